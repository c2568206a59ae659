//! # logseal
//!
//! Encrypt diagnostic log files into self-describing JSON containers that
//! only a designated recipient can decrypt.
//!
//! ## Overview
//!
//! A container is produced by a single synchronous pipeline:
//!
//! 1. Generate a fresh 32-byte stream key.
//! 2. Seal it under the recipient's static X25519 public key
//!    (anonymously; the producer keeps no way to decrypt).
//! 3. Stream-encrypt the input in fixed-size chunks with
//!    XChaCha20-Poly1305, each chunk authenticated and chained by a
//!    counter nonce.
//! 4. Serialize the sealed key, stream header, and ciphertext chunks
//!    incrementally into a JSON container, terminated by a single empty
//!    FINAL chunk.
//!
//! ## Usage
//!
//! ```no_run
//! use logseal::{Encryptor, RecipientPublicKey};
//!
//! fn main() -> logseal::Result<()> {
//!     let recipient = RecipientPublicKey::from_base64(
//!         "bV0f1zRHUeEtnu/o5HzoTUL9a2QUNY+BF5qdcMz2aFE=",
//!     )?;
//!     Encryptor::new(recipient)
//!         .encrypt_file("diagnostics.log", "diagnostics.log.json")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! The cryptographic primitives live in `logseal-core`, re-exported here
//! as the `core` module.

pub mod encrypt;
pub mod envelope;
pub mod error;
pub mod reader;

// Re-export the primitives crate
pub use logseal_core as core;

// Re-export main types for convenience
pub use encrypt::Encryptor;
pub use envelope::{EnvelopeWriter, FORMAT_VERSION};
pub use error::{EncryptError, Result};
pub use reader::{ChunkReader, DEFAULT_CHUNK_SIZE};

// Re-export commonly used core types
pub use logseal_core::{RecipientPublicKey, SealedStreamKey, StreamHeader, StreamKey};
