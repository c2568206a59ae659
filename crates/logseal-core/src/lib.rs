//! # logseal Core
//!
//! Pure cryptographic primitives for logseal: stream keys, sealed-key
//! envelopes, and streaming authenticated encryption.
//!
//! This crate contains no file I/O. It is pure computation over key
//! material and byte buffers; the container format and the pipeline that
//! produces it live in the `logseal` crate.
//!
//! ## Key Types
//!
//! - [`StreamKey`] - Ephemeral symmetric key, one per encryption run
//! - [`RecipientPublicKey`] - The recipient's static X25519 public key
//! - [`SealedStreamKey`] - The stream key, sealed for the recipient
//! - [`PushStream`] / [`StreamHeader`] - The streaming cipher
//!
//! ## Properties
//!
//! The producing process can encrypt but never decrypt: the stream key
//! exists in memory only for the duration of one run and leaves it solely
//! in sealed form. Chunks are chained by a counter nonce, so reordering,
//! tampering, or truncation is detectable by the recipient.

pub mod error;
pub mod keys;
pub mod seal;
pub mod stream;

pub use error::{CryptoError, KeyError};
pub use keys::{RecipientPublicKey, StreamKey, RECIPIENT_KEY_LEN, STREAM_KEY_LEN};
pub use seal::{seal, SealedStreamKey, SEALED_KEY_LEN};
pub use stream::{ChunkTag, PushStream, StreamHeader, CHUNK_OVERHEAD, STREAM_HEADER_LEN};
