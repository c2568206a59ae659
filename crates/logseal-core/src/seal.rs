//! Sealing the stream key for the recipient.
//!
//! The stream key is encrypted anonymously under the recipient's static
//! X25519 public key: an ephemeral keypair is generated, ECDH produces a
//! shared secret, a wrap key is derived from it with BLAKE3, and the
//! stream key is encrypted with ChaCha20-Poly1305. The ephemeral secret is
//! dropped immediately, so nothing identifies or authenticates a sender.
//!
//! Sealed key wire format:
//!
//! ```text
//! [32 bytes: ephemeral X25519 public key][12 bytes: nonce][48 bytes: ciphertext + tag]
//! ```

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use std::fmt;
use x25519_dalek::{EphemeralSecret, PublicKey};
use zeroize::Zeroize;

use crate::error::{CryptoError, Result};
use crate::keys::{RecipientPublicKey, StreamKey, RECIPIENT_KEY_LEN, STREAM_KEY_LEN};

/// Length of the nonce used when wrapping the stream key.
pub const SEAL_NONCE_LEN: usize = 12;

/// Length of the Poly1305 authentication tag.
pub const SEAL_TAG_LEN: usize = 16;

/// Total length of a sealed stream key.
pub const SEALED_KEY_LEN: usize =
    RECIPIENT_KEY_LEN + SEAL_NONCE_LEN + STREAM_KEY_LEN + SEAL_TAG_LEN;

/// Domain separation context for the wrap key derivation.
const WRAP_KEY_CONTEXT: &str = "logseal v1 stream key wrap";

/// A stream key sealed under a recipient public key.
///
/// Only the holder of the matching X25519 secret key can recover the
/// stream key from this blob.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedStreamKey(Vec<u8>);

impl SealedStreamKey {
    /// Wrap an existing sealed blob (e.g. read back from a container).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for SealedStreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SealedStreamKey({} bytes)", self.0.len())
    }
}

/// Derive the key that wraps the stream key.
///
/// Binds the ECDH shared secret and both public keys, so a sealed blob
/// cannot be re-targeted to a different recipient. The recipient side
/// performs the same derivation to unwrap.
pub fn derive_wrap_key(
    shared_secret: &[u8; 32],
    ephemeral_public: &[u8; RECIPIENT_KEY_LEN],
    recipient_public: &[u8; RECIPIENT_KEY_LEN],
) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(WRAP_KEY_CONTEXT);
    hasher.update(shared_secret);
    hasher.update(ephemeral_public);
    hasher.update(recipient_public);
    *hasher.finalize().as_bytes()
}

/// Seal a stream key under the recipient's public key.
pub fn seal(key: &StreamKey, recipient: &RecipientPublicKey) -> Result<SealedStreamKey> {
    let ephemeral = EphemeralSecret::random_from_rng(rand::thread_rng());
    let ephemeral_public = PublicKey::from(&ephemeral);

    let shared = ephemeral.diffie_hellman(&recipient.to_dalek());
    let mut wrap_key = derive_wrap_key(
        shared.as_bytes(),
        ephemeral_public.as_bytes(),
        recipient.as_bytes(),
    );

    let cipher = ChaCha20Poly1305::new_from_slice(&wrap_key)
        .map_err(|e| CryptoError::SealFailed(e.to_string()))?;

    let mut nonce_bytes = [0u8; SEAL_NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), key.as_bytes().as_ref())
        .map_err(|e| CryptoError::SealFailed(e.to_string()));
    wrap_key.zeroize();
    let ciphertext = ciphertext?;

    let mut out = Vec::with_capacity(SEALED_KEY_LEN);
    out.extend_from_slice(ephemeral_public.as_bytes());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);

    Ok(SealedStreamKey(out))
}
