//! Key material: the ephemeral stream key and the recipient's public key.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use rand::RngCore;
use std::fmt;
use x25519_dalek::PublicKey;
use zeroize::Zeroize;

use crate::error::KeyError;

/// Length of a stream key in bytes (XChaCha20-Poly1305 key size).
pub const STREAM_KEY_LEN: usize = 32;

/// Length of a recipient public key in bytes (X25519).
pub const RECIPIENT_KEY_LEN: usize = 32;

/// The ephemeral symmetric key protecting one container's payload.
///
/// Generated fresh per encryption run, held only in memory, and zeroized
/// on drop. It leaves the process solely in sealed form (see
/// [`crate::seal`]).
#[derive(Clone)]
pub struct StreamKey {
    bytes: [u8; STREAM_KEY_LEN],
}

impl StreamKey {
    /// Generate a new random stream key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; STREAM_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; STREAM_KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; STREAM_KEY_LEN] {
        &self.bytes
    }
}

impl Drop for StreamKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// The recipient's long-lived X25519 public key.
///
/// Supplied by the caller's environment; at rest it is conventionally a
/// base64 string, which [`RecipientPublicKey::from_base64`] accepts.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecipientPublicKey(pub [u8; RECIPIENT_KEY_LEN]);

impl RecipientPublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; RECIPIENT_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a byte slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != RECIPIENT_KEY_LEN {
            return Err(KeyError::InvalidLength {
                expected: RECIPIENT_KEY_LEN,
                got: bytes.len(),
            });
        }
        let mut arr = [0u8; RECIPIENT_KEY_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parse from the base64 at-rest form.
    pub fn from_base64(s: &str) -> Result<Self, KeyError> {
        let bytes = BASE64_STANDARD
            .decode(s.trim())
            .map_err(|e| KeyError::InvalidBase64(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Encode to the base64 at-rest form.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(self.0)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; RECIPIENT_KEY_LEN] {
        &self.0
    }

    /// Convert to x25519-dalek `PublicKey`.
    pub fn to_dalek(&self) -> PublicKey {
        PublicKey::from(self.0)
    }
}

impl From<PublicKey> for RecipientPublicKey {
    fn from(pk: PublicKey) -> Self {
        Self(*pk.as_bytes())
    }
}

impl fmt::Debug for RecipientPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecipientPublicKey({})", &hex::encode(self.0)[..16])
    }
}

impl AsRef<[u8]> for RecipientPublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
