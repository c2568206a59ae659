//! Error types for the core crate.

use thiserror::Error;

/// Errors produced while parsing or validating recipient key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The key is not valid base64.
    #[error("recipient key is not valid base64: {0}")]
    InvalidBase64(String),

    /// The key has the wrong length.
    #[error("recipient key has invalid length: expected {expected}, got {got}")]
    InvalidLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        got: usize,
    },
}

/// Errors that can occur during sealing or streaming encryption.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Sealing the stream key failed.
    #[error("sealing stream key failed: {0}")]
    SealFailed(String),

    /// Initializing the streaming cipher failed.
    #[error("stream initialization failed: {0}")]
    InitFailed(String),

    /// Encrypting a stream chunk failed.
    #[error("chunk encryption failed: {0}")]
    EncryptFailed(String),

    /// The stream's message counter is exhausted.
    ///
    /// Advancing past it would reuse a nonce, so the stream refuses.
    #[error("stream message counter exhausted")]
    StreamExhausted,
}

/// Result type for core operations.
pub type Result<T, E = CryptoError> = std::result::Result<T, E>;
