//! Error types for the encryption pipeline.

use thiserror::Error;

use logseal_core::{CryptoError, KeyError};

/// Errors surfaced by an encryption run.
///
/// Any of these aborts the run immediately; there is no retry and no
/// rollback of a partially written container. File handles are released
/// on every path regardless.
#[derive(Debug, Error)]
pub enum EncryptError {
    /// The recipient public key was missing or malformed.
    #[error("recipient key error: {0}")]
    Recipient(#[from] KeyError),

    /// Key generation, sealing, or streaming encryption failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Reading the input or writing the container failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for encryption operations.
pub type Result<T> = std::result::Result<T, EncryptError>;
