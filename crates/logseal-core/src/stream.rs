//! Streaming authenticated encryption.
//!
//! A push stream encrypts an ordered sequence of plaintext chunks under
//! one stream key. Each chunk becomes an XChaCha20-Poly1305 message whose
//! nonce is the stream header followed by a big-endian message counter, so
//! no nonce repeats within a stream and a reordered, duplicated, or
//! substituted chunk fails authentication on the pull side. A one-byte
//! chunk tag (MESSAGE or FINAL) is prepended to the plaintext before
//! encryption, making the marker both confidential and authenticated; a
//! stream without a FINAL chunk is detectably truncated.
//!
//! Chunk wire format:
//!
//! ```text
//! ciphertext = XChaCha20-Poly1305(nonce = header || counter_be, tag_byte || plaintext)
//! ```

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use std::fmt;

use crate::error::{CryptoError, Result};
use crate::keys::StreamKey;

/// Length of a stream header in bytes.
pub const STREAM_HEADER_LEN: usize = 16;

/// Length of the full XChaCha20-Poly1305 nonce (header + counter).
pub const STREAM_NONCE_LEN: usize = 24;

/// Bytes a chunk's ciphertext exceeds its plaintext by:
/// one encrypted tag byte plus the Poly1305 tag.
pub const CHUNK_OVERHEAD: usize = 1 + 16;

/// Marker carried by every encrypted chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkTag {
    /// An ordinary payload chunk.
    Message,
    /// The last chunk of a stream. Exactly one per stream, always last.
    Final,
}

impl ChunkTag {
    /// Wire encoding of the tag.
    pub const fn as_byte(self) -> u8 {
        match self {
            ChunkTag::Message => 0,
            ChunkTag::Final => 1,
        }
    }

    /// Decode a tag byte.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ChunkTag::Message),
            1 => Some(ChunkTag::Final),
            _ => None,
        }
    }
}

/// Public per-stream context emitted at initialization.
///
/// Random per stream; required (with the sealed key) to decrypt. Travels
/// in the clear in the container.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader(pub [u8; STREAM_HEADER_LEN]);

impl StreamHeader {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; STREAM_HEADER_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; STREAM_HEADER_LEN] {
        &self.0
    }
}

impl fmt::Debug for StreamHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamHeader({})", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for StreamHeader {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Build the nonce for the message at `counter` within a stream.
///
/// Exposed so recipient-side tooling can reconstruct it.
pub fn message_nonce(header: &StreamHeader, counter: u64) -> [u8; STREAM_NONCE_LEN] {
    let mut nonce = [0u8; STREAM_NONCE_LEN];
    nonce[..STREAM_HEADER_LEN].copy_from_slice(header.as_bytes());
    nonce[STREAM_HEADER_LEN..].copy_from_slice(&counter.to_be_bytes());
    nonce
}

/// The sending half of a stream: encrypts chunks in order.
///
/// Obtained from [`PushStream::init`]. Call [`push`](PushStream::push) for
/// each payload chunk, then [`finalize`](PushStream::finalize) exactly
/// once; `finalize` consumes the stream, so pushing after FINAL does not
/// compile.
pub struct PushStream {
    cipher: XChaCha20Poly1305,
    header: StreamHeader,
    counter: u64,
}

impl PushStream {
    /// Initialize a push stream bound to `key`.
    ///
    /// Returns the stream and its public header.
    pub fn init(key: &StreamKey) -> Result<(Self, StreamHeader)> {
        let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::InitFailed(e.to_string()))?;

        let mut header_bytes = [0u8; STREAM_HEADER_LEN];
        rand::thread_rng().fill_bytes(&mut header_bytes);
        let header = StreamHeader::from_bytes(header_bytes);

        let stream = Self {
            cipher,
            header,
            counter: 0,
        };
        Ok((stream, header))
    }

    /// Encrypt one payload chunk.
    pub fn push(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.push_with_tag(plaintext, ChunkTag::Message)
    }

    /// Encrypt the final chunk and consume the stream.
    ///
    /// The plaintext may be (and for containers is) empty.
    pub fn finalize(mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.push_with_tag(plaintext, ChunkTag::Final)
    }

    fn push_with_tag(&mut self, plaintext: &[u8], tag: ChunkTag) -> Result<Vec<u8>> {
        let counter = self.counter;
        // Claim the counter before encrypting so a failed push can never
        // lead to nonce reuse.
        self.counter = counter.checked_add(1).ok_or(CryptoError::StreamExhausted)?;

        let nonce_bytes = message_nonce(&self.header, counter);
        let nonce = XNonce::from_slice(&nonce_bytes);

        let mut message = Vec::with_capacity(1 + plaintext.len());
        message.push(tag.as_byte());
        message.extend_from_slice(plaintext);

        self.cipher
            .encrypt(nonce, message.as_slice())
            .map_err(|e| CryptoError::EncryptFailed(e.to_string()))
    }
}

impl fmt::Debug for PushStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushStream")
            .field("header", &self.header)
            .field("counter", &self.counter)
            .finish()
    }
}
