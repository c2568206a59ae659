//! Reference container decryptor.
//!
//! The shipped library deliberately cannot decrypt: the recipient's
//! secret key never enters the producing process. Verifying the pipeline
//! end to end still requires the recipient's side of every construction,
//! so this module implements it — for tests only.

use anyhow::{bail, Context, Result};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce, XChaCha20Poly1305, XNonce,
};
use serde::Deserialize;
use std::path::Path;
use x25519_dalek::{PublicKey, StaticSecret};

use logseal::FORMAT_VERSION;
use logseal_core::seal::{derive_wrap_key, SEALED_KEY_LEN, SEAL_NONCE_LEN};
use logseal_core::stream::{message_nonce, STREAM_HEADER_LEN};
use logseal_core::{ChunkTag, RecipientPublicKey, SealedStreamKey, StreamHeader, StreamKey};

/// Deserialized form of a JSON container.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Format version discriminator.
    #[serde(rename = "keyedWith")]
    pub keyed_with: String,

    /// Base64 sealed stream key.
    #[serde(rename = "encryptedKey")]
    pub encrypted_key: String,

    /// Base64 stream header.
    pub header: String,

    /// Base64 ciphertext chunks, in stream order.
    pub messages: Vec<String>,
}

/// A recipient's X25519 keypair. Holds the secret the production system
/// never sees.
pub struct RecipientKeyPair {
    secret: StaticSecret,
}

impl RecipientKeyPair {
    /// Generate a random recipient keypair.
    pub fn generate() -> Self {
        Self {
            secret: StaticSecret::random_from_rng(rand::thread_rng()),
        }
    }

    /// Create a deterministic keypair from seed bytes.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            secret: StaticSecret::from(seed),
        }
    }

    /// The public half, as the production pipeline consumes it.
    pub fn public_key(&self) -> RecipientPublicKey {
        RecipientPublicKey::from(PublicKey::from(&self.secret))
    }

    /// Recover the stream key from a sealed blob.
    pub fn open_sealed_key(&self, sealed: &SealedStreamKey) -> Result<StreamKey> {
        let bytes = sealed.as_bytes();
        if bytes.len() != SEALED_KEY_LEN {
            bail!(
                "sealed key has invalid length: expected {SEALED_KEY_LEN}, got {}",
                bytes.len()
            );
        }

        let ephemeral: [u8; 32] = bytes[..32].try_into().expect("length checked");
        let nonce = &bytes[32..32 + SEAL_NONCE_LEN];
        let ciphertext = &bytes[32 + SEAL_NONCE_LEN..];

        let shared = self.secret.diffie_hellman(&PublicKey::from(ephemeral));
        let recipient_public = PublicKey::from(&self.secret);
        let wrap_key = derive_wrap_key(shared.as_bytes(), &ephemeral, recipient_public.as_bytes());

        let cipher = ChaCha20Poly1305::new_from_slice(&wrap_key)
            .map_err(|_| anyhow::anyhow!("wrap key rejected by cipher"))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| anyhow::anyhow!("sealed key failed authentication"))?;

        let arr: [u8; 32] = plaintext
            .as_slice()
            .try_into()
            .map_err(|_| anyhow::anyhow!("unsealed key has wrong length"))?;
        Ok(StreamKey::from_bytes(arr))
    }
}

impl std::fmt::Debug for RecipientKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecipientKeyPair({:?})", self.public_key())
    }
}

/// The receiving half of a stream: decrypts chunks in order.
pub struct PullStream {
    cipher: XChaCha20Poly1305,
    header: StreamHeader,
    counter: u64,
}

impl PullStream {
    /// Initialize a pull stream from the key and the container's header.
    pub fn init(key: &StreamKey, header: StreamHeader) -> Result<Self> {
        let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|_| anyhow::anyhow!("stream key rejected by cipher"))?;
        Ok(Self {
            cipher,
            header,
            counter: 0,
        })
    }

    /// Decrypt the next chunk, returning its tag and plaintext.
    ///
    /// Fails if the chunk was tampered with, reordered, or encrypted
    /// under a different key or header.
    pub fn pull(&mut self, chunk: &[u8]) -> Result<(ChunkTag, Vec<u8>)> {
        let nonce_bytes = message_nonce(&self.header, self.counter);
        let mut message = self
            .cipher
            .decrypt(XNonce::from_slice(&nonce_bytes), chunk)
            .map_err(|_| {
                anyhow::anyhow!("chunk {} failed authentication", self.counter)
            })?;
        self.counter += 1;

        let tag_byte = match message.first() {
            Some(&b) => b,
            None => bail!("chunk {} decodes to an empty message", self.counter - 1),
        };
        let tag = ChunkTag::from_byte(tag_byte)
            .with_context(|| format!("chunk {} carries unknown tag {tag_byte}", self.counter - 1))?;
        message.remove(0);
        Ok((tag, message))
    }
}

/// Decrypt a complete container from its JSON text.
///
/// Enforces the container invariants: supported version, well-formed
/// base64, every chunk authenticated in order, and exactly one FINAL
/// chunk, last.
pub fn decrypt_envelope(text: &str, recipient: &RecipientKeyPair) -> Result<Vec<u8>> {
    let envelope: Envelope = serde_json::from_str(text).context("container is not valid JSON")?;
    if envelope.keyed_with != FORMAT_VERSION {
        bail!("unsupported container version {:?}", envelope.keyed_with);
    }

    let sealed = SealedStreamKey::from_bytes(
        BASE64_STANDARD
            .decode(&envelope.encrypted_key)
            .context("encryptedKey is not valid base64")?,
    );
    let header_bytes: [u8; STREAM_HEADER_LEN] = BASE64_STANDARD
        .decode(&envelope.header)
        .context("header is not valid base64")?
        .as_slice()
        .try_into()
        .map_err(|_| anyhow::anyhow!("header has wrong length"))?;

    let key = recipient.open_sealed_key(&sealed)?;
    let mut stream = PullStream::init(&key, StreamHeader::from_bytes(header_bytes))?;

    let mut plaintext = Vec::new();
    let mut finished = false;
    for (index, message) in envelope.messages.iter().enumerate() {
        if finished {
            bail!("chunk at index {index} appears after FINAL");
        }
        let chunk = BASE64_STANDARD
            .decode(message)
            .with_context(|| format!("message {index} is not valid base64"))?;
        let (tag, data) = stream.pull(&chunk)?;
        plaintext.extend_from_slice(&data);
        if tag == ChunkTag::Final {
            finished = true;
        }
    }
    if !finished {
        bail!("container is truncated: no FINAL chunk");
    }

    Ok(plaintext)
}

/// Decrypt a container file.
pub fn decrypt_envelope_file(path: impl AsRef<Path>, recipient: &RecipientKeyPair) -> Result<Vec<u8>> {
    let text = std::fs::read_to_string(path).context("reading container file")?;
    decrypt_envelope(&text, recipient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logseal_core::seal;

    #[test]
    fn test_open_sealed_key_roundtrip() {
        let recipient = RecipientKeyPair::generate();
        let key = StreamKey::generate();

        let sealed = seal(&key, &recipient.public_key()).unwrap();
        let opened = recipient.open_sealed_key(&sealed).unwrap();
        assert_eq!(key.as_bytes(), opened.as_bytes());
    }

    #[test]
    fn test_open_sealed_key_wrong_recipient() {
        let recipient = RecipientKeyPair::generate();
        let other = RecipientKeyPair::generate();

        let sealed = seal(&StreamKey::generate(), &recipient.public_key()).unwrap();
        assert!(other.open_sealed_key(&sealed).is_err());
    }

    #[test]
    fn test_open_sealed_key_bad_length() {
        let recipient = RecipientKeyPair::generate();
        let sealed = SealedStreamKey::from_bytes(vec![0u8; 10]);
        assert!(recipient.open_sealed_key(&sealed).is_err());
    }

    #[test]
    fn test_pull_stream_rejects_out_of_order() {
        use logseal_core::PushStream;

        let key = StreamKey::generate();
        let (mut push, header) = PushStream::init(&key).unwrap();
        let _c0 = push.push(b"zero").unwrap();
        let c1 = push.push(b"one").unwrap();

        let mut pull = PullStream::init(&key, header).unwrap();
        // First pull expects counter 0, but c1 was encrypted at counter 1.
        assert!(pull.pull(&c1).is_err());
    }

    #[test]
    fn test_from_seed_is_deterministic() {
        let a = RecipientKeyPair::from_seed([9; 32]);
        let b = RecipientKeyPair::from_seed([9; 32]);
        assert_eq!(a.public_key(), b.public_key());
    }
}
