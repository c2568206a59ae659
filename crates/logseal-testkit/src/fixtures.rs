//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a recipient keypair, a
//! temporary directory, and factories for log files and containers.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use logseal::Encryptor;

use crate::decrypt::{decrypt_envelope_file, RecipientKeyPair};

/// A test fixture with a recipient keypair and a scratch directory.
pub struct TestFixture {
    dir: TempDir,
    /// The recipient: public half feeds the pipeline, secret half the
    /// reference decryptor.
    pub recipient: RecipientKeyPair,
}

impl TestFixture {
    /// Create a new fixture with a random recipient.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("creating scratch directory"),
            recipient: RecipientKeyPair::generate(),
        }
    }

    /// Create with a deterministic recipient from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            dir: TempDir::new().expect("creating scratch directory"),
            recipient: RecipientKeyPair::from_seed(seed),
        }
    }

    /// Path of a file inside the scratch directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a log file of `len` bytes with deterministic content.
    pub fn make_log_file(&self, name: &str, len: usize) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, log_bytes(len)).expect("writing log fixture");
        path
    }

    /// An encryptor targeting this fixture's recipient.
    pub fn encryptor(&self) -> Encryptor {
        Encryptor::new(self.recipient.public_key())
    }

    /// Encrypt `input` into `<input>.json` and return the container path.
    pub fn encrypt(&self, input: &Path) -> PathBuf {
        let mut output = input.to_path_buf();
        output.set_extension("json");
        self.encryptor()
            .encrypt_file(input, &output)
            .expect("encrypting fixture file");
        output
    }

    /// Decrypt a container with this fixture's recipient secret.
    pub fn decrypt(&self, container: &Path) -> anyhow::Result<Vec<u8>> {
        decrypt_envelope_file(container, &self.recipient)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic log-shaped bytes of exactly `len` bytes.
pub fn log_bytes(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut line = 0u64;
    while out.len() < len {
        out.extend_from_slice(
            format!("2026-08-07T10:21:{:02}Z DEBUG request {} handled\n", line % 60, line)
                .as_bytes(),
        );
        line += 1;
    }
    out.truncate(len);
    out
}
