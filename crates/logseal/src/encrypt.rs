//! The encryption pipeline.
//!
//! One run: generate a fresh stream key, seal it for the recipient,
//! initialize the push stream, then interleave read → encrypt → write one
//! chunk at a time, finishing with the mandatory empty FINAL chunk and the
//! container's closing structure.

use std::io::{BufWriter, Read, Write};
use std::path::Path;

use logseal_core::{seal, PushStream, RecipientPublicKey, StreamKey};

use crate::envelope::EnvelopeWriter;
use crate::error::Result;
use crate::reader::{ChunkReader, DEFAULT_CHUNK_SIZE};

/// Encrypts files into recipient-sealed JSON containers.
///
/// Each [`encrypt_file`](Self::encrypt_file) call is an independent,
/// synchronous, single-threaded run with its own key material and file
/// handles; concurrent runs against distinct outputs need no coordination.
/// Handles are released on every exit path (they close on drop), though a
/// run that fails mid-way leaves a partially written, unparseable
/// container behind.
///
/// ```no_run
/// use logseal::{Encryptor, RecipientPublicKey};
///
/// fn main() -> logseal::Result<()> {
///     let recipient = RecipientPublicKey::from_base64("bV0f1zRHUeEtnu/o5HzoTUL9a2QUNY+BF5qdcMz2aFE=")?;
///     Encryptor::new(recipient).encrypt_file("app.log", "app.log.json")?;
///     Ok(())
/// }
/// ```
pub struct Encryptor {
    recipient: RecipientPublicKey,
    chunk_size: usize,
}

impl Encryptor {
    /// Create an encryptor for the given recipient.
    pub fn new(recipient: RecipientPublicKey) -> Self {
        Self {
            recipient,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the plaintext chunk size (default 4096 bytes).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Encrypt `input` into a container at `output`.
    ///
    /// The output file is created (truncating any existing file) before
    /// the first chunk is read.
    pub fn encrypt_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let (input, output) = (input.as_ref(), output.as_ref());
        tracing::debug!(input = %input.display(), output = %output.display(), "encrypting file");

        let writer = EnvelopeWriter::create(output)?;
        let chunks = ChunkReader::open(input, self.chunk_size)?;
        self.run(chunks, writer)
    }

    /// Encrypt from any reader into any writer.
    ///
    /// Same pipeline as [`encrypt_file`](Self::encrypt_file) without
    /// touching the filesystem.
    pub fn encrypt(&self, input: impl Read, output: impl Write) -> Result<()> {
        self.run(
            ChunkReader::new(input, self.chunk_size),
            EnvelopeWriter::new(BufWriter::new(output)),
        )
    }

    fn run<R: Read, W: Write>(
        &self,
        chunks: ChunkReader<R>,
        mut writer: EnvelopeWriter<W>,
    ) -> Result<()> {
        let key = StreamKey::generate();
        let sealed = seal(&key, &self.recipient)?;
        let (mut stream, header) = PushStream::init(&key)?;

        writer.write_header(&sealed, &header)?;

        let mut messages: u64 = 0;
        for chunk in chunks {
            let plaintext = chunk?;
            let ciphertext = stream.push(&plaintext)?;
            writer.write_chunk(&ciphertext, false)?;
            messages += 1;
        }

        // Always push the terminator, even for an empty input.
        let final_chunk = stream.finalize(b"")?;
        writer.write_chunk(&final_chunk, true)?;
        writer.close()?;

        tracing::debug!(messages = messages + 1, "container written");
        Ok(())
    }
}
