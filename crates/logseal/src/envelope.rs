//! The JSON container format and its incremental writer.
//!
//! A container is UTF-8 text, structurally JSON:
//!
//! ```json
//! {
//!     "keyedWith": "v1",
//!     "encryptedKey": "<base64 sealed stream key>",
//!     "header": "<base64 stream header>",
//!     "messages": [
//!         "<base64 chunk 0>",
//!         "<base64 final chunk>"
//!     ]
//! }
//! ```
//!
//! `messages` preserves strict read order; the last element is always the
//! FINAL chunk. The writer emits the container incrementally, one chunk
//! per line, so the pipeline never buffers the encrypted payload. The
//! output is well-formed JSON only once [`EnvelopeWriter::close`] has run.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use logseal_core::{SealedStreamKey, StreamHeader};

/// Container format version. Only `"v1"` is defined.
pub const FORMAT_VERSION: &str = "v1";

/// Incremental writer for the JSON container.
///
/// Call [`write_header`](Self::write_header) once, then
/// [`write_chunk`](Self::write_chunk) for each ciphertext chunk in order
/// (passing `is_last` for the final one), then [`close`](Self::close).
/// Dropping the writer without `close` releases the underlying handle but
/// leaves the container unterminated.
pub struct EnvelopeWriter<W: Write> {
    out: W,
    wrote_header: bool,
}

impl EnvelopeWriter<BufWriter<File>> {
    /// Create the output file (truncating any existing content) and wrap
    /// it in a buffered writer.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> EnvelopeWriter<W> {
    /// Wrap any writer.
    pub fn new(out: W) -> Self {
        Self {
            out,
            wrote_header: false,
        }
    }

    /// Write the version tag, sealed key, stream header, and the opening
    /// of the chunk list.
    pub fn write_header(
        &mut self,
        sealed_key: &SealedStreamKey,
        header: &StreamHeader,
    ) -> io::Result<()> {
        debug_assert!(!self.wrote_header, "header written twice");
        self.wrote_header = true;
        write!(
            self.out,
            "{{\n    \"keyedWith\": \"{}\",\n    \"encryptedKey\": \"{}\",\n    \"header\": \"{}\",\n    \"messages\": [\n",
            FORMAT_VERSION,
            BASE64_STANDARD.encode(sealed_key.as_bytes()),
            BASE64_STANDARD.encode(header.as_bytes()),
        )
    }

    /// Append one base64-encoded chunk element.
    ///
    /// Writes a trailing separator unless `is_last`.
    pub fn write_chunk(&mut self, chunk: &[u8], is_last: bool) -> io::Result<()> {
        debug_assert!(self.wrote_header, "chunk written before header");
        let separator = if is_last { "\n" } else { ",\n" };
        write!(
            self.out,
            "        \"{}\"{}",
            BASE64_STANDARD.encode(chunk),
            separator
        )
    }

    /// Write the closing structure, flush, and return the inner writer.
    pub fn close(mut self) -> io::Result<W> {
        self.out.write_all(b"    ]\n}\n")?;
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logseal_core::{seal, PushStream, RecipientPublicKey, StreamKey};

    fn sample_parts() -> (SealedStreamKey, StreamHeader) {
        let key = StreamKey::generate();
        let recipient = RecipientPublicKey::from_bytes([7; 32]);
        let sealed = seal(&key, &recipient).unwrap();
        let (_, header) = PushStream::init(&key).unwrap();
        (sealed, header)
    }

    fn written(chunks: &[(&[u8], bool)]) -> String {
        let (sealed, header) = sample_parts();
        let mut writer = EnvelopeWriter::new(Vec::new());
        writer.write_header(&sealed, &header).unwrap();
        for (chunk, is_last) in chunks {
            writer.write_chunk(chunk, *is_last).unwrap();
        }
        String::from_utf8(writer.close().unwrap()).unwrap()
    }

    #[test]
    fn test_output_is_valid_json() {
        let text = written(&[(b"first", false), (b"second", false), (b"", true)]);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["keyedWith"], FORMAT_VERSION);
        assert_eq!(value["messages"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_fields_are_base64() {
        let text = written(&[(b"chunk", true)]);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        for field in ["encryptedKey", "header"] {
            let encoded = value[field].as_str().unwrap();
            assert!(BASE64_STANDARD.decode(encoded).is_ok(), "{field} not base64");
        }
        let message = value["messages"][0].as_str().unwrap();
        assert_eq!(BASE64_STANDARD.decode(message).unwrap(), b"chunk");
    }

    #[test]
    fn test_messages_preserve_order() {
        let text = written(&[(b"a", false), (b"b", false), (b"c", true)]);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        let decoded: Vec<Vec<u8>> = value["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| BASE64_STANDARD.decode(m.as_str().unwrap()).unwrap())
            .collect();
        assert_eq!(decoded, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_single_chunk_container() {
        let text = written(&[(b"only", true)]);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_unclosed_container_is_not_json() {
        let (sealed, header) = sample_parts();
        let mut out = Vec::new();
        {
            let mut writer = EnvelopeWriter::new(&mut out);
            writer.write_header(&sealed, &header).unwrap();
            writer.write_chunk(b"chunk", false).unwrap();
            // Dropped without close.
        }
        let text = String::from_utf8(out).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&text).is_err());
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("container.json");
        std::fs::write(&path, "stale contents that must disappear").unwrap();

        let (sealed, header) = sample_parts();
        let mut writer = EnvelopeWriter::create(&path).unwrap();
        writer.write_header(&sealed, &header).unwrap();
        writer.write_chunk(b"fresh", true).unwrap();
        writer.close().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("stale"));
        assert!(serde_json::from_str::<serde_json::Value>(&text).is_ok());
    }
}
