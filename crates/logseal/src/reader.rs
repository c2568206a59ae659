//! Chunked input reading.
//!
//! The pipeline pulls plaintext from the input as a finite, ordered
//! sequence of fixed-size buffers so it never holds the whole file in
//! memory. The last buffer may be short; an empty input yields no buffers
//! at all.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Default read size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// A pull-based iterator of fixed-size plaintext buffers.
///
/// Reads `chunk_size` bytes per step, from offset 0 to end of input. A
/// buffer shorter than `chunk_size` (or an immediate end of input) ends
/// the sequence. Read failures surface as `Err` items and also end the
/// sequence.
pub struct ChunkReader<R> {
    inner: R,
    chunk_size: usize,
    done: bool,
}

impl ChunkReader<File> {
    /// Open a file for chunked reading.
    pub fn open(path: impl AsRef<Path>, chunk_size: usize) -> io::Result<Self> {
        Ok(Self::new(File::open(path)?, chunk_size))
    }
}

impl<R: Read> ChunkReader<R> {
    /// Wrap any reader.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(inner: R, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self {
            inner,
            chunk_size,
            done: false,
        }
    }

    // Fill as much of one chunk as the input has left.
    fn read_chunk(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_chunk() {
            Ok(buf) => {
                if buf.len() < self.chunk_size {
                    self.done = true;
                }
                if buf.is_empty() {
                    None
                } else {
                    Some(Ok(buf))
                }
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
