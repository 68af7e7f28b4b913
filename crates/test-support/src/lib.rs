//! Shared fixtures for exercising compression sessions in tests.
//!
//! The readers and writers here misbehave in controlled ways (short reads,
//! short writes, interruptions, hard failures) so tests can drive every branch
//! of the transfer loop without real sockets. Decoders wrap `flate2` so tests
//! can assert round trips for each framing.

#![deny(unsafe_code)]

use std::io::{self, BufRead, Cursor, Read, Write};

use tempfile::NamedTempFile;

// =============================================================================
// Payload generators
// =============================================================================

/// Highly compressible repetitive text of exactly `size` bytes.
pub fn repetitive_text(size: usize) -> Vec<u8> {
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    pattern.iter().cycle().take(size).copied().collect()
}

/// Pseudo-random bytes from a linear congruential generator.
pub fn random_data(size: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..size)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}

/// Writes `payload` to a fresh temporary file and rewinds nothing; reopen by path.
pub fn payload_file(payload: &[u8]) -> io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(payload)?;
    file.flush()?;
    Ok(file)
}

// =============================================================================
// Decoders
// =============================================================================

/// Inflates a bare DEFLATE stream.
pub fn inflate_raw(compressed: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoded = Vec::new();
    flate2::read::DeflateDecoder::new(compressed).read_to_end(&mut decoded)?;
    Ok(decoded)
}

/// Inflates a zlib-wrapped stream, verifying its Adler-32 trailer.
pub fn inflate_zlib(compressed: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoded = Vec::new();
    flate2::read::ZlibDecoder::new(compressed).read_to_end(&mut decoded)?;
    Ok(decoded)
}

/// Decodes a single gzip member, verifying its CRC-32 and length trailer.
pub fn gunzip(compressed: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoded = Vec::new();
    flate2::read::GzDecoder::new(compressed).read_to_end(&mut decoded)?;
    Ok(decoded)
}

// =============================================================================
// Readers
// =============================================================================

/// Buffered reader that never hands out more than `max` bytes per call.
///
/// Both `read` and `fill_buf` are capped, so consumers see the same increments
/// a socket delivering fixed-size packets would produce.
#[derive(Debug)]
pub struct ChunkedReader<R> {
    inner: R,
    max: usize,
    reads: usize,
}

impl ChunkedReader<Cursor<Vec<u8>>> {
    /// Wraps an owned payload.
    pub fn from_bytes(payload: Vec<u8>, max: usize) -> Self {
        Self::new(Cursor::new(payload), max)
    }

    /// Returns how many bytes have been consumed from the payload.
    pub fn position(&self) -> u64 {
        self.inner.position()
    }
}

impl<R: BufRead> ChunkedReader<R> {
    /// Wraps `inner`, capping every read at `max` bytes.
    pub fn new(inner: R, max: usize) -> Self {
        assert!(max > 0, "chunk size must be non-zero");
        Self {
            inner,
            max,
            reads: 0,
        }
    }

    /// Returns the number of non-empty reads served.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> Read for ChunkedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.consume(count);
        if count > 0 {
            self.reads += 1;
        }
        Ok(count)
    }
}

impl<R: BufRead> BufRead for ChunkedReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        let max = self.max;
        let available = self.inner.fill_buf()?;
        Ok(&available[..available.len().min(max)])
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
    }
}

/// Reader that serves `data` until `fail_at` bytes have been read, then fails.
#[derive(Debug)]
pub struct FailingReader {
    data: Cursor<Vec<u8>>,
    fail_at: u64,
    kind: io::ErrorKind,
}

impl FailingReader {
    /// Creates a reader that fails with `kind` once `fail_at` bytes were served.
    pub fn new(data: Vec<u8>, fail_at: u64, kind: io::ErrorKind) -> Self {
        Self {
            data: Cursor::new(data),
            fail_at,
            kind,
        }
    }

    fn check(&self) -> io::Result<()> {
        if self.data.position() >= self.fail_at {
            Err(io::Error::new(self.kind, "injected read failure"))
        } else {
            Ok(())
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.consume(count);
        Ok(count)
    }
}

impl BufRead for FailingReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.check()?;
        let allowed = (self.fail_at - self.data.position()) as usize;
        let available = self.data.fill_buf()?;
        Ok(&available[..available.len().min(allowed)])
    }

    fn consume(&mut self, amt: usize) {
        self.data.consume(amt);
    }
}

// =============================================================================
// Writers
// =============================================================================

/// Writer that accepts at most `max` bytes per call and reports
/// `ErrorKind::Interrupted` on every `interrupt_every`-th call.
#[derive(Debug, Default)]
pub struct ShortWriter {
    data: Vec<u8>,
    max: usize,
    interrupt_every: Option<usize>,
    calls: usize,
}

impl ShortWriter {
    /// Creates a writer that accepts up to `max` bytes per call.
    pub fn new(max: usize) -> Self {
        assert!(max > 0, "short writer must accept at least one byte");
        Self {
            max,
            ..Self::default()
        }
    }

    /// Makes every `n`-th write call fail with `ErrorKind::Interrupted`.
    pub fn interrupting_every(mut self, n: usize) -> Self {
        self.interrupt_every = Some(n);
        self
    }

    /// Returns the bytes accepted so far.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of write calls observed, interrupted ones included.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Consumes the writer, returning the accepted bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        if let Some(n) = self.interrupt_every {
            if self.calls % n == 0 {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
        }
        let count = buf.len().min(self.max);
        self.data.extend_from_slice(&buf[..count]);
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that accepts `budget` bytes and then fails with `kind`.
#[derive(Debug)]
pub struct FailingWriter {
    data: Vec<u8>,
    budget: usize,
    kind: io::ErrorKind,
}

impl FailingWriter {
    /// Creates a writer that fails with `kind` after accepting `budget` bytes.
    pub fn new(budget: usize, kind: io::ErrorKind) -> Self {
        Self {
            data: Vec::new(),
            budget,
            kind,
        }
    }

    /// Returns the bytes accepted before the failure.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.budget - self.data.len();
        if room == 0 {
            return Err(io::Error::new(self.kind, "injected write failure"));
        }
        let count = buf.len().min(room);
        self.data.extend_from_slice(&buf[..count]);
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
