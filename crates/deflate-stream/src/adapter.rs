//! Pluggable byte sources and sinks.
//!
//! The session only ever talks to streams through [`ByteSource`] and
//! [`ByteSink`]. Every [`BufRead`] is a source and every [`Write`] is a sink,
//! so slices, cursors, files, sockets and vectors work unchanged. Types that
//! are neither implement the traits directly.

use std::io::{self, BufRead, Write};

/// Sequential input the session pulls uncompressed bytes from.
///
/// Every [`BufRead`] is a source. A plain [`Read`](std::io::Read) such as a
/// `File` or `TcpStream` needs wrapping in a [`BufReader`](std::io::BufReader)
/// first, since `at_end` peeks through `fill_buf`.
pub trait ByteSource {
    /// Reads up to `buf.len()` bytes into `buf`, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Reports whether the source has no more bytes to offer.
    fn at_end(&mut self) -> io::Result<bool>;
}

/// Destination the session pushes compressed bytes into.
///
/// A write may accept fewer bytes than offered; the transfer loop retries
/// with the remainder.
pub trait ByteSink {
    /// Writes a prefix of `buf`, returning how many bytes were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

impl<R: BufRead + ?Sized> ByteSource for R {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }

    fn at_end(&mut self) -> io::Result<bool> {
        Ok(self.fill_buf()?.is_empty())
    }
}

impl<W: Write + ?Sized> ByteSink for W {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(self, buf)
    }
}

/// Reads into `buf`, retrying reads interrupted by signals.
pub(crate) fn read_retrying<S: ByteSource + ?Sized>(
    source: &mut S,
    buf: &mut [u8],
) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            other => return other,
        }
    }
}

/// Probes for end of input, retrying probes interrupted by signals.
pub(crate) fn at_end_retrying<S: ByteSource + ?Sized>(source: &mut S) -> io::Result<bool> {
    loop {
        match source.at_end() {
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            other => return other,
        }
    }
}

/// Writes the whole of `buf`, retrying short and interrupted writes.
pub(crate) fn write_fully<K: ByteSink + ?Sized>(sink: &mut K, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        match sink.write(buf) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "sink accepted zero bytes of compressed output",
                ));
            }
            Ok(written) => buf = &buf[written..],
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
    Ok(())
}
