#![allow(clippy::module_name_repetitions)]

//! [`std::io::Write`] front-end over a [`CompressionSession`].
//!
//! Each `write` call compresses straight through to the wrapped sink, so a
//! response pipeline can `io::copy` a body into the writer without holding
//! the payload. The writer records the number of compressed bytes produced so
//! higher layers can report accurate transfer sizes.

use std::io::{self, Write};

use crate::error::CompressError;
use crate::framing::FramingMode;
use crate::level::CompressionLevel;
use crate::session::CompressionSession;

/// Streaming encoder that forwards compressed bytes to `W` and counts them.
#[derive(Debug)]
pub struct CountingDeflateWriter<W>
where
    W: Write,
{
    sink: W,
    session: CompressionSession,
}

impl<W> CountingDeflateWriter<W>
where
    W: Write,
{
    /// Creates a new encoder that writes compressed bytes into `sink`.
    pub fn new(
        sink: W,
        framing: FramingMode,
        level: CompressionLevel,
    ) -> Result<Self, CompressError> {
        Ok(Self {
            sink,
            session: CompressionSession::new(framing, level)?,
        })
    }

    /// Returns the number of compressed bytes written to the sink so far.
    #[must_use]
    pub const fn bytes_written(&self) -> u64 {
        self.session.bytes_out()
    }

    /// Returns the number of uncompressed bytes accepted so far.
    #[must_use]
    pub const fn bytes_consumed(&self) -> u64 {
        self.session.bytes_in()
    }

    /// Returns the framing of the produced stream.
    #[must_use]
    pub const fn framing(&self) -> FramingMode {
        self.session.framing()
    }

    /// Provides immutable access to the underlying sink.
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Provides mutable access to the underlying sink.
    ///
    /// Writing to the sink directly corrupts the compressed stream.
    #[must_use]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Completes the stream and returns the sink together with the total
    /// number of compressed bytes written.
    pub fn finish_into_inner(mut self) -> io::Result<(W, u64)> {
        self.session.finish_to(&mut self.sink)?;
        self.sink.flush()?;
        Ok((self.sink, self.session.bytes_out()))
    }
}

impl<W> Write for CountingDeflateWriter<W>
where
    W: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.session.add_data_to(&mut self.sink, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}
