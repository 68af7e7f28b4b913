//! The DEFLATE primitive driven by the transfer loop.
//!
//! [`Deflater`] models the conventional streaming codec contract: each step
//! consumes some prefix of the presented input, writes into a bounded output
//! slice, and reports whether the stream has ended. The engine never looks
//! past the counts and status a step returns.
//!
//! [`FlateDeflater`] is the production implementation. It drives a persistent
//! [`flate2::Compress`] stream and layers gzip member framing on top when
//! [`FramingMode::GzipWrapped`] is selected.

use flate2::{Compress, FlushCompress, Status};

use crate::error::DeflateError;
use crate::framing::{FramingMode, GZIP_HEADER_LEN, GZIP_TRAILER_LEN, gzip_header, gzip_trailer};
use crate::level::{CompressionLevel, CompressionLevelError};

/// Flush instruction given to the primitive on each step.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FlushMode {
    /// More input may follow; emit output only as the compressor sees fit.
    None,
    /// No more input follows; emit everything including the trailer.
    Finish,
}

impl From<FlushMode> for FlushCompress {
    fn from(mode: FlushMode) -> Self {
        match mode {
            FlushMode::None => FlushCompress::None,
            FlushMode::Finish => FlushCompress::Finish,
        }
    }
}

/// Status reported by a successful primitive step.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StepStatus {
    /// Progress was made, or none was possible; more calls may produce output.
    Ok,
    /// All output, including any framing trailer, has been produced.
    StreamEnd,
}

/// Outcome of one primitive step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Step {
    /// Number of input bytes consumed from the front of the presented input.
    pub consumed: usize,
    /// Number of bytes written to the front of the output slice.
    pub produced: usize,
    /// Stream status after the step.
    pub status: StepStatus,
}

/// Streaming compressor contract the session drives.
pub trait Deflater {
    /// Compresses as much of `input` as fits into `output`.
    fn step(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<Step, DeflateError>;

    /// Discards all buffered state and returns to the start of a new stream.
    fn reset(&mut self) -> Result<(), DeflateError>;
}

impl<D: Deflater + ?Sized> Deflater for Box<D> {
    fn step(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<Step, DeflateError> {
        (**self).step(input, output, flush)
    }

    fn reset(&mut self) -> Result<(), DeflateError> {
        (**self).reset()
    }
}

/// [`Deflater`] backed by `flate2`.
pub struct FlateDeflater {
    compress: Compress,
    gzip: Option<GzipMember>,
}

impl FlateDeflater {
    /// Allocates a compressor producing the requested framing at `level`.
    ///
    /// Levels outside `0..=9` are rejected before `flate2` sees them.
    pub fn new(
        framing: FramingMode,
        level: CompressionLevel,
    ) -> Result<Self, CompressionLevelError> {
        let level = level.validate()?;
        let gzip = matches!(framing, FramingMode::GzipWrapped).then(|| GzipMember::new(level));
        Ok(Self {
            compress: Compress::new(level.into(), framing.zlib_header()),
            gzip,
        })
    }

    fn deflate(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, Status), DeflateError> {
        let before_in = self.compress.total_in();
        let before_out = self.compress.total_out();
        let status = self.compress.compress(input, output, flush.into())?;
        let consumed = (self.compress.total_in() - before_in) as usize;
        let produced = (self.compress.total_out() - before_out) as usize;
        Ok((consumed, produced, status))
    }
}

impl Deflater for FlateDeflater {
    fn step(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<Step, DeflateError> {
        let Some(mut member) = self.gzip.take() else {
            let (consumed, produced, status) = self.deflate(input, output, flush)?;
            let status = if status == Status::StreamEnd {
                StepStatus::StreamEnd
            } else {
                StepStatus::Ok
            };
            return Ok(Step {
                consumed,
                produced,
                status,
            });
        };

        let result = member.step(self, input, output, flush);
        self.gzip = Some(member);
        result
    }

    fn reset(&mut self) -> Result<(), DeflateError> {
        self.compress.reset();
        if let Some(member) = self.gzip.as_mut() {
            member.restart();
        }
        Ok(())
    }
}

/// Framing state for a single gzip member.
struct GzipMember {
    header: [u8; GZIP_HEADER_LEN],
    header_sent: usize,
    crc: crc32fast::Hasher,
    input_len: u64,
    trailer: Option<[u8; GZIP_TRAILER_LEN]>,
    trailer_sent: usize,
}

impl GzipMember {
    fn new(level: CompressionLevel) -> Self {
        Self {
            header: gzip_header(level),
            header_sent: 0,
            crc: crc32fast::Hasher::new(),
            input_len: 0,
            trailer: None,
            trailer_sent: 0,
        }
    }

    fn restart(&mut self) {
        self.header_sent = 0;
        self.crc = crc32fast::Hasher::new();
        self.input_len = 0;
        self.trailer = None;
        self.trailer_sent = 0;
    }

    fn step(
        &mut self,
        deflater: &mut FlateDeflater,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<Step, DeflateError> {
        let mut produced = copy_pending(&self.header, &mut self.header_sent, output);
        let mut consumed = 0;

        if self.header_sent == GZIP_HEADER_LEN && self.trailer.is_none() {
            let (used, written, status) = deflater.deflate(input, &mut output[produced..], flush)?;
            self.crc.update(&input[..used]);
            self.input_len += used as u64;
            consumed = used;
            produced += written;
            if status == Status::StreamEnd {
                self.trailer = Some(gzip_trailer(self.crc.clone().finalize(), self.input_len));
            }
        }

        let mut status = StepStatus::Ok;
        if let Some(trailer) = self.trailer {
            produced += copy_pending(&trailer, &mut self.trailer_sent, &mut output[produced..]);
            if self.trailer_sent == GZIP_TRAILER_LEN {
                status = StepStatus::StreamEnd;
            }
        }

        Ok(Step {
            consumed,
            produced,
            status,
        })
    }
}

/// Copies the unsent tail of `pending` into `output`, returning the byte count.
fn copy_pending(pending: &[u8], sent: &mut usize, output: &mut [u8]) -> usize {
    let remaining = &pending[*sent..];
    let count = remaining.len().min(output.len());
    output[..count].copy_from_slice(&remaining[..count]);
    *sent += count;
    count
}
