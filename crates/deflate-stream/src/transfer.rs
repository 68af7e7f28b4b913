//! Chunked transfer loop shared by every feed and finish path.
//!
//! The loop presents the caller's pending input to the primitive and drains
//! its output through a call-local chunk buffer of [`CHUNK_SIZE`] bytes, so
//! peak memory stays bounded no matter how large the payload is. A step that
//! fills the chunk completely signals that more output may be pending.
//!
//! Contract violations by the primitive (consuming more than it was given,
//! ending the stream early, or stalling) are defects rather than recoverable
//! errors and panic.

use crate::adapter::{ByteSink, write_fully};
use crate::debug_compress;
use crate::error::CompressError;
use crate::primitive::{Deflater, FlushMode, StepStatus};

/// Capacity of the intermediate chunk buffer, in bytes.
pub const CHUNK_SIZE: usize = 16 * 1024;

/// Destination for the bytes produced by one primitive step.
pub(crate) trait Drain {
    fn drain(&mut self, bytes: &[u8]) -> Result<(), CompressError>;
}

impl Drain for Vec<u8> {
    fn drain(&mut self, bytes: &[u8]) -> Result<(), CompressError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Drains into a [`ByteSink`], retrying until each chunk is fully written.
pub(crate) struct SinkDrain<'a, K: ?Sized> {
    sink: &'a mut K,
}

impl<'a, K: ByteSink + ?Sized> SinkDrain<'a, K> {
    pub(crate) fn new(sink: &'a mut K) -> Self {
        Self { sink }
    }
}

impl<K: ByteSink + ?Sized> Drain for SinkDrain<'_, K> {
    fn drain(&mut self, bytes: &[u8]) -> Result<(), CompressError> {
        write_fully(&mut *self.sink, bytes).map_err(CompressError::Write)
    }
}

/// Byte totals moved by one pump.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Pumped {
    pub(crate) consumed: u64,
    pub(crate) produced: u64,
}

/// Feeds `input` to `deflater` and drains all resulting output into `drain`.
///
/// With [`FlushMode::None`] the call returns once every input byte has been
/// consumed and the last step left the chunk partially empty. With
/// [`FlushMode::Finish`] it returns only after the primitive reports
/// [`StepStatus::StreamEnd`].
pub(crate) fn pump<D, T>(
    deflater: &mut D,
    input: &[u8],
    flush: FlushMode,
    drain: &mut T,
) -> Result<Pumped, CompressError>
where
    D: Deflater + ?Sized,
    T: Drain + ?Sized,
{
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut remaining = input;
    let mut pumped = Pumped::default();

    loop {
        let step = deflater.step(remaining, &mut chunk, flush)?;
        assert!(
            step.consumed <= remaining.len() && step.produced <= chunk.len(),
            "deflate primitive reported consuming {} of {} bytes and producing {} of {} bytes",
            step.consumed,
            remaining.len(),
            step.produced,
            chunk.len()
        );

        remaining = &remaining[step.consumed..];
        pumped.consumed += step.consumed as u64;
        if step.produced > 0 {
            drain.drain(&chunk[..step.produced])?;
            pumped.produced += step.produced as u64;
            debug_compress::trace_chunk_drained(step.produced, step.produced == chunk.len());
        }

        match (flush, step.status) {
            (FlushMode::Finish, StepStatus::StreamEnd) => break,
            (FlushMode::None, StepStatus::StreamEnd) => {
                panic!("deflate primitive ended the stream before finish was requested")
            }
            (FlushMode::None, StepStatus::Ok)
                if remaining.is_empty() && step.produced < chunk.len() =>
            {
                break;
            }
            _ => {}
        }

        assert!(
            step.consumed > 0 || step.produced > 0,
            "deflate primitive stalled with {} input bytes pending ({flush:?})",
            remaining.len()
        );
    }

    Ok(pumped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeflateError;
    use crate::framing::FramingMode;
    use crate::level::CompressionLevel;
    use crate::primitive::{FlateDeflater, Step};

    /// Emits `budget` bytes of 0xAA in full chunks before ending the stream.
    struct Firehose {
        budget: usize,
    }

    impl Deflater for Firehose {
        fn step(
            &mut self,
            input: &[u8],
            output: &mut [u8],
            flush: FlushMode,
        ) -> Result<Step, DeflateError> {
            let produced = self.budget.min(output.len());
            output[..produced].fill(0xAA);
            self.budget -= produced;
            let status = if flush == FlushMode::Finish && self.budget == 0 {
                StepStatus::StreamEnd
            } else {
                StepStatus::Ok
            };
            Ok(Step {
                consumed: input.len(),
                produced,
                status,
            })
        }

        fn reset(&mut self) -> Result<(), DeflateError> {
            Ok(())
        }
    }

    /// Never consumes input.
    struct Stuck;

    impl Deflater for Stuck {
        fn step(&mut self, _: &[u8], _: &mut [u8], _: FlushMode) -> Result<Step, DeflateError> {
            Ok(Step {
                consumed: 0,
                produced: 0,
                status: StepStatus::Ok,
            })
        }

        fn reset(&mut self) -> Result<(), DeflateError> {
            Ok(())
        }
    }

    /// Claims stream end on an intermediate step.
    struct Premature;

    impl Deflater for Premature {
        fn step(&mut self, input: &[u8], _: &mut [u8], _: FlushMode) -> Result<Step, DeflateError> {
            Ok(Step {
                consumed: input.len(),
                produced: 0,
                status: StepStatus::StreamEnd,
            })
        }

        fn reset(&mut self) -> Result<(), DeflateError> {
            Ok(())
        }
    }

    #[test]
    fn full_chunks_keep_the_loop_draining() {
        let mut deflater = Firehose {
            budget: CHUNK_SIZE * 3,
        };
        let mut output = Vec::new();
        let pumped = pump(&mut deflater, b"input", FlushMode::None, &mut output).unwrap();
        // The third full chunk is followed by an empty step that ends the loop.
        assert_eq!(output.len(), CHUNK_SIZE * 3);
        assert_eq!(pumped.consumed, 5);
        assert_eq!(pumped.produced, (CHUNK_SIZE * 3) as u64);
    }

    #[test]
    fn finish_drains_until_stream_end() {
        let mut deflater = Firehose {
            budget: CHUNK_SIZE + 7,
        };
        let mut output = Vec::new();
        pump(&mut deflater, &[], FlushMode::Finish, &mut output).unwrap();
        assert_eq!(output.len(), CHUNK_SIZE + 7);
    }

    #[test]
    fn sink_drain_counts_written_bytes() {
        let mut deflater =
            FlateDeflater::new(FramingMode::ZlibWrapped, CompressionLevel::Default).unwrap();
        let mut sink = Vec::new();
        let mut drain = SinkDrain::new(&mut sink);
        let fed = pump(&mut deflater, b"abcabcabc", FlushMode::None, &mut drain).unwrap();
        let done = pump(&mut deflater, &[], FlushMode::Finish, &mut drain).unwrap();
        assert_eq!(fed.consumed, 9);
        assert_eq!((fed.produced + done.produced) as usize, sink.len());
    }

    #[test]
    #[should_panic(expected = "stalled")]
    fn stalled_primitive_is_an_invariant_failure() {
        let mut output = Vec::new();
        let _ = pump(&mut Stuck, b"pending", FlushMode::None, &mut output);
    }

    #[test]
    #[should_panic(expected = "before finish")]
    fn early_stream_end_is_an_invariant_failure() {
        let mut output = Vec::new();
        let _ = pump(&mut Premature, b"pending", FlushMode::None, &mut output);
    }
}
