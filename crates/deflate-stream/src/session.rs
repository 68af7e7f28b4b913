//! Incremental compression sessions.
//!
//! A [`CompressionSession`] owns one DEFLATE primitive for its entire life.
//! Data is pushed through [`add_data`](CompressionSession::add_data) and its
//! stream and sink variants any number of times, then the stream is closed
//! exactly once with [`finish`](CompressionSession::finish) or
//! [`finish_to`](CompressionSession::finish_to). A finished or failed session
//! rejects further work until [`reset`](CompressionSession::reset) returns it
//! to a fresh accepting state with the same framing and level.
//!
//! # Examples
//!
//! ```
//! use deflate_stream::{CompressionLevel, CompressionSession, FramingMode};
//!
//! # fn main() -> Result<(), deflate_stream::CompressError> {
//! let mut session = CompressionSession::new(FramingMode::GzipWrapped, CompressionLevel::Default)?;
//! let mut body = session.add_data(b"first part, ")?;
//! body.extend(session.add_data(b"second part")?);
//! body.extend(session.finish()?);
//! assert_eq!(&body[..2], &[0x1f, 0x8b]);
//! assert_eq!(session.bytes_in(), 23);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io;

use crate::adapter::{ByteSink, ByteSource, at_end_retrying, read_retrying};
use crate::config::SessionConfig;
use crate::debug_compress;
use crate::error::CompressError;
use crate::framing::FramingMode;
use crate::level::CompressionLevel;
use crate::primitive::{Deflater, FlateDeflater, FlushMode};
use crate::transfer::{self, CHUNK_SIZE, Drain, SinkDrain};

/// Lifecycle state of a [`CompressionSession`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SessionState {
    /// Accepting input; `finish` has not been called yet.
    Accepting,
    /// The stream has been finished; only `reset` is accepted.
    Finished,
    /// An earlier read, write or primitive failure left the stream unusable.
    Poisoned,
}

/// Streaming compressor producing one framed DEFLATE stream per lifecycle.
pub struct CompressionSession<D = FlateDeflater> {
    deflater: D,
    framing: FramingMode,
    level: CompressionLevel,
    state: SessionState,
    bytes_in: u64,
    bytes_out: u64,
}

impl CompressionSession<FlateDeflater> {
    /// Creates a session backed by `flate2` with the given framing and level.
    ///
    /// A level the primitive cannot accept is reported as
    /// [`CompressError::Initialization`]; no partially usable session is
    /// returned.
    pub fn new(framing: FramingMode, level: CompressionLevel) -> Result<Self, CompressError> {
        let deflater = FlateDeflater::new(framing, level)
            .map_err(|error| CompressError::initialization(framing, error))?;
        Ok(Self::from_deflater(deflater, framing, level))
    }

    /// Creates a session from a numeric zlib level in `0..=9`.
    pub fn with_numeric_level(framing: FramingMode, level: u32) -> Result<Self, CompressError> {
        let level = CompressionLevel::from_numeric(level)
            .map_err(|error| CompressError::initialization(framing, error))?;
        Self::new(framing, level)
    }

    /// Creates a session from a [`SessionConfig`].
    pub fn from_config(config: &SessionConfig) -> Result<Self, CompressError> {
        Self::new(config.framing, config.level)
    }
}

impl<D: Deflater> CompressionSession<D> {
    /// Wraps an already constructed primitive.
    ///
    /// `framing` and `level` describe what `deflater` was built with; the
    /// session reports them but does not reconfigure the primitive.
    pub fn from_deflater(deflater: D, framing: FramingMode, level: CompressionLevel) -> Self {
        debug_compress::trace_session_created(framing, level);
        Self {
            deflater,
            framing,
            level,
            state: SessionState::Accepting,
            bytes_in: 0,
            bytes_out: 0,
        }
    }

    /// Returns the framing selected at construction.
    #[must_use]
    pub const fn framing(&self) -> FramingMode {
        self.framing
    }

    /// Returns the compression level selected at construction.
    #[must_use]
    pub const fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Returns the framing and level as a [`SessionConfig`].
    #[must_use]
    pub const fn config(&self) -> SessionConfig {
        SessionConfig::new(self.framing, self.level)
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the stream has been finished.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished)
    }

    /// Returns the number of uncompressed bytes consumed since construction or the last reset.
    #[must_use]
    pub const fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Returns the number of compressed bytes produced since construction or the last reset.
    #[must_use]
    pub const fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Returns the session to a fresh accepting state.
    ///
    /// The primitive is re-initialised in place; framing and level are kept.
    /// If re-initialisation fails the session stays [`SessionState::Poisoned`].
    pub fn reset(&mut self) -> Result<(), CompressError> {
        if let Err(error) = self.deflater.reset() {
            self.state = SessionState::Poisoned;
            return Err(CompressError::initialization(self.framing, error));
        }
        self.state = SessionState::Accepting;
        self.bytes_in = 0;
        self.bytes_out = 0;
        debug_compress::trace_session_reset(self.framing);
        Ok(())
    }

    /// Compresses `input` and returns the compressed bytes produced so far.
    ///
    /// The output may be empty; the primitive is free to buffer input until a
    /// later call or [`finish`](Self::finish).
    pub fn add_data(&mut self, input: &[u8]) -> Result<Vec<u8>, CompressError> {
        self.ensure_accepting()?;
        let mut output = Vec::new();
        let result = self.feed(input, &mut output);
        self.track(result).map(|_| output)
    }

    /// Compresses bytes pulled from `source` until it reports end of input or
    /// `limit` bytes have been consumed.
    pub fn add_stream<S>(
        &mut self,
        source: &mut S,
        limit: Option<u64>,
    ) -> Result<Vec<u8>, CompressError>
    where
        S: ByteSource + ?Sized,
    {
        self.ensure_accepting()?;
        let mut output = Vec::new();
        let result = self.feed_stream(source, limit, &mut output);
        self.track(result).map(|_| output)
    }

    /// Compresses `input`, writing the output through `sink`.
    ///
    /// Returns the number of compressed bytes written by this call.
    pub fn add_data_to<K>(&mut self, sink: &mut K, input: &[u8]) -> Result<u64, CompressError>
    where
        K: ByteSink + ?Sized,
    {
        self.ensure_accepting()?;
        let result = self.feed(input, &mut SinkDrain::new(sink));
        self.track(result)
    }

    /// Compresses bytes pulled from `source`, writing the output through `sink`.
    ///
    /// Returns the number of compressed bytes written by this call.
    pub fn add_stream_to<K, S>(
        &mut self,
        sink: &mut K,
        source: &mut S,
        limit: Option<u64>,
    ) -> Result<u64, CompressError>
    where
        K: ByteSink + ?Sized,
        S: ByteSource + ?Sized,
    {
        self.ensure_accepting()?;
        let result = self.feed_stream(source, limit, &mut SinkDrain::new(sink));
        self.track(result)
    }

    /// Ends the stream and returns the remaining output, trailer included.
    pub fn finish(&mut self) -> Result<Vec<u8>, CompressError> {
        self.ensure_accepting()?;
        let mut output = Vec::new();
        let result = self.close(&mut output);
        self.track(result).map(|_| output)
    }

    /// Ends the stream, writing the remaining output through `sink`.
    ///
    /// Returns the number of compressed bytes written by this call.
    pub fn finish_to<K>(&mut self, sink: &mut K) -> Result<u64, CompressError>
    where
        K: ByteSink + ?Sized,
    {
        self.ensure_accepting()?;
        let result = self.close(&mut SinkDrain::new(sink));
        self.track(result)
    }

    fn ensure_accepting(&self) -> Result<(), CompressError> {
        match self.state {
            SessionState::Accepting => Ok(()),
            SessionState::Finished => Err(CompressError::SessionFinished),
            SessionState::Poisoned => Err(CompressError::SessionPoisoned),
        }
    }

    fn track<T>(&mut self, result: Result<T, CompressError>) -> Result<T, CompressError> {
        if let Err(error) = &result {
            if error.poisons_session() {
                self.state = SessionState::Poisoned;
            }
            debug_compress::trace_session_failed(self.framing, error.kind());
        }
        result
    }

    fn pump<T: Drain + ?Sized>(
        &mut self,
        input: &[u8],
        flush: FlushMode,
        drain: &mut T,
    ) -> Result<u64, CompressError> {
        let pumped = transfer::pump(&mut self.deflater, input, flush, drain)?;
        self.bytes_in += pumped.consumed;
        self.bytes_out += pumped.produced;
        Ok(pumped.produced)
    }

    fn feed<T>(&mut self, input: &[u8], drain: &mut T) -> Result<u64, CompressError>
    where
        T: Drain + ?Sized,
    {
        self.pump(input, FlushMode::None, drain)
    }

    fn feed_stream<S, T>(
        &mut self,
        source: &mut S,
        limit: Option<u64>,
        drain: &mut T,
    ) -> Result<u64, CompressError>
    where
        S: ByteSource + ?Sized,
        T: Drain + ?Sized,
    {
        let mut buffer = [0u8; CHUNK_SIZE];
        let mut remaining = limit;
        let mut produced = 0;

        loop {
            let wanted = match remaining {
                Some(0) => break,
                Some(left) => left.min(CHUNK_SIZE as u64) as usize,
                None => CHUNK_SIZE,
            };
            if at_end_retrying(source).map_err(CompressError::Read)? {
                break;
            }
            let read = read_retrying(source, &mut buffer[..wanted]).map_err(CompressError::Read)?;
            if read == 0 {
                break;
            }
            if read > wanted {
                return Err(CompressError::Read(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("source reported {read} bytes read into a {wanted}-byte buffer"),
                )));
            }
            remaining = remaining.map(|left| left - read as u64);
            debug_compress::trace_source_read(read, remaining);
            produced += self.pump(&buffer[..read], FlushMode::None, drain)?;
        }

        Ok(produced)
    }

    fn close<T: Drain + ?Sized>(&mut self, drain: &mut T) -> Result<u64, CompressError> {
        let produced = self.pump(&[], FlushMode::Finish, drain)?;
        self.state = SessionState::Finished;
        debug_compress::trace_session_finished(self.framing, self.bytes_in, self.bytes_out);
        Ok(produced)
    }
}

impl<D> fmt::Debug for CompressionSession<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressionSession")
            .field("framing", &self.framing)
            .field("level", &self.level)
            .field("state", &self.state)
            .field("bytes_in", &self.bytes_in)
            .field("bytes_out", &self.bytes_out)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompressErrorKind, DeflateError};
    use crate::primitive::{Step, StepStatus};
    use std::io::{Cursor, Read};

    fn inflate_raw(bytes: &[u8]) -> Vec<u8> {
        let mut decoded = Vec::new();
        flate2::read::DeflateDecoder::new(bytes)
            .read_to_end(&mut decoded)
            .expect("inflate");
        decoded
    }

    /// Primitive whose reset always fails.
    struct Brittle;

    impl Deflater for Brittle {
        fn step(
            &mut self,
            input: &[u8],
            _: &mut [u8],
            flush: FlushMode,
        ) -> Result<Step, DeflateError> {
            Ok(Step {
                consumed: input.len(),
                produced: 0,
                status: if flush == FlushMode::Finish {
                    StepStatus::StreamEnd
                } else {
                    StepStatus::Ok
                },
            })
        }

        fn reset(&mut self) -> Result<(), DeflateError> {
            Err(DeflateError::new("out of memory"))
        }
    }

    /// Primitive whose steps fail until it is reset.
    struct Faulty {
        failing: bool,
    }

    impl Deflater for Faulty {
        fn step(
            &mut self,
            input: &[u8],
            output: &mut [u8],
            flush: FlushMode,
        ) -> Result<Step, DeflateError> {
            if self.failing {
                return Err(DeflateError::new("corrupt window state"));
            }
            Brittle.step(input, output, flush)
        }

        fn reset(&mut self) -> Result<(), DeflateError> {
            self.failing = false;
            Ok(())
        }
    }

    #[test]
    fn new_session_is_accepting() {
        let session = CompressionSession::new(FramingMode::Raw, CompressionLevel::Default).unwrap();
        assert_eq!(session.state(), SessionState::Accepting);
        assert_eq!(session.framing(), FramingMode::Raw);
        assert_eq!(session.level(), CompressionLevel::Default);
        assert_eq!(session.bytes_in(), 0);
        assert_eq!(session.bytes_out(), 0);
    }

    #[test]
    fn numeric_level_out_of_range_fails_initialization() {
        let err = CompressionSession::with_numeric_level(FramingMode::ZlibWrapped, 42)
            .expect_err("level 42 rejected");
        assert_eq!(err.kind(), CompressErrorKind::Initialization);
    }

    #[test]
    fn precise_level_out_of_range_fails_initialization() {
        let level = CompressionLevel::precise(std::num::NonZeroU8::new(200).unwrap());
        let err = CompressionSession::new(FramingMode::GzipWrapped, level)
            .expect_err("level 200 rejected");
        assert_eq!(err.kind(), CompressErrorKind::Initialization);
        assert!(err.to_string().contains("200"), "{err}");

        let config = SessionConfig::new(FramingMode::Raw, level);
        let err = CompressionSession::from_config(&config).expect_err("config rejected");
        assert_eq!(err.kind(), CompressErrorKind::Initialization);
    }

    #[test]
    fn add_then_finish_round_trips() {
        let mut session = CompressionSession::new(FramingMode::Raw, CompressionLevel::Default).unwrap();
        let mut compressed = session.add_data(b"aaaaa").unwrap();
        compressed.extend(session.finish().unwrap());
        assert!(session.is_finished());
        assert_eq!(inflate_raw(&compressed), b"aaaaa");
        assert_eq!(session.bytes_in(), 5);
        assert_eq!(session.bytes_out(), compressed.len() as u64);
    }

    #[test]
    fn work_after_finish_is_rejected() {
        let mut session = CompressionSession::new(FramingMode::Raw, CompressionLevel::Fast).unwrap();
        session.finish().unwrap();
        let err = session.add_data(b"late").expect_err("finished");
        assert_eq!(err.kind(), CompressErrorKind::SessionFinished);
        let err = session.finish().expect_err("finished twice");
        assert_eq!(err.kind(), CompressErrorKind::SessionFinished);
        // Lifecycle errors do not poison.
        assert_eq!(session.state(), SessionState::Finished);
    }

    #[test]
    fn stream_limit_caps_consumption() {
        let mut session = CompressionSession::new(FramingMode::Raw, CompressionLevel::Default).unwrap();
        let mut source = Cursor::new(vec![7u8; 100]);
        let mut compressed = session.add_stream(&mut source, Some(40)).unwrap();
        compressed.extend(session.finish().unwrap());
        assert_eq!(source.position(), 40);
        assert_eq!(inflate_raw(&compressed), vec![7u8; 40]);
    }

    #[test]
    fn zero_limit_reads_nothing() {
        let mut session = CompressionSession::new(FramingMode::Raw, CompressionLevel::Default).unwrap();
        let mut source = Cursor::new(vec![1u8; 10]);
        session.add_stream(&mut source, Some(0)).unwrap();
        assert_eq!(source.position(), 0);
        assert_eq!(session.bytes_in(), 0);
    }

    #[test]
    fn failed_reset_poisons_session() {
        let mut session =
            CompressionSession::from_deflater(Brittle, FramingMode::Raw, CompressionLevel::Default);
        session.add_data(b"ok").unwrap();
        let err = session.reset().expect_err("reset fails");
        assert_eq!(err.kind(), CompressErrorKind::Initialization);
        assert_eq!(session.state(), SessionState::Poisoned);
        let err = session.add_data(b"more").expect_err("poisoned");
        assert_eq!(err.kind(), CompressErrorKind::SessionPoisoned);
    }

    #[test]
    fn primitive_failure_poisons_until_reset() {
        let mut session = CompressionSession::from_deflater(
            Faulty { failing: true },
            FramingMode::ZlibWrapped,
            CompressionLevel::Default,
        );
        let err = session.add_data(b"payload").expect_err("step fails");
        assert_eq!(err.kind(), CompressErrorKind::Deflate);
        assert_eq!(session.state(), SessionState::Poisoned);

        let err = session.add_data(b"more").expect_err("poisoned");
        assert_eq!(err.kind(), CompressErrorKind::SessionPoisoned);
        let err = session.finish().expect_err("poisoned");
        assert_eq!(err.kind(), CompressErrorKind::SessionPoisoned);

        session.reset().unwrap();
        assert_eq!(session.state(), SessionState::Accepting);
        session.add_data(b"recovered").unwrap();
        session.finish().unwrap();
        assert!(session.is_finished());
        assert_eq!(session.bytes_in(), 9);
    }

    #[test]
    fn debug_output_omits_primitive() {
        let session = CompressionSession::new(FramingMode::GzipWrapped, CompressionLevel::Best).unwrap();
        let text = format!("{session:?}");
        assert!(text.contains("GzipWrapped"), "{text}");
        assert!(text.contains(".."), "{text}");
    }

    #[test]
    fn sessions_can_move_between_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<CompressionSession>();
    }
}
