//! Structured tracing for compression sessions.
//!
//! Every function here emits a `tracing` event under [`COMPRESS_TARGET`] when
//! the `tracing` feature is enabled and compiles to an inline no-op
//! otherwise, so the hot transfer loop pays nothing in default builds.
//!
//! # Examples
//!
//! ```
//! use deflate_stream::debug_compress::CompressTracer;
//! use deflate_stream::{CompressionLevel, CompressionSession, FramingMode};
//!
//! let mut tracer = CompressTracer::new();
//! let mut session = CompressionSession::new(FramingMode::GzipWrapped, CompressionLevel::Fast)?;
//! session.add_data(b"payload")?;
//! session.finish()?;
//! tracer.record_session(&session);
//! tracer.summary();
//! assert_eq!(tracer.sessions(), 1);
//! assert_eq!(tracer.bytes_in(), 7);
//! # Ok::<(), deflate_stream::CompressError>(())
//! ```

use crate::error::CompressErrorKind;
use crate::framing::FramingMode;
use crate::level::CompressionLevel;
use crate::primitive::Deflater;
use crate::session::CompressionSession;

/// Target name for tracing events emitted by this crate.
pub const COMPRESS_TARGET: &str = "deflate_stream::compress";

// ============================================================================
// Tracing functions (feature-gated)
// ============================================================================

/// Traces creation of a session.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_session_created(framing: FramingMode, level: CompressionLevel) {
    tracing::debug!(
        target: COMPRESS_TARGET,
        framing = %framing,
        level = %level,
        "session_created"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_session_created(_framing: FramingMode, _level: CompressionLevel) {}

/// Traces one chunk of compressed output handed to the destination.
///
/// `full` is set when the chunk buffer was filled, meaning the loop will
/// step the primitive again before returning.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_chunk_drained(bytes: usize, full: bool) {
    tracing::trace!(
        target: COMPRESS_TARGET,
        bytes = bytes,
        full = full,
        "chunk_drained"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_chunk_drained(_bytes: usize, _full: bool) {}

/// Traces one read from a byte source.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_source_read(bytes: usize, limit_remaining: Option<u64>) {
    tracing::trace!(
        target: COMPRESS_TARGET,
        bytes = bytes,
        limit_remaining = ?limit_remaining,
        "source_read"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_source_read(_bytes: usize, _limit_remaining: Option<u64>) {}

/// Traces a completed stream together with its totals.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_session_finished(framing: FramingMode, bytes_in: u64, bytes_out: u64) {
    tracing::debug!(
        target: COMPRESS_TARGET,
        framing = %framing,
        bytes_in = bytes_in,
        bytes_out = bytes_out,
        "session_finished"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_session_finished(_framing: FramingMode, _bytes_in: u64, _bytes_out: u64) {}

/// Traces a session returning to its initial accepting state.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_session_reset(framing: FramingMode) {
    tracing::debug!(target: COMPRESS_TARGET, framing = %framing, "session_reset");
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_session_reset(_framing: FramingMode) {}

/// Traces a failed session operation.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_session_failed(framing: FramingMode, kind: CompressErrorKind) {
    tracing::warn!(
        target: COMPRESS_TARGET,
        framing = %framing,
        kind = ?kind,
        "session_failed"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_session_failed(_framing: FramingMode, _kind: CompressErrorKind) {}

/// Traces aggregate statistics collected by a [`CompressTracer`].
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_compress_summary(sessions: usize, bytes_in: u64, bytes_out: u64) {
    tracing::info!(
        target: COMPRESS_TARGET,
        sessions = sessions,
        bytes_in = bytes_in,
        bytes_out = bytes_out,
        ratio = ratio(bytes_in, bytes_out),
        "compress_summary"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_compress_summary(_sessions: usize, _bytes_in: u64, _bytes_out: u64) {}

fn ratio(bytes_in: u64, bytes_out: u64) -> f64 {
    if bytes_in == 0 {
        0.0
    } else {
        bytes_out as f64 / bytes_in as f64
    }
}

// ============================================================================
// CompressTracer - aggregates statistics across sessions
// ============================================================================

/// Accumulates byte totals across many finished sessions.
///
/// Useful for a response pipeline that compresses many payloads and wants a
/// single summary event rather than one per response.
#[derive(Debug, Clone, Default)]
pub struct CompressTracer {
    sessions: usize,
    bytes_in: u64,
    bytes_out: u64,
}

impl CompressTracer {
    /// Creates a tracer with zero counts.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sessions: 0,
            bytes_in: 0,
            bytes_out: 0,
        }
    }

    /// Adds the totals of `session` to the aggregate.
    pub fn record_session<D: Deflater>(&mut self, session: &CompressionSession<D>) {
        self.record(session.bytes_in(), session.bytes_out());
    }

    /// Adds explicit totals to the aggregate.
    pub fn record(&mut self, bytes_in: u64, bytes_out: u64) {
        self.sessions += 1;
        self.bytes_in = self.bytes_in.saturating_add(bytes_in);
        self.bytes_out = self.bytes_out.saturating_add(bytes_out);
    }

    /// Emits a summary trace event with all accumulated statistics.
    pub fn summary(&self) {
        trace_compress_summary(self.sessions, self.bytes_in, self.bytes_out);
    }

    /// Resets all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Returns the number of recorded sessions.
    #[must_use]
    pub const fn sessions(&self) -> usize {
        self.sessions
    }

    /// Returns the total uncompressed bytes recorded.
    #[must_use]
    pub const fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Returns the total compressed bytes recorded.
    #[must_use]
    pub const fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Returns compressed size divided by uncompressed size, or 0.0 when empty.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        ratio(self.bytes_in, self.bytes_out)
    }
}
