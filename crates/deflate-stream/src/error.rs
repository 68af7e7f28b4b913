//! Error taxonomy for compression sessions.

use std::io;

use thiserror::Error;

use crate::framing::FramingMode;
use crate::level::CompressionLevelError;

/// Failure reported by a [`Deflater`](crate::primitive::Deflater) step or reset.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{message}")]
pub struct DeflateError {
    message: String,
}

impl DeflateError {
    /// Creates a primitive error carrying the supplied diagnostic.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the diagnostic reported by the primitive.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<flate2::CompressError> for DeflateError {
    fn from(error: flate2::CompressError) -> Self {
        Self::new(error.to_string())
    }
}

/// Reason a primitive could not be allocated or re-initialised.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InitFailure {
    /// The requested level is outside the primitive's range.
    #[error(transparent)]
    Level(#[from] CompressionLevelError),
    /// The primitive itself refused to initialise.
    #[error(transparent)]
    Primitive(#[from] DeflateError),
}

/// Errors returned by compression sessions and the one-shot helpers.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The primitive could not be allocated or reset. No usable session exists.
    #[error("failed to initialise {framing} compressor: {source}")]
    Initialization {
        /// Framing the session was being created with.
        framing: FramingMode,
        /// Underlying failure.
        #[source]
        source: InitFailure,
    },
    /// Reading from the input source failed. The session must be reset before reuse.
    #[error("failed to read compression input: {0}")]
    Read(#[source] io::Error),
    /// Writing to the output sink failed. The session must be reset before reuse.
    #[error("failed to write compressed output: {0}")]
    Write(#[source] io::Error),
    /// The primitive reported an error status while compressing.
    #[error("deflate primitive failed: {0}")]
    Deflate(#[from] DeflateError),
    /// Data or a finish request arrived after the stream was already finished.
    #[error("compression session already finished; reset it before adding more data")]
    SessionFinished,
    /// An earlier operation failed and left the primitive in an unknown state.
    #[error("compression session abandoned after an earlier failure; reset it before reuse")]
    SessionPoisoned,
}

/// Discriminant of [`CompressError`] for callers that only need to branch.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CompressErrorKind {
    /// See [`CompressError::Initialization`].
    Initialization,
    /// See [`CompressError::Read`].
    Read,
    /// See [`CompressError::Write`].
    Write,
    /// See [`CompressError::Deflate`].
    Deflate,
    /// See [`CompressError::SessionFinished`].
    SessionFinished,
    /// See [`CompressError::SessionPoisoned`].
    SessionPoisoned,
}

impl CompressError {
    pub(crate) fn initialization(framing: FramingMode, source: impl Into<InitFailure>) -> Self {
        Self::Initialization {
            framing,
            source: source.into(),
        }
    }

    /// Returns the kind of failure.
    #[must_use]
    pub const fn kind(&self) -> CompressErrorKind {
        match self {
            Self::Initialization { .. } => CompressErrorKind::Initialization,
            Self::Read(_) => CompressErrorKind::Read,
            Self::Write(_) => CompressErrorKind::Write,
            Self::Deflate(_) => CompressErrorKind::Deflate,
            Self::SessionFinished => CompressErrorKind::SessionFinished,
            Self::SessionPoisoned => CompressErrorKind::SessionPoisoned,
        }
    }

    /// Whether the failure leaves the session unusable until [`reset`] is called.
    ///
    /// [`reset`]: crate::session::CompressionSession::reset
    #[must_use]
    pub const fn poisons_session(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Write(_) | Self::Deflate(_))
    }
}

impl From<CompressError> for io::Error {
    fn from(error: CompressError) -> Self {
        match error {
            CompressError::Read(inner) | CompressError::Write(inner) => inner,
            other => io::Error::other(other),
        }
    }
}
