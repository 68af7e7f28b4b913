//! Compression levels accepted by the DEFLATE primitive.

use std::{fmt, num::NonZeroU8};

use flate2::Compression;

/// Highest numeric level understood by the DEFLATE primitive.
pub const MAX_LEVEL: u32 = 9;

/// Compression levels recognised by the session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CompressionLevel {
    /// Emit stored blocks only. Output is framed but not reduced in size.
    None,
    /// Favour speed over compression ratio.
    Fast,
    /// Use the primitive's default balance between speed and ratio.
    #[default]
    Default,
    /// Favour the best possible compression ratio.
    Best,
    /// Use an explicit level in the range `1..=9`.
    Precise(NonZeroU8),
}

impl CompressionLevel {
    /// Creates a level from its numeric zlib representation.
    ///
    /// `0` maps to [`CompressionLevel::None`] and `1..=9` map to
    /// [`CompressionLevel::Precise`]. Anything above `9` is rejected.
    pub fn from_numeric(level: u32) -> Result<Self, CompressionLevelError> {
        if level > MAX_LEVEL {
            return Err(CompressionLevelError::new(level));
        }
        Ok(match NonZeroU8::new(level as u8) {
            Some(precise) => Self::Precise(precise),
            None => Self::None,
        })
    }

    /// Constructs a [`CompressionLevel::Precise`] variant from the provided level.
    #[must_use]
    pub const fn precise(level: NonZeroU8) -> Self {
        Self::Precise(level)
    }

    /// Returns `self` if the primitive accepts it.
    ///
    /// Named variants always pass; [`CompressionLevel::Precise`] values above
    /// [`MAX_LEVEL`] are rejected.
    pub fn validate(self) -> Result<Self, CompressionLevelError> {
        let numeric = self.numeric();
        if numeric > MAX_LEVEL {
            return Err(CompressionLevelError::new(numeric));
        }
        Ok(self)
    }

    /// Returns the numeric zlib level this variant resolves to.
    #[must_use]
    pub fn numeric(self) -> u32 {
        Compression::from(self).level()
    }
}

impl From<CompressionLevel> for Compression {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::None => Compression::none(),
            CompressionLevel::Fast => Compression::fast(),
            CompressionLevel::Default => Compression::default(),
            CompressionLevel::Best => Compression::best(),
            CompressionLevel::Precise(value) => Compression::new(u32::from(value.get())),
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Fast => f.write_str("fast"),
            Self::Default => f.write_str("default"),
            Self::Best => f.write_str("best"),
            Self::Precise(value) => write!(f, "{value}"),
        }
    }
}

/// Error returned when a requested compression level falls outside the
/// permissible range.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CompressionLevelError {
    level: u32,
}

impl CompressionLevelError {
    pub(crate) const fn new(level: u32) -> Self {
        Self { level }
    }

    /// Returns the invalid compression level that triggered the error.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }
}

impl fmt::Display for CompressionLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compression level {} is outside the supported range 0-{MAX_LEVEL}",
            self.level
        )
    }
}

impl std::error::Error for CompressionLevelError {}
