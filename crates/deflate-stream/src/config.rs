//! Session configuration combining framing and compression level.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use crate::framing::{FramingMode, FramingParseError};
use crate::level::{CompressionLevel, CompressionLevelError};

/// Construction parameters for a [`CompressionSession`](crate::CompressionSession).
///
/// The textual form is `framing[:level]`, for example `gzip`, `zlib:9` or
/// `raw:fast`. Levels accept `none`, `fast`, `default`, `best` or a number in
/// `0..=9`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Header and trailer convention of the produced stream.
    pub framing: FramingMode,
    /// Compression level handed to the primitive.
    pub level: CompressionLevel,
}

impl SessionConfig {
    /// Creates a configuration from its parts.
    #[must_use]
    pub const fn new(framing: FramingMode, level: CompressionLevel) -> Self {
        Self { framing, level }
    }

    /// Returns a copy with the framing replaced.
    #[must_use]
    pub const fn with_framing(mut self, framing: FramingMode) -> Self {
        self.framing = framing;
        self
    }

    /// Returns a copy with the level replaced.
    #[must_use]
    pub const fn with_level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Parses the `framing[:level]` form.
    pub fn parse(text: &str) -> Result<Self, ConfigParseError> {
        let (framing, level) = match text.split_once(':') {
            Some((framing, level)) => (framing, Some(level)),
            None => (text, None),
        };
        let framing = framing.parse::<FramingMode>()?;
        let level = match level {
            Some(level) => parse_level(level)?,
            None => CompressionLevel::Default,
        };
        Ok(Self::new(framing, level))
    }
}

impl fmt::Display for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.framing, self.level)
    }
}

impl FromStr for SessionConfig {
    type Err = ConfigParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors produced while parsing a [`SessionConfig`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigParseError {
    /// The framing component is not recognised.
    #[error(transparent)]
    Framing(#[from] FramingParseError),
    /// The level component is numeric but out of range.
    #[error(transparent)]
    Level(#[from] CompressionLevelError),
    /// The level component is neither a number nor a known name.
    #[error("unrecognised compression level: {0}")]
    UnknownLevel(String),
}

fn parse_level(text: &str) -> Result<CompressionLevel, ConfigParseError> {
    let text = text.trim();
    match text.to_ascii_lowercase().as_str() {
        "none" | "store" => Ok(CompressionLevel::None),
        "fast" => Ok(CompressionLevel::Fast),
        "default" | "" => Ok(CompressionLevel::Default),
        "best" => Ok(CompressionLevel::Best),
        _ => match text.parse::<u32>() {
            Ok(numeric) => Ok(CompressionLevel::from_numeric(numeric)?),
            Err(_) => Err(ConfigParseError::UnknownLevel(text.to_owned())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU8;

    #[test]
    fn default_is_raw_balanced() {
        let config = SessionConfig::default();
        assert_eq!(config.framing, FramingMode::Raw);
        assert_eq!(config.level, CompressionLevel::Default);
    }

    #[test]
    fn parse_framing_only_uses_default_level() {
        let config: SessionConfig = "gzip".parse().unwrap();
        assert_eq!(config, SessionConfig::new(FramingMode::GzipWrapped, CompressionLevel::Default));
    }

    #[test]
    fn parse_accepts_named_and_numeric_levels() {
        assert_eq!(
            SessionConfig::parse("zlib:best").unwrap().level,
            CompressionLevel::Best
        );
        assert_eq!(
            SessionConfig::parse("raw: 3 ").unwrap().level,
            CompressionLevel::Precise(NonZeroU8::new(3).unwrap())
        );
        assert_eq!(
            SessionConfig::parse("deflate:0").unwrap(),
            SessionConfig::new(FramingMode::ZlibWrapped, CompressionLevel::None)
        );
    }

    #[test]
    fn parse_reports_each_failure() {
        assert!(matches!(
            SessionConfig::parse("lzma:1"),
            Err(ConfigParseError::Framing(_))
        ));
        assert!(matches!(
            SessionConfig::parse("gzip:11"),
            Err(ConfigParseError::Level(err)) if err.level() == 11
        ));
        assert_eq!(
            SessionConfig::parse("gzip:turbo"),
            Err(ConfigParseError::UnknownLevel("turbo".to_owned()))
        );
    }

    #[test]
    fn display_parses_back() {
        let config = SessionConfig::default()
            .with_framing(FramingMode::GzipWrapped)
            .with_level(CompressionLevel::Fast);
        assert_eq!(config.to_string(), "gzip:fast");
        assert_eq!(config.to_string().parse::<SessionConfig>().unwrap(), config);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trips_through_json() {
        let config = SessionConfig::new(FramingMode::ZlibWrapped, CompressionLevel::Best);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"framing":"zlib","level":"best"}"#);
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let partial: SessionConfig = serde_json::from_str(r#"{"framing":"gzip"}"#).unwrap();
        assert_eq!(partial.level, CompressionLevel::Default);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_out_of_range_level_is_rejected_at_construction() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"level":{"precise":200}}"#).unwrap();
        let err = crate::CompressionSession::from_config(&config).unwrap_err();
        assert_eq!(err.kind(), crate::CompressErrorKind::Initialization);
    }
}
