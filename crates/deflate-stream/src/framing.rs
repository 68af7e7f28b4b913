//! Header and trailer conventions wrapped around raw DEFLATE output.
//!
//! The framing mode is a construction parameter of the primitive rather than
//! a distinct encoder type: [`FramingMode::Raw`] and
//! [`FramingMode::ZlibWrapped`] are handled natively by `flate2`, while
//! [`FramingMode::GzipWrapped`] is assembled here from a raw DEFLATE stream
//! plus the RFC 1952 member header and CRC-32/ISIZE trailer.

use core::fmt;
use core::str::FromStr;

use crate::level::CompressionLevel;

/// Leading magic bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Length of the fixed gzip member header emitted by the engine.
pub const GZIP_HEADER_LEN: usize = 10;

/// Length of the gzip member trailer (CRC-32 followed by ISIZE).
pub const GZIP_TRAILER_LEN: usize = 8;

const GZIP_METHOD_DEFLATE: u8 = 8;
const GZIP_OS_UNKNOWN: u8 = 255;
const GZIP_XFL_BEST: u8 = 2;
const GZIP_XFL_FASTEST: u8 = 4;

/// Framing applied around the DEFLATE stream produced by a session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FramingMode {
    /// Bare DEFLATE blocks with no header or trailer.
    #[default]
    Raw,
    /// Two-byte zlib header and trailing Adler-32 checksum (RFC 1950).
    #[cfg_attr(feature = "serde", serde(rename = "zlib"))]
    ZlibWrapped,
    /// gzip member header and CRC-32/ISIZE trailer (RFC 1952).
    #[cfg_attr(feature = "serde", serde(rename = "gzip"))]
    GzipWrapped,
}

impl FramingMode {
    /// Every framing mode, in declaration order.
    pub const ALL: [Self; 3] = [Self::Raw, Self::ZlibWrapped, Self::GzipWrapped];

    /// Returns the canonical name used in configuration and diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::ZlibWrapped => "zlib",
            Self::GzipWrapped => "gzip",
        }
    }

    /// Returns the HTTP `Content-Encoding` token matching this framing.
    ///
    /// Raw DEFLATE has no registered token; HTTP's `deflate` coding is the
    /// zlib-wrapped format.
    #[must_use]
    pub const fn content_encoding(self) -> Option<&'static str> {
        match self {
            Self::Raw => None,
            Self::ZlibWrapped => Some("deflate"),
            Self::GzipWrapped => Some("gzip"),
        }
    }

    /// Whether `flate2` should emit the zlib header and Adler-32 trailer.
    pub(crate) const fn zlib_header(self) -> bool {
        matches!(self, Self::ZlibWrapped)
    }
}

impl fmt::Display for FramingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when attempting to parse an unsupported framing mode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FramingParseError {
    input: String,
}

impl FramingParseError {
    /// Creates a parse error capturing the original input.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the invalid input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for FramingParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported framing mode: {}", self.input)
    }
}

impl std::error::Error for FramingParseError {}

impl FromStr for FramingMode {
    type Err = FramingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" | "deflate-raw" => Ok(Self::Raw),
            "zlib" | "deflate" => Ok(Self::ZlibWrapped),
            "gzip" | "gz" | "x-gzip" => Ok(Self::GzipWrapped),
            other => Err(FramingParseError::new(other)),
        }
    }
}

/// Builds the fixed gzip member header: no file name, no mtime, unknown OS.
pub(crate) fn gzip_header(level: CompressionLevel) -> [u8; GZIP_HEADER_LEN] {
    let numeric = level.numeric();
    let xfl = if numeric >= 9 {
        GZIP_XFL_BEST
    } else if numeric == 1 {
        GZIP_XFL_FASTEST
    } else {
        0
    };
    [
        GZIP_MAGIC[0],
        GZIP_MAGIC[1],
        GZIP_METHOD_DEFLATE,
        0,
        0,
        0,
        0,
        0,
        xfl,
        GZIP_OS_UNKNOWN,
    ]
}

/// Builds the gzip member trailer from the CRC-32 and length of the input.
pub(crate) fn gzip_trailer(crc: u32, input_len: u64) -> [u8; GZIP_TRAILER_LEN] {
    let mut trailer = [0u8; GZIP_TRAILER_LEN];
    trailer[..4].copy_from_slice(&crc.to_le_bytes());
    // ISIZE is the input length modulo 2^32.
    trailer[4..].copy_from_slice(&(input_len as u32).to_le_bytes());
    trailer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_accepts_known_names() {
        assert_eq!("raw".parse::<FramingMode>().unwrap(), FramingMode::Raw);
        assert_eq!(
            " Deflate ".parse::<FramingMode>().unwrap(),
            FramingMode::ZlibWrapped
        );
        assert_eq!("zlib".parse::<FramingMode>().unwrap(), FramingMode::ZlibWrapped);
        assert_eq!("GZIP".parse::<FramingMode>().unwrap(), FramingMode::GzipWrapped);
        assert_eq!("x-gzip".parse::<FramingMode>().unwrap(), FramingMode::GzipWrapped);
    }

    #[test]
    fn parsing_rejects_unknown_names() {
        let err = "brotli".parse::<FramingMode>().expect_err("brotli unsupported");
        assert_eq!(err.input(), "brotli");
        assert_eq!(err.to_string(), "unsupported framing mode: brotli");
    }

    #[test]
    fn display_round_trips_through_parse() {
        for mode in FramingMode::ALL {
            assert_eq!(mode.to_string().parse::<FramingMode>().unwrap(), mode);
        }
    }

    #[test]
    fn content_encoding_matches_http_tokens() {
        assert_eq!(FramingMode::Raw.content_encoding(), None);
        assert_eq!(FramingMode::ZlibWrapped.content_encoding(), Some("deflate"));
        assert_eq!(FramingMode::GzipWrapped.content_encoding(), Some("gzip"));
    }

    #[test]
    fn gzip_header_flags_extreme_levels() {
        assert_eq!(gzip_header(CompressionLevel::Best)[8], GZIP_XFL_BEST);
        assert_eq!(gzip_header(CompressionLevel::Fast)[8], GZIP_XFL_FASTEST);
        let header = gzip_header(CompressionLevel::Default);
        assert_eq!(&header[..3], &[0x1f, 0x8b, 0x08]);
        assert_eq!(header[8], 0);
        assert_eq!(header[9], GZIP_OS_UNKNOWN);
    }

    #[test]
    fn gzip_trailer_wraps_length() {
        let trailer = gzip_trailer(0xdead_beef, (1u64 << 32) + 5);
        assert_eq!(&trailer[..4], &0xdead_beefu32.to_le_bytes());
        assert_eq!(&trailer[4..], &5u32.to_le_bytes());
    }
}
