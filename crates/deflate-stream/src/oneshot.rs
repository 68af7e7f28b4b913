//! Stateless helpers that run a whole session in one call.
//!
//! The unsuffixed helpers produce [`FramingMode::Raw`] output; the `_framed`
//! variants take the framing explicitly. Each helper performs exactly one add
//! followed by finish.

use crate::adapter::{ByteSink, ByteSource};
use crate::error::CompressError;
use crate::framing::FramingMode;
use crate::level::CompressionLevel;
use crate::session::CompressionSession;

/// Compresses `input` into a new raw DEFLATE [`Vec`].
pub fn compress(input: &[u8], level: CompressionLevel) -> Result<Vec<u8>, CompressError> {
    compress_framed(input, FramingMode::Raw, level)
}

/// Compresses `input` into a new [`Vec`] using `framing`.
pub fn compress_framed(
    input: &[u8],
    framing: FramingMode,
    level: CompressionLevel,
) -> Result<Vec<u8>, CompressError> {
    let mut session = CompressionSession::new(framing, level)?;
    let mut output = session.add_data(input)?;
    output.extend(session.finish()?);
    Ok(output)
}

/// Compresses up to `limit` bytes of `source` into a new raw DEFLATE [`Vec`].
pub fn compress_stream<S>(
    source: &mut S,
    level: CompressionLevel,
    limit: Option<u64>,
) -> Result<Vec<u8>, CompressError>
where
    S: ByteSource + ?Sized,
{
    compress_stream_framed(source, FramingMode::Raw, level, limit)
}

/// Compresses up to `limit` bytes of `source` into a new [`Vec`] using `framing`.
pub fn compress_stream_framed<S>(
    source: &mut S,
    framing: FramingMode,
    level: CompressionLevel,
    limit: Option<u64>,
) -> Result<Vec<u8>, CompressError>
where
    S: ByteSource + ?Sized,
{
    let mut session = CompressionSession::new(framing, level)?;
    let mut output = session.add_stream(source, limit)?;
    output.extend(session.finish()?);
    Ok(output)
}

/// Compresses `input` as raw DEFLATE into `sink`, returning the bytes written.
pub fn compress_to<K>(
    sink: &mut K,
    input: &[u8],
    level: CompressionLevel,
) -> Result<u64, CompressError>
where
    K: ByteSink + ?Sized,
{
    compress_to_framed(sink, input, FramingMode::Raw, level)
}

/// Compresses `input` into `sink` using `framing`, returning the bytes written.
pub fn compress_to_framed<K>(
    sink: &mut K,
    input: &[u8],
    framing: FramingMode,
    level: CompressionLevel,
) -> Result<u64, CompressError>
where
    K: ByteSink + ?Sized,
{
    let mut session = CompressionSession::new(framing, level)?;
    let written = session.add_data_to(sink, input)?;
    Ok(written + session.finish_to(sink)?)
}

/// Compresses up to `limit` bytes of `source` as raw DEFLATE into `sink`.
pub fn compress_stream_to<K, S>(
    sink: &mut K,
    source: &mut S,
    level: CompressionLevel,
    limit: Option<u64>,
) -> Result<u64, CompressError>
where
    K: ByteSink + ?Sized,
    S: ByteSource + ?Sized,
{
    compress_stream_to_framed(sink, source, FramingMode::Raw, level, limit)
}

/// Compresses up to `limit` bytes of `source` into `sink` using `framing`.
pub fn compress_stream_to_framed<K, S>(
    sink: &mut K,
    source: &mut S,
    framing: FramingMode,
    level: CompressionLevel,
    limit: Option<u64>,
) -> Result<u64, CompressError>
where
    K: ByteSink + ?Sized,
    S: ByteSource + ?Sized,
{
    let mut session = CompressionSession::new(framing, level)?;
    let written = session.add_stream_to(sink, source, limit)?;
    Ok(written + session.finish_to(sink)?)
}
