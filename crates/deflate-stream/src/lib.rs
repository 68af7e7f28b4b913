#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `deflate_stream` compresses arbitrary binary payloads incrementally with the
//! DEFLATE family of encodings, without ever holding the whole payload in
//! memory. Output can be bare DEFLATE, zlib-wrapped, or a gzip member, which
//! makes the crate a fit for HTTP response bodies as well as file payloads.
//!
//! # Design
//!
//! - [`session::CompressionSession`] owns one DEFLATE primitive and exposes
//!   push/drain operations for buffers and streams.
//! - [`transfer`] holds the chunked loop every operation shares: the primitive
//!   writes into a fixed [`transfer::CHUNK_SIZE`] buffer that is drained into
//!   the caller's destination until no more output is pending.
//! - [`adapter`] decouples the engine from concrete stream types through the
//!   [`ByteSource`] and [`ByteSink`] traits, implemented for every
//!   [`std::io::BufRead`] and [`std::io::Write`].
//! - [`primitive`] defines the [`Deflater`] step/reset contract and the
//!   `flate2`-backed [`FlateDeflater`].
//! - [`oneshot`] and [`writer`] compose a session for callers who do not need
//!   the incremental interface.
//!
//! # Invariants
//!
//! - Peak memory per call is bounded by the chunk size, regardless of payload
//!   size. Chunk buffers are call-local and never shared between sessions.
//! - A session's framing and level never change after construction.
//! - After any intermediate call all presented input has been consumed by the
//!   primitive; after `finish` the primitive has reached stream end. Violations
//!   are primitive defects and panic.
//!
//! # Errors
//!
//! Operations return [`CompressError`]. Read, write and primitive failures
//! poison the session; only [`CompressionSession::reset`] makes it usable
//! again. Adding data after `finish` fails with
//! [`CompressError::SessionFinished`].
//!
//! # Examples
//!
//! ```
//! use std::io::Read;
//! use deflate_stream::{CompressionLevel, CompressionSession, FramingMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = CompressionSession::new(FramingMode::ZlibWrapped, CompressionLevel::Default)?;
//! let mut compressed = Vec::new();
//! session.add_data_to(&mut compressed, b"streaming example payload")?;
//! session.finish_to(&mut compressed)?;
//!
//! let mut decoded = Vec::new();
//! flate2::read::ZlibDecoder::new(&compressed[..]).read_to_end(&mut decoded)?;
//! assert_eq!(decoded, b"streaming example payload");
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod debug_compress;
pub mod error;
pub mod framing;
pub mod level;
pub mod oneshot;
pub mod primitive;
pub mod session;
pub mod transfer;
pub mod writer;

pub use adapter::{ByteSink, ByteSource};
pub use config::{ConfigParseError, SessionConfig};
pub use error::{CompressError, CompressErrorKind, DeflateError, InitFailure};
pub use framing::{FramingMode, FramingParseError};
pub use level::{CompressionLevel, CompressionLevelError};
pub use oneshot::{
    compress, compress_framed, compress_stream, compress_stream_framed, compress_stream_to,
    compress_stream_to_framed, compress_to, compress_to_framed,
};
pub use primitive::{Deflater, FlateDeflater, FlushMode, Step, StepStatus};
pub use session::{CompressionSession, SessionState};
pub use writer::CountingDeflateWriter;
