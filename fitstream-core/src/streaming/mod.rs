//! Range-aware video delivery.
//!
//! Translates a file on disk plus an optional HTTP `Range` header into a
//! correctly-framed response streamed in fixed-size chunks. The range is
//! resolved once into an immutable [`ResolvedRange`] value; the file handle
//! is owned by the chunk stream and released on every exit path.

pub mod file_stream;
pub mod mime;
pub mod range;

use std::path::PathBuf;

pub use file_stream::{ChunkStream, MediaStream, VideoStream};
pub use mime::mime_for_path;
pub use range::ResolvedRange;

/// Errors that can occur while resolving or delivering a byte range.
///
/// `NotFound` and the range errors are detected before any bytes are sent
/// and map to clean HTTP error responses. `StreamIo` and
/// `ClientDisconnected` occur mid-transfer, after the status line is on the
/// wire; the only valid action then is to abort the connection.
#[derive(Debug, thiserror::Error)]
pub enum StreamingError {
    #[error("video file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("multiple ranges are not supported")]
    UnsupportedRange { total_size: u64 },

    #[error("range not satisfiable for resource of {total_size} bytes")]
    RangeNotSatisfiable { total_size: u64 },

    #[error("I/O failure streaming {path} at offset {offset}: {source}")]
    StreamIo {
        path: PathBuf,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("client disconnected at offset {offset}")]
    ClientDisconnected { offset: u64 },
}

impl StreamingError {
    /// Total resource size to report in a `Content-Range: bytes */<size>`
    /// header, for the error cases that carry one.
    pub fn total_size(&self) -> Option<u64> {
        match self {
            StreamingError::UnsupportedRange { total_size }
            | StreamingError::RangeNotSatisfiable { total_size } => Some(*total_size),
            _ => None,
        }
    }
}
