//! HTTP Range header parsing and resolution.
//!
//! Implements the RFC 7233 single-range subset used by media players:
//! `bytes=N-M`, `bytes=N-` and `bytes=-N`. Multiple ranges are rejected
//! rather than partially honored.

use super::StreamingError;

/// An effective byte range resolved against a concrete resource size.
///
/// Computed once per request and passed through the call chain unchanged.
/// Invariant for non-empty resources: `start <= end <= total_size - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    /// First byte offset to serve.
    pub start: u64,
    /// Last byte offset to serve, inclusive.
    pub end: u64,
    /// Total size of the underlying resource in bytes.
    pub total_size: u64,
    /// Whether this resolution came from a `Range` header (206 vs 200).
    pub is_partial: bool,
}

impl ResolvedRange {
    /// Resolves the entire resource, as served for requests without a
    /// `Range` header.
    pub fn full(total_size: u64) -> Self {
        Self {
            start: 0,
            end: total_size.saturating_sub(1),
            total_size,
            is_partial: false,
        }
    }

    /// Resolves an optional raw `Range` header value against the resource
    /// size.
    ///
    /// # Errors
    ///
    /// - `StreamingError::UnsupportedRange` - header requests multiple ranges
    /// - `StreamingError::RangeNotSatisfiable` - malformed or out-of-bounds range
    pub fn from_header(header: Option<&str>, total_size: u64) -> Result<Self, StreamingError> {
        match header {
            None => Ok(Self::full(total_size)),
            Some(value) => parse_range_header(value, total_size),
        }
    }

    /// Number of bytes this range covers, which is also the exact
    /// `Content-Length` of the response body.
    pub fn len(&self) -> u64 {
        if self.total_size == 0 {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// True for the zero-byte resource case.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `Content-Range` header value for successful partial responses.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

/// Parses a raw `Range` header value into a resolved range.
///
/// Suffix form `bytes=-N` means the last N bytes; open form `bytes=N-`
/// runs to end of file; the closed form clamps its end to the final byte.
fn parse_range_header(value: &str, total_size: u64) -> Result<ResolvedRange, StreamingError> {
    // Single-range subset only, matching common media-player behavior.
    if value.contains(',') {
        return Err(StreamingError::UnsupportedRange { total_size });
    }

    let unsatisfiable = || StreamingError::RangeNotSatisfiable { total_size };

    let spec = value
        .strip_prefix("bytes=")
        .ok_or_else(unsatisfiable)?
        .trim();
    let (start_str, end_str) = spec.split_once('-').ok_or_else(unsatisfiable)?;

    let (start, end) = if start_str.is_empty() {
        // Suffix form: last N bytes. A suffix longer than the file is
        // clamped to the whole file, per RFC 7233.
        let suffix: u64 = end_str.parse().map_err(|_| unsatisfiable())?;
        (total_size.saturating_sub(suffix), total_size.saturating_sub(1))
    } else {
        let start: u64 = start_str.parse().map_err(|_| unsatisfiable())?;
        let end = if end_str.is_empty() {
            total_size.saturating_sub(1)
        } else {
            let end: u64 = end_str.parse().map_err(|_| unsatisfiable())?;
            end.min(total_size.saturating_sub(1))
        };
        (start, end)
    };

    if total_size == 0 || start > end || start > total_size - 1 {
        return Err(unsatisfiable());
    }

    Ok(ResolvedRange {
        start,
        end,
        total_size,
        is_partial: true,
    })
}
