//! Chunked file delivery for range requests.
//!
//! [`VideoStream::serve`] resolves the requested range against the file on
//! disk and returns a [`MediaStream`]: the resolved range, the content type,
//! and a lazy chunk stream. The open file handle lives inside the stream
//! state, so dropping the stream on any exit path releases the descriptor.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{Stream, try_unfold};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};

use super::mime::mime_for_path;
use super::range::ResolvedRange;
use super::StreamingError;
use crate::config::StreamingConfig;

/// Ordered chunk sequence forming a response body.
///
/// Finite and not restartable; a fresh [`VideoStream::serve`] call is
/// required to re-stream.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, StreamingError>> + Send>>;

/// Range-aware streamer for a single media file.
///
/// Performs no access control; callers hand over paths that are already
/// authorized and resolved.
#[derive(Debug, Clone)]
pub struct VideoStream {
    path: PathBuf,
    chunk_size: usize,
}

/// One streamable response: resolved range, content type, and body.
pub struct MediaStream {
    /// The effective byte range this stream covers.
    pub range: ResolvedRange,
    /// `Content-Type` derived from the file extension.
    pub content_type: String,
    body: ChunkStream,
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("range", &self.range)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

impl VideoStream {
    /// Creates a streamer with the default 100 KiB chunk size.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_config(path, &StreamingConfig::default())
    }

    /// Creates a streamer using the configured chunk size.
    pub fn from_config(path: impl Into<PathBuf>, config: &StreamingConfig) -> Self {
        Self {
            path: path.into(),
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Overrides the chunk size, mainly for tests exercising chunk
    /// boundaries.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Path this streamer serves.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves the range and opens the file, returning a lazy stream over
    /// the requested bytes.
    ///
    /// The file is opened and positioned before this returns, so range and
    /// not-found failures are reported before any body bytes exist.
    ///
    /// # Errors
    ///
    /// - `StreamingError::NotFound` - file missing, unreadable, or not a regular file
    /// - `StreamingError::UnsupportedRange` - header requests multiple ranges
    /// - `StreamingError::RangeNotSatisfiable` - malformed or out-of-bounds range
    /// - `StreamingError::StreamIo` - seeking to the range start failed
    pub async fn serve(&self, range_header: Option<&str>) -> Result<MediaStream, StreamingError> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|_| StreamingError::NotFound {
                path: self.path.clone(),
            })?;
        if !metadata.is_file() {
            return Err(StreamingError::NotFound {
                path: self.path.clone(),
            });
        }

        let total_size = metadata.len();
        let range = ResolvedRange::from_header(range_header, total_size)?;

        debug!(
            path = %self.path.display(),
            start = range.start,
            end = range.end,
            total_size,
            partial = range.is_partial,
            "serving media range"
        );

        let mut file = File::open(&self.path)
            .await
            .map_err(|_| StreamingError::NotFound {
                path: self.path.clone(),
            })?;

        if range.start > 0 {
            file.seek(SeekFrom::Start(range.start))
                .await
                .map_err(|source| StreamingError::StreamIo {
                    path: self.path.clone(),
                    offset: range.start,
                    source,
                })?;
        }

        let body = chunk_stream(file, self.path.clone(), range, self.chunk_size);

        Ok(MediaStream {
            range,
            content_type: mime_for_path(&self.path),
            body,
        })
    }
}

/// Builds the ordered chunk stream over `[range.start, range.end]`.
///
/// Each pull reads `min(chunk_size, remaining)` bytes at the cursor and
/// advances by the bytes actually read. EOF before the resolved end means
/// the file shrank under us; that is surfaced as `StreamIo`, not silent
/// completion.
fn chunk_stream(file: File, path: PathBuf, range: ResolvedRange, chunk_size: usize) -> ChunkStream {
    let stream = try_unfold(
        (file, range.start, range.len()),
        move |(mut file, offset, remaining)| {
            let path = path.clone();
            async move {
                if remaining == 0 {
                    return Ok(None);
                }

                let want = remaining.min(chunk_size as u64) as usize;
                let mut buffer = vec![0u8; want];
                let read = file.read(&mut buffer).await.map_err(|source| {
                    error!(
                        path = %path.display(),
                        offset,
                        "read failed mid-stream: {source}"
                    );
                    StreamingError::StreamIo {
                        path: path.clone(),
                        offset,
                        source,
                    }
                })?;

                if read == 0 {
                    // The file ended short of the resolved range.
                    error!(
                        path = %path.display(),
                        offset,
                        remaining,
                        "file truncated mid-stream"
                    );
                    return Err(StreamingError::StreamIo {
                        path,
                        offset,
                        source: std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            "file ended before the resolved range",
                        ),
                    });
                }

                buffer.truncate(read);
                Ok(Some((
                    Bytes::from(buffer),
                    (file, offset + read as u64, remaining - read as u64),
                )))
            }
        },
    );

    Box::pin(stream)
}

impl MediaStream {
    /// Exact `Content-Length` of the body.
    pub fn content_length(&self) -> u64 {
        self.range.len()
    }

    /// Consumes the stream into its body, for transports that pull chunks
    /// themselves (e.g. `axum::body::Body::from_stream`).
    pub fn into_body(self) -> ChunkStream {
        self.body
    }

    /// Drives the chunk loop into an arbitrary sink, one chunk at a time:
    /// read, write, flush, advance. Returns the number of bytes written.
    ///
    /// A failed write stops the loop immediately; no further reads are
    /// issued and the file handle is released with the stream.
    ///
    /// # Errors
    ///
    /// - `StreamingError::StreamIo` - disk read failed or the file was truncated
    /// - `StreamingError::ClientDisconnected` - the sink rejected a write
    pub async fn write_to<W>(self, sink: &mut W) -> Result<u64, StreamingError>
    where
        W: AsyncWrite + Unpin,
    {
        use futures::StreamExt;

        let mut offset = self.range.start;
        let mut written = 0u64;
        let mut body = self.body;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            let disconnected = |offset| {
                debug!(offset, "client disconnected mid-stream");
                StreamingError::ClientDisconnected { offset }
            };
            sink.write_all(&chunk)
                .await
                .map_err(|_| disconnected(offset))?;
            sink.flush().await.map_err(|_| disconnected(offset))?;
            offset += chunk.len() as u64;
            written += chunk.len() as u64;
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use tempfile::TempDir;

    use super::*;

    async fn write_fixture(contents: &[u8]) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("workout.mp4");
        tokio::fs::write(&path, contents).await.unwrap();
        (dir, path)
    }

    async fn collect(stream: MediaStream) -> Result<Vec<u8>, StreamingError> {
        let mut body = stream.into_body();
        let mut bytes = Vec::new();
        while let Some(chunk) = body.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        Ok(bytes)
    }

    fn fixture_bytes(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[tokio::test]
    async fn full_file_without_range_header() {
        let contents = fixture_bytes(1000);
        let (_dir, path) = write_fixture(&contents).await;

        let stream = VideoStream::new(&path).serve(None).await.unwrap();
        assert!(!stream.range.is_partial);
        assert_eq!(stream.content_length(), 1000);
        assert_eq!(stream.content_type, "video/mp4");
        assert_eq!(collect(stream).await.unwrap(), contents);
    }

    #[tokio::test]
    async fn range_slice_matches_source_bytes() {
        let contents = fixture_bytes(1000);
        let (_dir, path) = write_fixture(&contents).await;

        let stream = VideoStream::new(&path)
            .serve(Some("bytes=100-299"))
            .await
            .unwrap();
        assert!(stream.range.is_partial);
        assert_eq!(stream.content_length(), 200);
        assert_eq!(stream.range.content_range(), "bytes 100-299/1000");
        assert_eq!(collect(stream).await.unwrap(), &contents[100..300]);
    }

    #[tokio::test]
    async fn single_byte_range() {
        let contents = fixture_bytes(1000);
        let (_dir, path) = write_fixture(&contents).await;

        let stream = VideoStream::new(&path)
            .serve(Some("bytes=0-0"))
            .await
            .unwrap();
        assert_eq!(stream.content_length(), 1);
        assert_eq!(collect(stream).await.unwrap(), &contents[0..1]);
    }

    #[tokio::test]
    async fn suffix_range_returns_last_bytes() {
        let contents = fixture_bytes(2000);
        let (_dir, path) = write_fixture(&contents).await;

        let stream = VideoStream::new(&path)
            .serve(Some("bytes=-500"))
            .await
            .unwrap();
        assert_eq!(stream.range.content_range(), "bytes 1500-1999/2000");
        assert_eq!(collect(stream).await.unwrap(), &contents[1500..]);
    }

    #[tokio::test]
    async fn chunking_reassembles_exactly_regardless_of_buffer_size() {
        let contents = fixture_bytes(1000);
        let (_dir, path) = write_fixture(&contents).await;

        for chunk_size in [1, 7, 100, 333, 4096] {
            let stream = VideoStream::new(&path)
                .with_chunk_size(chunk_size)
                .serve(Some("bytes=13-987"))
                .await
                .unwrap();
            assert_eq!(
                collect(stream).await.unwrap(),
                &contents[13..988],
                "chunk size {chunk_size}"
            );
        }
    }

    #[tokio::test]
    async fn repeated_serves_are_idempotent() {
        let contents = fixture_bytes(512);
        let (_dir, path) = write_fixture(&contents).await;
        let streamer = VideoStream::new(&path);

        let first = collect(streamer.serve(Some("bytes=10-200")).await.unwrap())
            .await
            .unwrap();
        let second = collect(streamer.serve(Some("bytes=10-200")).await.unwrap())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn start_beyond_eof_is_range_not_satisfiable() {
        let (_dir, path) = write_fixture(&fixture_bytes(100)).await;

        let err = VideoStream::new(&path)
            .serve(Some("bytes=100-110"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StreamingError::RangeNotSatisfiable { total_size: 100 }
        ));
    }

    #[tokio::test]
    async fn multiple_ranges_are_rejected_not_parsed() {
        let (_dir, path) = write_fixture(&fixture_bytes(100)).await;

        let err = VideoStream::new(&path)
            .serve(Some("bytes=0-10,20-30"))
            .await
            .unwrap_err();
        assert!(matches!(err, StreamingError::UnsupportedRange { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.mp4");

        let err = VideoStream::new(&path).serve(None).await.unwrap_err();
        assert!(matches!(err, StreamingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn directory_is_not_found() {
        let dir = TempDir::new().unwrap();

        let err = VideoStream::new(dir.path()).serve(None).await.unwrap_err();
        assert!(matches!(err, StreamingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn empty_file_streams_zero_bytes() {
        let (_dir, path) = write_fixture(&[]).await;

        let stream = VideoStream::new(&path).serve(None).await.unwrap();
        assert_eq!(stream.content_length(), 0);
        assert_eq!(collect(stream).await.unwrap(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn truncation_mid_stream_is_an_io_error_not_silent_eof() {
        let contents = fixture_bytes(1000);
        let (_dir, path) = write_fixture(&contents).await;

        // Resolve the range against the original size, then shrink the file
        // before the body is pulled.
        let stream = VideoStream::new(&path)
            .with_chunk_size(64)
            .serve(None)
            .await
            .unwrap();
        let handle = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .await
            .unwrap();
        handle.set_len(100).await.unwrap();

        let err = collect(stream).await.unwrap_err();
        match err {
            StreamingError::StreamIo { offset, source, .. } => {
                assert_eq!(offset, 100);
                assert_eq!(source.kind(), std::io::ErrorKind::UnexpectedEof);
            }
            other => panic!("expected StreamIo, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn write_to_copies_the_exact_range() {
        let contents = fixture_bytes(600);
        let (_dir, path) = write_fixture(&contents).await;

        let stream = VideoStream::new(&path)
            .with_chunk_size(50)
            .serve(Some("bytes=100-399"))
            .await
            .unwrap();

        let (mut client, mut server) = tokio::io::duplex(64 * 1024);
        let written = stream.write_to(&mut server).await.unwrap();
        drop(server);
        assert_eq!(written, 300);

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, &contents[100..400]);
    }

    #[tokio::test]
    async fn write_failure_aborts_as_client_disconnected() {
        let contents = fixture_bytes(64 * 1024);
        let (_dir, path) = write_fixture(&contents).await;

        let stream = VideoStream::new(&path)
            .with_chunk_size(1024)
            .serve(None)
            .await
            .unwrap();

        // Small pipe with the read half dropped: writes fail once the
        // buffer is gone.
        let (client, mut server) = tokio::io::duplex(2048);
        drop(client);

        let err = stream.write_to(&mut server).await.unwrap_err();
        assert!(matches!(err, StreamingError::ClientDisconnected { .. }));
    }
}
