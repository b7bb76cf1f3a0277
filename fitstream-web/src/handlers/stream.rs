//! Video streaming and thumbnail handlers.
//!
//! The streaming handler is a thin adapter: authorize, resolve the media id
//! to a path, then hand the path and raw `Range` header to the core
//! streamer and translate its outcome into an HTTP response.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use fitstream_core::MediaId;
use fitstream_core::streaming::{MediaStream, StreamingError, VideoStream, mime_for_path};
use tracing::{debug, warn};

use super::json_error;
use crate::access::principal_from_headers;
use crate::server::AppState;

/// GET `/stream/{media_id}` - serve a workout video, honoring single-range
/// `Range` requests.
pub async fn stream_media(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    headers: HeaderMap,
) -> Response<Body> {
    let Ok(media_id) = MediaId::from_hex(&media_id) else {
        return json_error(StatusCode::NOT_FOUND, "Unknown media id");
    };

    let principal = principal_from_headers(&headers);
    if !state.access.allow(principal.as_deref(), media_id).await {
        return json_error(
            StatusCode::FORBIDDEN,
            "You do not have access to this video",
        );
    }

    let file = {
        let library = state.library.read().await;
        match library.media_by_id(media_id) {
            Some(file) => file.clone(),
            None => return json_error(StatusCode::NOT_FOUND, "Media not found"),
        }
    };

    let range_header = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let streamer = VideoStream::from_config(&file.file_path, &state.config.streaming);
    match streamer.serve(range_header).await {
        Ok(stream) => stream_response(stream, state.config.streaming.cache_max_age),
        Err(error) => streaming_error_response(error),
    }
}

/// Builds the 200/206 response around a resolved media stream.
fn stream_response(stream: MediaStream, cache_max_age: u32) -> Response<Body> {
    let range = stream.range;
    let status = if range.is_partial {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, &stream.content_type)
        .header(header::CONTENT_LENGTH, stream.content_length().to_string())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={cache_max_age}"),
        );

    if range.is_partial {
        builder = builder.header(header::CONTENT_RANGE, range.content_range());
    }

    builder
        .body(Body::from_stream(stream.into_body()))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Maps pre-body streaming failures to clean HTTP responses.
///
/// Range errors carry `Content-Range: bytes */<size>` and an empty body so
/// the client can learn the real size and retry.
fn streaming_error_response(error: StreamingError) -> Response<Body> {
    match &error {
        StreamingError::NotFound { path } => {
            warn!(path = %path.display(), "media file missing on disk");
            json_error(StatusCode::NOT_FOUND, "Video file not found")
        }
        StreamingError::UnsupportedRange { total_size }
        | StreamingError::RangeNotSatisfiable { total_size } => {
            debug!(total_size, "rejecting unsatisfiable range request");
            Response::builder()
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(header::CONTENT_RANGE, format!("bytes */{total_size}"))
                .header(header::ACCEPT_RANGES, "bytes")
                .body(Body::empty())
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        StreamingError::StreamIo { path, offset, .. } => {
            warn!(path = %path.display(), offset, "stream setup failed: {error}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Streaming failed")
        }
        StreamingError::ClientDisconnected { .. } => {
            // Nothing useful can reach the client at this point.
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET `/thumbnail/{media_id}` - serve the sibling thumbnail image whole.
pub async fn thumbnail_media(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    headers: HeaderMap,
) -> Response<Body> {
    let Ok(media_id) = MediaId::from_hex(&media_id) else {
        return json_error(StatusCode::NOT_FOUND, "Unknown media id");
    };

    let principal = principal_from_headers(&headers);
    if !state.access.allow(principal.as_deref(), media_id).await {
        return json_error(
            StatusCode::FORBIDDEN,
            "You do not have access to this thumbnail",
        );
    }

    let thumbnail = {
        let library = state.library.read().await;
        if library.media_by_id(media_id).is_none() {
            return json_error(StatusCode::NOT_FOUND, "Media not found");
        }
        library.thumbnail_path(media_id)
    };

    let Some(path) = thumbnail else {
        return json_error(StatusCode::NOT_FOUND, "No thumbnail available");
    };

    match tokio::fs::read(&path).await {
        Ok(contents) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, mime_for_path(&path))
            .header(header::CONTENT_LENGTH, contents.len().to_string())
            .body(Body::from(contents))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(error) => {
            warn!(path = %path.display(), "thumbnail read failed: {error}");
            json_error(StatusCode::NOT_FOUND, "Thumbnail file not found")
        }
    }
}
