//! View logging and watch statistics handlers.
//!
//! These endpoints are independent of the streaming path: the player posts
//! watch progress on its own schedule, and a slow or failing log never
//! blocks the byte stream.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use fitstream_core::MediaId;
use fitstream_core::views::ViewRecord;
use serde::Deserialize;

use super::json_error;
use crate::access::principal_from_headers;
use crate::server::AppState;

/// Body of a view-log POST.
#[derive(Debug, Deserialize)]
pub struct ViewLogRequest {
    /// Seconds of the video watched.
    pub duration_watched: u64,
    /// Whether the viewer reached the end.
    pub completed: bool,
}

/// POST `/api/media/{media_id}/views` - record or update a view.
pub async fn log_view(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ViewLogRequest>,
) -> Response<Body> {
    let Ok(media_id) = MediaId::from_hex(&media_id) else {
        return json_error(StatusCode::NOT_FOUND, "Unknown media id");
    };

    {
        let library = state.library.read().await;
        if library.media_by_id(media_id).is_none() {
            return json_error(StatusCode::NOT_FOUND, "Media not found");
        }
    }

    let principal =
        principal_from_headers(&headers).unwrap_or_else(|| "anonymous".to_string());
    let record = ViewRecord {
        media_id,
        principal,
        duration_watched: request.duration_watched,
        completed: request.completed,
        watched_at: Utc::now(),
    };

    state.view_log.record(record.clone()).await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "View logged successfully",
            "view_log": record,
        })),
    )
        .into_response()
}

/// GET `/api/media/{media_id}/stats` - watch statistics for one video.
pub async fn media_stats(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> Response<Body> {
    let Ok(media_id) = MediaId::from_hex(&media_id) else {
        return json_error(StatusCode::NOT_FOUND, "Unknown media id");
    };

    {
        let library = state.library.read().await;
        if library.media_by_id(media_id).is_none() {
            return json_error(StatusCode::NOT_FOUND, "Media not found");
        }
    }

    let summary = state.view_log.summary(media_id).await;
    Json(summary).into_response()
}

/// GET `/api/history` - the requesting principal's viewing history,
/// newest first.
pub async fn my_history(State(state): State<AppState>, headers: HeaderMap) -> Response<Body> {
    let principal =
        principal_from_headers(&headers).unwrap_or_else(|| "anonymous".to_string());
    let history = state.view_log.history(&principal).await;
    Json(history).into_response()
}
