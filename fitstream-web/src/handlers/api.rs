//! JSON API handlers for library listing and service health.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::server::AppState;

/// GET `/api/library` - all scanned media, for the frontend's catalog view.
pub async fn api_library(State(state): State<AppState>) -> impl IntoResponse {
    let library = state.library.read().await;
    let mut media: Vec<_> = library.all_media().into_iter().cloned().collect();
    media.sort_by(|a, b| a.title.cmp(&b.title));
    Json(media)
}

/// GET `/api/health` - liveness plus basic library stats.
pub async fn api_health(State(state): State<AppState>) -> impl IntoResponse {
    let library_size = state.library.read().await.len();

    Json(serde_json::json!({
        "status": "healthy",
        "library_size": library_size,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}
