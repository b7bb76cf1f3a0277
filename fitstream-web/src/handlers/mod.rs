//! HTTP request handlers organized by functionality

pub mod api;
pub mod stream;
pub mod views;

use axum::Json;
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

// Re-export handler functions
pub use api::{api_health, api_library};
pub use stream::{stream_media, thumbnail_media};
pub use views::{ViewLogRequest, log_view, media_stats, my_history};

/// Clean JSON error response for failures detected before any body bytes
/// are sent.
pub(crate) fn json_error(status: StatusCode, message: &str) -> Response<Body> {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
