//! Application state and server wiring.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, post};
use fitstream_core::views::InMemoryViewLog;
use fitstream_core::{FitstreamConfig, MediaLibrary, ViewLog};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::access::{AccessPolicy, AllowAll};
use crate::handlers::{
    api_health, api_library, log_view, media_stats, my_history, stream_media, thumbnail_media,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<RwLock<MediaLibrary>>,
    pub view_log: Arc<dyn ViewLog>,
    pub access: Arc<dyn AccessPolicy>,
    pub config: FitstreamConfig,
    pub started_at: Instant,
}

impl AppState {
    /// State with the default permissive policy and in-memory view log.
    pub fn new(library: MediaLibrary, config: FitstreamConfig) -> Self {
        Self {
            library: Arc::new(RwLock::new(library)),
            view_log: Arc::new(InMemoryViewLog::new()),
            access: Arc::new(AllowAll),
            config,
            started_at: Instant::now(),
        }
    }

    /// Replaces the access policy, for deployments that enforce
    /// assignment-based visibility in-process.
    pub fn with_access_policy(mut self, access: Arc<dyn AccessPolicy>) -> Self {
        self.access = access;
        self
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Media delivery
        .route("/stream/{media_id}", get(stream_media))
        .route("/thumbnail/{media_id}", get(thumbnail_media))
        // JSON API
        .route("/api/media/{media_id}/views", post(log_view))
        .route("/api/media/{media_id}/stats", get(media_stats))
        .route("/api/history", get(my_history))
        .route("/api/library", get(api_library))
        .route("/api/health", get(api_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Scans the media directory and runs the server until shutdown.
///
/// # Errors
///
/// Returns an error when the scan fails or the listen address cannot be
/// bound.
pub async fn run_server(
    config: FitstreamConfig,
    media_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut library = MediaLibrary::from_config(&config.library);
    let count = library.scan_directory(media_dir).await?;
    info!(count, dir = %media_dir.display(), "media library ready");

    let addr = SocketAddr::new(config.server.bind_address, config.server.port);
    let app = build_router(AppState::new(library, config));

    info!("Fitstream media server running on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
