//! View logging for watch tracking.
//!
//! Records how much of a workout video each user watched. Deliberately
//! decoupled from the streaming path: entries arrive through their own
//! endpoint and never touch the byte stream.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::library::MediaId;

/// One recorded view, keyed by media and principal.
#[derive(Debug, Clone, Serialize)]
pub struct ViewRecord {
    pub media_id: MediaId,
    /// Opaque principal identifier supplied by the outer platform.
    pub principal: String,
    /// Seconds of the video watched.
    pub duration_watched: u64,
    /// Whether the viewer reached the end.
    pub completed: bool,
    pub watched_at: DateTime<Utc>,
}

/// Aggregate statistics for one media item.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSummary {
    pub total_views: usize,
    pub completed_views: usize,
    /// Mean watch duration in seconds, zero when there are no views.
    pub average_duration: f64,
    pub views: Vec<ViewRecord>,
}

/// Watch-tracking store.
///
/// Recording a second view for the same media/principal pair replaces the
/// earlier entry, so a summary counts viewers rather than playbacks.
#[async_trait]
pub trait ViewLog: Send + Sync {
    /// Records (or updates) a view.
    async fn record(&self, record: ViewRecord);

    /// Summarizes all views of one media item.
    async fn summary(&self, media_id: MediaId) -> ViewSummary;

    /// All views recorded by one principal, newest first.
    async fn history(&self, principal: &str) -> Vec<ViewRecord>;
}

/// Thread-safe in-memory view log.
#[derive(Debug, Default)]
pub struct InMemoryViewLog {
    records: Arc<RwLock<HashMap<(MediaId, String), ViewRecord>>>,
}

impl InMemoryViewLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ViewLog for InMemoryViewLog {
    async fn record(&self, record: ViewRecord) {
        let key = (record.media_id, record.principal.clone());
        self.records.write().insert(key, record);
    }

    async fn summary(&self, media_id: MediaId) -> ViewSummary {
        let records = self.records.read();
        let views: Vec<ViewRecord> = records
            .values()
            .filter(|r| r.media_id == media_id)
            .cloned()
            .collect();

        let completed_views = views.iter().filter(|r| r.completed).count();
        let average_duration = if views.is_empty() {
            0.0
        } else {
            views.iter().map(|r| r.duration_watched as f64).sum::<f64>() / views.len() as f64
        };

        ViewSummary {
            total_views: views.len(),
            completed_views,
            average_duration,
            views,
        }
    }

    async fn history(&self, principal: &str) -> Vec<ViewRecord> {
        let records = self.records.read();
        let mut views: Vec<ViewRecord> = records
            .values()
            .filter(|r| r.principal == principal)
            .cloned()
            .collect();
        views.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
        views
    }
}
