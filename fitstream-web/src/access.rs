//! Access policy seam.
//!
//! The coaching platform decides who may watch what (students see assigned
//! workouts, trainers see their own). That decision happens upstream; this
//! seam only fixes the call order in the handlers: authorize, then resolve,
//! then stream. The default policy admits everyone, which is correct when
//! Fitstream runs behind the platform's authenticating proxy.

use async_trait::async_trait;
use axum::http::HeaderMap;
use fitstream_core::MediaId;

/// Header the outer platform uses to forward the authenticated principal.
pub const PRINCIPAL_HEADER: &str = "x-fitstream-user";

/// Authorization decision for one principal and one media item.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Returns whether `principal` may view `media_id`.
    async fn allow(&self, principal: Option<&str>, media_id: MediaId) -> bool;
}

/// Permissive policy for deployments where authorization happens upstream.
#[derive(Debug, Default)]
pub struct AllowAll;

#[async_trait]
impl AccessPolicy for AllowAll {
    async fn allow(&self, _principal: Option<&str>, _media_id: MediaId) -> bool {
        true
    }
}

/// Extracts the forwarded principal from request headers.
pub fn principal_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(PRINCIPAL_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
