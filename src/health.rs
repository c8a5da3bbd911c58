//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload with the server version,
//! uptime, the upstream target in effect, and cumulative request
//! counters. The route sits outside auth and rate limiting so
//! orchestrators can probe it without credentials.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub upstream: UpstreamHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct UpstreamHealth {
    pub url: String,
    pub timeout_ms: u64,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests_forwarded: u64,
    pub requests_failed: u64,
    pub requests_rate_limited: u64,
    pub requests_unauthorized: u64,
}

#[allow(clippy::cast_possible_truncation)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        upstream: UpstreamHealth {
            url: state.config.upstream_url.to_string(),
            timeout_ms: state.config.upstream_timeout.as_millis() as u64,
        },
        stats: StatsResponse {
            requests_forwarded: state.stats.forwarded.load(Ordering::Relaxed),
            requests_failed: state.stats.failed.load(Ordering::Relaxed),
            requests_rate_limited: state.stats.rate_limited.load(Ordering::Relaxed),
            requests_unauthorized: state.stats.unauthorized.load(Ordering::Relaxed),
        },
    })
}
