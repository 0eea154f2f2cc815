//! Health check routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/health | GET | none |
//! | /api/health/detailed | GET | none |
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "connections": 12 }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use shared::response::HealthResponse;
use std::time::SystemTime;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    connections: usize,
    store: CheckResult,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

/// Pin the uptime origin; called when the router is built
pub(crate) fn mark_started() {
    START_TIME.get_or_init(SystemTime::now);
}

fn get_uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(SystemTime::now);
    SystemTime::now()
        .duration_since(*start)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connections: state.hub.connection_count(),
    })
}

/// Health plus a read transaction against the store
pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let orders = state.orders.clone();
    let started = std::time::Instant::now();
    let check = tokio::task::spawn_blocking(move || orders.storage().begin_read().map(|_| ())).await;

    let store = match check {
        Ok(Ok(())) => CheckResult {
            status: "ok",
            latency_ms: Some(started.elapsed().as_millis() as u64),
            message: None,
        },
        Ok(Err(e)) => CheckResult {
            status: "error",
            latency_ms: None,
            message: Some(format!("Store error: {}", e)),
        },
        Err(e) => CheckResult {
            status: "error",
            latency_ms: None,
            message: Some(format!("Store check failed: {}", e)),
        },
    };

    Json(DetailedHealthResponse {
        status: if store.status == "ok" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: get_uptime_seconds(),
        connections: state.hub.connection_count(),
        store,
    })
}
