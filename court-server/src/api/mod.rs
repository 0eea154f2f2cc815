//! HTTP API
//!
//! - [`health`] - liveness and store check
//! - [`checkout`] - cart → parent order + per-vendor sub-orders
//! - [`vendors`] - vendor queue, status actions, refunds
//! - [`orders`] - customer order list, detail, cancellation
//!
//! `/ws` (realtime) is mounted here as well. Handlers read bodies and query
//! strings through [`extract`] so malformed input gets a structured error.

pub mod checkout;
pub mod extract;
pub mod health;
pub mod orders;
pub mod vendors;

use std::time::Duration;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::orders::ManagerError;
use shared::{AppError, AppResult};

/// Build the application router with middleware and state
///
/// Used by the server and by router-level tests (`oneshot`).
pub fn build_router(state: ServerState) -> Router {
    health::mark_started();
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    Router::new()
        .merge(health::router())
        .merge(checkout::router())
        .merge(vendors::router())
        .merge(orders::router())
        .route("/ws", get(crate::realtime::ws::handle_ws))
        // ========== Tower HTTP Middleware ==========
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run blocking store work off the async runtime
pub(crate) async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> Result<T, ManagerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Blocking task failed: {}", e)))?
        .map_err(AppError::from)
}
