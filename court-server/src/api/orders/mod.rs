//! Customer Order API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /api/orders/status | GET | the caller's parent orders (summaries) |
//! | /api/orders/status | POST | one parent order with every sub-order timeline |
//! | /api/orders/{orderId}/cancel | PATCH | cancel a pending sub-order |

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/status", get(handler::list_status).post(handler::order_detail))
        .route("/{order_id}/cancel", patch(handler::cancel))
}
