//! Vendor API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /api/vendors/{vendorId}/queue | GET | one queue section + live counts |
//! | /api/vendors/{vendorId}/queue | PATCH | accept / reject a pending order |
//! | /api/vendors/{vendorId}/orders/{orderId}/status | PATCH | start_preparing / mark_ready / complete / cancel |
//! | /api/vendors/{vendorId}/orders/{orderId}/refund | PATCH | record a refund outcome |
//!
//! Every route requires staff of that vendor (or an admin).

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/vendors/{vendor_id}", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/queue", get(handler::list_queue).patch(handler::queue_action))
        .route("/orders/{order_id}/status", patch(handler::status_action))
        .route("/orders/{order_id}/refund", patch(handler::update_refund))
}
