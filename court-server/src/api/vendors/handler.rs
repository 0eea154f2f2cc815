//! Vendor API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::order::{QueueSection, SubOrder, VendorAction};
use shared::request::{QueueAction, QueueActionRequest, QueueQuery, RefundUpdateRequest, StatusActionRequest};
use shared::response::{QueueActionResponse, QueueResponse, StatusActionResponse};
use shared::{AppError, AppResult};

use crate::api::blocking;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::{ActionInput, SectionFilter};
use crate::utils::time::day_range;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_OTP_LEN, page_limit, validate_optional_range, validate_optional_text,
};

const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Longest preparation estimate a vendor may set (minutes)
const MAX_PREPARATION_MINUTES: u32 = 600;

/// GET /api/vendors/{vendorId}/queue?section&date&page&limit
pub async fn list_queue(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(vendor_id): Path<String>,
    ApiQuery(query): ApiQuery<QueueQuery>,
) -> AppResult<Json<QueueResponse>> {
    user.ensure_vendor_access(&vendor_id)?;

    let date = match query.date.as_deref() {
        Some(date) if !date.is_empty() => Some(day_range(date, state.tz)?),
        _ => None,
    };
    let filter = SectionFilter {
        section: query.section.unwrap_or(QueueSection::Upcoming),
        date,
        page: query.page.unwrap_or(1).max(1),
        limit: page_limit(query.limit, DEFAULT_PAGE_LIMIT),
    };

    let orders = state.orders.clone();
    let page = blocking(move || orders.list_section(&vendor_id, &filter)).await?;

    Ok(Json(QueueResponse {
        orders: page.orders,
        pagination: page.pagination,
        section_counts: page.section_counts,
    }))
}

/// PATCH /api/vendors/{vendorId}/queue
///
/// Only pending orders can be accepted or rejected; anything else is
/// reported as not found.
pub async fn queue_action(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(vendor_id): Path<String>,
    ApiJson(payload): ApiJson<QueueActionRequest>,
) -> AppResult<Json<QueueActionResponse>> {
    user.ensure_vendor_access(&vendor_id)?;
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    validate_optional_range(
        payload.estimated_preparation_time,
        "estimatedPreparationTime",
        1..=MAX_PREPARATION_MINUTES,
    )?;

    let action = VendorAction::from(payload.action);
    let input = ActionInput {
        actor: user.id.clone(),
        reason: payload.reason,
        estimated_preparation_time: match payload.action {
            QueueAction::Accept => payload.estimated_preparation_time,
            QueueAction::Reject => None,
        },
        ..Default::default()
    };

    let orders = state.orders.clone();
    let order_id = payload.order_id;
    let order = tokio::task::spawn_blocking(move || {
        orders
            .apply_action(&vendor_id, &order_id, action, &input)
            .map_err(|e| e.into_queue_error())
    })
    .await
    .map_err(|e| AppError::internal(format!("Blocking task failed: {}", e)))??;

    Ok(Json(QueueActionResponse {
        order_id: order.id,
        status: order.status,
        queue_position: order.queue_position,
    }))
}

/// PATCH /api/vendors/{vendorId}/orders/{orderId}/status
pub async fn status_action(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((vendor_id, order_id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<StatusActionRequest>,
) -> AppResult<Json<StatusActionResponse>> {
    user.ensure_vendor_access(&vendor_id)?;

    if matches!(payload.action, VendorAction::Accept | VendorAction::Reject) {
        return Err(AppError::validation(format!(
            "Action {} goes through the queue endpoint",
            payload.action
        ))
        .with_detail("action", payload.action.as_str()));
    }
    validate_optional_text(&payload.otp, "otp", MAX_OTP_LEN)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let action = payload.action;
    let input = ActionInput {
        actor: user.id.clone(),
        otp: payload.otp,
        // a vendor cancel records the note as its reason
        reason: match action {
            VendorAction::Cancel => payload.note.clone(),
            _ => None,
        },
        note: payload.note,
        ..Default::default()
    };

    let orders = state.orders.clone();
    let order = blocking(move || orders.apply_action(&vendor_id, &order_id, action, &input)).await?;

    Ok(Json(StatusActionResponse {
        order_id: order.id,
        status: order.status,
        order_otp: order.order_otp,
        parent_order_id: order.parent_order_id,
    }))
}

/// PATCH /api/vendors/{vendorId}/orders/{orderId}/refund
pub async fn update_refund(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((vendor_id, order_id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<RefundUpdateRequest>,
) -> AppResult<Json<SubOrder>> {
    user.ensure_vendor_access(&vendor_id)?;

    let orders = state.orders.clone();
    let order = blocking(move || orders.update_refund(&vendor_id, &order_id, payload.status)).await?;
    Ok(Json(order))
}
