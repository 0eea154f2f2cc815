//! Customer Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::order::{OrderDetail, OrderStatus, SubOrder};
use shared::request::{CancelOrderRequest, OrderDetailRequest, OrderStatusQuery};
use shared::response::OrderSummariesResponse;
use shared::{AppError, AppResult};

use crate::api::blocking;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::SummaryFilter;
use crate::utils::validation::{MAX_NOTE_LEN, page_limit, validate_id, validate_optional_text};

const DEFAULT_PAGE_LIMIT: u32 = 10;

/// GET /api/orders/status?parentOrderId&status&activeOnly&page&limit
pub async fn list_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<OrderStatusQuery>,
) -> AppResult<Json<OrderSummariesResponse>> {
    let status = match query.status.as_deref() {
        Some(s) if !s.is_empty() => Some(
            s.parse::<OrderStatus>()
                .map_err(|e| AppError::validation(e).with_detail("status", s))?,
        ),
        _ => None,
    };

    let filter = SummaryFilter {
        parent_order_id: query.parent_order_id.filter(|id| !id.is_empty()),
        status,
        active_only: query.active_only.unwrap_or(false),
        page: query.page.unwrap_or(1).max(1),
        limit: page_limit(query.limit, DEFAULT_PAGE_LIMIT),
    };

    let orders = state.orders.clone();
    let user_id = user.id.clone();
    let (order_summaries, pagination) =
        blocking(move || orders.order_summaries(&user_id, &filter)).await?;

    Ok(Json(OrderSummariesResponse {
        order_summaries,
        pagination,
    }))
}

/// POST /api/orders/status
pub async fn order_detail(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<OrderDetailRequest>,
) -> AppResult<Json<OrderDetail>> {
    validate_id(&payload.parent_order_id, "parentOrderId")?;

    let orders = state.orders.clone();
    let user_id = user.id.clone();
    let detail =
        blocking(move || orders.order_detail(&user_id, &payload.parent_order_id)).await?;
    Ok(Json(detail))
}

/// PATCH /api/orders/{orderId}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
    payload: Option<ApiJson<CancelOrderRequest>>,
) -> AppResult<Json<SubOrder>> {
    let reason = payload
        .and_then(|ApiJson(p)| p.reason)
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    validate_optional_text(&reason, "reason", MAX_NOTE_LEN)?;

    let orders = state.orders.clone();
    let user_id = user.id.clone();
    let order = blocking(move || orders.customer_cancel(&user_id, &order_id, reason)).await?;
    Ok(Json(order))
}
