//! Checkout handler

use axum::{Json, extract::State, http::StatusCode};
use shared::order::PaymentMethod;
use shared::request::CheckoutRequest;
use shared::response::CheckoutResponse;
use shared::{AppError, AppResult, ErrorCode};

use crate::api::blocking;
use crate::api::extract::ApiJson;
use crate::auth::{CurrentUser, Role};
use crate::core::ServerState;
use crate::orders::CheckoutInput;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

/// Split the caller's cart into per-vendor sub-orders
///
/// 201 with the parent order, the shared OTP and the charge apportionment.
pub async fn checkout(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<CheckoutResponse>)> {
    if user.role != Role::Customer {
        return Err(AppError::with_message(
            ErrorCode::RoleRequired,
            "Only customers can check out",
        ));
    }

    let payment_method: PaymentMethod = payload.payment_method.parse().map_err(|e: String| {
        AppError::with_message(ErrorCode::PaymentInvalidMethod, e)
            .with_detail("paymentMethod", payload.payment_method.clone())
    })?;
    validate_optional_text(
        &payload.special_instructions,
        "specialInstructions",
        MAX_NOTE_LEN,
    )?;

    let input = CheckoutInput {
        user_id: user.id.clone(),
        payment_method,
        special_instructions: payload
            .special_instructions
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };

    let orders = state.orders.clone();
    let response = blocking(move || orders.checkout(input)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
