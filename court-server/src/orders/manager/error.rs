use super::super::splitter::SplitError;
use super::super::state_machine::TransitionError;
use super::super::storage::StorageError;
use shared::error::{AppError, ErrorCode};
use shared::order::{OrderStatus, VendorAction};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Vendor not found or inactive: {0}")]
    VendorNotFoundOrInactive(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order is not pending: {0}")]
    OrderNotPending(String),

    #[error("Cannot {action} order {order_id} in status {status}")]
    InvalidTransition {
        order_id: String,
        status: OrderStatus,
        action: VendorAction,
    },

    #[error("Invalid pickup code for order {0}")]
    InvalidOtp(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Refund not allowed for order {0} in status {1}")]
    RefundNotAllowed(String, OrderStatus),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Payment already refunded: {0}")]
    PaymentAlreadyRefunded(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ManagerError {
    pub(super) fn transition(order_id: &str, err: TransitionError) -> Self {
        match err {
            TransitionError::Invalid { status, action } => Self::InvalidTransition {
                order_id: order_id.to_string(),
                status,
                action,
            },
            TransitionError::InvalidOtp => Self::InvalidOtp(order_id.to_string()),
        }
    }

    /// The accept/reject queue endpoint reports "not pending" instead of an
    /// illegal transition
    pub fn into_queue_error(self) -> Self {
        match self {
            Self::InvalidTransition { order_id, .. } => Self::OrderNotPending(order_id),
            other => other,
        }
    }
}

impl From<SplitError> for ManagerError {
    fn from(err: SplitError) -> Self {
        match err {
            SplitError::EmptyCart => Self::EmptyCart,
            SplitError::VendorUnavailable(id) => Self::VendorNotFoundOrInactive(id),
            SplitError::InvalidItem(msg) => Self::Validation(msg),
        }
    }
}

/// Classify a storage failure into an error code
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    match e {
        StorageError::Serialization(_) => return ErrorCode::InternalError,
        StorageError::OrderNotFound(_) => return ErrorCode::OrderNotFound,
        _ => {}
    }

    // redb errors only expose their message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    // Database/Transaction/Table/Storage/Commit
    ErrorCode::DatabaseError
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = %code, "Storage error occurred");
                // store internals stay in the log
                AppError::new(code)
            }
            ManagerError::EmptyCart => AppError::new(ErrorCode::EmptyCart),
            ManagerError::VendorNotFoundOrInactive(id) => AppError::with_message(
                ErrorCode::VendorNotFoundOrInactive,
                format!("Vendor not found or inactive: {}", id),
            )
            .with_detail("vendorId", id),
            ManagerError::OrderNotFound(id) => AppError::with_message(
                ErrorCode::OrderNotFound,
                format!("Order not found: {}", id),
            ),
            ManagerError::OrderNotPending(id) => AppError::with_message(
                ErrorCode::OrderNotPending,
                format!("Order not found or not pending: {}", id),
            ),
            ManagerError::InvalidTransition {
                order_id,
                status,
                action,
            } => AppError::with_message(
                ErrorCode::InvalidTransition,
                format!("Cannot {} an order that is {}", action, status),
            )
            .with_detail("orderId", order_id)
            .with_detail("status", status.as_str())
            .with_detail("action", action.as_str()),
            ManagerError::InvalidOtp(_) => AppError::new(ErrorCode::InvalidOtp),
            ManagerError::AccessDenied(msg) => AppError::permission_denied(msg),
            ManagerError::RefundNotAllowed(id, status) => AppError::with_message(
                ErrorCode::RefundNotAllowed,
                format!("Order {} is {}; refunds apply to rejected or cancelled orders", id, status),
            ),
            ManagerError::PaymentNotFound(id) => AppError::with_message(
                ErrorCode::PaymentNotFound,
                format!("Payment not found for order {}", id),
            ),
            ManagerError::PaymentAlreadyRefunded(id) => AppError::with_message(
                ErrorCode::PaymentAlreadyRefunded,
                format!("Payment already refunded for order {}", id),
            ),
            ManagerError::Validation(msg) => AppError::validation(msg),
            ManagerError::Internal(msg) => AppError::internal(msg),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
