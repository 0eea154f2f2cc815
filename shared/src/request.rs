//! Request bodies and query strings of the order API

use crate::order::{QueueSection, RefundStatus, VendorAction};
use serde::{Deserialize, Serialize};

/// `POST /api/checkout`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method: String,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

/// Actions accepted by the queue endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueAction {
    Accept,
    Reject,
}

impl From<QueueAction> for VendorAction {
    fn from(action: QueueAction) -> Self {
        match action {
            QueueAction::Accept => VendorAction::Accept,
            QueueAction::Reject => VendorAction::Reject,
        }
    }
}

/// `PATCH /api/vendors/{vendorId}/queue`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueActionRequest {
    pub order_id: String,
    pub action: QueueAction,
    #[serde(default)]
    pub reason: Option<String>,
    /// Overrides the vendor default on accept (minutes)
    #[serde(default)]
    pub estimated_preparation_time: Option<u32>,
}

/// `PATCH /api/vendors/{vendorId}/orders/{orderId}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusActionRequest {
    pub action: VendorAction,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// `GET /api/vendors/{vendorId}/queue`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueQuery {
    #[serde(default)]
    pub section: Option<QueueSection>,
    /// `YYYY-MM-DD` in the court timezone
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// `GET /api/orders/status`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusQuery {
    #[serde(default)]
    pub parent_order_id: Option<String>,
    /// Sub-order status; keeps parents with any sibling in it
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub active_only: Option<bool>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// `POST /api/orders/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailRequest {
    pub parent_order_id: String,
}

/// `PATCH /api/orders/{orderId}/cancel`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// `PATCH /api/vendors/{vendorId}/orders/{orderId}/refund`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundUpdateRequest {
    pub status: RefundStatus,
}
