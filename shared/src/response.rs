//! Response bodies of the order API

use crate::order::{
    ChargeBreakdown, OrderStatus, OrderSummary, SectionCounts, SubOrder,
};
use crate::types::Pagination;
use serde::{Deserialize, Serialize};

/// Shared charges of one checkout, with the per-vendor apportionment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCharges {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub service_charge: f64,
    pub platform_charge: f64,
    pub total_amount: f64,
    pub per_vendor: Vec<VendorCharges>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorCharges {
    pub vendor_id: String,
    /// Vendor subtotal / grand subtotal
    pub share: f64,
    #[serde(flatten)]
    pub charges: ChargeBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub parent_order_id: String,
    pub order_otp: String,
    pub orders: Vec<SubOrder>,
    pub total_amount: f64,
    pub charges: CheckoutCharges,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    pub orders: Vec<SubOrder>,
    pub pagination: Pagination,
    pub section_counts: SectionCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueActionResponse {
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusActionResponse {
    pub order_id: String,
    pub status: OrderStatus,
    pub order_otp: String,
    pub parent_order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummariesResponse {
    pub order_summaries: Vec<OrderSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub connections: usize,
}
