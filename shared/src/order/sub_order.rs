//! Sub-order record: one per vendor per checkout

use super::payment::PaymentMethod;
use super::status::OrderStatus;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Customization chosen for a line item (e.g. "extra cheese")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

/// Ordered line item, snapshotted from the cart at checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    /// unit_price × quantity
    pub subtotal: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customizations: Vec<Customization>,
}

/// Append-only status history entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub updated_by: String,
}

/// Refund bookkeeping state (set only on rejection/cancellation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    Processed,
    Failed,
}

/// Shared charges apportioned to one vendor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChargeBreakdown {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub service_charge: f64,
    pub platform_charge: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
}

/// One vendor's share of a checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubOrder {
    // === Identity ===
    pub id: String,
    /// Human-readable, globally unique
    pub order_number: String,
    pub parent_order_id: String,
    pub court_id: String,
    pub vendor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    /// None for counter orders
    #[serde(default)]
    pub user_id: Option<String>,

    // === Financial ===
    pub subtotal: f64,
    pub tax_amount: f64,
    pub service_charge: f64,
    pub platform_charge: f64,
    #[serde(default)]
    pub discount_amount: f64,
    pub total_amount: f64,

    // === Commerce ===
    pub items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,

    // === Lifecycle ===
    pub status: OrderStatus,
    /// Only set while accepted or preparing
    #[serde(default)]
    pub queue_position: Option<u32>,
    pub status_history: Vec<StatusHistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparing_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_status: Option<RefundStatus>,

    // === Correlation ===
    pub order_otp: String,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_preparation_time: Option<u32>,

    /// Audit-only side channel, never branched on
    #[serde(default)]
    pub metadata: serde_json::Value,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SubOrder {
    /// Whether the sub-order belongs to a customer (not a counter order)
    pub fn has_customer(&self) -> bool {
        self.user_id.is_some()
    }

    /// Charges carried by this sub-order
    pub fn charges(&self) -> ChargeBreakdown {
        ChargeBreakdown {
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            service_charge: self.service_charge,
            platform_charge: self.platform_charge,
            discount_amount: self.discount_amount,
            total_amount: self.total_amount,
        }
    }
}
