//! Customer-side aggregation view types

use super::payment::Payment;
use super::status::{OrderStatus, OverallStatus};
use super::sub_order::SubOrder;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Per-vendor line in an order summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorOrderBrief {
    pub order_id: String,
    pub order_number: String,
    pub vendor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    pub status: OrderStatus,
    pub total_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_preparation_time: Option<u32>,
}

impl From<&SubOrder> for VendorOrderBrief {
    fn from(order: &SubOrder) -> Self {
        Self {
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            vendor_id: order.vendor_id.clone(),
            vendor_name: order.vendor_name.clone(),
            status: order.status,
            total_amount: order.total_amount,
            queue_position: order.queue_position,
            estimated_preparation_time: order.estimated_preparation_time,
        }
    }
}

/// Parent order summary, recomputed on every read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub parent_order_id: String,
    pub overall_status: OverallStatus,
    pub order_otp: String,
    pub total_amount: f64,
    pub vendor_count: u32,
    pub completed_vendors: u32,
    pub rejected_vendors: u32,
    pub cancelled_vendors: u32,
    pub created_at: Timestamp,
    pub orders: Vec<VendorOrderBrief>,
}

/// Full parent order detail; each sub-order carries its status timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub sub_orders: Vec<SubOrder>,
    pub payments: Vec<Payment>,
}
