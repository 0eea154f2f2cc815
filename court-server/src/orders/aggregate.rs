//! Customer-side aggregation of sibling sub-orders
//!
//! Nothing is stored: the summary is rebuilt from the siblings on every read.

use super::money::{to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::order::{
    OrderDetail, OrderStatus, OrderSummary, OverallStatus, Payment, SubOrder, VendorOrderBrief,
};

/// Derive the parent order status from its siblings
///
/// Only cancelled siblings are set aside. A rejected sibling still counts
/// against "all completed", so `[completed, rejected]` is partial; a set of
/// nothing but rejected (and cancelled) siblings is rejected.
pub fn overall_status(statuses: &[OrderStatus]) -> OverallStatus {
    if statuses.is_empty() {
        return OverallStatus::Pending;
    }

    let remaining: Vec<OrderStatus> = statuses
        .iter()
        .copied()
        .filter(|s| *s != OrderStatus::Cancelled)
        .collect();

    if remaining.is_empty() {
        return OverallStatus::Cancelled;
    }
    if remaining.iter().all(|s| *s == OrderStatus::Rejected) {
        return OverallStatus::Rejected;
    }

    let completed = remaining
        .iter()
        .filter(|s| **s == OrderStatus::Completed)
        .count();
    if completed == remaining.len() {
        OverallStatus::Completed
    } else if completed > 0 {
        OverallStatus::Partial
    } else if remaining.contains(&OrderStatus::Ready) {
        OverallStatus::Ready
    } else {
        OverallStatus::Pending
    }
}

/// Whether the parent order still needs the customer's attention
pub fn is_active(status: OverallStatus) -> bool {
    matches!(
        status,
        OverallStatus::Pending | OverallStatus::Ready | OverallStatus::Partial
    )
}

fn count(siblings: &[SubOrder], status: OrderStatus) -> u32 {
    siblings.iter().filter(|o| o.status == status).count() as u32
}

/// Build the summary of one parent order; `None` when there are no siblings
pub fn summarize(siblings: &[SubOrder]) -> Option<OrderSummary> {
    let first = siblings.first()?;

    let statuses: Vec<OrderStatus> = siblings.iter().map(|o| o.status).collect();
    let total: Decimal = siblings.iter().map(|o| to_decimal(o.total_amount)).sum();

    let mut orders: Vec<VendorOrderBrief> = siblings.iter().map(VendorOrderBrief::from).collect();
    orders.sort_by(|a, b| a.vendor_id.cmp(&b.vendor_id));

    Some(OrderSummary {
        parent_order_id: first.parent_order_id.clone(),
        overall_status: overall_status(&statuses),
        order_otp: first.order_otp.clone(),
        total_amount: to_f64(total),
        vendor_count: siblings.len() as u32,
        completed_vendors: count(siblings, OrderStatus::Completed),
        rejected_vendors: count(siblings, OrderStatus::Rejected),
        cancelled_vendors: count(siblings, OrderStatus::Cancelled),
        created_at: siblings.iter().map(|o| o.created_at).min().unwrap_or(first.created_at),
        orders,
    })
}

/// Summary plus every sub-order with its status timeline
pub fn detail(mut siblings: Vec<SubOrder>, payments: Vec<Payment>) -> Option<OrderDetail> {
    siblings.sort_by(|a, b| a.vendor_id.cmp(&b.vendor_id));
    let summary = summarize(&siblings)?;
    Some(OrderDetail {
        summary,
        sub_orders: siblings,
        payments,
    })
}
