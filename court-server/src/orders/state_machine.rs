//! Sub-order state machine
//!
//! ```text
//! pending ──accept──► accepted ──start_preparing──► preparing ──mark_ready──► ready ──complete──► completed
//!    │                    │                             │                       │
//!    └──reject──► rejected└──────────── cancel (any non-terminal) ─────────────┴──► cancelled
//! ```
//!
//! `apply` either performs the whole transition or returns an error with the
//! order untouched. Queue positions are assigned by the caller (they need the
//! vendor bucket) and handed in through [`TransitionContext`].

use shared::order::{OrderStatus, RefundStatus, StatusHistoryEntry, SubOrder, VendorAction};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Cannot {action} an order that is {status}")]
    Invalid {
        status: OrderStatus,
        action: VendorAction,
    },

    #[error("Invalid pickup code")]
    InvalidOtp,
}

/// Per-call inputs of a transition
#[derive(Debug, Clone, Default)]
pub struct TransitionContext<'a> {
    pub now: i64,
    /// Actor recorded in the history entry
    pub actor: &'a str,
    /// Pickup code presented on `complete`
    pub otp: Option<&'a str>,
    /// Rejection / cancellation reason
    pub reason: Option<&'a str>,
    /// Free-form history note
    pub note: Option<&'a str>,
    /// Position assigned on `accept`
    pub queue_position: Option<u32>,
    /// Preparation time override on `accept`
    pub estimated_preparation_time: Option<u32>,
}

/// Legal `(status, action)` pairs
pub fn can_apply(status: OrderStatus, action: VendorAction) -> bool {
    use OrderStatus::*;
    use VendorAction::*;
    matches!(
        (status, action),
        (Pending, Accept)
            | (Pending, Reject)
            | (Accepted, StartPreparing)
            | (Preparing, MarkReady)
            | (Ready, Complete)
            | (Pending | Accepted | Preparing | Ready, Cancel)
    )
}

/// Check legality without touching the order
pub fn ensure_can_apply(status: OrderStatus, action: VendorAction) -> Result<(), TransitionError> {
    if can_apply(status, action) {
        Ok(())
    } else {
        Err(TransitionError::Invalid { status, action })
    }
}

fn default_note(action: VendorAction) -> &'static str {
    match action {
        VendorAction::Accept => "Order accepted",
        VendorAction::Reject => "Order rejected",
        VendorAction::StartPreparing => "Preparation started",
        VendorAction::MarkReady => "Order ready for pickup",
        VendorAction::Complete => "Order picked up",
        VendorAction::Cancel => "Order cancelled",
    }
}

/// Apply `action` to `order`
pub fn apply(
    order: &mut SubOrder,
    action: VendorAction,
    ctx: &TransitionContext<'_>,
) -> Result<(), TransitionError> {
    ensure_can_apply(order.status, action)?;

    if action == VendorAction::Complete && ctx.otp.map(str::trim) != Some(order.order_otp.as_str())
    {
        return Err(TransitionError::InvalidOtp);
    }

    let now = ctx.now;
    let mut note = ctx.note.map(str::to_string);
    match action {
        VendorAction::Accept => {
            order.accepted_at = Some(now);
            order.queue_position = ctx.queue_position;
            if let Some(minutes) = ctx.estimated_preparation_time {
                order.estimated_preparation_time = Some(minutes);
            }
        }
        VendorAction::Reject => {
            order.rejected_at = Some(now);
            order.rejection_reason = ctx.reason.map(str::to_string);
            order.refund_amount = Some(order.total_amount);
            order.refund_status = Some(RefundStatus::Pending);
            if note.is_none() {
                note = ctx.reason.map(str::to_string);
            }
        }
        VendorAction::StartPreparing => {
            order.preparing_at = Some(now);
        }
        VendorAction::MarkReady => {
            order.ready_at = Some(now);
        }
        VendorAction::Complete => {
            order.completed_at = Some(now);
        }
        VendorAction::Cancel => {
            order.cancelled_at = Some(now);
            order.refund_amount = Some(order.total_amount);
            order.refund_status = Some(RefundStatus::Pending);
            if note.is_none() {
                note = ctx.reason.map(str::to_string);
            }
        }
    }

    let status = action.target_status();
    order.status = status;
    if !status.holds_queue_position() {
        order.queue_position = None;
    }
    order.updated_at = now;
    order.status_history.push(StatusHistoryEntry {
        status,
        timestamp: now,
        note: note.or_else(|| Some(default_note(action).to_string())),
        updated_by: ctx.actor.to_string(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::PaymentMethod;

    fn order_in(status: OrderStatus) -> SubOrder {
        SubOrder {
            id: "o-1".into(),
            order_number: "FC-1".into(),
            parent_order_id: "p-1".into(),
            court_id: "c-1".into(),
            vendor_id: "v-1".into(),
            vendor_name: None,
            user_id: Some("u-1".into()),
            subtotal: 59.0,
            tax_amount: 10.62,
            service_charge: 2.95,
            platform_charge: 3.01,
            discount_amount: 0.0,
            total_amount: 75.58,
            items: vec![],
            payment_method: PaymentMethod::Cash,
            special_instructions: None,
            status,
            queue_position: status.holds_queue_position().then_some(3),
            status_history: vec![StatusHistoryEntry {
                status,
                timestamp: 0,
                note: None,
                updated_by: "seed".into(),
            }],
            accepted_at: None,
            preparing_at: None,
            ready_at: None,
            completed_at: None,
            rejected_at: None,
            cancelled_at: None,
            rejection_reason: None,
            refund_amount: None,
            refund_status: None,
            order_otp: "4821".into(),
            estimated_preparation_time: Some(10),
            metadata: serde_json::Value::Null,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn ctx(now: i64) -> TransitionContext<'static> {
        TransitionContext {
            now,
            actor: "vendor-user",
            ..Default::default()
        }
    }

    #[test]
    fn test_every_unlisted_pair_is_rejected_without_mutation() {
        for status in OrderStatus::ALL {
            for action in VendorAction::ALL {
                if can_apply(status, action) {
                    continue;
                }
                let mut order = order_in(status);
                let before = order.clone();
                let mut c = ctx(99);
                c.otp = Some("4821");
                let err = apply(&mut order, action, &c).unwrap_err();
                assert_eq!(err, TransitionError::Invalid { status, action });
                assert_eq!(order, before, "{status} / {action} mutated the order");
            }
        }
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for status in [
            OrderStatus::Completed,
            OrderStatus::Rejected,
            OrderStatus::Cancelled,
        ] {
            assert!(VendorAction::ALL.iter().all(|a| !can_apply(status, *a)));
        }
    }

    #[test]
    fn test_accept_assigns_position_and_history() {
        let mut order = order_in(OrderStatus::Pending);
        let mut c = ctx(10);
        c.queue_position = Some(4);
        c.estimated_preparation_time = Some(25);
        apply(&mut order, VendorAction::Accept, &c).unwrap();

        assert_eq!(order.status, OrderStatus::Accepted);
        assert_eq!(order.queue_position, Some(4));
        assert_eq!(order.accepted_at, Some(10));
        assert_eq!(order.estimated_preparation_time, Some(25));
        assert_eq!(order.status_history.len(), 2);
        assert_eq!(order.status_history.last().unwrap().status, order.status);
    }

    #[test]
    fn test_reject_sets_refund() {
        let mut order = order_in(OrderStatus::Pending);
        let mut c = ctx(10);
        c.reason = Some("Out of stock");
        apply(&mut order, VendorAction::Reject, &c).unwrap();

        assert_eq!(order.status, OrderStatus::Rejected);
        assert_eq!(order.rejection_reason.as_deref(), Some("Out of stock"));
        assert_eq!(order.refund_amount, Some(75.58));
        assert_eq!(order.refund_status, Some(RefundStatus::Pending));
        assert_eq!(
            order.status_history.last().unwrap().note.as_deref(),
            Some("Out of stock")
        );
    }

    #[test]
    fn test_mark_ready_clears_queue_position() {
        let mut order = order_in(OrderStatus::Preparing);
        assert_eq!(order.queue_position, Some(3));
        apply(&mut order, VendorAction::MarkReady, &ctx(5)).unwrap();
        assert_eq!(order.status, OrderStatus::Ready);
        assert_eq!(order.queue_position, None);
        assert_eq!(order.ready_at, Some(5));
    }

    #[test]
    fn test_complete_requires_matching_otp() {
        let mut order = order_in(OrderStatus::Ready);
        let before = order.clone();

        let mut wrong = ctx(7);
        wrong.otp = Some("0000");
        assert_eq!(
            apply(&mut order, VendorAction::Complete, &wrong),
            Err(TransitionError::InvalidOtp)
        );
        assert_eq!(order, before);

        assert_eq!(
            apply(&mut order, VendorAction::Complete, &ctx(7)),
            Err(TransitionError::InvalidOtp)
        );

        let mut right = ctx(8);
        right.otp = Some("4821");
        apply(&mut order, VendorAction::Complete, &right).unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.completed_at, Some(8));
    }

    #[test]
    fn test_cancel_from_queue_clears_position() {
        let mut order = order_in(OrderStatus::Accepted);
        apply(&mut order, VendorAction::Cancel, &ctx(3)).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.queue_position, None);
        assert_eq!(order.cancelled_at, Some(3));
        assert_eq!(order.refund_status, Some(RefundStatus::Pending));
    }

    #[test]
    fn test_happy_path_history_is_append_only() {
        let mut order = order_in(OrderStatus::Pending);
        let mut c = ctx(1);
        c.queue_position = Some(1);
        apply(&mut order, VendorAction::Accept, &c).unwrap();
        apply(&mut order, VendorAction::StartPreparing, &ctx(2)).unwrap();
        apply(&mut order, VendorAction::MarkReady, &ctx(3)).unwrap();
        let mut done = ctx(4);
        done.otp = Some(" 4821 ");
        apply(&mut order, VendorAction::Complete, &done).unwrap();

        let statuses: Vec<OrderStatus> = order.status_history.iter().map(|h| h.status).collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Pending,
                OrderStatus::Accepted,
                OrderStatus::Preparing,
                OrderStatus::Ready,
                OrderStatus::Completed
            ]
        );
        let stamps: Vec<i64> = order.status_history.iter().map(|h| h.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }
}
