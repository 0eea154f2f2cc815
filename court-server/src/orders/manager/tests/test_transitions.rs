use super::*;
use crate::orders::state_machine::can_apply;
use std::sync::Arc;

// ========================================================================
// Legality grid
// ========================================================================

#[test]
fn test_illegal_transitions_leave_store_unchanged() {
    let manager = create_test_manager();

    for status in OrderStatus::ALL {
        for action in VendorAction::ALL {
            if can_apply(status, action) {
                continue;
            }
            let placed = place_order(&manager, "u-1", "v-grid");
            let order = advance_to(&manager, &placed, status);
            let before = manager.storage().get_order(&order.id).unwrap().unwrap();
            let mut rx = manager.subscribe();

            let mut input = vendor_input();
            input.otp = Some(order.order_otp.clone());
            let err = manager
                .apply_action("v-grid", &order.id, action, &input)
                .unwrap_err();

            match err {
                ManagerError::InvalidTransition {
                    status: s,
                    action: a,
                    ..
                } => {
                    assert_eq!(s, status);
                    assert_eq!(a, action);
                }
                other => panic!("{status}/{action}: unexpected error {other:?}"),
            }
            let after = manager.storage().get_order(&order.id).unwrap().unwrap();
            assert_eq!(after, before, "{status}/{action} changed the stored order");
            assert!(rx.try_recv().is_err(), "{status}/{action} broadcast a change");
        }
    }
}

#[test]
fn test_unknown_order_and_foreign_vendor() {
    let manager = create_test_manager();
    let order = place_order(&manager, "u-1", "v-a");

    let err = manager
        .apply_action("v-a", "missing", VendorAction::Accept, &vendor_input())
        .unwrap_err();
    assert!(matches!(err, ManagerError::OrderNotFound(_)));

    let err = manager
        .apply_action("v-other", &order.id, VendorAction::Accept, &vendor_input())
        .unwrap_err();
    assert!(matches!(err, ManagerError::OrderNotFound(_)));
    let stored = manager.storage().get_order(&order.id).unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
}

// ========================================================================
// Happy path
// ========================================================================

#[test]
fn test_full_lifecycle_with_otp() {
    let manager = create_test_manager();
    let order = place_order(&manager, "u-1", "v-a");
    let ready = advance_to(&manager, &order, OrderStatus::Ready);
    assert_eq!(ready.queue_position, None);
    assert!(ready.ready_at.is_some());

    // wrong OTP: stays ready, payment untouched
    let mut wrong = vendor_input();
    wrong.otp = Some(if ready.order_otp == "0000" { "1111" } else { "0000" }.to_string());
    let err = manager
        .apply_action("v-a", &ready.id, VendorAction::Complete, &wrong)
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidOtp(_)));
    let stored = manager.storage().get_order(&ready.id).unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Ready);
    assert_eq!(stored.status_history.len(), ready.status_history.len());

    // missing OTP
    let err = manager
        .apply_action("v-a", &ready.id, VendorAction::Complete, &vendor_input())
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidOtp(_)));

    let mut right = vendor_input();
    right.otp = Some(ready.order_otp.clone());
    let done = manager
        .apply_action("v-a", &ready.id, VendorAction::Complete, &right)
        .unwrap();
    assert_eq!(done.status, OrderStatus::Completed);
    assert!(done.completed_at.is_some());

    let payment = manager.storage().get_payment(&done.id).unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert!(payment.completed_at.is_some());

    let statuses: Vec<OrderStatus> = done.status_history.iter().map(|h| h.status).collect();
    assert_eq!(
        statuses,
        vec![
            OrderStatus::Pending,
            OrderStatus::Accepted,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Completed,
        ]
    );
    assert!(done.status_history.iter().skip(1).all(|h| h.updated_by == "vendor-staff"));

    // terminal: left the vendor index
    assert!(manager.storage().active_vendor_orders("v-a").unwrap().is_empty());
}

#[test]
fn test_reject_records_refund() {
    let manager = create_test_manager();
    let order = place_order(&manager, "u-1", "v-a");

    let mut input = vendor_input();
    input.reason = Some("Out of batter".to_string());
    let rejected = manager
        .apply_action("v-a", &order.id, VendorAction::Reject, &input)
        .unwrap();

    assert_eq!(rejected.status, OrderStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Out of batter"));
    assert_eq!(rejected.refund_amount, Some(rejected.total_amount));
    assert_eq!(rejected.refund_status, Some(RefundStatus::Pending));
    assert!(rejected.rejected_at.is_some());
}

#[test]
fn test_accept_overrides_preparation_time() {
    let manager = create_test_manager();
    let order = place_order(&manager, "u-1", "v-a");
    assert_eq!(order.estimated_preparation_time, Some(15));

    let mut input = vendor_input();
    input.estimated_preparation_time = Some(30);
    let accepted = manager
        .apply_action("v-a", &order.id, VendorAction::Accept, &input)
        .unwrap();
    assert_eq!(accepted.estimated_preparation_time, Some(30));
    assert_eq!(accepted.queue_position, Some(1));
}

#[test]
fn test_vendor_cancel_from_preparing() {
    let manager = create_test_manager();
    let order = place_order(&manager, "u-1", "v-a");
    let preparing = advance_to(&manager, &order, OrderStatus::Preparing);
    assert_eq!(preparing.queue_position, Some(1));

    let cancelled = manager
        .apply_action("v-a", &order.id, VendorAction::Cancel, &vendor_input())
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.queue_position, None);
    assert_eq!(cancelled.refund_status, Some(RefundStatus::Pending));
}

#[test]
fn test_transition_broadcasts_counts() {
    let manager = create_test_manager();
    let first = place_order(&manager, "u-1", "v-a");
    let _second = place_order(&manager, "u-2", "v-a");
    let mut rx = manager.subscribe();

    manager
        .apply_action("v-a", &first.id, VendorAction::Accept, &vendor_input())
        .unwrap();

    match rx.try_recv().unwrap() {
        OrderChange::StatusChanged {
            order,
            action,
            section_counts,
        } => {
            assert_eq!(order.id, first.id);
            assert_eq!(action, VendorAction::Accept);
            assert_eq!(section_counts.upcoming, 1);
            assert_eq!(section_counts.queue, 1);
            assert_eq!(section_counts.ready, 0);
        }
        other => panic!("unexpected change: {:?}", other),
    }
}

// ========================================================================
// Concurrency
// ========================================================================

#[test]
fn test_concurrent_accepts_get_distinct_positions() {
    const N: usize = 16;
    let manager = Arc::new(create_test_manager());
    seed_vendor(&manager, "v-busy");

    let mut ids = Vec::new();
    for i in 0..N {
        let user = format!("u-{}", i);
        seed_cart(&manager, &user, vec![item("v-busy", "Thali", 80.0, 1)]);
        let response = manager.checkout(checkout_input(&user)).unwrap();
        ids.push(response.orders[0].id.clone());
    }

    let handles: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || {
                manager
                    .apply_action("v-busy", &id, VendorAction::Accept, &vendor_input())
                    .unwrap()
                    .queue_position
                    .unwrap()
            })
        })
        .collect();

    let mut positions: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    positions.sort_unstable();
    assert_eq!(positions, (1..=N as u32).collect::<Vec<_>>());

    let counts = manager.section_counts("v-busy").unwrap();
    assert_eq!(counts.queue, N as u32);
    assert_eq!(counts.upcoming, 0);
}

#[test]
fn test_concurrent_accepts_of_one_order_succeed_once() {
    const N: usize = 8;
    let manager = Arc::new(create_test_manager());
    let order = place_order(&manager, "u-1", "v-a");

    let handles: Vec<_> = (0..N)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let id = order.id.clone();
            std::thread::spawn(move || {
                manager.apply_action("v-a", &id, VendorAction::Accept, &vendor_input())
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let accepted: Vec<&SubOrder> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].status_history.len(), 2);
    assert_eq!(accepted[0].queue_position, Some(1));
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ManagerError::InvalidTransition { .. }))
    );

    // stored copy agrees with the winner
    let stored = manager.storage().get_order(&order.id).unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Accepted);
    assert_eq!(stored.status_history.len(), 2);
}

#[test]
fn test_positions_keep_gaps_after_ready() {
    let manager = create_test_manager();
    let a = place_order(&manager, "u-1", "v-a");
    let b = place_order(&manager, "u-2", "v-a");
    let c = place_order(&manager, "u-3", "v-a");

    let a = advance_to(&manager, &a, OrderStatus::Accepted);
    let b = advance_to(&manager, &b, OrderStatus::Accepted);
    assert_eq!(b.queue_position, Some(2));

    // a leaves the bucket; b keeps 2, c gets max + 1
    for action in [VendorAction::StartPreparing, VendorAction::MarkReady] {
        manager
            .apply_action("v-a", &a.id, action, &vendor_input())
            .unwrap();
    }
    let c = advance_to(&manager, &c, OrderStatus::Accepted);
    assert_eq!(c.queue_position, Some(3));
}
