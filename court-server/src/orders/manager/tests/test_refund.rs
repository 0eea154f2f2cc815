use super::*;

#[test]
fn test_refund_processed_moves_payment() {
    let manager = create_test_manager();
    let order = place_order(&manager, "u-1", "v-a");
    advance_to(&manager, &order, OrderStatus::Rejected);

    let updated = manager
        .update_refund("v-a", &order.id, RefundStatus::Processed)
        .unwrap();
    assert_eq!(updated.refund_status, Some(RefundStatus::Processed));
    assert_eq!(updated.status, OrderStatus::Rejected);
    // bookkeeping is not a transition
    assert_eq!(updated.status_history.len(), 2);

    let payment = manager.storage().get_payment(&order.id).unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Refunded);
    assert!(payment.refunded_at.is_some());

    let err = manager
        .update_refund("v-a", &order.id, RefundStatus::Failed)
        .unwrap_err();
    assert!(matches!(err, ManagerError::PaymentAlreadyRefunded(_)));
}

#[test]
fn test_refund_failed_keeps_payment() {
    let manager = create_test_manager();
    let order = place_order(&manager, "u-1", "v-a");
    advance_to(&manager, &order, OrderStatus::Cancelled);

    let updated = manager
        .update_refund("v-a", &order.id, RefundStatus::Failed)
        .unwrap();
    assert_eq!(updated.refund_status, Some(RefundStatus::Failed));
    let payment = manager.storage().get_payment(&order.id).unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);

    // a failed refund can be retried
    manager
        .update_refund("v-a", &order.id, RefundStatus::Processed)
        .unwrap();
}

#[test]
fn test_refund_only_after_reject_or_cancel() {
    let manager = create_test_manager();
    let order = place_order(&manager, "u-1", "v-a");

    let err = manager
        .update_refund("v-a", &order.id, RefundStatus::Processed)
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::RefundNotAllowed(_, OrderStatus::Pending)
    ));

    advance_to(&manager, &order, OrderStatus::Completed);
    let err = manager
        .update_refund("v-a", &order.id, RefundStatus::Processed)
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::RefundNotAllowed(_, OrderStatus::Completed)
    ));
}

#[test]
fn test_refund_rejects_pending_status_and_foreign_vendor() {
    let manager = create_test_manager();
    let order = place_order(&manager, "u-1", "v-a");
    advance_to(&manager, &order, OrderStatus::Rejected);

    let err = manager
        .update_refund("v-a", &order.id, RefundStatus::Pending)
        .unwrap_err();
    assert!(matches!(err, ManagerError::Validation(_)));

    let err = manager
        .update_refund("v-b", &order.id, RefundStatus::Processed)
        .unwrap_err();
    assert!(matches!(err, ManagerError::OrderNotFound(_)));
}
