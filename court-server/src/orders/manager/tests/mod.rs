use super::*;
use crate::orders::splitter::ChargeRates;
use shared::models::{Cart, CartItem, Vendor};
use shared::order::PaymentMethod;

const COURT: &str = "court-1";

fn test_rates() -> ChargeRates {
    ChargeRates::from_f64(0.18, 0.05, 5.0)
}

fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    OrdersManager::with_storage(storage, test_rates(), 256)
}

fn seed_vendor(manager: &OrdersManager, id: &str) {
    manager
        .storage()
        .put_vendor(&Vendor {
            id: id.to_string(),
            court_id: COURT.to_string(),
            name: format!("Vendor {}", id),
            is_active: true,
            estimated_preparation_time: Some(15),
        })
        .unwrap();
}

fn item(vendor_id: &str, name: &str, unit_price: f64, quantity: u32) -> CartItem {
    CartItem {
        vendor_id: vendor_id.to_string(),
        menu_item_id: format!("{}-{}", vendor_id, name),
        name: name.to_string(),
        unit_price,
        quantity,
        customizations: vec![],
    }
}

fn seed_cart(manager: &OrdersManager, user_id: &str, items: Vec<CartItem>) {
    manager
        .storage()
        .put_cart(&Cart {
            user_id: user_id.to_string(),
            court_id: COURT.to_string(),
            items,
        })
        .unwrap();
}

fn checkout_input(user_id: &str) -> CheckoutInput {
    CheckoutInput {
        user_id: user_id.to_string(),
        payment_method: PaymentMethod::Upi,
        special_instructions: None,
    }
}

// ========================================================================
// Helper: place a single-vendor order and return its sub-order
// ========================================================================

fn place_order(manager: &OrdersManager, user_id: &str, vendor_id: &str) -> SubOrder {
    seed_vendor(manager, vendor_id);
    seed_cart(manager, user_id, vec![item(vendor_id, "Dosa", 40.0, 1)]);
    let response = manager.checkout(checkout_input(user_id)).unwrap();
    response.orders.into_iter().next().unwrap()
}

fn vendor_input() -> ActionInput {
    ActionInput::by("vendor-staff")
}

/// Drive a pending order to `target` through the legal path
fn advance_to(manager: &OrdersManager, order: &SubOrder, target: OrderStatus) -> SubOrder {
    let path: &[VendorAction] = match target {
        OrderStatus::Pending => &[],
        OrderStatus::Accepted => &[VendorAction::Accept],
        OrderStatus::Preparing => &[VendorAction::Accept, VendorAction::StartPreparing],
        OrderStatus::Ready => &[
            VendorAction::Accept,
            VendorAction::StartPreparing,
            VendorAction::MarkReady,
        ],
        OrderStatus::Completed => &[
            VendorAction::Accept,
            VendorAction::StartPreparing,
            VendorAction::MarkReady,
            VendorAction::Complete,
        ],
        OrderStatus::Rejected => &[VendorAction::Reject],
        OrderStatus::Cancelled => &[VendorAction::Cancel],
    };

    let mut current = order.clone();
    for action in path {
        let mut input = vendor_input();
        if *action == VendorAction::Complete {
            input.otp = Some(current.order_otp.clone());
        }
        current = manager
            .apply_action(&current.vendor_id, &current.id, *action, &input)
            .unwrap();
    }
    current
}

mod test_transitions;
mod test_refund;
