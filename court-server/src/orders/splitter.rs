//! Order splitter: one multi-vendor cart in, one sub-order per vendor out
//!
//! Shared charges are computed once on the grand subtotal and apportioned to
//! vendors by subtotal weight (not equally). The last vendor absorbs the
//! rounding remainder of every charge so the sibling totals add up exactly.
//! The split is pure; persisting it is the manager's job.

use super::money::{self, MAX_PRICE, MAX_QUANTITY, apportion, to_decimal, to_f64};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shared::models::{Cart, CartItem, Vendor};
use shared::order::{
    ChargeBreakdown, LineItem, OrderStatus, Payment, PaymentMethod, PaymentStatus,
    StatusHistoryEntry, SubOrder,
};
use shared::response::{CheckoutCharges, VendorCharges};
use shared::util::{generate_order_number, generate_otp};
use std::collections::HashMap;
use thiserror::Error;

/// Court charge configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeRates {
    /// Fraction of the subtotal, e.g. 0.18
    pub tax_rate: Decimal,
    /// Fraction of the subtotal, e.g. 0.05
    pub service_charge_rate: Decimal,
    /// Flat amount per checkout
    pub platform_charge: Decimal,
}

impl ChargeRates {
    pub fn from_f64(tax_rate: f64, service_charge_rate: f64, platform_charge: f64) -> Self {
        Self {
            tax_rate: to_decimal(tax_rate),
            service_charge_rate: to_decimal(service_charge_rate),
            platform_charge: to_decimal(platform_charge),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Vendor not found or inactive: {0}")]
    VendorUnavailable(String),

    #[error("Invalid cart item: {0}")]
    InvalidItem(String),
}

/// Who is checking out and how
#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub user_id: String,
    pub payment_method: PaymentMethod,
    pub special_instructions: Option<String>,
}

/// Everything one checkout creates
#[derive(Debug, Clone)]
pub struct SplitPlan {
    pub parent_order_id: String,
    pub order_otp: String,
    pub orders: Vec<SubOrder>,
    pub payments: Vec<Payment>,
    pub charges: CheckoutCharges,
}

impl SplitPlan {
    pub fn total_amount(&self) -> f64 {
        self.charges.total_amount
    }
}

/// Items of one vendor, in cart order
struct VendorGroup<'a> {
    vendor: &'a Vendor,
    items: Vec<&'a CartItem>,
    subtotal: Decimal,
}

fn validate_item(item: &CartItem) -> Result<(), SplitError> {
    if !item.unit_price.is_finite() || item.unit_price < 0.0 || item.unit_price > MAX_PRICE {
        return Err(SplitError::InvalidItem(format!(
            "{}: unit price {} out of range",
            item.name, item.unit_price
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(SplitError::InvalidItem(format!(
            "{}: quantity {} exceeds {}",
            item.name, item.quantity, MAX_QUANTITY
        )));
    }
    Ok(())
}

fn line_subtotal(item: &CartItem) -> Decimal {
    money::round_money(to_decimal(item.unit_price) * Decimal::from(item.quantity))
}

/// Partition a cart into per-vendor sub-orders with proportional charges.
///
/// `vendors` must contain every vendor the cart references; a missing,
/// inactive or foreign-court vendor fails the whole split.
pub fn split_cart(
    cart: &Cart,
    vendors: &HashMap<String, Vendor>,
    rates: &ChargeRates,
    input: &CheckoutInput,
    now: i64,
) -> Result<SplitPlan, SplitError> {
    if cart.is_empty() {
        return Err(SplitError::EmptyCart);
    }

    let mut groups: Vec<VendorGroup<'_>> = Vec::new();
    for item in cart.items.iter().filter(|item| item.quantity > 0) {
        validate_item(item)?;
        let position = match groups.iter().position(|g| g.vendor.id == item.vendor_id) {
            Some(position) => position,
            None => {
                let vendor = vendors
                    .get(&item.vendor_id)
                    .filter(|v| v.is_active && v.court_id == cart.court_id)
                    .ok_or_else(|| SplitError::VendorUnavailable(item.vendor_id.clone()))?;
                groups.push(VendorGroup {
                    vendor,
                    items: Vec::new(),
                    subtotal: Decimal::ZERO,
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[position];
        group.subtotal += line_subtotal(item);
        group.items.push(item);
    }

    let weights: Vec<Decimal> = groups.iter().map(|g| g.subtotal).collect();
    let grand_subtotal: Decimal = weights.iter().copied().sum();
    let tax = money::round_money(rates.tax_rate * grand_subtotal);
    let service = money::round_money(rates.service_charge_rate * grand_subtotal);
    let platform = money::round_money(rates.platform_charge);

    let tax_shares = apportion(tax, &weights);
    let service_shares = apportion(service, &weights);
    let platform_shares = apportion(platform, &weights);

    let parent_order_id = uuid::Uuid::new_v4().to_string();
    let order_otp = generate_otp();

    let mut orders = Vec::with_capacity(groups.len());
    let mut payments = Vec::with_capacity(groups.len());
    let mut per_vendor = Vec::with_capacity(groups.len());

    for (index, group) in groups.iter().enumerate() {
        let share = if grand_subtotal.is_zero() {
            Decimal::ZERO
        } else {
            group.subtotal / grand_subtotal
        };
        let total = group.subtotal + tax_shares[index] + service_shares[index] + platform_shares[index];
        let breakdown = ChargeBreakdown {
            subtotal: to_f64(group.subtotal),
            tax_amount: to_f64(tax_shares[index]),
            service_charge: to_f64(service_shares[index]),
            platform_charge: to_f64(platform_shares[index]),
            discount_amount: 0.0,
            total_amount: to_f64(total),
        };
        let share_f64 = share.round_dp(4).to_f64().unwrap_or_default();

        let items = group
            .items
            .iter()
            .map(|item| LineItem {
                menu_item_id: item.menu_item_id.clone(),
                name: item.name.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                subtotal: to_f64(line_subtotal(item)),
                customizations: item.customizations.clone(),
            })
            .collect();

        let order_id = uuid::Uuid::new_v4().to_string();
        orders.push(SubOrder {
            id: order_id.clone(),
            order_number: generate_order_number(),
            parent_order_id: parent_order_id.clone(),
            court_id: cart.court_id.clone(),
            vendor_id: group.vendor.id.clone(),
            vendor_name: Some(group.vendor.name.clone()),
            user_id: Some(input.user_id.clone()),
            subtotal: breakdown.subtotal,
            tax_amount: breakdown.tax_amount,
            service_charge: breakdown.service_charge,
            platform_charge: breakdown.platform_charge,
            discount_amount: breakdown.discount_amount,
            total_amount: breakdown.total_amount,
            items,
            payment_method: input.payment_method,
            special_instructions: input.special_instructions.clone(),
            status: OrderStatus::Pending,
            queue_position: None,
            status_history: vec![StatusHistoryEntry {
                status: OrderStatus::Pending,
                timestamp: now,
                note: Some("Order placed".to_string()),
                updated_by: input.user_id.clone(),
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
            order_otp: order_otp.clone(),
            estimated_preparation_time: group.vendor.estimated_preparation_time,
            metadata: serde_json::json!({
                "charges": {
                    "vendorShare": share_f64,
                    "grandSubtotal": to_f64(grand_subtotal),
                    "taxRate": rates.tax_rate.to_string(),
                    "serviceChargeRate": rates.service_charge_rate.to_string(),
                    "platformCharge": to_f64(platform),
                    "vendorCount": groups.len(),
                }
            }),
            created_at: now,
            updated_at: now,
        });

        payments.push(Payment {
            id: uuid::Uuid::new_v4().to_string(),
            order_id,
            status: PaymentStatus::Pending,
            amount: breakdown.total_amount,
            method: input.payment_method,
            created_at: now,
            updated_at: now,
            completed_at: None,
            refunded_at: None,
        });

        per_vendor.push(VendorCharges {
            vendor_id: group.vendor.id.clone(),
            share: share_f64,
            charges: breakdown,
        });
    }

    let charges = CheckoutCharges {
        subtotal: to_f64(grand_subtotal),
        tax_amount: to_f64(tax),
        service_charge: to_f64(service),
        platform_charge: to_f64(platform),
        total_amount: to_f64(grand_subtotal + tax + service + platform),
        per_vendor,
    };

    Ok(SplitPlan {
        parent_order_id,
        order_otp,
        orders,
        payments,
        charges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn vendor(id: &str) -> Vendor {
        Vendor {
            id: id.to_string(),
            court_id: "court-1".to_string(),
            name: format!("Vendor {id}"),
            is_active: true,
            estimated_preparation_time: Some(15),
        }
    }

    fn item(vendor_id: &str, name: &str, price: f64, quantity: u32) -> CartItem {
        CartItem {
            vendor_id: vendor_id.to_string(),
            menu_item_id: format!("{vendor_id}-{name}"),
            name: name.to_string(),
            unit_price: price,
            quantity,
            customizations: vec![],
        }
    }

    fn vendors(ids: &[&str]) -> HashMap<String, Vendor> {
        ids.iter().map(|id| (id.to_string(), vendor(id))).collect()
    }

    fn input() -> CheckoutInput {
        CheckoutInput {
            user_id: "user-1".to_string(),
            payment_method: PaymentMethod::Upi,
            special_instructions: Some("less spicy".to_string()),
        }
    }

    fn rates() -> ChargeRates {
        ChargeRates::from_f64(0.18, 0.05, 5.0)
    }

    fn cart(items: Vec<CartItem>) -> Cart {
        Cart {
            user_id: "user-1".to_string(),
            court_id: "court-1".to_string(),
            items,
        }
    }

    #[test]
    fn test_two_vendor_split_is_proportional() {
        let cart = cart(vec![item("a", "dosa", 59.0, 1), item("b", "chai", 39.0, 1)]);
        let plan = split_cart(&cart, &vendors(&["a", "b"]), &rates(), &input(), 1_000).unwrap();

        assert_eq!(plan.orders.len(), 2);
        let a = &plan.orders[0];
        let b = &plan.orders[1];
        assert_eq!(a.vendor_id, "a");
        assert_eq!(a.subtotal, 59.0);
        assert_eq!(b.subtotal, 39.0);

        // 59 / 98 ≈ 60.2 % of every shared charge
        assert_eq!(a.tax_amount, 10.62);
        assert_eq!(b.tax_amount, 7.02);
        assert_eq!(a.service_charge, 2.95);
        assert_eq!(b.service_charge, 1.95);
        assert_eq!(a.platform_charge, 3.01);
        assert_eq!(b.platform_charge, 1.99);
        assert!((plan.charges.per_vendor[0].share - 0.602).abs() < 0.001);

        assert_eq!(plan.charges.total_amount, 125.54);
        assert!(money::money_eq(a.total_amount + b.total_amount, 125.54));
    }

    #[test]
    fn test_siblings_share_otp_and_parent() {
        let cart = cart(vec![
            item("a", "dosa", 59.0, 2),
            item("b", "chai", 15.0, 3),
            item("c", "kulfi", 40.0, 1),
        ]);
        let plan = split_cart(&cart, &vendors(&["a", "b", "c"]), &rates(), &input(), 1_000).unwrap();

        let otps: HashSet<&str> = plan.orders.iter().map(|o| o.order_otp.as_str()).collect();
        let parents: HashSet<&str> = plan.orders.iter().map(|o| o.parent_order_id.as_str()).collect();
        let numbers: HashSet<&str> = plan.orders.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(otps.len(), 1);
        assert_eq!(parents.len(), 1);
        assert_eq!(numbers.len(), 3);
        assert_eq!(plan.order_otp.len(), 4);
        assert!(plan.orders.iter().all(|o| o.status == OrderStatus::Pending));
        assert!(plan.orders.iter().all(|o| o.status_history.len() == 1));
        assert_eq!(plan.payments.len(), 3);
    }

    #[test]
    fn test_split_conservation_awkward_amounts() {
        let cart = cart(vec![
            item("a", "x", 33.33, 1),
            item("b", "y", 33.33, 1),
            item("c", "z", 33.34, 1),
            item("d", "w", 0.99, 7),
        ]);
        let rates = ChargeRates::from_f64(0.0725, 0.031, 3.33);
        let plan = split_cart(&cart, &vendors(&["a", "b", "c", "d"]), &rates, &input(), 0).unwrap();

        let sum: Decimal = plan
            .orders
            .iter()
            .map(|o| to_decimal(o.total_amount))
            .sum();
        let expected = to_decimal(plan.charges.total_amount);
        let tolerance = Decimal::new(plan.orders.len() as i64, 2);
        assert!((sum - expected).abs() <= tolerance);

        let payment_sum: Decimal = plan.payments.iter().map(|p| to_decimal(p.amount)).sum();
        assert_eq!(payment_sum, sum);
    }

    #[test]
    fn test_same_vendor_lines_grouped() {
        let cart = cart(vec![
            item("a", "dosa", 59.0, 1),
            item("b", "chai", 10.0, 1),
            item("a", "vada", 20.0, 2),
        ]);
        let plan = split_cart(&cart, &vendors(&["a", "b"]), &rates(), &input(), 0).unwrap();
        assert_eq!(plan.orders.len(), 2);
        assert_eq!(plan.orders[0].items.len(), 2);
        assert_eq!(plan.orders[0].subtotal, 99.0);
        assert_eq!(plan.orders[0].estimated_preparation_time, Some(15));
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = split_cart(&cart(vec![]), &vendors(&[]), &rates(), &input(), 0).unwrap_err();
        assert_eq!(err, SplitError::EmptyCart);

        let zero = cart(vec![item("a", "dosa", 59.0, 0)]);
        let err = split_cart(&zero, &vendors(&["a"]), &rates(), &input(), 0).unwrap_err();
        assert_eq!(err, SplitError::EmptyCart);
    }

    #[test]
    fn test_inactive_or_unknown_vendor_rejected() {
        let mut known = vendors(&["a", "b"]);
        known.get_mut("b").unwrap().is_active = false;

        let cart_b = cart(vec![item("a", "dosa", 59.0, 1), item("b", "chai", 39.0, 1)]);
        let err = split_cart(&cart_b, &known, &rates(), &input(), 0).unwrap_err();
        assert_eq!(err, SplitError::VendorUnavailable("b".to_string()));

        let cart_z = cart(vec![item("z", "tea", 10.0, 1)]);
        let err = split_cart(&cart_z, &known, &rates(), &input(), 0).unwrap_err();
        assert_eq!(err, SplitError::VendorUnavailable("z".to_string()));

        known.get_mut("a").unwrap().court_id = "court-2".to_string();
        let cart_a = cart(vec![item("a", "dosa", 59.0, 1)]);
        assert!(split_cart(&cart_a, &known, &rates(), &input(), 0).is_err());
    }

    #[test]
    fn test_invalid_price_rejected() {
        let cart = cart(vec![item("a", "dosa", f64::NAN, 1)]);
        let err = split_cart(&cart, &vendors(&["a"]), &rates(), &input(), 0).unwrap_err();
        assert!(matches!(err, SplitError::InvalidItem(_)));
    }
}
