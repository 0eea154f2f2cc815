//! Cart Model

use crate::order::Customization;
use serde::{Deserialize, Serialize};

/// Cart line, may reference any vendor of the court
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub vendor_id: String,
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub customizations: Vec<Customization>,
}

/// Per-user cart, cleared by a successful checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub user_id: String,
    pub court_id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| item.quantity == 0)
    }

    /// Distinct vendor ids in first-appearance order
    pub fn vendor_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for item in &self.items {
            if !ids.contains(&item.vendor_id.as_str()) {
                ids.push(&item.vendor_id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(vendor: &str, qty: u32) -> CartItem {
        CartItem {
            vendor_id: vendor.to_string(),
            menu_item_id: format!("{vendor}-item"),
            name: "Masala Dosa".to_string(),
            unit_price: 59.0,
            quantity: qty,
            customizations: vec![],
        }
    }

    #[test]
    fn test_vendor_ids_keep_first_appearance_order() {
        let cart = Cart {
            user_id: "u-1".into(),
            court_id: "c-1".into(),
            items: vec![item("b", 1), item("a", 2), item("b", 1)],
        };
        assert_eq!(cart.vendor_ids(), vec!["b", "a"]);
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_zero_quantity_cart_is_empty() {
        let cart = Cart {
            user_id: "u-1".into(),
            court_id: "c-1".into(),
            items: vec![item("a", 0)],
        };
        assert!(cart.is_empty());
    }
}
