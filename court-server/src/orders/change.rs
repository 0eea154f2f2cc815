//! Committed order changes broadcast by the manager
//!
//! A change is sent only after its transaction committed, in commit order.
//! The event router turns it into per-room socket frames.

use shared::order::{SectionCounts, SubOrder, VendorAction};

#[derive(Debug, Clone, PartialEq)]
pub enum OrderChange {
    /// A checkout created sibling sub-orders
    Placed {
        parent_order_id: String,
        user_id: Option<String>,
        /// Created sub-orders, each with its vendor's counts after commit
        orders: Vec<(SubOrder, SectionCounts)>,
    },

    /// A state machine transition on one sub-order
    StatusChanged {
        order: SubOrder,
        action: VendorAction,
        section_counts: SectionCounts,
    },
}

impl OrderChange {
    pub fn parent_order_id(&self) -> &str {
        match self {
            Self::Placed {
                parent_order_id, ..
            } => parent_order_id,
            Self::StatusChanged { order, .. } => &order.parent_order_id,
        }
    }
}
