//! Order domain types
//!
//! - Sub-orders and their line items / history
//! - Status, vendor actions and derived queue sections
//! - Payments
//! - Customer aggregation view

pub mod payment;
pub mod status;
pub mod sub_order;
pub mod summary;

// Re-exports
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use status::{OrderStatus, OverallStatus, QueueSection, SectionCounts, VendorAction};
pub use sub_order::{
    ChargeBreakdown, Customization, LineItem, RefundStatus, StatusHistoryEntry, SubOrder,
};
pub use summary::{OrderDetail, OrderSummary, VendorOrderBrief};
