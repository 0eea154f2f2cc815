//! Realtime message types
//!
//! Shared between the court server and the vendor dashboard / customer apps.
//! Every frame on the socket is `{"event": "<name>", "data": <payload>}`.

use crate::order::{QueueSection, SectionCounts, SubOrder, VendorAction};
use serde::{Deserialize, Serialize};

/// Frames sent by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinVendorRoom(String),
    JoinUserRoom(String),
    JoinOrderRoom(String),
}

/// Frames pushed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    OrderStatusUpdated(OrderStatusUpdate),
    OrderRemoved(OrderRemoved),
    NewOrder(NewOrder),
    OrderPlaced(OrderPlaced),
    JoinedVendorRoom(Joined),
    JoinedUserRoom(Joined),
    JoinedOrderRoom(Joined),
}

impl ServerEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderStatusUpdated(_) => "order-status-updated",
            Self::OrderRemoved(_) => "order-removed",
            Self::NewOrder(_) => "new-order",
            Self::OrderPlaced(_) => "order-placed",
            Self::JoinedVendorRoom(_) => "joined-vendor-room",
            Self::JoinedUserRoom(_) => "joined-user-room",
            Self::JoinedOrderRoom(_) => "joined-order-room",
        }
    }
}

/// `order-status-updated` payload; the vendor and customer shapes differ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderStatusUpdate {
    Vendor(VendorStatusUpdate),
    Customer(CustomerStatusUpdate),
}

/// Vendor channel view of a non-terminal transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorStatusUpdate {
    pub section: QueueSection,
    pub order: SubOrder,
    pub action: VendorAction,
    pub section_counts: SectionCounts,
}

/// Customer and parent-order channel view of any transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStatusUpdate {
    pub parent_order_id: String,
    pub vendor_order: SubOrder,
    pub action: VendorAction,
}

/// Sent to the vendor channel when a sub-order reaches a terminal state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRemoved {
    pub order_id: String,
    pub section_counts: SectionCounts,
}

/// Sent to the vendor channel for each sub-order created by checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order: SubOrder,
    pub section_counts: SectionCounts,
}

/// Sent to the customer channel once checkout commits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlaced {
    pub parent_order_id: String,
    pub orders: Vec<SubOrder>,
}

/// Join acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joined {
    pub room: String,
}
