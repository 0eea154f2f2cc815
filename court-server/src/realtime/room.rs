//! Room names and join rules
//!
//! | Room | Who may join |
//! |------|--------------|
//! | `vendor:<vendorId>` | staff of that vendor (and admins) |
//! | `customer:<userId>` | that customer (and admins) |
//! | `order:<parentOrderId>` | customers owning a sub-order of the parent (and admins) |

use shared::message::Joined;
use shared::{ClientEvent, ServerEvent};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    Vendor(String),
    Customer(String),
    Order(String),
}

impl Room {
    /// Room a join frame asks for
    pub fn from_join(event: &ClientEvent) -> Option<Self> {
        let room = match event {
            ClientEvent::JoinVendorRoom(id) => Self::Vendor(id.clone()),
            ClientEvent::JoinUserRoom(id) => Self::Customer(id.clone()),
            ClientEvent::JoinOrderRoom(id) => Self::Order(id.clone()),
        };
        match &room {
            Self::Vendor(id) | Self::Customer(id) | Self::Order(id) if id.is_empty() => None,
            _ => Some(room),
        }
    }

    /// Acknowledgement sent back after a successful join
    pub fn joined_event(&self) -> ServerEvent {
        let joined = Joined {
            room: self.to_string(),
        };
        match self {
            Self::Vendor(_) => ServerEvent::JoinedVendorRoom(joined),
            Self::Customer(_) => ServerEvent::JoinedUserRoom(joined),
            Self::Order(_) => ServerEvent::JoinedOrderRoom(joined),
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vendor(id) => write!(f, "vendor:{}", id),
            Self::Customer(id) => write!(f, "customer:{}", id),
            Self::Order(id) => write!(f, "order:{}", id),
        }
    }
}
