//! Sub-order status, vendor actions and derived queue sections

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a single sub-order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Preparing,
    Ready,
    Completed,
    Rejected,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }

    /// Queue section this status is displayed in, if any
    pub fn section(&self) -> Option<QueueSection> {
        match self {
            Self::Pending => Some(QueueSection::Upcoming),
            Self::Accepted | Self::Preparing => Some(QueueSection::Queue),
            Self::Ready => Some(QueueSection::Ready),
            _ => None,
        }
    }

    /// Whether the sub-order holds a queue position in this status
    pub fn holds_queue_position(&self) -> bool {
        matches!(self, Self::Accepted | Self::Preparing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub const ALL: [OrderStatus; 7] = [
        Self::Pending,
        Self::Accepted,
        Self::Preparing,
        Self::Ready,
        Self::Completed,
        Self::Rejected,
        Self::Cancelled,
    ];
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// Action a vendor (or customer, for cancel) applies to a sub-order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorAction {
    Accept,
    Reject,
    StartPreparing,
    MarkReady,
    Complete,
    Cancel,
}

impl VendorAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::StartPreparing => "start_preparing",
            Self::MarkReady => "mark_ready",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }

    /// Status reached when the action succeeds
    pub fn target_status(&self) -> OrderStatus {
        match self {
            Self::Accept => OrderStatus::Accepted,
            Self::Reject => OrderStatus::Rejected,
            Self::StartPreparing => OrderStatus::Preparing,
            Self::MarkReady => OrderStatus::Ready,
            Self::Complete => OrderStatus::Completed,
            Self::Cancel => OrderStatus::Cancelled,
        }
    }

    pub const ALL: [VendorAction; 6] = [
        Self::Accept,
        Self::Reject,
        Self::StartPreparing,
        Self::MarkReady,
        Self::Complete,
        Self::Cancel,
    ];
}

impl fmt::Display for VendorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived vendor queue bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueSection {
    #[default]
    Upcoming,
    Queue,
    Ready,
}

impl QueueSection {
    /// Statuses that fall into this section
    pub fn statuses(&self) -> &'static [OrderStatus] {
        match self {
            Self::Upcoming => &[OrderStatus::Pending],
            Self::Queue => &[OrderStatus::Accepted, OrderStatus::Preparing],
            Self::Ready => &[OrderStatus::Ready],
        }
    }
}

impl fmt::Display for QueueSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upcoming => f.write_str("upcoming"),
            Self::Queue => f.write_str("queue"),
            Self::Ready => f.write_str("ready"),
        }
    }
}

/// Live per-vendor section counts (always recomputed, never cached)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectionCounts {
    pub upcoming: u32,
    pub queue: u32,
    pub ready: u32,
}

impl SectionCounts {
    /// Count one sub-order in the given status
    pub fn add(&mut self, status: OrderStatus) {
        match status.section() {
            Some(QueueSection::Upcoming) => self.upcoming += 1,
            Some(QueueSection::Queue) => self.queue += 1,
            Some(QueueSection::Ready) => self.ready += 1,
            None => {}
        }
    }
}

/// Customer-facing status of a whole parent order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Pending,
    Ready,
    Partial,
    Completed,
    Rejected,
    Cancelled,
}
