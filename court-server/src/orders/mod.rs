//! Order lifecycle core
//!
//! - **splitter**: multi-vendor cart → one sub-order per vendor
//! - **state_machine**: legal sub-order transitions and their effects
//! - **queue**: derived vendor sections, positions and counts
//! - **aggregate**: customer-side parent order view
//! - **manager**: transactional OrdersManager tying the above to storage
//! - **storage**: redb tables and indices
//!
//! # Data Flow
//!
//! ```text
//! Checkout ─► Splitter ─► N sub-orders ─┐
//!                                       ├─► OrdersManager ─► redb (one write txn)
//! Vendor action ─► State Machine ───────┘          │
//!                                                  ▼ (after commit)
//!                                         broadcast OrderChange
//!                                                  │
//!                                             EventRouter ─► rooms
//! ```

pub mod aggregate;
pub mod change;
pub mod manager;
pub mod money;
pub mod queue;
pub mod splitter;
pub mod state_machine;
pub mod storage;

// Re-exports
pub use change::OrderChange;
pub use manager::{ActionInput, ManagerError, ManagerResult, OrdersManager, SummaryFilter};
pub use queue::{DateRange, SectionFilter, SectionPage};
pub use splitter::{ChargeRates, CheckoutInput};
pub use storage::{OrderStorage, StorageError};
