//! Reference data models
//!
//! Read by the order core, written by the CRUD layer (and tests) through the
//! store-level seeding calls.

pub mod cart;
pub mod vendor;

// Re-exports
pub use cart::*;
pub use vendor::*;
