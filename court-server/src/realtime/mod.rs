//! Realtime fan-out
//!
//! Rooms keyed by vendor, customer and parent order. Order changes are routed
//! into rooms by [`crate::core::EventRouter`]; sockets live in [`ws`].

pub mod hub;
pub mod room;
pub mod ws;

pub use hub::{ConnectionId, FanoutHub};
pub use room::Room;
