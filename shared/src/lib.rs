//! Shared types for the food-court order core
//!
//! Domain types, API DTOs, realtime frames and the error/response system
//! used by the court server and its tests.

pub mod error;
pub mod message;
pub mod models;
pub mod order;
pub mod request;
pub mod response;
pub mod types;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use message::{ClientEvent, ServerEvent};
pub use serde::{Deserialize, Serialize};
