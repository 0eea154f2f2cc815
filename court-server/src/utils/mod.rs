//! Utilities
//!
//! - [`logger`] - tracing subscriber setup
//! - [`time`] - business-timezone date ranges
//! - [`validation`] - request text limits

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::{ApiResponse, AppError, AppResult, ErrorCode};
