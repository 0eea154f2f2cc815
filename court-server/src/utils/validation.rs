//! Input validation helpers
//!
//! Text limits for free-form fields carried into sub-orders and history.

use shared::{AppError, ErrorCode};
use std::ops::RangeInclusive;

/// Notes, reasons, special instructions
pub const MAX_NOTE_LEN: usize = 500;

/// Pickup OTP as typed at the counter (4 digits, some slack for spaces)
pub const MAX_OTP_LEN: usize = 16;

/// Largest page size the list endpoints return
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate a required path id
pub fn validate_id(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(
            AppError::with_message(ErrorCode::RequiredField, format!("{field} must not be empty"))
                .with_detail("field", field),
        );
    }
    Ok(())
}

/// Validate an optional number against an inclusive range
pub fn validate_optional_range(
    value: Option<u32>,
    field: &str,
    range: RangeInclusive<u32>,
) -> Result<(), AppError> {
    if let Some(v) = value
        && !range.contains(&v)
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!(
                "{field} must be between {} and {} (got {v})",
                range.start(),
                range.end()
            ),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// `limit` query value, clamped to `1..=MAX_PAGE_LIMIT`
pub fn page_limit(limit: Option<u32>, default: u32) -> u32 {
    limit.unwrap_or(default).clamp(1, MAX_PAGE_LIMIT)
}
