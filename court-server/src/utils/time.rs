//! Business-timezone date helpers
//!
//! Dates arriving over HTTP are converted to `i64` Unix millis here, in the
//! handler layer; the order core only sees millis.

use chrono::NaiveDate;
use chrono_tz::Tz;
use shared::{AppError, AppResult};

use crate::orders::DateRange;

/// Parse `YYYY-MM-DD`
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Local midnight → Unix millis
///
/// A midnight skipped by a DST jump falls back to UTC.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Next day's local midnight → Unix millis (exclusive end)
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// `[start of date, start of next day)` in the business timezone
pub fn day_range(date: &str, tz: Tz) -> AppResult<DateRange> {
    let date = parse_date(date)?;
    Ok(DateRange {
        start: day_start_millis(date, tz),
        end: day_end_millis(date, tz),
    })
}
