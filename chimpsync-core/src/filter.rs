//! `created-since` parsing.
//!
//! Inputs are normalized to a naive UTC timestamp at second precision, the
//! same shape the store uses for `orders.created_at`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

use crate::error::StoreError;

/// Format used for `orders.created_at` and for the bound passed to SQL.
pub const STORE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a date-like `created-since` value.
///
/// Accepts RFC 3339 (converted to UTC), `YYYY-MM-DD[ T]HH:MM[:SS[.fff]]`
/// and a bare `YYYY-MM-DD` (midnight). Fractional seconds are truncated.
pub fn parse_created_since(input: &str) -> Result<NaiveDateTime, StoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid(input, "empty value"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(truncate_to_seconds(dt.naive_utc()));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(truncate_to_seconds(dt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| invalid(input, "date has no midnight"));
    }

    Err(invalid(
        input,
        "expected YYYY-MM-DD, YYYY-MM-DD HH:MM[:SS] or an RFC 3339 timestamp",
    ))
}

/// Render a timestamp in the store's `created_at` format.
pub fn format_store_datetime(dt: &NaiveDateTime) -> String {
    dt.format(STORE_DATETIME_FORMAT).to_string()
}

fn truncate_to_seconds(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}

fn invalid(input: &str, reason: &str) -> StoreError {
    StoreError::InvalidFilter {
        input: input.to_owned(),
        reason: reason.to_owned(),
    }
}
