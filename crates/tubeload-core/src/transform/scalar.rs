use chrono::{DateTime, NaiveDateTime, Utc};

use super::TransformError;

/// The only timestamp shape the API is trusted to send.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse an API timestamp strictly as `YYYY-MM-DDTHH:MM:SSZ` (UTC).
///
/// Fractional seconds, offsets other than `Z`, and date-only values are all
/// rejected.
///
/// # Errors
///
/// Returns [`TransformError::Timestamp`] when `value` does not match.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TransformError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| TransformError::Timestamp {
            value: value.to_string(),
        })
}

/// Coerce a decimal count string (`"12345"`) into an integer.
///
/// # Errors
///
/// Returns [`TransformError::Count`] for empty, signed, fractional, or
/// out-of-range values.
pub fn parse_count(field: &str, value: &str) -> Result<i64, TransformError> {
    let err = || TransformError::Count {
        field: field.to_string(),
        value: value.to_string(),
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    value.parse::<i64>().map_err(|_| err())
}
