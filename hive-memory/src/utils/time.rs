//! Time Utilities
//!
//! Storage keeps unix milliseconds; the engine API speaks `DateTime<Utc>`.

use chrono::{DateTime, TimeDelta, Utc};

/// Get current UTC timestamp
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Convert to stored unix milliseconds
pub fn to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Convert stored unix milliseconds back, clamping out-of-range values to the epoch
pub fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// `now` minus a whole number of days, in stored milliseconds.
///
/// Saturates at the earliest representable instant.
pub fn days_before(now: DateTime<Utc>, days: u32) -> i64 {
    to_millis(saturating_sub(now, TimeDelta::try_days(i64::from(days))))
}

/// `now` minus a whole number of hours, in stored milliseconds.
///
/// Saturates at the earliest representable instant.
pub fn hours_before(now: DateTime<Utc>, hours: u32) -> i64 {
    to_millis(saturating_sub(now, TimeDelta::try_hours(i64::from(hours))))
}

fn saturating_sub(now: DateTime<Utc>, delta: Option<TimeDelta>) -> DateTime<Utc> {
    delta
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
