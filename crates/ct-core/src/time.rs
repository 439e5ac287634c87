//! Timestamp representation and display formatting.

use chrono::{Local, TimeZone};

/// Milliseconds since the Unix epoch.
///
/// Stored as a plain `i64` so that sentinel values (`0` for seed events,
/// `i64::MAX` for the open end of the default activity) survive
/// serialization without range checks.
pub type Timestamp = i64;

/// The current wall-clock time in epoch milliseconds.
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

/// Formats a timestamp as `yyyy/MM/dd HH:mm:ss +zzzz` in the local timezone.
///
/// Values outside the range `chrono` can represent (notably `i64::MAX`,
/// the open end of the default activity) fall back to the raw
/// millisecond count.
#[must_use]
pub fn format_timestamp(millis: Timestamp) -> String {
    match Local.timestamp_millis_opt(millis) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
            dt.format("%Y/%m/%d %H:%M:%S %z").to_string()
        }
        chrono::LocalResult::None => millis.to_string(),
    }
}
