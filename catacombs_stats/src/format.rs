//! Display strings for counts and durations.

use catacombs_schema::Milliseconds;
use chrono::DateTime;

pub const NOT_AVAILABLE: &str = "N/A";

/// `1.2K`, `3.4M`, `5.6B`; smaller values are printed as-is.
pub fn format_number(value: u64) -> String {
    let v = value as f64;
    if value >= 1_000_000_000 {
        format!("{:.1}B", v / 1_000_000_000.0)
    } else if value >= 1_000_000 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", v / 1_000.0)
    } else {
        value.to_string()
    }
}

/// Calendar date (UTC) of a millisecond timestamp.
pub fn format_date(timestamp_ms: Option<u64>) -> String {
    timestamp_ms
        .filter(|&ms| ms > 0)
        .and_then(|ms| i64::try_from(ms).ok())
        .and_then(DateTime::from_timestamp_millis)
        .map_or_else(|| NOT_AVAILABLE.to_string(), |date| date.format("%Y-%m-%d").to_string())
}

/// `m:ss`; zero and missing durations render as `N/A`.
pub fn format_time(ms: Option<Milliseconds>) -> String {
    match ms {
        Some(ms) if ms > 0 => {
            let seconds = ms / 1000;
            format!("{}:{:02}", seconds / 60, seconds % 60)
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}
