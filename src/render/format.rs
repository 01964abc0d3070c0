//! Human-readable formatting helpers

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Byte count with a binary unit, e.g. `1.5 GB`. Zero means unknown.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "Unknown".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", trim_decimals(value), SIZE_UNITS[unit])
}

/// Coarse elapsed time since `started_at` (epoch seconds).
pub fn format_run_time(started_at: Option<i64>, now: DateTime<Utc>) -> String {
    let Some(started_at) = started_at.filter(|s| *s != 0) else {
        return "Unknown".to_string();
    };
    let elapsed = (now.timestamp() - started_at).max(0);
    match elapsed {
        s if s < 60 => format!("{} seconds", s),
        s if s < 3_600 => format!("{} minutes", s / 60),
        s if s < 86_400 => format!("{} hours", s / 3_600),
        s => format!("{} days", s / 86_400),
    }
}

/// Numeric telemetry value without a spurious `.0`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Round to two decimals and drop trailing zeros.
fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
