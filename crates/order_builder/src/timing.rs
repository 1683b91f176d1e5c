//! Clock times on the sheets.
//!
//! Accepts `"7:00 PM"`, `"7 PM"` and `"19:00"`; always writes `"7:00 PM"`.

use anyhow::{bail, Result};
use chrono::{Duration, NaiveTime};

const FORMATS: [&str; 2] = ["%I:%M %p", "%H:%M"];

pub fn parse_show_time(value: &str) -> Result<NaiveTime> {
    let trimmed = value.trim();
    let normalized = normalize_hour_only(trimmed);
    for format in FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(&normalized, format) {
            return Ok(time);
        }
    }
    bail!("Unsupported time format: {}", value)
}

/// `"7 PM"` -> `"7:00 PM"`. chrono needs minutes to build a time.
fn normalize_hour_only(value: &str) -> String {
    let upper = value.to_ascii_uppercase();
    if value.contains(':') {
        return value.to_string();
    }
    for meridiem in ["AM", "PM"] {
        if let Some(hour) = upper.strip_suffix(meridiem) {
            return format!("{}:00 {}", hour.trim(), meridiem);
        }
    }
    value.to_string()
}

pub fn format_show_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Wraps past midnight.
pub fn add_minutes(time: NaiveTime, minutes: i64) -> NaiveTime {
    time + Duration::minutes(minutes)
}
