//! Clock-time helpers.
//!
//! The engine represents times of day as [`chrono::NaiveTime`] so that all
//! arithmetic happens in real minutes. The legacy `HHMM` integer encoding
//! (e.g. `930` for 09:30, `1430` for 14:30) survives only at the edges of
//! the system: scraped pages and JSON output. It is not arithmetic-safe
//! across hour boundaries (09:50 + 20min is not `950 + 20`), so nothing
//! inside the engine computes with it.

use chrono::{NaiveTime, Timelike};

/// Parses an `HH:MM` string as it appears in scraped activity rows.
pub fn parse_hm(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").ok()
}

/// Encodes a time as an `HHMM` integer, e.g. 14:30 → 1430.
pub fn hhmm(time: NaiveTime) -> u32 {
    time.hour() * 100 + time.minute()
}

/// Decodes an `HHMM` integer, rejecting out-of-range hour/minute parts.
pub fn from_hhmm(encoded: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(encoded / 100, encoded % 100, 0)
}

/// Formats a time as `HH:MM` for display.
pub fn format_hm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Fractional hours between two times on the same day.
#[allow(clippy::cast_precision_loss)]
pub fn hours_between(start: NaiveTime, finish: NaiveTime) -> f64 {
    finish.signed_duration_since(start).num_minutes() as f64 / 60.0
}

/// Position of a day in the Mon..Sun week, for bucketing and ordering.
pub fn day_index(day: chrono::Weekday) -> usize {
    day.num_days_from_monday() as usize
}
