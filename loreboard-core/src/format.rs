//! Formatting helpers shared across outputs.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::analytics::labels::month_abbrev;
pub use crate::analytics::calendar::parse_timestamp;

/// Format a timestamp relative to `now` (e.g., "3h ago", "2w ago").
///
/// Anything older than 30 days is shown as a short date ("5 Mar").
pub fn format_relative_time(ts: DateTime<FixedOffset>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_hours() < 1 {
        "just now".to_string()
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_days() < 30 {
        format!("{}w ago", duration.num_days() / 7)
    } else {
        format!("{} {}", ts.day(), month_abbrev(ts.month()))
    }
}

/// Relative time for a raw record timestamp, or an em dash if it doesn't parse.
pub fn format_relative_timestamp(raw: &str, now: DateTime<Utc>) -> String {
    match parse_timestamp(raw) {
        Some(ts) => format_relative_time(ts, now),
        None => "—".to_string(),
    }
}

/// The instant relative times are measured from when "today" is pinned to
/// `date`: the last second of that day, UTC.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
        .and_utc()
}

/// Full weekday name for a Sunday-based index.
pub fn day_name(day: u8) -> &'static str {
    match day {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Unknown",
    }
}

/// Full month name for a 1-based month.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
