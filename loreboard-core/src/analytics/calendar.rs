//! Calendar bucketing.
//!
//! Maps timestamps onto the periods used by the series aggregator and the
//! terrain grid: ISO weeks, year-month keys and Sunday-based weekday indices.
//!
//! ## Week 53
//!
//! The terrain is a fixed 52-column grid, so [`iso_week`] folds ISO week 53
//! into week 52 instead of modeling 53-week years. This is a known deviation
//! from ISO-8601: in a 53-week year the last two weeks share a number.
//!
//! ## Unparseable timestamps
//!
//! Source data is loosely validated. A timestamp that does not parse has no
//! bucket: [`parse_date`] returns `None` and [`dated`] drops the record.
//! Nothing here returns an error.

use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveDateTime, Weekday};

use crate::types::Dated;

/// Columns in the terrain grid.
pub const WEEKS_PER_YEAR: u32 = 52;

/// Rows in the terrain grid.
pub const DAYS_PER_WEEK: u32 = 7;

/// Parse a record timestamp to an instant.
///
/// Accepts RFC 3339 (`2024-01-02T10:00:00Z`, `2024-01-02T10:00:00+02:00`),
/// naive date-times with `T` or space separators (seconds optional),
/// git-style `2024-01-02 10:00:00 +0200`, and bare `2024-01-02`. Naive
/// values are taken as UTC; bare dates as UTC midnight.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z") {
        return Some(ts);
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Calendar date of a record timestamp.
///
/// Offset-bearing timestamps keep the date as written in their own offset,
/// so this agrees with [`parse_timestamp`] on every input.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|ts| ts.date_naive())
}

/// Pair each record with its parsed date, dropping unparseable ones.
///
/// This is the single filtering step every aggregation goes through.
pub fn dated<'a, R: Dated>(records: &'a [R]) -> impl Iterator<Item = (&'a R, NaiveDate)> + 'a {
    records.iter().filter_map(|record| match parse_date(record.timestamp()) {
        Some(date) => Some((record, date)),
        None => {
            tracing::trace!(
                timestamp = record.timestamp(),
                "Skipping record with unparseable timestamp"
            );
            None
        }
    })
}

/// ISO-8601 week number, clamped to `1..=52`.
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week().min(WEEKS_PER_YEAR)
}

/// Day of week with 0 = Sunday, 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Weekday for a Sunday-based index.
pub fn weekday_from_index(day: u32) -> Option<Weekday> {
    match day {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Concrete date for (ISO year, ISO week, Sunday-based weekday).
///
/// Sunday is the last day of its ISO week, so `(2024, 1, 0)` is
/// 2024-01-07. Returns `None` for weeks outside `1..=52` or days outside
/// `0..=6`.
pub fn week_day_to_date(year: i32, week: u32, day: u32) -> Option<NaiveDate> {
    if !(1..=WEEKS_PER_YEAR).contains(&week) {
        return None;
    }
    NaiveDate::from_isoywd_opt(year, week, weekday_from_index(day)?)
}

/// Monday that starts the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Step a month start back by `n` months.
pub fn months_before(month: NaiveDate, n: u32) -> NaiveDate {
    month.checked_sub_months(Months::new(n)).unwrap_or(month)
}

/// Sortable week key, e.g. `2024-W07`.
///
/// Uses the ISO year so that the days of one Monday–Sunday week share a
/// key even across a year boundary.
pub fn week_key(date: NaiveDate) -> String {
    format!("{:04}-W{:02}", date.iso_week().year(), iso_week(date))
}

/// Sortable month key, e.g. `2024-02`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
