//! Month labels and grid lines for series axes.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::calendar;

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three-letter abbreviation for a 1-based month.
pub fn month_abbrev(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_ABBREVS.get(idx as usize))
        .copied()
        .unwrap_or("???")
}

/// The last `count` month abbreviations, ending with the month of `now`.
pub fn month_labels(count: usize, now: NaiveDate) -> Vec<&'static str> {
    let current = calendar::month_start(now);
    (0..count)
        .rev()
        .map(|back| month_abbrev(calendar::months_before(current, back as u32).month()))
        .collect()
}

/// One abbreviation per month from the month of `start` through `end`.
pub fn month_labels_for_range(start: NaiveDate, end: NaiveDate) -> Vec<&'static str> {
    let mut labels = Vec::new();
    let mut current = calendar::month_start(start);
    while current <= end {
        labels.push(month_abbrev(current.month()));
        match current.checked_add_months(chrono::Months::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }
    labels
}

/// Fractional x positions (`index / (len - 1)`) where the month changes.
///
/// Empty when there are fewer than two dates.
pub fn month_boundaries(dates: &[NaiveDate]) -> Vec<f64> {
    if dates.len() < 2 {
        return Vec::new();
    }
    let span = (dates.len() - 1) as f64;
    dates
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].month() != pair[1].month())
        .map(|(idx, _)| (idx + 1) as f64 / span)
        .collect()
}

/// A month label centred on that month's run of points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthLabel {
    pub month: &'static str,
    /// Position as a fraction of the axis, 0..=1
    pub x: f64,
}

/// Label each consecutive run of same-month dates at the run's centre.
pub fn month_label_positions(dates: &[NaiveDate]) -> Vec<MonthLabel> {
    let span = dates.len().saturating_sub(1).max(1) as f64;
    let mut labels = Vec::new();
    let mut run_start = 0;

    for idx in 1..=dates.len() {
        let run_ends = idx == dates.len() || dates[idx].month() != dates[run_start].month();
        if run_ends {
            let centre = (run_start + idx - 1) as f64 / 2.0;
            labels.push(MonthLabel {
                month: month_abbrev(dates[run_start].month()),
                x: centre / span,
            });
            run_start = idx;
        }
    }
    labels
}
