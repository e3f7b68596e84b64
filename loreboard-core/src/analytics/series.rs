//! Time-series aggregation.
//!
//! Buckets timestamped records into a trailing window of days, weeks or
//! months ending at the period that contains "now". The window always has
//! exactly the requested number of buckets; periods without records are
//! zero. "now" is a parameter so callers (and tests) control it.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use super::calendar::{self, dated};
use crate::types::{Dated, ProjectScoped};

/// Bucket size for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    /// Monday–Sunday ISO week
    Week,
    /// Calendar month
    Month,
}

impl Granularity {
    /// First day of the period containing `date`.
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => calendar::week_start(date),
            Granularity::Month => calendar::month_start(date),
        }
    }

    /// Start of the period `n` periods before the one starting at `start`.
    fn periods_before(self, start: NaiveDate, n: u32) -> NaiveDate {
        match self {
            Granularity::Day => start - chrono::Days::new(u64::from(n)),
            Granularity::Week => start - chrono::Days::new(7 * u64::from(n)),
            Granularity::Month => calendar::months_before(start, n),
        }
    }

    /// Stable string key for the period containing `date`.
    pub fn key(self, date: NaiveDate) -> String {
        match self {
            Granularity::Day => date.format("%Y-%m-%d").to_string(),
            Granularity::Week => calendar::week_key(date),
            Granularity::Month => calendar::month_key(date),
        }
    }
}

/// Period start dates for a trailing window, oldest first.
///
/// The last entry is the start of the period containing `now`.
pub fn window_starts(granularity: Granularity, len: usize, now: NaiveDate) -> Vec<NaiveDate> {
    let current = granularity.period_start(now);
    (0..len)
        .rev()
        .map(|back| granularity.periods_before(current, back as u32))
        .collect()
}

/// Counts per period over a trailing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    pub granularity: Granularity,
    /// One count per period, oldest first
    pub counts: Vec<u64>,
    /// Start date of each period (axis labels)
    pub period_dates: Vec<NaiveDate>,
    /// Sum of `counts`
    pub total: u64,
}

impl TimeSeries {
    /// A zero-filled series.
    pub fn empty(granularity: Granularity, len: usize, now: NaiveDate) -> Self {
        Self {
            granularity,
            counts: vec![0; len],
            period_dates: window_starts(granularity, len, now),
            total: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Bucket keys matching `period_dates`.
    pub fn period_keys(&self) -> Vec<String> {
        self.period_dates
            .iter()
            .map(|date| self.granularity.key(*date))
            .collect()
    }

    /// Count for the most recent period.
    pub fn latest(&self) -> u64 {
        self.counts.last().copied().unwrap_or(0)
    }

    /// Index of the bucket holding `date`, if it falls inside the window.
    pub fn bucket_of(&self, date: NaiveDate) -> Option<usize> {
        let start = self.granularity.period_start(date);
        self.period_dates.binary_search(&start).ok()
    }

    fn add(&mut self, date: NaiveDate) {
        if let Some(idx) = self.bucket_of(date) {
            self.counts[idx] += 1;
            self.total += 1;
        }
    }
}

/// Bucket `records` into a trailing window of `len` periods ending at `now`.
///
/// Records outside the window, or with unparseable timestamps, are ignored.
pub fn build_series<R: Dated>(
    records: &[R],
    granularity: Granularity,
    len: usize,
    now: NaiveDate,
) -> TimeSeries {
    let mut series = TimeSeries::empty(granularity, len, now);
    for (_, date) in dated(records) {
        series.add(date);
    }
    series
}

/// Per-project series for the project activity cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectActivity {
    pub project_name: String,
    pub counts: Vec<u64>,
    pub period_dates: Vec<NaiveDate>,
    pub total: u64,
}

/// Top `top_n` projects by in-window activity.
///
/// Records are grouped by project before bucketing; records without a
/// project are skipped. Projects with no activity inside the window are
/// dropped. Ordering is by total descending; ties keep the order in which
/// each project first appears in `records`.
pub fn project_activity<R: ProjectScoped>(
    records: &[R],
    granularity: Granularity,
    len: usize,
    top_n: usize,
    now: NaiveDate,
) -> Vec<ProjectActivity> {
    let template = TimeSeries::empty(granularity, len, now);
    let mut order: Vec<(String, TimeSeries)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(project) = record.project() else {
            continue;
        };
        let slot = match index.get(project) {
            Some(&slot) => slot,
            None => {
                index.insert(project.to_string(), order.len());
                order.push((project.to_string(), template.clone()));
                order.len() - 1
            }
        };
        if let Some(date) = calendar::parse_date(record.timestamp()) {
            order[slot].1.add(date);
        }
    }

    let mut projects: Vec<ProjectActivity> = order
        .into_iter()
        .filter(|(_, series)| series.total > 0)
        .map(|(project_name, series)| ProjectActivity {
            project_name,
            counts: series.counts,
            period_dates: series.period_dates,
            total: series.total,
        })
        .collect();

    // sort_by is stable, which gives the first-appearance tie-break
    projects.sort_by(|a, b| b.total.cmp(&a.total));
    projects.truncate(top_n);

    tracing::debug!(
        projects = projects.len(),
        top_n,
        ?granularity,
        "Computed project activity"
    );
    projects
}

/// One day of the combined commits/tasks chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityPoint {
    pub date: NaiveDate,
    pub commits: u64,
    pub tasks: u64,
    /// commits + tasks
    pub value: u64,
}

/// Daily commits and tasks over the last `days` days ending at `now`.
pub fn daily_activity<C: Dated, T: Dated>(
    commits: &[C],
    tasks: &[T],
    days: usize,
    now: NaiveDate,
) -> Vec<ActivityPoint> {
    let commit_series = build_series(commits, Granularity::Day, days, now);
    let task_series = build_series(tasks, Granularity::Day, days, now);

    commit_series
        .period_dates
        .iter()
        .zip(commit_series.counts.iter().zip(task_series.counts.iter()))
        .map(|(&date, (&commits, &tasks))| ActivityPoint {
            date,
            commits,
            tasks,
            value: commits + tasks,
        })
        .collect()
}

/// Index of the busiest weekday (0 = Sunday) across a daily series.
///
/// Ties go to the earliest weekday; an all-zero series reports Monday.
pub fn busiest_weekday(points: &[ActivityPoint]) -> u8 {
    let mut totals = [0u64; 7];
    for point in points {
        totals[calendar::day_of_week(point.date) as usize] += point.value;
    }
    if totals.iter().all(|&t| t == 0) {
        return 1;
    }
    let mut best = 0;
    for (day, &total) in totals.iter().enumerate() {
        if total > totals[best] {
            best = day;
        }
    }
    best as u8
}

/// A pageable view over a long daily series.
///
/// `offset` counts periods back from the newest point; 0 shows the most
/// recent `window_len` points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    len: usize,
    window_len: usize,
    offset: usize,
}

impl ActivityWindow {
    pub fn new(len: usize, window_len: usize) -> Self {
        Self {
            len,
            window_len,
            offset: 0,
        }
    }

    /// Furthest the window can move back.
    pub fn max_offset(&self) -> usize {
        self.len.saturating_sub(self.window_len)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move back in time, clamped to the start of the data.
    pub fn back(&mut self, step: usize) {
        self.offset = (self.offset + step).min(self.max_offset());
    }

    /// Index range of the visible points.
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.len.saturating_sub(self.window_len + self.offset);
        let end = (start + self.window_len).min(self.len);
        start..end
    }

    /// The visible slice of `data`.
    pub fn slice<'a, T>(&self, data: &'a [T]) -> &'a [T] {
        let range = self.range();
        let end = range.end.min(data.len());
        &data[range.start.min(end)..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dated, ProjectScoped};

    #[derive(Debug)]
    struct Rec {
        date: String,
        project: Option<String>,
    }

    impl Dated for Rec {
        fn timestamp(&self) -> &str {
            &self.date
        }
    }

    impl ProjectScoped for Rec {
        fn project(&self) -> Option<&str> {
            self.project.as_deref()
        }
    }

    fn rec(date: &str) -> Rec {
        Rec {
            date: date.to_string(),
            project: None,
        }
    }

    fn proj(date: &str, project: &str) -> Rec {
        Rec {
            date: date.to_string(),
            project: Some(project.to_string()),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_window_starts_weeks() {
        // 2024-03-14 is a Thursday; its week starts Monday 03-11
        let starts = window_starts(Granularity::Week, 3, d(2024, 3, 14));
        assert_eq!(starts, vec![d(2024, 2, 26), d(2024, 3, 4), d(2024, 3, 11)]);
    }

    #[test]
    fn test_window_starts_months_cross_year() {
        let starts = window_starts(Granularity::Month, 4, d(2024, 2, 10));
        assert_eq!(
            starts,
            vec![d(2023, 11, 1), d(2023, 12, 1), d(2024, 1, 1), d(2024, 2, 1)]
        );
    }

    #[test]
    fn test_series_length_is_fixed() {
        let now = d(2024, 6, 15);
        let empty: Vec<Rec> = Vec::new();
        assert_eq!(build_series(&empty, Granularity::Week, 12, now).len(), 12);

        let many: Vec<Rec> = (0..10_000)
            .map(|i| rec(&(d(2020, 1, 1) + chrono::Days::new(i % 2000)).to_string()))
            .collect();
        let series = build_series(&many, Granularity::Month, 12, now);
        assert_eq!(series.counts.len(), 12);
        assert_eq!(series.period_dates.len(), 12);
        assert_eq!(series.total, series.counts.iter().sum::<u64>());
    }

    #[test]
    fn test_series_counts_and_exclusions() {
        let now = d(2024, 3, 14);
        let records = vec![
            rec("2024-03-11T08:00:00Z"),
            rec("2024-03-17"),
            rec("2024-03-04"),
            rec("2024-01-01"), // before the window
            rec("2024-03-18"), // after now's week
            rec("not a date"),
        ];
        let series = build_series(&records, Granularity::Week, 3, now);
        assert_eq!(series.counts, vec![0, 1, 2]);
        assert_eq!(series.total, 3);
        assert_eq!(series.latest(), 2);
    }

    #[test]
    fn test_monthly_series() {
        let now = d(2024, 2, 10);
        let records = vec![rec("2023-12-31"), rec("2024-01-15"), rec("2024-02-29"), rec("2023-10-31")];
        let series = build_series(&records, Granularity::Month, 3, now);
        assert_eq!(series.counts, vec![1, 1, 1]);
        assert_eq!(series.period_keys(), vec!["2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_project_activity_orders_by_total() {
        let now = d(2024, 3, 14);
        let mut records = Vec::new();
        for _ in 0..3 {
            records.push(proj("2024-02-27", "beta"));
        }
        for _ in 0..5 {
            records.push(proj("2024-03-12", "alpha"));
        }

        let projects = project_activity(&records, Granularity::Week, 4, 2, now);
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].project_name, "alpha");
        assert_eq!(projects[0].counts, vec![0, 0, 0, 5]);
        assert_eq!(projects[0].total, 5);
        assert_eq!(projects[1].project_name, "beta");
        assert_eq!(projects[1].counts, vec![0, 3, 0, 0]);
        assert_eq!(projects[1].counts.iter().sum::<u64>(), 3);
    }

    #[test]
    fn test_project_activity_ties_keep_input_order() {
        let now = d(2024, 3, 14);
        let records = vec![
            proj("2024-03-12", "zeta"),
            proj("2024-03-12", "alpha"),
            proj("2024-03-12", "mid"),
            proj("2024-03-12", "mid"),
        ];
        let names: Vec<_> = project_activity(&records, Granularity::Week, 4, 3, now)
            .into_iter()
            .map(|p| p.project_name)
            .collect();
        assert_eq!(names, vec!["mid", "zeta", "alpha"]);
    }

    #[test]
    fn test_project_activity_truncates_and_drops_idle() {
        let now = d(2024, 3, 14);
        let records = vec![
            proj("2024-03-12", "a"),
            proj("2024-03-12", "b"),
            proj("2024-03-12", "c"),
            proj("2020-01-01", "old"),
            rec("2024-03-12"),
        ];
        let projects = project_activity(&records, Granularity::Week, 4, 2, now);
        assert_eq!(projects.len(), 2);
        assert!(projects.iter().all(|p| p.project_name != "old"));
    }

    #[test]
    fn test_daily_activity_zips_sources() {
        let now = d(2024, 3, 14);
        let commits = vec![rec("2024-03-14"), rec("2024-03-14"), rec("2024-03-12")];
        let tasks = vec![rec("2024-03-13"), rec("2024-03-14")];
        let points = daily_activity(&commits, &tasks, 3, now);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, d(2024, 3, 12));
        assert_eq!((points[0].commits, points[0].tasks), (1, 0));
        assert_eq!((points[1].commits, points[1].tasks), (0, 1));
        assert_eq!(points[2].value, 3);
    }

    #[test]
    fn test_busiest_weekday() {
        let now = d(2024, 3, 14); // Thursday
        let commits = vec![rec("2024-03-14"), rec("2024-03-14"), rec("2024-03-12")];
        let empty: Vec<Rec> = Vec::new();
        let points = daily_activity(&commits, &empty, 7, now);
        assert_eq!(busiest_weekday(&points), 4);
        assert_eq!(busiest_weekday(&daily_activity(&empty, &empty, 7, now)), 1);
    }

    #[test]
    fn test_activity_window_paging() {
        let data: Vec<usize> = (0..100).collect();
        let mut window = ActivityWindow::new(data.len(), 30);
        assert_eq!(window.slice(&data).first(), Some(&70));
        assert_eq!(window.slice(&data).len(), 30);

        window.back(30);
        assert_eq!(window.range(), 40..70);

        window.back(100);
        assert_eq!(window.offset(), 70);
        assert_eq!(window.range(), 0..30);

        let short = ActivityWindow::new(10, 30);
        assert_eq!(short.max_offset(), 0);
        assert_eq!(short.range(), 0..10);
    }
}
