//! Activity terrain: a dense 52×7 grid of per-day intensity for one year.
//!
//! Columns are ISO weeks 1..=52, rows are weekdays with 0 = Sunday. Every
//! one of the 364 cells always exists. Each cell keeps raw counts per source
//! and a value normalized against the busiest cell, which drives the height
//! and density of the 3D terrain.
//!
//! The grid is rebuilt from scratch on every call; there is no incremental
//! update path. Records from other years are dropped, not wrapped.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::calendar::{self, dated, DAYS_PER_WEEK, WEEKS_PER_YEAR};
use crate::config::TerrainConfig;
use crate::types::Dated;

/// One (week, weekday) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainCell {
    /// ISO week, 1..=52
    pub week: u32,
    /// Weekday, 0 = Sunday
    pub day: u32,
    /// `count / max count`, in [0, 1]
    pub value: f64,
    /// Total records in this cell
    pub count: u64,
    /// Canonical date for tooltips
    pub date: Option<NaiveDate>,
    pub commits: u64,
    pub tasks: u64,
    pub personal: u64,
}

/// 52 weeks × 7 days of [`TerrainCell`]s, outer by week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainGrid {
    pub year: i32,
    weeks: Vec<Vec<TerrainCell>>,
}

#[derive(Debug, Clone, Copy, Default)]
struct CellCounts {
    commits: u64,
    tasks: u64,
    personal: u64,
}

impl CellCounts {
    fn total(&self) -> u64 {
        self.commits + self.tasks + self.personal
    }
}

/// Grid position of `date` if it belongs to `year`.
fn cell_index(date: NaiveDate, year: i32) -> Option<(usize, usize)> {
    if date.year() != year {
        return None;
    }
    let week = calendar::iso_week(date) as usize;
    let day = calendar::day_of_week(date) as usize;
    Some((week - 1, day))
}

fn accumulate<R: Dated>(
    counts: &mut [[CellCounts; 7]],
    records: &[R],
    year: i32,
    field: fn(&mut CellCounts) -> &mut u64,
) -> u64 {
    let mut accepted = 0;
    for (_, date) in dated(records) {
        if let Some((week, day)) = cell_index(date, year) {
            *field(&mut counts[week][day]) += 1;
            accepted += 1;
        }
    }
    accepted
}

/// Build the terrain for `year` from commits, tasks and personal items.
///
/// Each record lands in the cell of its ISO week (clamped to 52) and
/// weekday. Dates in early January that belong to the previous ISO year
/// therefore land in week 52, and late-December dates that belong to the
/// next ISO year land in week 1, matching how the timestamps read on a
/// calendar for `year`.
pub fn build_terrain<C: Dated, T: Dated, P: Dated>(
    commits: &[C],
    tasks: &[T],
    personal: &[P],
    year: i32,
) -> TerrainGrid {
    let mut counts = vec![[CellCounts::default(); 7]; WEEKS_PER_YEAR as usize];

    let accepted = accumulate(&mut counts, commits, year, |c| &mut c.commits)
        + accumulate(&mut counts, tasks, year, |c| &mut c.tasks)
        + accumulate(&mut counts, personal, year, |c| &mut c.personal);

    let max_count = counts
        .iter()
        .flat_map(|week| week.iter())
        .map(CellCounts::total)
        .max()
        .unwrap_or(0)
        .max(1);

    let weeks = counts
        .iter()
        .enumerate()
        .map(|(week_idx, days)| {
            let week = week_idx as u32 + 1;
            days.iter()
                .enumerate()
                .map(|(day_idx, c)| {
                    let day = day_idx as u32;
                    let count = c.total();
                    TerrainCell {
                        week,
                        day,
                        value: count as f64 / max_count as f64,
                        count,
                        date: calendar::week_day_to_date(year, week, day),
                        commits: c.commits,
                        tasks: c.tasks,
                        personal: c.personal,
                    }
                })
                .collect()
        })
        .collect();

    tracing::debug!(
        year,
        records = accepted,
        max_count,
        "Built terrain grid"
    );

    TerrainGrid { year, weeks }
}

impl TerrainGrid {
    /// Columns, week 1 first.
    pub fn weeks(&self) -> &[Vec<TerrainCell>] {
        &self.weeks
    }

    /// Cell by ISO week (1..=52) and weekday (0 = Sunday).
    pub fn cell(&self, week: u32, day: u32) -> Option<&TerrainCell> {
        let week_idx = (week as usize).checked_sub(1)?;
        self.weeks.get(week_idx)?.get(day as usize)
    }

    /// All 364 cells, week-major.
    pub fn cells(&self) -> impl Iterator<Item = &TerrainCell> {
        self.weeks.iter().flat_map(|week| week.iter())
    }

    /// Highest raw count in the grid.
    pub fn max_count(&self) -> u64 {
        self.cells().map(|c| c.count).max().unwrap_or(0)
    }

    /// Sum of all cell counts.
    pub fn total(&self) -> u64 {
        self.cells().map(|c| c.count).sum()
    }

    /// Cells with `value` strictly above `threshold`.
    pub fn active_cells(&self, threshold: f64) -> impl Iterator<Item = &TerrainCell> {
        self.cells().filter(move |c| c.value > threshold)
    }

    /// Cell under a world position centred on the plane's origin.
    pub fn cell_at(&self, mapping: &PlaneMapping, x: f64, z: f64) -> Option<&TerrainCell> {
        let (week_idx, day_idx) = mapping.locate_centered(x, z)?;
        self.weeks.get(week_idx)?.get(day_idx)
    }
}

/// Linear mapping between the terrain plane and grid indices.
///
/// The week axis (x) spans `width`, the weekday axis (z) spans `depth`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneMapping {
    pub width: f64,
    pub depth: f64,
}

impl Default for PlaneMapping {
    fn default() -> Self {
        Self {
            width: 28.0,
            depth: 8.0,
        }
    }
}

impl From<&TerrainConfig> for PlaneMapping {
    fn from(config: &TerrainConfig) -> Self {
        Self {
            width: config.width,
            depth: config.depth,
        }
    }
}

/// Bin `pos` within `[0, extent)` into `bins` equal parts.
fn bin(pos: f64, extent: f64, bins: u32) -> Option<usize> {
    if !pos.is_finite() || pos < 0.0 || pos >= extent {
        return None;
    }
    let idx = (pos / extent * f64::from(bins)).floor();
    // Rounding at the top edge can still produce `bins`
    (idx < f64::from(bins)).then_some(idx as usize)
}

impl PlaneMapping {
    /// Grid indices `(week_idx 0..52, day_idx 0..7)` for a position measured
    /// from the plane's corner. `None` outside `[0, width) × [0, depth)`.
    pub fn locate(&self, x: f64, z: f64) -> Option<(usize, usize)> {
        let week_idx = bin(x, self.width, WEEKS_PER_YEAR)?;
        let day_idx = bin(z, self.depth, DAYS_PER_WEEK)?;
        Some((week_idx, day_idx))
    }

    /// Same as [`locate`](Self::locate) for a world position centred on the
    /// origin (x in `[-width/2, width/2)`).
    pub fn locate_centered(&self, x: f64, z: f64) -> Option<(usize, usize)> {
        self.locate(x + self.width / 2.0, z + self.depth / 2.0)
    }

    /// Centred world position at which a cell is drawn.
    ///
    /// The first and last columns sit on the plane's edges.
    pub fn cell_center(&self, week_idx: usize, day_idx: usize) -> (f64, f64) {
        let x = week_idx as f64 / f64::from(WEEKS_PER_YEAR - 1) * self.width - self.width / 2.0;
        let z = day_idx as f64 / f64::from(DAYS_PER_WEEK - 1) * self.depth - self.depth / 2.0;
        (x, z)
    }
}

/// Zero-based week column containing `today`, for scrolling the view.
pub fn current_week_index(today: NaiveDate) -> usize {
    calendar::iso_week(today) as usize - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rec(&'static str);

    impl Dated for Rec {
        fn timestamp(&self) -> &str {
            self.0
        }
    }

    const NONE: [Rec; 0] = [];

    #[test]
    fn test_grid_is_dense() {
        let grid = build_terrain(&NONE, &NONE, &NONE, 2024);
        assert_eq!(grid.weeks().len(), 52);
        assert!(grid.weeks().iter().all(|w| w.len() == 7));
        assert_eq!(grid.cells().count(), 364);

        for (w, week) in grid.weeks().iter().enumerate() {
            for (d, cell) in week.iter().enumerate() {
                assert_eq!(cell.week, w as u32 + 1);
                assert_eq!(cell.day, d as u32);
            }
        }
    }

    #[test]
    fn test_empty_year_is_all_zero() {
        let grid = build_terrain(&NONE, &NONE, &NONE, 2024);
        assert!(grid.cells().all(|c| c.count == 0 && c.value == 0.0));
        assert_eq!(grid.max_count(), 0);
        assert_eq!(grid.active_cells(0.0).count(), 0);
    }

    #[test]
    fn test_two_commits_same_tuesday() {
        let commits = [Rec("2024-01-02T09:00:00Z"), Rec("2024-01-02T17:30:00Z")];
        let grid = build_terrain(&commits, &NONE, &NONE, 2024);

        let cell = grid.cell(1, 2).unwrap();
        assert_eq!(cell.count, 2);
        assert_eq!(cell.commits, 2);
        assert_eq!(cell.value, 1.0);
        assert_eq!(cell.date, NaiveDate::from_ymd_opt(2024, 1, 2));

        let others = grid.cells().filter(|c| !(c.week == 1 && c.day == 2));
        assert!(others.into_iter().all(|c| c.value == 0.0));
    }

    #[test]
    fn test_breakdown_and_normalization() {
        let commits = [Rec("2024-03-05"), Rec("2024-03-05"), Rec("2024-03-06")];
        let tasks = [Rec("2024-03-05"), Rec("2024-07-01")];
        let personal = [Rec("2024-03-05"), Rec("2024-03-06")];
        let grid = build_terrain(&commits, &tasks, &personal, 2024);

        // 2024-03-05 is Tuesday of ISO week 10
        let busiest = grid.cell(10, 2).unwrap();
        assert_eq!((busiest.commits, busiest.tasks, busiest.personal), (2, 1, 1));
        assert_eq!(busiest.value, 1.0);

        let wednesday = grid.cell(10, 3).unwrap();
        assert_eq!(wednesday.count, 2);
        assert_eq!(wednesday.value, 0.5);

        assert!(grid.cells().all(|c| (0.0..=1.0).contains(&c.value)));
        assert_eq!(grid.total(), 7);
    }

    #[test]
    fn test_out_of_year_and_unparseable_are_excluded() {
        let commits = [Rec("2023-06-01"), Rec("2025-02-01"), Rec("garbage"), Rec(""), Rec("2024-06-01")];
        let grid = build_terrain(&commits, &NONE, &NONE, 2024);
        assert_eq!(grid.total(), 1);
    }

    #[test]
    fn test_year_edge_dates_use_clamped_iso_week() {
        // 2024-12-30 (Mon) is in ISO 2025-W01; 2021-01-01 (Fri) is in 2020-W53
        let grid = build_terrain(&[Rec("2024-12-30")], &NONE, &NONE, 2024);
        assert_eq!(grid.cell(1, 1).unwrap().count, 1);

        let grid = build_terrain(&[Rec("2021-01-01")], &NONE, &NONE, 2021);
        assert_eq!(grid.cell(52, 5).unwrap().count, 1);
    }

    #[test]
    fn test_build_is_deterministic() {
        let commits = [Rec("2024-04-01"), Rec("2024-04-02")];
        let tasks = [Rec("2024-04-01T12:00:00+02:00")];
        let a = build_terrain(&commits, &tasks, &NONE, 2024);
        let b = build_terrain(&commits, &tasks, &NONE, 2024);
        assert_eq!(a, b);
    }

    #[test]
    fn test_locate_bins_and_bounds() {
        let mapping = PlaneMapping::default();
        assert_eq!(mapping.locate(0.0, 0.0), Some((0, 0)));
        assert_eq!(mapping.locate(27.99, 7.99), Some((51, 6)));
        assert_eq!(mapping.locate(28.0, 1.0), None);
        assert_eq!(mapping.locate(1.0, 8.0), None);
        assert_eq!(mapping.locate(-0.01, 1.0), None);
        assert_eq!(mapping.locate(1.0, -0.01), None);
        assert_eq!(mapping.locate(f64::NAN, 1.0), None);

        // Each week bin is 28/52 wide
        let w = 28.0 / 52.0;
        assert_eq!(mapping.locate(w * 10.5, 0.0), Some((10, 0)));
    }

    #[test]
    fn test_locate_centered() {
        let mapping = PlaneMapping::default();
        assert_eq!(mapping.locate_centered(-14.0, -4.0), Some((0, 0)));
        assert_eq!(mapping.locate_centered(0.0, 0.0), Some((26, 3)));
        assert_eq!(mapping.locate_centered(14.0, 0.0), None);
    }

    #[test]
    fn test_cell_center_round_trips_interior_cells() {
        let mapping = PlaneMapping::default();
        assert_eq!(mapping.cell_center(0, 0), (-14.0, -4.0));
        for week_idx in 0..51 {
            for day_idx in 0..6 {
                let (x, z) = mapping.cell_center(week_idx, day_idx);
                assert_eq!(mapping.locate_centered(x, z), Some((week_idx, day_idx)));
            }
        }
    }

    #[test]
    fn test_cell_at_reverse_lookup() {
        let grid = build_terrain(&[Rec("2024-01-02")], &NONE, &NONE, 2024);
        let mapping = PlaneMapping::default();
        let (x, z) = mapping.cell_center(0, 2);
        let cell = grid.cell_at(&mapping, x, z).unwrap();
        assert_eq!((cell.week, cell.day, cell.count), (1, 2, 1));
        assert!(grid.cell_at(&mapping, 100.0, 0.0).is_none());
    }

    #[test]
    fn test_current_week_index() {
        assert_eq!(current_week_index(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()), 0);
        assert_eq!(current_week_index(NaiveDate::from_ymd_opt(2020, 12, 31).unwrap()), 51);
    }
}
