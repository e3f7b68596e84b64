//! Analytics module for loreboard
//!
//! Pure aggregation over record slices:
//! - [`calendar`] - ISO week / month / weekday bucketing
//! - [`series`] - trailing-window time series, per-project rankings, daily activity
//! - [`terrain`] - the 52×7 activity grid and its plane mapping
//! - [`labels`] - month labels and boundaries for series axes
//! - [`filters`] - list filters for the browse views
//! - [`dashboard`] - the combined front-page summary and activity feed
//!
//! Nothing in here reads the database or the clock. Records come in as
//! slices and "now" comes in as an argument, so every function is repeatable for
//! the same inputs.

pub mod calendar;
pub mod dashboard;
pub mod filters;
pub mod labels;
pub mod series;
pub mod terrain;

pub use calendar::{day_of_week, iso_week, month_key, parse_date, week_day_to_date, week_key};
pub use dashboard::{
    activity_feed, calculate_streaks, recent_activity, ActivityItem, DashboardSummary,
};
pub use filters::{CommitFilter, DateRange, ProjectFilter, TaskFilter};
pub use series::{
    build_series, daily_activity, project_activity, ActivityPoint, ActivityWindow, Granularity,
    ProjectActivity, TimeSeries,
};
pub use terrain::{build_terrain, PlaneMapping, TerrainCell, TerrainGrid};
