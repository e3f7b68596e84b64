//! loreboard - personal activity dashboard
//!
//! Reads a lore archive once and prints the dashboard aggregates (activity
//! terrain, trailing series, project rankings, recent activity) or one of the
//! filtered browse lists.

mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use loreboard_core::analytics::filters::{self, ProjectFilter};
use loreboard_core::analytics::{
    activity_feed, build_series, build_terrain, daily_activity, project_activity, ActivityWindow,
    CommitFilter, DashboardSummary, DateRange, Granularity, PlaneMapping, TaskFilter,
};
use loreboard_core::format::end_of_day;
use loreboard_core::{Config, LoreSource, LoreStore, PersonalType, TaskStatus};

use crate::render::Output;

#[derive(Parser, Debug)]
#[command(name = "loreboard")]
#[command(about = "Personal activity dashboard over your lore archive")]
#[command(version)]
struct Args {
    /// Path to lore.db (default: [store] path from config, then ~/.local/share/lore/lore.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD); relative ages count from its last second
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Md,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SeriesSource {
    Commits,
    Tasks,
    Personal,
}

#[derive(Subcommand, Debug)]
enum ProjectsView {
    /// Development projects, optionally narrowed by tech
    List {
        /// Keep projects using any of these (repeatable)
        #[arg(long)]
        tech: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Counts, streaks, top projects and recent activity (default)
    Summary,

    /// The 52×7 activity terrain for a year
    Terrain {
        /// Year to show (default: the current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Trailing weekly or monthly counts for one source
    Series {
        #[arg(long, value_enum, default_value_t = SeriesSource::Commits)]
        source: SeriesSource,

        /// Number of weeks (default from config)
        #[arg(long, conflicts_with = "months")]
        weeks: Option<usize>,

        /// Use monthly buckets over this many months
        #[arg(long)]
        months: Option<usize>,
    },

    /// Most active projects by commit count
    Projects {
        /// How many projects to list
        #[arg(long)]
        top: Option<usize>,

        /// Trailing window in weeks
        #[arg(long)]
        weeks: Option<usize>,

        #[command(subcommand)]
        view: Option<ProjectsView>,
    },

    /// Commits, newest first
    Commits {
        /// Only this project
        #[arg(long)]
        project: Option<String>,

        /// week, month or all
        #[arg(long, default_value = "all")]
        range: DateRange,
    },

    /// Tasks, most recently captured first
    Tasks {
        /// Keep these statuses (repeatable; default: all)
        #[arg(long = "status")]
        statuses: Vec<TaskStatus>,

        /// Only this project
        #[arg(long, conflicts_with = "no_project")]
        project: Option<String>,

        /// Only tasks without a project
        #[arg(long)]
        no_project: bool,
    },

    /// Books, movies, podcasts, interests and habits with per-type counts
    Personal {
        /// interest, book, movie, podcast or habit
        #[arg(long = "type")]
        kind: Option<PersonalType>,
    },

    /// Recent items across every source
    Feed {
        /// Number of items (default from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Daily commits and tasks, one page at a time
    Daily {
        /// Days of history to load (default from config)
        #[arg(long)]
        days: Option<usize>,

        /// Days per page
        #[arg(long, default_value_t = 30)]
        window: usize,

        /// Pages back from the newest
        #[arg(long, default_value_t = 0)]
        back: usize,
    },

    /// Full-text search across the archive
    Search {
        /// FTS5 query
        query: String,

        /// Restrict to one source (commits, tasks, personal, ...)
        #[arg(long)]
        source: Option<LoreSource>,
    },

    /// Which terrain cell sits under a world position (x, z centred on the plane)
    Locate {
        #[arg(allow_negative_numbers = true)]
        x: f64,

        #[arg(allow_negative_numbers = true)]
        z: f64,

        #[arg(long)]
        year: Option<i32>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = loreboard_core::logging::init(&config.logging).ok();

    let db_path = args.db.clone().unwrap_or_else(|| config.store_path());
    let store = LoreStore::open(&db_path)
        .with_context(|| format!("failed to open lore database at {}", db_path.display()))?;

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let now = args.today.map(end_of_day).unwrap_or_else(Utc::now);
    tracing::debug!(%today, %now, db = %db_path.display(), "Starting loreboard");

    let out = Output {
        format: args.format,
        now,
        today,
        cluster_threshold: config.terrain.cluster_threshold,
        mapping: PlaneMapping::from(&config.terrain),
    };

    match args.command.unwrap_or(Command::Summary) {
        Command::Summary => {
            let snapshot = store.snapshot().context("failed to load records")?;
            let summary = DashboardSummary::build(&snapshot, &config.dashboard, today);
            render::summary(&summary, &out)?;
        }
        Command::Terrain { year } => {
            let snapshot = store.snapshot().context("failed to load records")?;
            let year = year.unwrap_or(today.year());
            let grid = build_terrain(&snapshot.commits, &snapshot.tasks, &snapshot.personal, year);
            render::terrain(&grid, &out)?;
        }
        Command::Series {
            source,
            weeks,
            months,
        } => {
            let (granularity, len) = match months {
                Some(months) => (Granularity::Month, months),
                None => (Granularity::Week, weeks.unwrap_or(config.dashboard.weeks)),
            };
            if len == 0 {
                anyhow::bail!("window length must be at least 1");
            }
            let series = match source {
                SeriesSource::Commits => build_series(&store.commits()?, granularity, len, today),
                SeriesSource::Tasks => build_series(&store.tasks()?, granularity, len, today),
                SeriesSource::Personal => {
                    build_series(&store.personal_items()?, granularity, len, today)
                }
            };
            render::series(source_label(source), &series, &out)?;
        }
        Command::Projects {
            view: Some(ProjectsView::List { tech }),
            ..
        } => {
            let projects = store.projects()?;
            let listed = filters::filter_by_tech(&projects, &tech);
            render::project_list(&listed, &filters::all_techs(&projects), &out)?;
        }
        Command::Projects {
            top,
            weeks,
            view: None,
        } => {
            let weeks = weeks.unwrap_or(config.dashboard.weeks);
            if weeks == 0 {
                anyhow::bail!("window length must be at least 1");
            }
            let top = top.unwrap_or(config.dashboard.top_projects);
            let projects =
                project_activity(&store.commits()?, Granularity::Week, weeks, top, today);
            render::projects(&projects, &out)?;
        }
        Command::Commits { project, range } => {
            let commits = store.commits()?;
            let filter = CommitFilter { project, range };
            let listed = filter.apply(&commits, now);
            tracing::debug!(range = %filter.range, matched = listed.len(), "Filtered commits");
            render::commits(&listed, &filters::commit_projects(&commits), &out)?;
        }
        Command::Tasks {
            statuses,
            project,
            no_project,
        } => {
            let tasks = store.tasks()?;
            let project = match (project, no_project) {
                (Some(name), _) => ProjectFilter::Named(name),
                (None, true) => ProjectFilter::Unassigned,
                (None, false) => ProjectFilter::Any,
            };
            let filter = TaskFilter { statuses, project };
            let listed = filter.apply(&tasks);
            render::tasks(&listed, &filters::available_statuses(&tasks), &out)?;
        }
        Command::Personal { kind } => {
            let items = store.personal_items()?;
            let counts = filters::personal_type_counts(&items);
            render::personal(&counts, &filters::filter_personal(&items, kind), &out)?;
        }
        Command::Feed { limit } => {
            let snapshot = store.snapshot().context("failed to load records")?;
            let items = activity_feed(&snapshot, limit.unwrap_or(config.dashboard.recent_limit));
            render::feed(&items, &out)?;
        }
        Command::Daily { days, window, back } => {
            let days = days.unwrap_or(config.dashboard.days);
            if days == 0 || window == 0 {
                anyhow::bail!("window length must be at least 1");
            }
            let points = daily_activity(&store.commits()?, &store.tasks()?, days, today);
            let mut view = ActivityWindow::new(points.len(), window);
            view.back(back.saturating_mul(window));
            render::daily(&points, &view, &out)?;
        }
        Command::Search { query, source } => {
            let entries = store
                .search(&query, source)
                .with_context(|| format!("search for '{}' failed", query))?;
            render::entries(&entries, &out)?;
        }
        Command::Locate { x, z, year } => {
            let snapshot = store.snapshot().context("failed to load records")?;
            let year = year.unwrap_or(today.year());
            let grid = build_terrain(&snapshot.commits, &snapshot.tasks, &snapshot.personal, year);
            render::located(grid.cell_at(&out.mapping, x, z), &out)?;
        }
    }

    Ok(())
}

fn source_label(source: SeriesSource) -> &'static str {
    match source {
        SeriesSource::Commits => "commits",
        SeriesSource::Tasks => "tasks",
        SeriesSource::Personal => "personal",
    }
}
