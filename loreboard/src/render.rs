//! Text, markdown and JSON output for each subcommand.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use loreboard_core::analytics::filters::TypeCount;
use loreboard_core::analytics::labels::{
    month_abbrev, month_boundaries, month_label_positions, month_labels, month_labels_for_range,
};
use loreboard_core::analytics::terrain::current_week_index;
use loreboard_core::analytics::{
    ActivityItem, ActivityPoint, ActivityWindow, DashboardSummary, Granularity, PlaneMapping,
    ProjectActivity, TerrainCell, TerrainGrid, TimeSeries,
};
use loreboard_core::format::{day_name, format_relative_timestamp, month_name};
use loreboard_core::{Commit, Dated, LoreEntry, PersonalItem, Project, Task, TaskStatus};
use serde::Serialize;

use crate::OutputFormat;

const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];
const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const DAY_ABBREVS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Settings shared by every renderer.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub format: OutputFormat,
    /// Reference instant for relative ages
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
    pub cluster_threshold: f64,
    pub mapping: PlaneMapping,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn shade(value: f64) -> char {
    if value <= 0.0 {
        return SHADES[0];
    }
    let idx = (value * (SHADES.len() - 1) as f64).ceil() as usize;
    SHADES[idx.clamp(1, SHADES.len() - 1)]
}

fn sparkline(counts: &[u64]) -> String {
    let max = counts.iter().copied().max().unwrap_or(0).max(1);
    counts
        .iter()
        .map(|&c| {
            if c == 0 {
                ' '
            } else {
                let idx = (c * (BARS.len() as u64 - 1)) / max;
                BARS[idx as usize]
            }
        })
        .collect()
}

/// Seven rows (Sunday first) of 52 shaded columns.
fn heatmap_rows(grid: &TerrainGrid) -> Vec<String> {
    (0..7)
        .map(|day| {
            let row: String = grid
                .weeks()
                .iter()
                .map(|week| week.get(day).map_or(' ', |c| shade(c.value)))
                .collect();
            format!("{} {}", DAY_ABBREVS[day], row)
        })
        .collect()
}

/// A '^' under this week's column, when the grid is for the current year.
fn current_week_marker(grid: &TerrainGrid, today: NaiveDate) -> Option<String> {
    (grid.year == today.year()).then(|| format!("    {}^", " ".repeat(current_week_index(today))))
}

/// Tick and label lines under a sparkline of `dates.len()` columns.
fn month_axis(dates: &[NaiveDate]) -> (String, String) {
    let width = dates.len();
    if width == 0 {
        return (String::new(), String::new());
    }
    let column = |x: f64| ((x * (width - 1) as f64).round() as usize).min(width - 1);

    let mut ticks = vec![' '; width];
    for x in month_boundaries(dates) {
        ticks[column(x)] = '|';
    }

    let mut labels = vec![' '; width];
    let mut next_free = 0;
    for label in month_label_positions(dates) {
        let start = column(label.x).saturating_sub(1).max(next_free);
        for (offset, ch) in label.month.chars().enumerate() {
            if let Some(slot) = labels.get_mut(start + offset) {
                *slot = ch;
            }
        }
        next_free = start + label.month.len() + 1;
    }

    (
        ticks.into_iter().collect::<String>().trim_end().to_string(),
        labels.into_iter().collect::<String>().trim_end().to_string(),
    )
}

fn short_date(date: NaiveDate) -> String {
    format!("{} {}", date.day(), month_abbrev(date.month()))
}

fn activity_line(item: &ActivityItem, now: DateTime<Utc>) -> String {
    let when = format_relative_timestamp(item.date(), now);
    match item {
        ActivityItem::Commit {
            message,
            sha,
            project,
            insertions,
            deletions,
            ..
        } => format!(
            "{:>8}  {} {} [{}] +{} -{}",
            when, sha, message, project, insertions, deletions
        ),
        ActivityItem::Task {
            title,
            project,
            status,
            ..
        } => format!(
            "{:>8}  [{}] {} ({})",
            when,
            status,
            title,
            project.as_deref().unwrap_or("No project")
        ),
        ActivityItem::Capture { title, .. } => format!("{:>8}  [capture] {}", when, title),
        ActivityItem::Project { title, tech, .. } => {
            format!("{:>8}  [project] {} ({})", when, title, tech.join(", "))
        }
        ActivityItem::Personal { title, kind, .. } => {
            format!("{:>8}  [{}] {}", when, kind.as_str(), title)
        }
        ActivityItem::Exploration {
            title,
            project,
            status,
            ..
        } => format!("{:>8}  [exploration] {} ({}, {})", when, title, project, status),
        ActivityItem::Blog { title, status, .. } => {
            let badge = if status == "published" { "LIVE" } else { "DRAFT" };
            format!("{:>8}  [blog] {} ({})", when, title, badge)
        }
    }
}

// ============================================
// summary
// ============================================

#[derive(Serialize)]
struct SummaryOutput<'a> {
    #[serde(flatten)]
    summary: &'a DashboardSummary,
    active_cells: usize,
}

pub fn summary(summary: &DashboardSummary, out: &Output) -> Result<()> {
    let active_cells = summary.terrain.active_cells(out.cluster_threshold).count();
    match out.format {
        OutputFormat::Json => print_json(&SummaryOutput {
            summary,
            active_cells,
        }),
        OutputFormat::Text => {
            print_summary_terminal(summary, active_cells, out);
            Ok(())
        }
        OutputFormat::Md => {
            print_summary_markdown(summary, active_cells, out);
            Ok(())
        }
    }
}

fn print_summary_terminal(summary: &DashboardSummary, active_cells: usize, out: &Output) {
    let title = format!("loreboard · {}", summary.today);
    println!();
    println!("╭{}╮", "─".repeat(60));
    println!("│{:^60}│", title);
    println!("╰{}╯", "─".repeat(60));
    println!();

    if summary.total_entries == 0 {
        println!("  No lore entries found.");
        println!();
        return;
    }

    let counts = &summary.counts;
    println!("SUMMARY");
    println!("   Commits:      {:>8}", counts.commits);
    println!("   Tasks:        {:>8}", counts.tasks);
    println!("   Personal:     {:>8}", counts.personal);
    println!("   Projects:     {:>8}", counts.projects);
    println!(
        "   Other:        {:>8}",
        counts.explorations + counts.blogs + counts.captures
    );
    println!();

    println!("TERRAIN {}", summary.terrain.year);
    for row in heatmap_rows(&summary.terrain) {
        println!("   {}", row);
    }
    if let Some(marker) = current_week_marker(&summary.terrain, out.today) {
        println!("   {}", marker);
    }
    println!("   Active cells: {}", active_cells);
    println!();

    println!("LAST {} WEEKS", summary.weekly.commits.len());
    let weekly = &summary.weekly;
    for (name, series) in [
        ("commits", &weekly.commits),
        ("tasks", &weekly.tasks),
        ("personal", &weekly.personal),
    ] {
        println!(
            "   {:<9} {}  {} this week",
            name,
            sparkline(&series.counts),
            series.latest()
        );
    }
    println!();

    println!("STREAKS");
    println!("   Current:      {:>5} days", summary.current_streak);
    println!("   Longest:      {:>5} days", summary.longest_streak);
    println!("   Busiest day:  {}", day_name(summary.busiest_day));
    println!();

    if !summary.top_projects.is_empty() {
        println!("TOP PROJECTS");
        for (i, project) in summary.top_projects.iter().enumerate() {
            println!(
                "   {}. {:<24} {:>5}  {}",
                i + 1,
                project.project_name,
                project.total,
                sparkline(&project.counts)
            );
        }
        println!();
    }

    if !summary.recent.is_empty() {
        println!("RECENT");
        for item in &summary.recent {
            println!("   {}", activity_line(item, out.now));
        }
        println!();
    }
}

fn print_summary_markdown(summary: &DashboardSummary, active_cells: usize, out: &Output) {
    println!("# Lore Dashboard: {}", summary.today);
    println!();

    if summary.total_entries == 0 {
        println!("*No lore entries found.*");
        return;
    }

    let counts = &summary.counts;
    println!("## Summary");
    println!();
    println!("| Category | Entries |");
    println!("|----------|---------|");
    println!("| Commits | {} |", counts.commits);
    println!("| Tasks | {} |", counts.tasks);
    println!("| Personal | {} |", counts.personal);
    println!("| Projects | {} |", counts.projects);
    println!("| Explorations | {} |", counts.explorations);
    println!("| Blogs | {} |", counts.blogs);
    println!("| Captures | {} |", counts.captures);
    println!();

    println!("## Streaks");
    println!();
    println!("- **Current streak:** {} days", summary.current_streak);
    println!("- **Longest streak:** {} days", summary.longest_streak);
    println!("- **Busiest day:** {}", day_name(summary.busiest_day));
    println!("- **Active terrain cells:** {}", active_cells);
    println!();

    if !summary.top_projects.is_empty() {
        println!("## Top Projects");
        println!();
        for (i, project) in summary.top_projects.iter().enumerate() {
            println!(
                "{}. **{}** - {} commits",
                i + 1,
                project.project_name,
                project.total
            );
        }
        println!();
    }

    if !summary.recent.is_empty() {
        println!("## Recent Activity");
        println!();
        for item in &summary.recent {
            println!("- {}", activity_line(item, out.now).trim_start());
        }
        println!();
    }

    println!("---");
    println!("*Generated by loreboard*");
}

// ============================================
// terrain
// ============================================

#[derive(Serialize)]
struct TerrainOutput<'a> {
    #[serde(flatten)]
    grid: &'a TerrainGrid,
    cluster_threshold: f64,
    active_cells: usize,
}

pub fn terrain(grid: &TerrainGrid, out: &Output) -> Result<()> {
    let active_cells = grid.active_cells(out.cluster_threshold).count();
    match out.format {
        OutputFormat::Json => print_json(&TerrainOutput {
            grid,
            cluster_threshold: out.cluster_threshold,
            active_cells,
        }),
        OutputFormat::Text => {
            println!(
                "Terrain {}  ({} entries, {} active cells)",
                grid.year,
                grid.total(),
                active_cells
            );
            for row in heatmap_rows(grid) {
                println!("{}", row);
            }
            if let Some(marker) = current_week_marker(grid, out.today) {
                println!("{}", marker);
            }
            Ok(())
        }
        OutputFormat::Md => {
            println!("## Terrain {}", grid.year);
            println!();
            println!("```");
            for row in heatmap_rows(grid) {
                println!("{}", row);
            }
            println!("```");
            println!();
            println!(
                "{} entries, busiest cell {}, {} active cells",
                grid.total(),
                grid.max_count(),
                active_cells
            );
            Ok(())
        }
    }
}

// ============================================
// series / projects
// ============================================

/// Row labels: "12 Feb" for weeks and days, "Mar" for months.
fn period_labels(series: &TimeSeries, today: NaiveDate) -> Vec<String> {
    match series.granularity {
        Granularity::Month => month_labels(series.len(), today)
            .into_iter()
            .map(str::to_string)
            .collect(),
        _ => series.period_dates.iter().map(|d| short_date(*d)).collect(),
    }
}

#[derive(Serialize)]
struct SeriesOutput<'a> {
    #[serde(flatten)]
    series: &'a TimeSeries,
    /// "2024-W07" or "2024-02" per period
    period_keys: Vec<String>,
}

pub fn series(label: &str, series: &TimeSeries, out: &Output) -> Result<()> {
    match out.format {
        OutputFormat::Json => print_json(&SeriesOutput {
            series,
            period_keys: series.period_keys(),
        }),
        OutputFormat::Text => {
            println!("{} ({} total)", label, series.total);
            for (period, count) in period_labels(series, out.today).iter().zip(&series.counts) {
                println!("  {:<8} {:>5}", period, count);
            }
            println!();
            println!("  {}", sparkline(&series.counts));
            if series.granularity != Granularity::Month {
                let (ticks, labels) = month_axis(&series.period_dates);
                println!("  {}", ticks);
                println!("  {}", labels);
            }
            Ok(())
        }
        OutputFormat::Md => {
            println!("| Period | {} |", label);
            println!("|--------|------|");
            for (date, count) in series.period_dates.iter().zip(&series.counts) {
                let period = match series.granularity {
                    Granularity::Month => format!("{} {}", month_name(date.month()), date.year()),
                    _ => format!("Week of {}", short_date(*date)),
                };
                println!("| {} | {} |", period, count);
            }
            Ok(())
        }
    }
}

pub fn projects(projects: &[ProjectActivity], out: &Output) -> Result<()> {
    match out.format {
        OutputFormat::Json => print_json(projects),
        OutputFormat::Text => {
            if projects.is_empty() {
                println!("No project activity in this window.");
            }
            for (i, project) in projects.iter().enumerate() {
                println!(
                    "{:>2}. {:<24} {:>5}  {}",
                    i + 1,
                    project.project_name,
                    project.total,
                    sparkline(&project.counts)
                );
            }
            Ok(())
        }
        OutputFormat::Md => {
            println!("| # | Project | Commits |");
            println!("|---|---------|---------|");
            for (i, project) in projects.iter().enumerate() {
                println!("| {} | {} | {} |", i + 1, project.project_name, project.total);
            }
            Ok(())
        }
    }
}

pub fn daily(points: &[ActivityPoint], window: &ActivityWindow, out: &Output) -> Result<()> {
    let visible = window.slice(points);
    match out.format {
        OutputFormat::Json => print_json(visible),
        OutputFormat::Text | OutputFormat::Md => {
            let (Some(first), Some(last)) = (visible.first(), visible.last()) else {
                println!("No days to show.");
                return Ok(());
            };
            let values: Vec<u64> = visible.iter().map(|p| p.value).collect();
            let commits: u64 = visible.iter().map(|p| p.commits).sum();
            let tasks: u64 = visible.iter().map(|p| p.tasks).sum();

            println!(
                "Daily activity {} to {}  ({})",
                first.date,
                last.date,
                month_labels_for_range(first.date, last.date).join(" · ")
            );
            println!("  {}", sparkline(&values));
            println!("  {} commits, {} tasks", commits, tasks);
            if window.max_offset() > 0 {
                println!(
                    "  {} of {} days back",
                    window.offset(),
                    window.max_offset()
                );
            }
            Ok(())
        }
    }
}

// ============================================
// browse lists
// ============================================

pub fn commits(commits: &[&Commit], projects: &[&str], out: &Output) -> Result<()> {
    match out.format {
        OutputFormat::Json => print_json(commits),
        OutputFormat::Text => {
            for commit in commits {
                println!(
                    "{:>8}  {} {} [{}] +{} -{}",
                    format_relative_timestamp(&commit.date, out.now),
                    commit.short_sha(),
                    commit.subject(),
                    commit.project,
                    commit.stats.insertions,
                    commit.stats.deletions
                );
            }
            println!("{} commit(s); projects: {}", commits.len(), projects.join(", "));
            Ok(())
        }
        OutputFormat::Md => {
            println!("| When | Commit | Project | +/- |");
            println!("|------|--------|---------|-----|");
            for commit in commits {
                println!(
                    "| {} | `{}` {} | {} | +{}/-{} |",
                    format_relative_timestamp(&commit.date, out.now),
                    commit.short_sha(),
                    commit.subject(),
                    commit.project,
                    commit.stats.insertions,
                    commit.stats.deletions
                );
            }
            Ok(())
        }
    }
}

pub fn tasks(tasks: &[&Task], statuses: &[TaskStatus], out: &Output) -> Result<()> {
    match out.format {
        OutputFormat::Json => print_json(tasks),
        OutputFormat::Text | OutputFormat::Md => {
            let bullet = if out.format == OutputFormat::Md { "- " } else { "" };
            for task in tasks {
                println!(
                    "{}{:>8}  [{}] {} ({})",
                    bullet,
                    format_relative_timestamp(&task.captured, out.now),
                    task.status.as_str(),
                    task.title,
                    task.project.as_deref().unwrap_or("No project")
                );
            }
            let statuses: Vec<&str> = statuses.iter().map(TaskStatus::as_str).collect();
            println!("{} task(s); statuses: {}", tasks.len(), statuses.join(", "));
            Ok(())
        }
    }
}

pub fn personal(counts: &[TypeCount], items: &[&PersonalItem], out: &Output) -> Result<()> {
    match out.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "counts": counts,
            "items": items,
        })),
        OutputFormat::Text | OutputFormat::Md => {
            let tabs: Vec<String> = counts
                .iter()
                .map(|tc| format!("{} ({})", tc.kind.plural_label(), tc.count))
                .collect();
            println!("{}", tabs.join("  "));
            println!();
            for item in items {
                println!(
                    "  {:<10}  [{}] {}",
                    item.timestamp(),
                    item.kind().as_str(),
                    item.label()
                );
            }
            Ok(())
        }
    }
}

pub fn project_list(projects: &[&Project], techs: &[&str], out: &Output) -> Result<()> {
    match out.format {
        OutputFormat::Json => print_json(projects),
        OutputFormat::Text | OutputFormat::Md => {
            for project in projects {
                println!(
                    "  {:<24} {:<10}  {}",
                    project.project,
                    project.date,
                    project.tech.join(", ")
                );
            }
            println!("{} project(s); tech: {}", projects.len(), techs.join(", "));
            Ok(())
        }
    }
}

pub fn feed(items: &[ActivityItem], out: &Output) -> Result<()> {
    match out.format {
        OutputFormat::Json => print_json(items),
        OutputFormat::Text => {
            for item in items {
                println!("{}", activity_line(item, out.now));
            }
            Ok(())
        }
        OutputFormat::Md => {
            for item in items {
                println!("- {}", activity_line(item, out.now).trim_start());
            }
            Ok(())
        }
    }
}

// ============================================
// search / locate
// ============================================

pub fn entries(entries: &[LoreEntry], out: &Output) -> Result<()> {
    match out.format {
        OutputFormat::Json => print_json(entries),
        OutputFormat::Text => {
            for entry in entries {
                println!("[{}] {}", entry.source, entry.title);
            }
            println!("{} result(s)", entries.len());
            Ok(())
        }
        OutputFormat::Md => {
            for entry in entries {
                println!("- **{}** ({})", entry.title, entry.source);
            }
            Ok(())
        }
    }
}

pub fn located(cell: Option<&TerrainCell>, out: &Output) -> Result<()> {
    if out.format == OutputFormat::Json {
        return print_json(&cell);
    }

    let Some(cell) = cell else {
        println!("Outside the terrain");
        return Ok(());
    };

    let date = cell
        .date
        .map(short_date)
        .unwrap_or_else(|| "no date".to_string());
    let (x, z) = out
        .mapping
        .cell_center(cell.week.saturating_sub(1) as usize, cell.day as usize);
    println!(
        "Week {}, {}: {} ({} commits, {} tasks, {} personal) at ({:.2}, {:.2})",
        cell.week,
        DAY_ABBREVS[cell.day as usize % 7],
        date,
        cell.commits,
        cell.tasks,
        cell.personal,
        x,
        z
    );
    Ok(())
}
