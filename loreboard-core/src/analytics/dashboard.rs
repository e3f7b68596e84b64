//! Dashboard summary: everything the front page shows, built in one pass
//! over a [`LoreSnapshot`].

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use serde::Serialize;

use super::series::{
    self, build_series, daily_activity, project_activity, ActivityPoint, Granularity,
    ProjectActivity, TimeSeries,
};
use super::calendar::parse_timestamp;
use super::terrain::{build_terrain, TerrainGrid};
use crate::config::DashboardConfig;
use crate::db::LoreSnapshot;
use crate::types::{Commit, Dated, LoreCounts, PersonalType, Task};

/// One row of the recent activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActivityItem {
    Commit {
        date: String,
        /// First line of the commit message
        message: String,
        sha: String,
        project: String,
        insertions: u64,
        deletions: u64,
    },
    Task {
        date: String,
        title: String,
        project: Option<String>,
        status: String,
    },
    Capture {
        date: String,
        title: String,
    },
    Project {
        date: String,
        title: String,
        /// At most the first three tech tags
        tech: Vec<String>,
    },
    Personal {
        date: String,
        title: String,
        kind: PersonalType,
    },
    Exploration {
        date: String,
        title: String,
        project: String,
        status: String,
    },
    Blog {
        date: String,
        title: String,
        status: String,
    },
}

impl ActivityItem {
    pub fn date(&self) -> &str {
        match self {
            ActivityItem::Commit { date, .. }
            | ActivityItem::Task { date, .. }
            | ActivityItem::Capture { date, .. }
            | ActivityItem::Project { date, .. }
            | ActivityItem::Personal { date, .. }
            | ActivityItem::Exploration { date, .. }
            | ActivityItem::Blog { date, .. } => date,
        }
    }

    fn from_commit(c: &Commit) -> Self {
        ActivityItem::Commit {
            date: c.date.clone(),
            message: c.subject().to_string(),
            sha: c.short_sha().to_string(),
            project: c.project.clone(),
            insertions: c.stats.insertions,
            deletions: c.stats.deletions,
        }
    }

    fn from_task(t: &Task) -> Self {
        ActivityItem::Task {
            date: t.date.clone(),
            title: t.title.clone(),
            project: t.project.clone(),
            status: t.status.as_str().to_string(),
        }
    }
}

/// Capture titles are stored as "[type] text"; the feed shows the text.
fn strip_capture_prefix(title: &str) -> &str {
    title
        .strip_prefix('[')
        .and_then(|rest| rest.split_once("] "))
        .map_or(title, |(_, text)| text)
}

fn newest_first(
    mut items: Vec<(Option<DateTime<FixedOffset>>, ActivityItem)>,
    limit: usize,
) -> Vec<ActivityItem> {
    // None < Some, so reversing puts undated items last
    items.sort_by(|a, b| b.0.cmp(&a.0));
    items.truncate(limit);
    items.into_iter().map(|(_, item)| item).collect()
}

/// Most recent commits and tasks, newest first.
///
/// Tasks are ordered by their `date` field here, not `captured`. Items whose
/// date doesn't parse sort after everything else.
pub fn recent_activity(commits: &[Commit], tasks: &[Task], limit: usize) -> Vec<ActivityItem> {
    let items = commits
        .iter()
        .map(|c| (parse_timestamp(&c.date), ActivityItem::from_commit(c)))
        .chain(
            tasks
                .iter()
                .map(|t| (parse_timestamp(&t.date), ActivityItem::from_task(t))),
        )
        .collect();
    newest_first(items, limit)
}

/// Most recent items across every source, newest first.
///
/// Same ordering rules as [`recent_activity`], over all seven categories.
pub fn activity_feed(snapshot: &LoreSnapshot, limit: usize) -> Vec<ActivityItem> {
    let mut items: Vec<(Option<DateTime<FixedOffset>>, ActivityItem)> = Vec::new();

    items.extend(
        snapshot
            .commits
            .iter()
            .map(|c| (parse_timestamp(&c.date), ActivityItem::from_commit(c))),
    );
    items.extend(
        snapshot
            .tasks
            .iter()
            .map(|t| (parse_timestamp(&t.date), ActivityItem::from_task(t))),
    );
    items.extend(snapshot.captures.iter().map(|c| {
        (
            parse_timestamp(&c.date),
            ActivityItem::Capture {
                date: c.date.clone(),
                title: strip_capture_prefix(&c.title).to_string(),
            },
        )
    }));
    items.extend(snapshot.projects.iter().map(|p| {
        (
            parse_timestamp(&p.date),
            ActivityItem::Project {
                date: p.date.clone(),
                title: p.title.clone(),
                tech: p.tech.iter().take(3).cloned().collect(),
            },
        )
    }));
    items.extend(snapshot.personal.iter().map(|item| {
        (
            parse_timestamp(item.timestamp()),
            ActivityItem::Personal {
                date: item.timestamp().to_string(),
                title: item.label().to_string(),
                kind: item.kind(),
            },
        )
    }));
    items.extend(snapshot.explorations.iter().map(|e| {
        (
            parse_timestamp(&e.date),
            ActivityItem::Exploration {
                date: e.date.clone(),
                title: e.title.clone(),
                project: e.project.clone(),
                status: e.status.as_str().to_string(),
            },
        )
    }));
    items.extend(snapshot.blogs.iter().map(|b| {
        (
            parse_timestamp(&b.date),
            ActivityItem::Blog {
                date: b.date.clone(),
                title: b.title.clone(),
                status: b.status.as_str().to_string(),
            },
        )
    }));

    tracing::debug!(candidates = items.len(), limit, "Building activity feed");
    newest_first(items, limit)
}

/// Current and longest runs of non-zero days, oldest first in `counts`.
///
/// The current streak counts back from the last element.
pub fn calculate_streaks(counts: &[u64]) -> (u64, u64) {
    let mut longest = 0u64;
    let mut streak = 0u64;
    for &count in counts {
        if count > 0 {
            streak += 1;
            longest = longest.max(streak);
        } else {
            streak = 0;
        }
    }

    let current = counts.iter().rev().take_while(|&&c| c > 0).count() as u64;
    (current, longest)
}

/// Weekly series for each terrain source.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySeries {
    pub commits: TimeSeries,
    pub tasks: TimeSeries,
    pub personal: TimeSeries,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub today: NaiveDate,
    pub counts: LoreCounts,
    pub total_entries: u64,
    pub terrain: TerrainGrid,
    pub weekly: CategorySeries,
    pub monthly_commits: TimeSeries,
    pub top_projects: Vec<ProjectActivity>,
    pub daily: Vec<ActivityPoint>,
    pub current_streak: u64,
    pub longest_streak: u64,
    /// 0 = Sunday
    pub busiest_day: u8,
    pub recent: Vec<ActivityItem>,
}

impl DashboardSummary {
    /// Build the summary for `today` from a loaded snapshot.
    pub fn build(snapshot: &LoreSnapshot, config: &DashboardConfig, today: NaiveDate) -> Self {
        let weekly = CategorySeries {
            commits: build_series(&snapshot.commits, Granularity::Week, config.weeks, today),
            tasks: build_series(&snapshot.tasks, Granularity::Week, config.weeks, today),
            personal: build_series(&snapshot.personal, Granularity::Week, config.weeks, today),
        };

        let daily = daily_activity(&snapshot.commits, &snapshot.tasks, config.days, today);
        let day_counts: Vec<u64> = daily.iter().map(|p| p.value).collect();
        let (current_streak, longest_streak) = calculate_streaks(&day_counts);

        let summary = Self {
            today,
            counts: snapshot.counts,
            total_entries: snapshot.counts.total(),
            terrain: build_terrain(
                &snapshot.commits,
                &snapshot.tasks,
                &snapshot.personal,
                today.year(),
            ),
            weekly,
            monthly_commits: build_series(
                &snapshot.commits,
                Granularity::Month,
                config.months,
                today,
            ),
            top_projects: project_activity(
                &snapshot.commits,
                Granularity::Week,
                config.weeks,
                config.top_projects,
                today,
            ),
            busiest_day: series::busiest_weekday(&daily),
            daily,
            current_streak,
            longest_streak,
            recent: recent_activity(&snapshot.commits, &snapshot.tasks, config.recent_limit),
        };

        tracing::info!(
            %today,
            entries = summary.total_entries,
            terrain_total = summary.terrain.total(),
            projects = summary.top_projects.len(),
            "Built dashboard summary"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Blog, BlogStatus, Book, Capture, CommitAuthor, CommitStats, Exploration,
        ExplorationStatus, PersonalItem, Project, TaskStatus, TaskType,
    };

    fn commit(date: &str, project: &str, content: &str) -> Commit {
        Commit {
            sha: format!("{:0>12}", date.len()),
            date: date.to_string(),
            project: project.to_string(),
            author: CommitAuthor::default(),
            stats: CommitStats {
                files_changed: 1,
                insertions: 10,
                deletions: 2,
            },
            title: content.lines().next().unwrap_or_default().to_string(),
            content: content.to_string(),
        }
    }

    fn task(date: &str, captured: &str, title: &str) -> Task {
        Task {
            task_type: TaskType::Todo,
            id: title.to_string(),
            date: date.to_string(),
            captured: captured.to_string(),
            status: TaskStatus::Active,
            project: None,
            title: title.to_string(),
            content: String::new(),
        }
    }

    #[test]
    fn test_streaks() {
        assert_eq!(calculate_streaks(&[]), (0, 0));
        assert_eq!(calculate_streaks(&[0, 0, 0]), (0, 0));
        assert_eq!(calculate_streaks(&[1, 2, 0, 1, 1, 1, 0, 4, 5]), (2, 3));
        assert_eq!(calculate_streaks(&[1, 1, 1]), (3, 3));
    }

    #[test]
    fn test_recent_activity_merges_and_sorts() {
        let commits = vec![
            commit("2024-03-01T10:00:00Z", "alpha", "Add parser\n\nbody"),
            commit("2024-03-03T10:00:00Z", "beta", "Fix bug"),
        ];
        let tasks = vec![
            task("2024-03-02", "2024-03-02", "Write docs"),
            task("whenever", "2024-03-02", "Undated"),
        ];

        let items = recent_activity(&commits, &tasks, 10);
        let dates: Vec<_> = items.iter().map(|i| i.date()).collect();
        assert_eq!(
            dates,
            vec!["2024-03-03T10:00:00Z", "2024-03-02", "2024-03-01T10:00:00Z", "whenever"]
        );
        match &items[2] {
            ActivityItem::Commit { message, project, .. } => {
                assert_eq!(message, "Add parser");
                assert_eq!(project, "alpha");
            }
            other => panic!("expected commit, got {:?}", other),
        }

        assert_eq!(recent_activity(&commits, &tasks, 2).len(), 2);
    }

    #[test]
    fn test_activity_feed_covers_every_source() {
        let snapshot = LoreSnapshot {
            commits: vec![commit("2024-03-07T10:00:00Z", "alpha", "Ship it")],
            tasks: vec![task("2024-03-06", "2024-03-06", "Plan")],
            captures: vec![Capture {
                date: "2024-03-05T09:00:00Z".to_string(),
                title: "[idea] Terrain tooltips".to_string(),
                content: String::new(),
            }],
            projects: vec![Project {
                project: "loreboard".to_string(),
                description: String::new(),
                date: "2024-03-04".to_string(),
                tech: vec!["rust", "sqlite", "chrono", "serde"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                path: String::new(),
                title: "loreboard".to_string(),
                content: String::new(),
            }],
            personal: vec![PersonalItem::Book(Book {
                date: "2024-03-03".to_string(),
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                isbn: None,
                rating: 5.0,
                date_read: None,
                shelf: None,
            })],
            explorations: vec![Exploration {
                date: "2024-03-02".to_string(),
                status: ExplorationStatus::Active,
                purpose: String::new(),
                project: "alpha".to_string(),
                path: String::new(),
                title: "FTS ranking".to_string(),
                content: String::new(),
            }],
            blogs: vec![Blog {
                date: "2024-03-01".to_string(),
                topics: vec![],
                word_count: 900,
                url: String::new(),
                path: String::new(),
                status: BlogStatus::Draft,
                title: "Week notes".to_string(),
                content: String::new(),
            }],
            ..Default::default()
        };

        let feed = activity_feed(&snapshot, 10);
        let kinds: Vec<_> = feed
            .iter()
            .map(|item| match item {
                ActivityItem::Commit { .. } => "commit",
                ActivityItem::Task { .. } => "task",
                ActivityItem::Capture { .. } => "capture",
                ActivityItem::Project { .. } => "project",
                ActivityItem::Personal { .. } => "personal",
                ActivityItem::Exploration { .. } => "exploration",
                ActivityItem::Blog { .. } => "blog",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["commit", "task", "capture", "project", "personal", "exploration", "blog"]
        );

        match &feed[2] {
            ActivityItem::Capture { title, .. } => assert_eq!(title, "Terrain tooltips"),
            other => panic!("expected capture, got {:?}", other),
        }
        match &feed[3] {
            ActivityItem::Project { tech, .. } => assert_eq!(tech, &["rust", "sqlite", "chrono"]),
            other => panic!("expected project, got {:?}", other),
        }

        assert_eq!(activity_feed(&snapshot, 3).len(), 3);
    }

    #[test]
    fn test_capture_prefix() {
        assert_eq!(strip_capture_prefix("[note] buy milk"), "buy milk");
        assert_eq!(strip_capture_prefix("plain"), "plain");
        assert_eq!(strip_capture_prefix("[unclosed"), "[unclosed");
    }

    #[test]
    fn test_summary_from_snapshot() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let snapshot = LoreSnapshot {
            commits: vec![
                commit("2024-03-12T09:00:00Z", "alpha", "one"),
                commit("2024-03-13T09:00:00Z", "alpha", "two"),
                commit("2024-03-14T09:00:00Z", "beta", "three"),
            ],
            tasks: vec![task("2024-03-14", "2024-03-14T08:00:00Z", "plan")],
            counts: LoreCounts {
                commits: 3,
                tasks: 1,
                ..Default::default()
            },
            ..Default::default()
        };

        let summary = DashboardSummary::build(&snapshot, &DashboardConfig::default(), today);
        assert_eq!(summary.total_entries, 4);
        assert_eq!(summary.terrain.year, 2024);
        assert_eq!(summary.terrain.total(), 4);
        assert_eq!(summary.weekly.commits.len(), 12);
        assert_eq!(summary.weekly.commits.latest(), 3);
        assert_eq!(summary.weekly.tasks.latest(), 1);
        assert_eq!(summary.monthly_commits.latest(), 3);
        assert_eq!(summary.top_projects[0].project_name, "alpha");
        assert_eq!(summary.daily.len(), 90);
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.busiest_day, 4);
        assert_eq!(summary.recent.len(), 4);
    }
}
