//! Filters for the browse views.
//!
//! Each list view narrows one category: commits by project and date range,
//! tasks by status and project, personal items by type, projects by tech.
//! Filters borrow from the snapshot and never reorder the input except where
//! noted.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::Serialize;

use super::calendar::parse_timestamp;
use crate::types::{
    Commit, PersonalItem, PersonalType, Project, ProjectScoped, Task, TaskStatus,
};

// ============================================
// Commits
// ============================================

/// How far back a commit list reaches from "now".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    #[default]
    All,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::Week => "week",
            DateRange::Month => "month",
            DateRange::All => "all",
        }
    }

    /// Earliest instant inside the range; `None` means unbounded.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateRange::Week => Some(now - Duration::days(7)),
            DateRange::Month => Some(now - Duration::days(30)),
            DateRange::All => None,
        }
    }

    /// Whether `raw` falls inside the range. Unparseable timestamps only
    /// match [`DateRange::All`].
    pub fn contains(self, raw: &str, now: DateTime<Utc>) -> bool {
        match self.cutoff(now) {
            None => true,
            Some(cutoff) => {
                parse_timestamp(raw).is_some_and(|ts| ts.with_timezone(&Utc) >= cutoff)
            }
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            "all" => Ok(DateRange::All),
            other => Err(format!("unknown date range: {} (expected week, month or all)", other)),
        }
    }
}

/// Commit list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitFilter {
    /// Exact project name; `None` keeps every project
    pub project: Option<String>,
    pub range: DateRange,
}

impl CommitFilter {
    pub fn matches(&self, commit: &Commit, now: DateTime<Utc>) -> bool {
        if let Some(project) = &self.project {
            if &commit.project != project {
                return false;
            }
        }
        self.range.contains(&commit.date, now)
    }

    /// Matching commits, newest first. Undated commits sort last.
    pub fn apply<'a>(&self, commits: &'a [Commit], now: DateTime<Utc>) -> Vec<&'a Commit> {
        newest_first(
            commits
                .iter()
                .filter(|c| self.matches(c, now))
                .map(|c| (parse_timestamp(&c.date), c)),
        )
    }
}

/// Distinct commit projects, sorted.
pub fn commit_projects(commits: &[Commit]) -> Vec<&str> {
    distinct_sorted(commits.iter().filter_map(|c| ProjectScoped::project(c)))
}

// ============================================
// Tasks
// ============================================

/// Order in which statuses are offered.
pub const STATUS_ORDER: [TaskStatus; 4] = [
    TaskStatus::Active,
    TaskStatus::Later,
    TaskStatus::Done,
    TaskStatus::Archived,
];

/// Which tasks to keep by project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProjectFilter {
    #[default]
    Any,
    /// Only tasks with no project
    Unassigned,
    Named(String),
}

impl ProjectFilter {
    fn matches(&self, project: Option<&str>) -> bool {
        match self {
            ProjectFilter::Any => true,
            ProjectFilter::Unassigned => project.is_none(),
            ProjectFilter::Named(name) => project == Some(name.as_str()),
        }
    }
}

/// Task list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Keep tasks in any of these statuses; empty keeps all
    pub statuses: Vec<TaskStatus>,
    pub project: ProjectFilter,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&task.status))
            && self.project.matches(ProjectScoped::project(task))
    }

    /// Matching tasks, most recently captured first.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        newest_first(
            tasks
                .iter()
                .filter(|t| self.matches(t))
                .map(|t| (parse_timestamp(&t.captured), t)),
        )
    }
}

/// Statuses present in `tasks`, in [`STATUS_ORDER`].
pub fn available_statuses(tasks: &[Task]) -> Vec<TaskStatus> {
    STATUS_ORDER
        .into_iter()
        .filter(|status| tasks.iter().any(|t| t.status == *status))
        .collect()
}

/// Distinct task projects, sorted.
pub fn task_projects(tasks: &[Task]) -> Vec<&str> {
    distinct_sorted(tasks.iter().filter_map(|t| ProjectScoped::project(t)))
}

// ============================================
// Personal items
// ============================================

/// Items of one personal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub kind: PersonalType,
    pub count: usize,
}

/// Per-type counts for the types that have items, in [`PersonalType::ALL`] order.
pub fn personal_type_counts(items: &[PersonalItem]) -> Vec<TypeCount> {
    PersonalType::ALL
        .into_iter()
        .map(|kind| TypeCount {
            kind,
            count: items.iter().filter(|item| item.kind() == kind).count(),
        })
        .filter(|tc| tc.count > 0)
        .collect()
}

/// Items of `kind`, or all items when `kind` is `None`. Input order is kept.
pub fn filter_personal(items: &[PersonalItem], kind: Option<PersonalType>) -> Vec<&PersonalItem> {
    items
        .iter()
        .filter(|item| kind.map_or(true, |k| item.kind() == k))
        .collect()
}

// ============================================
// Projects
// ============================================

/// Every tech tag used by any project, sorted.
pub fn all_techs(projects: &[Project]) -> Vec<&str> {
    distinct_sorted(projects.iter().flat_map(|p| p.tech.iter().map(String::as_str)))
}

/// Projects using at least one of `techs`; all projects when `techs` is empty.
pub fn filter_by_tech<'a>(projects: &'a [Project], techs: &[String]) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|p| techs.is_empty() || techs.iter().any(|t| p.tech.contains(t)))
        .collect()
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    values.collect::<BTreeSet<_>>().into_iter().collect()
}

fn newest_first<'a, T>(
    items: impl Iterator<Item = (Option<DateTime<FixedOffset>>, &'a T)>,
) -> Vec<&'a T> {
    let mut items: Vec<_> = items.collect();
    // None < Some, so the reversed comparison puts undated items last
    items.sort_by(|a, b| b.0.cmp(&a.0));
    items.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Book, CommitAuthor, CommitStats, Habit, Interest, TaskType};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-14T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn commit(date: &str, project: &str) -> Commit {
        Commit {
            sha: format!("sha-{date}"),
            date: date.to_string(),
            project: project.to_string(),
            author: CommitAuthor::default(),
            stats: CommitStats::default(),
            title: String::new(),
            content: String::new(),
        }
    }

    fn task(captured: &str, status: TaskStatus, project: Option<&str>) -> Task {
        Task {
            task_type: TaskType::Todo,
            id: captured.to_string(),
            date: captured.to_string(),
            captured: captured.to_string(),
            status,
            project: project.map(str::to_string),
            title: String::new(),
            content: String::new(),
        }
    }

    fn project(name: &str, tech: &[&str]) -> Project {
        Project {
            project: name.to_string(),
            description: String::new(),
            date: "2024-01-01".to_string(),
            tech: tech.iter().map(|t| t.to_string()).collect(),
            path: String::new(),
            title: name.to_string(),
            content: String::new(),
        }
    }

    #[test]
    fn test_date_range_cutoffs() {
        assert!(DateRange::Week.contains("2024-03-08T12:00:00Z", now()));
        assert!(!DateRange::Week.contains("2024-03-07T11:00:00Z", now()));
        assert!(DateRange::Month.contains("2024-02-14T12:00:00Z", now()));
        assert!(!DateRange::Month.contains("2024-02-13T11:00:00Z", now()));
        assert!(DateRange::All.contains("1999-01-01", now()));

        // Undated records only survive the unbounded range
        assert!(!DateRange::Week.contains("someday", now()));
        assert!(DateRange::All.contains("someday", now()));

        assert_eq!("month".parse::<DateRange>().unwrap(), DateRange::Month);
        assert!("year".parse::<DateRange>().is_err());
    }

    #[test]
    fn test_commit_filter_by_project_and_range_sorted_newest_first() {
        let commits = vec![
            commit("2024-03-01T10:00:00Z", "alpha"),
            commit("2024-03-13T10:00:00Z", "alpha"),
            commit("2024-03-12T10:00:00Z", "beta"),
            commit("2024-03-10T10:00:00Z", "alpha"),
            commit("bad", "alpha"),
        ];

        let all_alpha = CommitFilter {
            project: Some("alpha".to_string()),
            range: DateRange::All,
        };
        let dates: Vec<_> = all_alpha
            .apply(&commits, now())
            .iter()
            .map(|c| c.date.as_str())
            .collect();
        assert_eq!(
            dates,
            vec!["2024-03-13T10:00:00Z", "2024-03-10T10:00:00Z", "2024-03-01T10:00:00Z", "bad"]
        );

        let week = CommitFilter {
            project: None,
            range: DateRange::Week,
        };
        assert_eq!(week.apply(&commits, now()).len(), 3);

        assert_eq!(commit_projects(&commits), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_task_filter_status_and_project() {
        let tasks = vec![
            task("2024-03-01T08:00:00Z", TaskStatus::Done, Some("alpha")),
            task("2024-03-03T08:00:00Z", TaskStatus::Active, None),
            task("2024-03-02T08:00:00Z", TaskStatus::Later, Some("alpha")),
            task("2024-03-04T08:00:00Z", TaskStatus::Active, Some("beta")),
        ];

        let open = TaskFilter {
            statuses: vec![TaskStatus::Active, TaskStatus::Later],
            project: ProjectFilter::Any,
        };
        let captured: Vec<_> = open.apply(&tasks).iter().map(|t| t.captured.as_str()).collect();
        assert_eq!(
            captured,
            vec!["2024-03-04T08:00:00Z", "2024-03-03T08:00:00Z", "2024-03-02T08:00:00Z"]
        );

        let unassigned = TaskFilter {
            statuses: vec![],
            project: ProjectFilter::Unassigned,
        };
        assert_eq!(unassigned.apply(&tasks).len(), 1);

        let alpha = TaskFilter {
            statuses: vec![],
            project: ProjectFilter::Named("alpha".to_string()),
        };
        assert_eq!(alpha.apply(&tasks).len(), 2);

        assert_eq!(
            available_statuses(&tasks),
            vec![TaskStatus::Active, TaskStatus::Later, TaskStatus::Done]
        );
        assert_eq!(task_projects(&tasks), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_personal_type_counts_and_filter() {
        let items = vec![
            PersonalItem::Habit(Habit {
                date: "2024-01-01".to_string(),
                habit: "run".to_string(),
                frequency: None,
            }),
            PersonalItem::Book(Book {
                date: "2024-01-02".to_string(),
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                isbn: None,
                rating: 5.0,
                date_read: None,
                shelf: None,
            }),
            PersonalItem::Interest(Interest {
                date: "2024-01-03".to_string(),
                name: "astronomy".to_string(),
            }),
            PersonalItem::Book(Book {
                date: "2024-01-04".to_string(),
                title: "Hyperion".to_string(),
                author: "Dan Simmons".to_string(),
                isbn: None,
                rating: 4.0,
                date_read: None,
                shelf: None,
            }),
        ];

        let counts = personal_type_counts(&items);
        assert_eq!(
            counts,
            vec![
                TypeCount { kind: PersonalType::Interest, count: 1 },
                TypeCount { kind: PersonalType::Book, count: 2 },
                TypeCount { kind: PersonalType::Habit, count: 1 },
            ]
        );

        let books: Vec<_> = filter_personal(&items, Some(PersonalType::Book))
            .iter()
            .map(|i| i.label())
            .collect();
        assert_eq!(books, vec!["Dune", "Hyperion"]);
        assert_eq!(filter_personal(&items, None).len(), 4);
        assert!(filter_personal(&items, Some(PersonalType::Movie)).is_empty());
    }

    #[test]
    fn test_tech_filter_matches_any_selected() {
        let projects = vec![
            project("loreboard", &["rust", "sqlite"]),
            project("site", &["typescript"]),
            project("notes", &[]),
        ];

        assert_eq!(all_techs(&projects), vec!["rust", "sqlite", "typescript"]);
        assert_eq!(filter_by_tech(&projects, &[]).len(), 3);

        let picked = filter_by_tech(&projects, &["sqlite".to_string(), "typescript".to_string()]);
        let names: Vec<_> = picked.iter().map(|p| p.project.as_str()).collect();
        assert_eq!(names, vec!["loreboard", "site"]);
    }
}
