//! Core domain types for loreboard
//!
//! These types mirror the rows of the `lore.db` FTS5 `search` table. Every
//! row carries a `source`, a `title`, a `content` body and a JSON `metadata`
//! blob whose shape depends on the source.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Source** | The category a row belongs to (`commits`, `tasks`, `personal`, ...) |
//! | **Entry** | A raw row from the `search` table, metadata still unparsed |
//! | **Record** | A typed value built from an entry's metadata plus its title/content |
//! | **Timestamp** | The "when this happened" field; `captured` for tasks, `date` otherwise |
//!
//! Aggregation only ever needs the timestamp (and, for per-project series,
//! the project name), so analytics code is written against the [`Dated`] and
//! [`ProjectScoped`] traits rather than the concrete record types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================
// Sources
// ============================================

/// Source categories present in `lore.db`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoreSource {
    /// Development projects
    Development,
    Commits,
    Personal,
    Tasks,
    Explorations,
    Blogs,
    Obsidian,
    Sessions,
    Captures,
    Readmes,
    Events,
}

impl LoreSource {
    /// All known sources, in display order.
    pub const ALL: [LoreSource; 11] = [
        LoreSource::Development,
        LoreSource::Commits,
        LoreSource::Personal,
        LoreSource::Tasks,
        LoreSource::Explorations,
        LoreSource::Blogs,
        LoreSource::Obsidian,
        LoreSource::Sessions,
        LoreSource::Captures,
        LoreSource::Readmes,
        LoreSource::Events,
    ];

    /// The value stored in the `source` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoreSource::Development => "development",
            LoreSource::Commits => "commits",
            LoreSource::Personal => "personal",
            LoreSource::Tasks => "tasks",
            LoreSource::Explorations => "explorations",
            LoreSource::Blogs => "blogs",
            LoreSource::Obsidian => "obsidian",
            LoreSource::Sessions => "sessions",
            LoreSource::Captures => "captures",
            LoreSource::Readmes => "readmes",
            LoreSource::Events => "events",
        }
    }
}

impl fmt::Display for LoreSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoreSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoreSource::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("unknown lore source: {}", s))
    }
}

/// A raw row from the FTS5 `search` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoreEntry {
    pub source: String,
    pub title: String,
    pub content: String,
    /// JSON blob, parsed per source type
    pub metadata: String,
}

// ============================================
// Record traits
// ============================================

/// Anything with a "when this happened" timestamp.
///
/// The timestamp is returned unparsed; bucketing decides whether it is
/// usable (see [`crate::analytics::calendar::parse_date`]).
pub trait Dated {
    /// Raw ISO-8601 timestamp string.
    fn timestamp(&self) -> &str;
}

/// Records that may belong to a project.
pub trait ProjectScoped: Dated {
    /// Project identifier, if the record has one.
    fn project(&self) -> Option<&str>;
}

/// Records built from a [`LoreEntry`]: metadata JSON plus the row's text.
pub trait EntryRecord: serde::de::DeserializeOwned {
    /// The source these records are read from.
    const SOURCE: LoreSource;

    /// Merge the entry's title and content into the parsed metadata.
    fn attach_text(&mut self, title: String, content: String);
}

// ============================================
// Development projects
// ============================================

/// A development project (`development` source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Dated for Project {
    fn timestamp(&self) -> &str {
        &self.date
    }
}

impl EntryRecord for Project {
    const SOURCE: LoreSource = LoreSource::Development;

    fn attach_text(&mut self, title: String, content: String) {
        self.title = title;
        self.content = content;
    }
}

// ============================================
// Commits
// ============================================

/// Commit author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

/// Diff statistics for a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    pub files_changed: u64,
    pub insertions: u64,
    pub deletions: u64,
}

/// A git commit (`commits` source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    /// ISO 8601 commit date
    pub date: String,
    pub project: String,
    #[serde(default)]
    pub author: CommitAuthor,
    #[serde(default)]
    pub stats: CommitStats,
    /// Commit message summary
    #[serde(default)]
    pub title: String,
    /// Full commit message
    #[serde(default)]
    pub content: String,
}

impl Commit {
    /// First line of the full commit message.
    pub fn subject(&self) -> &str {
        self.content.lines().next().unwrap_or(&self.title)
    }

    /// Abbreviated SHA (first 7 characters).
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

impl Dated for Commit {
    fn timestamp(&self) -> &str {
        &self.date
    }
}

impl ProjectScoped for Commit {
    fn project(&self) -> Option<&str> {
        Some(self.project.as_str()).filter(|p| !p.is_empty())
    }
}

impl EntryRecord for Commit {
    const SOURCE: LoreSource = LoreSource::Commits;

    fn attach_text(&mut self, title: String, content: String) {
        self.title = title;
        self.content = content;
    }
}

// ============================================
// Tasks
// ============================================

/// Kind of captured task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Idea,
    Todo,
    Task,
    Bug,
    Feature,
}

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Later,
    Active,
    Done,
    Archived,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Later,
        TaskStatus::Active,
        TaskStatus::Done,
        TaskStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Later => "later",
            TaskStatus::Active => "active",
            TaskStatus::Done => "done",
            TaskStatus::Archived => "archived",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown task status: {}", s))
    }
}

/// A captured task (`tasks` source).
///
/// Tasks are bucketed by `captured`, not `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub id: String,
    #[serde(default)]
    pub date: String,
    pub captured: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub project: Option<String>,
    /// Task description
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Dated for Task {
    fn timestamp(&self) -> &str {
        &self.captured
    }
}

impl ProjectScoped for Task {
    fn project(&self) -> Option<&str> {
        self.project.as_deref().filter(|p| !p.is_empty())
    }
}

impl EntryRecord for Task {
    const SOURCE: LoreSource = LoreSource::Tasks;

    fn attach_text(&mut self, title: String, content: String) {
        self.title = title;
        self.content = content;
    }
}

// ============================================
// Personal items
// ============================================

/// Discriminant of a [`PersonalItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalType {
    Interest,
    Book,
    Movie,
    Podcast,
    Habit,
}

impl PersonalType {
    /// Display order for type tabs.
    pub const ALL: [PersonalType; 5] = [
        PersonalType::Interest,
        PersonalType::Book,
        PersonalType::Movie,
        PersonalType::Podcast,
        PersonalType::Habit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalType::Interest => "interest",
            PersonalType::Book => "book",
            PersonalType::Movie => "movie",
            PersonalType::Podcast => "podcast",
            PersonalType::Habit => "habit",
        }
    }

    /// Plural tab label ("Books").
    pub fn plural_label(&self) -> &'static str {
        match self {
            PersonalType::Interest => "Interests",
            PersonalType::Book => "Books",
            PersonalType::Movie => "Movies",
            PersonalType::Podcast => "Podcasts",
            PersonalType::Habit => "Habits",
        }
    }
}

impl FromStr for PersonalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonalType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown personal item type: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub date: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub date: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub date_read: Option<String>,
    #[serde(default)]
    pub shelf: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub watched_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Podcast {
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub date: String,
    pub habit: String,
    #[serde(default)]
    pub frequency: Option<String>,
}

/// A personal log item (`personal` source), tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PersonalItem {
    Interest(Interest),
    Book(Book),
    Movie(Movie),
    Podcast(Podcast),
    Habit(Habit),
}

impl PersonalItem {
    pub fn kind(&self) -> PersonalType {
        match self {
            PersonalItem::Interest(_) => PersonalType::Interest,
            PersonalItem::Book(_) => PersonalType::Book,
            PersonalItem::Movie(_) => PersonalType::Movie,
            PersonalItem::Podcast(_) => PersonalType::Podcast,
            PersonalItem::Habit(_) => PersonalType::Habit,
        }
    }

    /// Human-readable label for list views.
    pub fn label(&self) -> &str {
        match self {
            PersonalItem::Interest(i) => &i.name,
            PersonalItem::Book(b) => &b.title,
            PersonalItem::Movie(m) => &m.title,
            PersonalItem::Podcast(p) => &p.title,
            PersonalItem::Habit(h) => &h.habit,
        }
    }
}

impl Dated for PersonalItem {
    fn timestamp(&self) -> &str {
        match self {
            PersonalItem::Interest(i) => &i.date,
            PersonalItem::Book(b) => &b.date,
            PersonalItem::Movie(m) => &m.date,
            PersonalItem::Podcast(p) => &p.date,
            PersonalItem::Habit(h) => &h.date,
        }
    }
}

impl EntryRecord for PersonalItem {
    const SOURCE: LoreSource = LoreSource::Personal;

    // Personal rows keep everything in metadata.
    fn attach_text(&mut self, _title: String, _content: String) {}
}

// ============================================
// Explorations, blogs, captures
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplorationStatus {
    Active,
    Complete,
    Archived,
}

impl ExplorationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplorationStatus::Active => "active",
            ExplorationStatus::Complete => "complete",
            ExplorationStatus::Archived => "archived",
        }
    }
}

/// An exploration write-up (`explorations` source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exploration {
    pub date: String,
    pub status: ExplorationStatus,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Dated for Exploration {
    fn timestamp(&self) -> &str {
        &self.date
    }
}

impl ProjectScoped for Exploration {
    fn project(&self) -> Option<&str> {
        Some(self.project.as_str()).filter(|p| !p.is_empty())
    }
}

impl EntryRecord for Exploration {
    const SOURCE: LoreSource = LoreSource::Explorations;

    fn attach_text(&mut self, title: String, content: String) {
        self.title = title;
        self.content = content;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    Published,
    Draft,
}

impl BlogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Published => "published",
            BlogStatus::Draft => "draft",
        }
    }
}

/// A blog post (`blogs` source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub date: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub word_count: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub path: String,
    pub status: BlogStatus,
    #[serde(default)]
    pub title: String,
    /// Preview text
    #[serde(default)]
    pub content: String,
}

impl Dated for Blog {
    fn timestamp(&self) -> &str {
        &self.date
    }
}

impl EntryRecord for Blog {
    const SOURCE: LoreSource = LoreSource::Blogs;

    fn attach_text(&mut self, title: String, content: String) {
        self.title = title;
        self.content = content;
    }
}

/// A quick capture (`captures` source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Dated for Capture {
    fn timestamp(&self) -> &str {
        &self.date
    }
}

impl EntryRecord for Capture {
    const SOURCE: LoreSource = LoreSource::Captures;

    fn attach_text(&mut self, title: String, content: String) {
        self.title = title;
        self.content = content;
    }
}

// ============================================
// Counts
// ============================================

/// Row counts per dashboard category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoreCounts {
    /// Rows in the `development` source
    pub projects: u64,
    pub commits: u64,
    pub personal: u64,
    pub tasks: u64,
    pub explorations: u64,
    pub blogs: u64,
    pub captures: u64,
}

impl LoreCounts {
    /// Total entries across all dashboard categories.
    pub fn total(&self) -> u64 {
        self.projects
            + self.commits
            + self.personal
            + self.tasks
            + self.explorations
            + self.blogs
            + self.captures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lore_source_roundtrip() {
        for source in LoreSource::ALL {
            assert_eq!(source.as_str().parse::<LoreSource>().unwrap(), source);
        }
        assert!("nope".parse::<LoreSource>().is_err());
    }

    #[test]
    fn test_status_and_kind_parse() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert_eq!("book".parse::<PersonalType>().unwrap(), PersonalType::Book);
        assert!("game".parse::<PersonalType>().is_err());
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_personal_item_tagged_by_type() {
        let item: PersonalItem =
            serde_json::from_str(r#"{"type":"book","date":"2024-03-01","title":"Dune","author":"Herbert","rating":5}"#)
                .unwrap();
        assert_eq!(item.kind(), PersonalType::Book);
        assert_eq!(item.timestamp(), "2024-03-01");
        assert_eq!(item.label(), "Dune");

        let habit: PersonalItem =
            serde_json::from_str(r#"{"type":"habit","date":"2024-03-02","habit":"run"}"#).unwrap();
        assert_eq!(habit.kind(), PersonalType::Habit);

        let unknown = serde_json::from_str::<PersonalItem>(r#"{"type":"game","date":"2024-03-02"}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn test_task_uses_captured_timestamp() {
        let task: Task = serde_json::from_str(
            r#"{"type":"bug","id":"t1","date":"2024-01-01","captured":"2024-02-02T10:00:00Z","status":"active","project":null}"#,
        )
        .unwrap();
        assert_eq!(task.timestamp(), "2024-02-02T10:00:00Z");
        assert_eq!(ProjectScoped::project(&task), None);
    }

    #[test]
    fn test_commit_helpers() {
        let commit = Commit {
            sha: "abcdef1234567".to_string(),
            date: "2024-01-02T10:00:00Z".to_string(),
            project: "alpha".to_string(),
            author: CommitAuthor::default(),
            stats: CommitStats::default(),
            title: "Fix parser".to_string(),
            content: "Fix parser\n\nLonger body".to_string(),
        };
        assert_eq!(commit.short_sha(), "abcdef1");
        assert_eq!(commit.subject(), "Fix parser");
        assert_eq!(ProjectScoped::project(&commit), Some("alpha"));
    }

    #[test]
    fn test_counts_total() {
        let counts = LoreCounts {
            projects: 1,
            commits: 2,
            personal: 3,
            tasks: 4,
            explorations: 5,
            blogs: 6,
            captures: 7,
        };
        assert_eq!(counts.total(), 28);
    }
}
