//! Read-only record store over `lore.db`
//!
//! Every category lives in the same FTS5 `search` table, distinguished by the
//! `source` column. Typed getters parse each row's metadata JSON; rows whose
//! metadata doesn't parse are logged and skipped.

use crate::error::{Error, Result};
use crate::types::*;
use rusqlite::{Connection, OpenFlags, Row};
use std::collections::HashMap;
use std::path::Path;

use super::schema;

/// Every category the dashboard uses, loaded once.
///
/// A snapshot is never updated in place; to pick up new data, take a new one.
#[derive(Debug, Clone, Default)]
pub struct LoreSnapshot {
    pub projects: Vec<Project>,
    pub commits: Vec<Commit>,
    pub personal: Vec<PersonalItem>,
    pub tasks: Vec<Task>,
    pub explorations: Vec<Exploration>,
    pub blogs: Vec<Blog>,
    pub captures: Vec<Capture>,
    pub counts: LoreCounts,
}

/// Read-only handle on a lore archive
pub struct LoreStore {
    conn: Connection,
}

impl LoreStore {
    /// Open the archive at `path` read-only.
    ///
    /// Fails with [`Error::DatabaseNotFound`] if the file is missing and
    /// [`Error::Schema`] if it has no usable `search` table.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DatabaseNotFound(path.to_path_buf()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let store = Self::from_connection(conn)?;

        tracing::info!(path = %path.display(), "Opened lore database");
        Ok(store)
    }

    /// Wrap an existing connection (in-memory fixtures, tests).
    pub fn from_connection(conn: Connection) -> Result<Self> {
        schema::verify_schema(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_entry(row: &Row) -> rusqlite::Result<LoreEntry> {
        Ok(LoreEntry {
            source: row.get("source")?,
            title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
            content: row.get::<_, Option<String>>("content")?.unwrap_or_default(),
            metadata: row.get::<_, Option<String>>("metadata")?.unwrap_or_default(),
        })
    }

    // ============================================
    // Raw entries
    // ============================================

    /// All entries for a given source
    pub fn query_by_source(&self, source: LoreSource) -> Result<Vec<LoreEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT source, title, content, metadata FROM search WHERE source = ?1")?;
        let entries = stmt
            .query_map([source.as_str()], Self::row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(%source, rows = entries.len(), "Queried source");
        Ok(entries)
    }

    /// Full-text search, optionally restricted to one source
    pub fn search(&self, query: &str, source: Option<LoreSource>) -> Result<Vec<LoreEntry>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidArgument("search query is empty".to_string()));
        }

        let entries = match source {
            Some(source) => {
                let mut stmt = self.conn.prepare(
                    "SELECT source, title, content, metadata FROM search \
                     WHERE search MATCH ?1 AND source = ?2",
                )?;
                let rows = stmt
                    .query_map([query, source.as_str()], Self::row_to_entry)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT source, title, content, metadata FROM search WHERE search MATCH ?1",
                )?;
                let rows = stmt
                    .query_map([query], Self::row_to_entry)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };
        Ok(entries)
    }

    /// Number of entries for a source
    pub fn count_by_source(&self, source: LoreSource) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM search WHERE source = ?1",
            [source.as_str()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    /// Entry counts keyed by the raw `source` value
    pub fn source_counts(&self) -> Result<HashMap<String, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT source, COUNT(*) FROM search GROUP BY source")?;
        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?.max(0) as u64))
            })?
            .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(counts)
    }

    /// Counts for the dashboard categories; missing sources count as 0
    pub fn all_counts(&self) -> Result<LoreCounts> {
        let raw = self.source_counts()?;
        let get = |source: LoreSource| raw.get(source.as_str()).copied().unwrap_or(0);
        Ok(LoreCounts {
            projects: get(LoreSource::Development),
            commits: get(LoreSource::Commits),
            personal: get(LoreSource::Personal),
            tasks: get(LoreSource::Tasks),
            explorations: get(LoreSource::Explorations),
            blogs: get(LoreSource::Blogs),
            captures: get(LoreSource::Captures),
        })
    }

    // ============================================
    // Typed records
    // ============================================

    /// All parseable records of type `T`
    pub fn records<T: EntryRecord>(&self) -> Result<Vec<T>> {
        let entries = self.query_by_source(T::SOURCE)?;
        Ok(parse_entries(entries))
    }

    pub fn projects(&self) -> Result<Vec<Project>> {
        self.records()
    }

    pub fn commits(&self) -> Result<Vec<Commit>> {
        self.records()
    }

    pub fn personal_items(&self) -> Result<Vec<PersonalItem>> {
        self.records()
    }

    pub fn tasks(&self) -> Result<Vec<Task>> {
        self.records()
    }

    pub fn explorations(&self) -> Result<Vec<Exploration>> {
        self.records()
    }

    pub fn blogs(&self) -> Result<Vec<Blog>> {
        self.records()
    }

    pub fn captures(&self) -> Result<Vec<Capture>> {
        self.records()
    }

    /// Load every dashboard category at once
    pub fn snapshot(&self) -> Result<LoreSnapshot> {
        let snapshot = LoreSnapshot {
            projects: self.projects()?,
            commits: self.commits()?,
            personal: self.personal_items()?,
            tasks: self.tasks()?,
            explorations: self.explorations()?,
            blogs: self.blogs()?,
            captures: self.captures()?,
            counts: self.all_counts()?,
        };

        tracing::info!(
            commits = snapshot.commits.len(),
            tasks = snapshot.tasks.len(),
            personal = snapshot.personal.len(),
            total = snapshot.counts.total(),
            "Loaded lore snapshot"
        );
        Ok(snapshot)
    }
}

/// Parse one entry's metadata JSON into a typed record.
pub fn parse_entry<T: EntryRecord>(entry: LoreEntry) -> Result<T> {
    let mut record: T = serde_json::from_str(&entry.metadata)?;
    record.attach_text(entry.title, entry.content);
    Ok(record)
}

/// Parse entries into typed records, skipping rows with bad metadata.
pub fn parse_entries<T: EntryRecord>(entries: Vec<LoreEntry>) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let (source, title) = (entry.source.clone(), entry.title.clone());
            match parse_entry(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(%source, %title, error = %e, "Failed to parse metadata");
                    None
                }
            }
        })
        .collect()
}
