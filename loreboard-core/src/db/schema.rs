//! Layout of the lore archive
//!
//! lore owns `lore.db` and writes it; loreboard only reads it. The one table
//! we depend on is the FTS5 `search` table, whose `metadata` column holds a
//! per-source JSON blob.

use rusqlite::Connection;

use crate::error::{Error, Result};

/// Name of the full-text table
pub const SEARCH_TABLE: &str = "search";

/// Columns loreboard reads from [`SEARCH_TABLE`]
pub const SEARCH_COLUMNS: [&str; 4] = ["source", "title", "content", "metadata"];

/// DDL lore uses for the search table.
///
/// loreboard never runs this against a real archive; it exists so tests and
/// tooling can build fixture databases with the same layout.
pub const SEARCH_TABLE_DDL: &str = r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS search USING fts5(
        source UNINDEXED,
        title,
        content,
        metadata UNINDEXED
    );
"#;

/// Check that the connection looks like a lore archive.
pub fn verify_schema(conn: &Connection) -> Result<()> {
    let exists: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE name = ?1",
        [SEARCH_TABLE],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(Error::Schema(format!("missing `{}` table", SEARCH_TABLE)));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", SEARCH_TABLE))?;
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<_>>()?;

    for required in SEARCH_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            return Err(Error::Schema(format!(
                "`{}` table has no `{}` column",
                SEARCH_TABLE, required
            )));
        }
    }
    Ok(())
}
