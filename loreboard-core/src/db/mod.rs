//! Database layer for loreboard
//!
//! This module provides read-only access to the lore archive:
//! - Schema verification for the FTS5 `search` table
//! - Typed record queries per source
//! - One-shot snapshots for aggregation

pub mod repo;
pub mod schema;

pub use repo::{parse_entries, LoreSnapshot, LoreStore};
