//! # loreboard-core
//!
//! Core library for loreboard - a personal activity dashboard over a
//! `lore.db` archive.
//!
//! This library provides:
//! - Domain types for commits, tasks, personal items and the other lore sources
//! - A read-only record store over the SQLite FTS5 `search` table
//! - Calendar bucketing (ISO weeks, month keys, weekday indices)
//! - Time-series aggregation and the 52×7 activity terrain
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows in one direction:
//! - **Store:** `lore.db` is opened read-only and loaded once into a [`LoreSnapshot`]
//! - **Aggregation:** pure functions over the snapshot's record slices
//! - **Presentation:** read-only views of [`TimeSeries`](analytics::TimeSeries)
//!   and [`TerrainGrid`](analytics::TerrainGrid)
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::{Datelike, Local};
//! use loreboard_core::analytics::build_terrain;
//! use loreboard_core::{Config, LoreStore};
//!
//! let config = Config::load().expect("failed to load config");
//! let store = LoreStore::open(&config.store_path()).expect("failed to open lore.db");
//! let snapshot = store.snapshot().expect("failed to load records");
//!
//! let year = Local::now().year();
//! let grid = build_terrain(&snapshot.commits, &snapshot.tasks, &snapshot.personal, year);
//! println!("{} active days", grid.active_cells(0.0).count());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{LoreSnapshot, LoreStore};
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod types;
