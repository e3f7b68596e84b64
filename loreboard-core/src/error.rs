//! Error types for loreboard-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the loreboard-core library
///
/// Aggregation never produces these: malformed records are filtered out
/// rather than reported. Errors only come from the edges (opening the
/// store, reading configuration, bad caller arguments).
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The lore database does not exist
    #[error("lore database not found at {}", .0.display())]
    DatabaseNotFound(PathBuf),

    /// The database isn't a lore archive
    #[error("unexpected schema: {0}")]
    Schema(String),

    /// A caller-supplied argument is out of range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for loreboard-core
pub type Result<T> = std::result::Result<T, Error>;
