//! File logging for loreboard
//!
//! loreboard is a one-shot command whose stdout is often piped into other
//! tools, so nothing is logged to the terminal. Everything goes to a daily
//! file under `$XDG_STATE_HOME/loreboard/` (see [`Config::log_path`]).

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "loreboard.log";

/// Keeps the background log writer alive; pending lines are flushed on drop.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// Install the global subscriber, logging to the XDG state directory.
///
/// `RUST_LOG` takes precedence over `[logging] level`.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    init_in(&Config::state_dir(), config)
}

/// Same as [`init`] with an explicit log directory.
pub fn init_in(log_dir: &Path, config: &LoggingConfig) -> Result<LoggingGuard> {
    std::fs::create_dir_all(log_dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .max_log_files(config.max_files.max(1))
        .build(log_dir)
        .map_err(|e| Error::Config(format!("cannot create log file in {:?}: {}", log_dir, e)))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    // Already installed when embedded or under a test harness
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .try_init();

    tracing::debug!(log_dir = %log_dir.display(), level = %config.level, "Logging initialized");

    Ok(LoggingGuard { _guard: guard })
}
