//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/loreboard/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/loreboard/` (~/.config/loreboard/)
//! - Data: `$XDG_DATA_HOME/lore/lore.db` is the archive we read (owned by lore)
//! - State/Logs: `$XDG_STATE_HOME/loreboard/` (~/.local/state/loreboard/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Record store location
    #[serde(default)]
    pub store: StoreConfig,

    /// Time-series and summary settings
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Terrain plane settings
    #[serde(default)]
    pub terrain: TerrainConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Record store configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct StoreConfig {
    /// Override path to lore.db
    pub path: Option<PathBuf>,
}

/// Window lengths and list sizes used by the dashboard
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Trailing window for weekly series
    #[serde(default = "default_weeks")]
    pub weeks: usize,

    /// Trailing window for monthly series
    #[serde(default = "default_months")]
    pub months: usize,

    /// Trailing window for the daily activity chart
    #[serde(default = "default_days")]
    pub days: usize,

    /// Number of projects in the per-project ranking
    #[serde(default = "default_top_projects")]
    pub top_projects: usize,

    /// Number of items in the recent activity feed
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            weeks: default_weeks(),
            months: default_months(),
            days: default_days(),
            top_projects: default_top_projects(),
            recent_limit: default_recent_limit(),
        }
    }
}

impl DashboardConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.weeks == 0 {
            return Err(Error::Config("dashboard.weeks must be at least 1".to_string()));
        }
        if self.months == 0 {
            return Err(Error::Config("dashboard.months must be at least 1".to_string()));
        }
        if self.days == 0 {
            return Err(Error::Config("dashboard.days must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn default_weeks() -> usize {
    12
}

fn default_months() -> usize {
    12
}

fn default_days() -> usize {
    90
}

fn default_top_projects() -> usize {
    5
}

fn default_recent_limit() -> usize {
    8
}

/// Dimensions of the plane the terrain is drawn on
#[derive(Debug, Deserialize, Clone)]
pub struct TerrainConfig {
    /// Extent along the week axis
    #[serde(default = "default_terrain_width")]
    pub width: f64,

    /// Extent along the day axis
    #[serde(default = "default_terrain_depth")]
    pub depth: f64,

    /// Cells above this normalized value seed visual clusters
    #[serde(default = "default_cluster_threshold")]
    pub cluster_threshold: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: default_terrain_width(),
            depth: default_terrain_depth(),
            cluster_threshold: default_cluster_threshold(),
        }
    }
}

impl TerrainConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.width.is_finite()) {
            return Err(Error::Config("terrain.width must be positive".to_string()));
        }
        if !(self.depth > 0.0 && self.depth.is_finite()) {
            return Err(Error::Config("terrain.depth must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.cluster_threshold) {
            return Err(Error::Config(
                "terrain.cluster_threshold must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_terrain_width() -> f64 {
    28.0
}

fn default_terrain_depth() -> f64 {
    8.0
}

fn default_cluster_threshold() -> f64 {
    0.05
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.dashboard.validate()?;
        self.terrain.validate()
    }

    /// Path of the lore database, honoring `[store] path`
    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(Self::default_store_path)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/loreboard/config.toml` (~/.config/loreboard/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("loreboard").join("config.toml")
    }

    /// Returns the default lore database path
    ///
    /// `$XDG_DATA_HOME/lore/lore.db` (~/.local/share/lore/lore.db)
    pub fn default_store_path() -> PathBuf {
        xdg_data_home().join("lore").join("lore.db")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/loreboard/` (~/.local/state/loreboard/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("loreboard")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("loreboard.log")
    }
}
