//! Configuration module for stagepipe
//!
//! The pipeline has two tunables, both fixed for the lifetime of a run:
//! the sliding-window capacity and the drain interval of the buffering
//! stage. They are read from a TOML file, then optionally overridden from
//! the environment.
//!
//! # Config Location
//!
//! When no path is given on the command line, the config is looked up in the
//! platform-appropriate config directory:
//! - **Linux**: `~/.config/stagepipe/config.toml`
//! - **macOS**: `~/Library/Application Support/stagepipe/config.toml`
//! - **Windows**: `%APPDATA%\stagepipe\config.toml`
//!
//! # Example
//!
//! ```toml
//! buffer_capacity = 10
//! drain_interval_ms = 10000
//! ```

use crate::error::{Result, StagePipeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for config directories
pub const APP_ID: &str = "stagepipe";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default sliding-window capacity
pub const DEFAULT_BUFFER_CAPACITY: usize = 10;

/// Default drain interval in milliseconds
pub const DEFAULT_DRAIN_INTERVAL_MS: u64 = 10_000;

/// Environment variable overriding `buffer_capacity`
pub const ENV_BUFFER_CAPACITY: &str = "STAGEPIPE_BUFFER_CAPACITY";

/// Environment variable overriding `drain_interval_ms`
pub const ENV_DRAIN_INTERVAL_MS: &str = "STAGEPIPE_DRAIN_INTERVAL_MS";

/// Get the default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of values the buffering stage holds between flushes
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Time between flushes, measured from the end of the previous flush
    #[serde(default = "default_drain_interval_ms")]
    pub drain_interval_ms: u64,
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_drain_interval_ms() -> u64 {
    DEFAULT_DRAIN_INTERVAL_MS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            drain_interval_ms: DEFAULT_DRAIN_INTERVAL_MS,
        }
    }
}

impl PipelineConfig {
    /// The interval is kept at millisecond granularity. A non-zero interval
    /// shorter than a millisecond rounds up to one, and anything beyond
    /// `u64::MAX` milliseconds saturates.
    pub fn new(buffer_capacity: usize, drain_interval: Duration) -> Self {
        let mut drain_interval_ms = u64::try_from(drain_interval.as_millis()).unwrap_or(u64::MAX);
        if drain_interval_ms == 0 && !drain_interval.is_zero() {
            drain_interval_ms = 1;
        }
        Self {
            buffer_capacity,
            drain_interval_ms,
        }
    }

    pub fn drain_interval(&self) -> Duration {
        Duration::from_millis(self.drain_interval_ms)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StagePipeError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            StagePipeError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load a config file, returning defaults if it is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save to a TOML file, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| StagePipeError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `STAGEPIPE_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(ENV_BUFFER_CAPACITY) {
            self.buffer_capacity = raw.trim().parse().map_err(|_| {
                StagePipeError::Config(format!(
                    "{} must be an integer, got {:?}",
                    ENV_BUFFER_CAPACITY, raw
                ))
            })?;
        }
        if let Ok(raw) = std::env::var(ENV_DRAIN_INTERVAL_MS) {
            self.drain_interval_ms = raw.trim().parse().map_err(|_| {
                StagePipeError::Config(format!(
                    "{} must be an integer, got {:?}",
                    ENV_DRAIN_INTERVAL_MS, raw
                ))
            })?;
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(StagePipeError::Config(
                "buffer_capacity must be at least 1".to_string(),
            ));
        }
        if self.drain_interval_ms == 0 {
            return Err(StagePipeError::Config(
                "drain_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "capacity {}, drain interval {:?}",
            self.buffer_capacity,
            self.drain_interval()
        )
    }
}

// ==================== Tests ====================
