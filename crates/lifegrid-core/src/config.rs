//! Configuration loading and typed config structures for LifeGrid.
//!
//! The configuration lives in `lifegrid-config.yaml` in the working
//! directory. Every field has a default, so a missing file or a partial
//! file is fine. Values are read once at startup; nothing here is
//! adjustable while the server runs.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::grid::{DEFAULT_COLS, DEFAULT_DENSITY, DEFAULT_ROWS, MAX_CELLS};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is outside its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `lifegrid-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LifeGridConfig {
    /// Grid dimensions and simulation timing.
    #[serde(default)]
    pub grid: GridConfig,

    /// Listener and static asset settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LifeGridConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listener:
    /// - `LIFEGRID_PORT` overrides `server.port`
    /// - `LIFEGRID_STATIC_DIR` overrides `server.static_dir`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if `LIFEGRID_PORT` is not a port number.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// Only the YAML is consulted; environment overrides are applied by
    /// [`from_file`](Self::from_file).
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.server.validate()
    }
}

/// Grid dimensions and simulation timing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridConfig {
    /// Number of rows.
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Number of columns.
    #[serde(default = "default_cols")]
    pub cols: usize,

    /// Milliseconds between generations while running.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Probability that a cell is alive after `random`.
    #[serde(default = "default_random_density")]
    pub random_density: f64,
}

impl GridConfig {
    /// The tick period as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.rows, self.cols
            )));
        }
        match self.rows.checked_mul(self.cols) {
            Some(cells) if cells <= MAX_CELLS => {}
            _ => {
                return Err(invalid(format!(
                    "grid {}x{} exceeds the {MAX_CELLS} cell limit",
                    self.rows, self.cols
                )));
            }
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms must be at least 1".to_owned()));
        }
        if !(0.0..=1.0).contains(&self.random_density) {
            return Err(invalid(format!(
                "random_density must be within [0, 1], got {}",
                self.random_density
            )));
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            tick_interval_ms: default_tick_interval_ms(),
            random_density: default_random_density(),
        }
    }
}

/// Listener and static asset settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the front-end assets served at `/`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Outbound snapshots queued per session before it is dropped as
    /// too slow.
    #[serde(default = "default_session_queue")]
    pub session_queue: usize,
}

impl ServerConfig {
    /// Override listener settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override listener settings from `lookup`, keyed by variable name.
    ///
    /// `LIFEGRID_PORT` must parse as a port number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("LIFEGRID_PORT") {
            self.port = val
                .parse()
                .map_err(|e| invalid(format!("LIFEGRID_PORT={val}: {e}")))?;
        }
        if let Some(val) = lookup("LIFEGRID_STATIC_DIR") {
            self.static_dir = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.session_queue == 0 {
            return Err(invalid("session_queue must be at least 1".to_owned()));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            session_queue: default_session_queue(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

const fn default_rows() -> usize {
    DEFAULT_ROWS
}

const fn default_cols() -> usize {
    DEFAULT_COLS
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_random_density() -> f64 {
    DEFAULT_DENSITY
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    String::from("frontend")
}

const fn default_session_queue() -> usize {
    64
}

fn default_log_level() -> String {
    String::from("info")
}
