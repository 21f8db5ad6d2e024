//! Configuration loading and typed config structures for the `milestone`
//! tool.
//!
//! The configuration lives in `milestone-config.yaml` in the working
//! directory. Every field has a default, so the file is optional and may be
//! partial.
//!
//! ```yaml
//! snapshot:
//!   path: "milestone-snapshot.json"
//!   pretty: true
//! logging:
//!   level: "info"
//!   log_changes: true
//!   json: false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable overriding `snapshot.path`.
pub const SNAPSHOT_PATH_ENV: &str = "MILESTONE_SNAPSHOT_PATH";

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "MILESTONE_LOG_LEVEL";

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MilestoneConfig {
    /// Where and how the registry snapshot is kept.
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MilestoneConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `MILESTONE_SNAPSHOT_PATH` overrides `snapshot.path`
    /// - `MILESTONE_LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults (still
    /// applying environment overrides).
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Override values with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override values using `lookup` to resolve variable names.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(SNAPSHOT_PATH_ENV) {
            self.snapshot.path = PathBuf::from(val);
        }
        if let Some(val) = lookup(LOG_LEVEL_ENV) {
            self.logging.level = val;
        }
    }
}

/// Snapshot file settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnapshotConfig {
    /// Snapshot file read at startup and written after mutations.
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,

    /// Pretty-print the JSON when writing.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
            pretty: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log every change notification emitted by the registry.
    #[serde(default = "default_true")]
    pub log_changes: bool,

    /// Emit JSON log lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_changes: true,
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("milestone-snapshot.json")
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
