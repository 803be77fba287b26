//! Host configuration loaded from `homestead.yaml`.
//!
//! The file is optional. Every section falls back to defaults, and a few
//! deployment settings can be overridden from the environment.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use homestead_core::EngineConfig;
use homestead_types::FarmId;

use crate::error::HostError;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "HOMESTEAD_CONFIG";

/// Configuration file used when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "homestead.yaml";

/// Everything the host needs at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    /// Limits handed to the transition engine.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Log level and output format.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where farm snapshots live.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl HostConfig {
    /// Parse and validate a YAML document.
    pub fn parse(yaml: &str) -> Result<Self, HostError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Read `path`, or return defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, HostError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(HostError::io(path, err)),
        }
    }

    /// Apply overrides from a variable lookup, normally the process
    /// environment.
    ///
    /// `HOMESTEAD_SNAPSHOT_DIR` and `HOMESTEAD_FARM_ID` are recognised. A
    /// farm id that is not a number is ignored with a warning.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("HOMESTEAD_SNAPSHOT_DIR") {
            self.storage.snapshot_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("HOMESTEAD_FARM_ID") {
            match val.parse::<u64>() {
                Ok(id) => self.storage.farm_id = FarmId(id),
                Err(_) => tracing::warn!(value = %val, "Ignoring non-numeric HOMESTEAD_FARM_ID"),
            }
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Snapshot storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON snapshot per farm.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Farm this host process serves.
    #[serde(default = "default_farm_id")]
    pub farm_id: FarmId,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
            farm_id: default_farm_id(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("snapshots")
}

const fn default_farm_id() -> FarmId {
    FarmId(1)
}
