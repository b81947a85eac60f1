//! Configuration management for hive.
//!
//! Configuration is loaded with precedence:
//! 1. Command-line flags (`--config`, `--database`; also `HIVE_CONFIG`, `HIVE_DATABASE_PATH`)
//! 2. Config file (`<data dir>/config.toml`)
//! 3. Default values

use anyhow::{Context, Result};
use directories::ProjectDirs;
use hive_memory::{MaintenanceConfig, MemoryConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Memory engine thresholds
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Maintenance runner settings
    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directives used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "hive", "hive") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hive")
    }
}

fn default_database_path() -> PathBuf {
    default_data_dir().join("hive.db")
}

fn default_log_filter() -> String {
    "hive=info,hive_memory=info,hive_core=warn".to_string()
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_config_path);

        let config: Config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", config_path.display()))?
        } else {
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Default config file path.
    pub fn default_config_path() -> PathBuf {
        default_data_dir().join("config.toml")
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.memory.validate().context("Invalid [memory] section")?;
        self.maintenance
            .validate()
            .context("Invalid [maintenance] section")?;
        Ok(())
    }
}
