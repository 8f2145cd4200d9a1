//! Configuration file support for abx.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/abx/config.toml`. Rule
//! weights and formula constants are not configurable.

use crate::reference::{get_default_tables, ReferenceTables};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the audit log inside the data directory
pub const AUDIT_LOG_FILE: &str = "audit.jsonl";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub reference: ReferenceConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Reference table source; embedded defaults when no path is set
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub tables_path: Option<PathBuf>,
}

/// Audit trail configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuditConfig {
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn home_relative(suffix: &str) -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(suffix))
        .unwrap_or_else(|| PathBuf::from(suffix))
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_relative(".local/share"));
    base.join("abx")
}

fn default_audit_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_relative(".config"));
        base.join("abx").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Path of the JSONL audit log
    pub fn audit_log_path(&self) -> PathBuf {
        self.data.data_dir.join(AUDIT_LOG_FILE)
    }

    /// Reference tables named by the config, or the embedded defaults
    pub fn reference_tables(&self) -> Result<ReferenceTables> {
        match &self.reference.tables_path {
            Some(path) => ReferenceTables::load_from(path),
            None => Ok(get_default_tables().clone()),
        }
    }
}
