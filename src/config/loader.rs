//! Configuration loader for Identity-Manager
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use crate::identity::ManagerOptions;
use crate::windows::types::LogonProvider;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "IDENTITY_MANAGER_CONFIG";

/// Configuration file used when the environment variable is unset
pub const DEFAULT_CONFIG_FILE: &str = "identity-manager.toml";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_identity")]
    pub identity: IdentityConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Identity manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_system_process_name")]
    pub system_process_name: String,
    #[serde(default = "default_logon_provider")]
    pub logon_provider: LogonProvider,
    #[serde(default = "default_revert_on_drop")]
    pub revert_on_drop: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

impl From<&IdentityConfig> for ManagerOptions {
    fn from(config: &IdentityConfig) -> Self {
        ManagerOptions {
            system_process_name: config.system_process_name.clone(),
            logon_provider: config.logon_provider,
            revert_on_drop: config.revert_on_drop,
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loader for the path in `IDENTITY_MANAGER_CONFIG`, or the default file
    pub fn from_env() -> Self {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::new(DEFAULT_CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration, returning defaults only if the file doesn't exist
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from the environment-selected or default location
pub fn load_config() -> Result<Config, ConfigError> {
    ConfigLoader::from_env().load_or_default()
}

// Default functions for serde
fn default_identity() -> IdentityConfig {
    let defaults = default_config().identity;
    IdentityConfig {
        system_process_name: defaults.system_process_name,
        logon_provider: defaults.logon_provider,
        revert_on_drop: defaults.revert_on_drop,
    }
}

fn default_logging() -> LoggingConfig {
    let defaults = default_config().logging;
    LoggingConfig {
        level: defaults.level,
        with_target: defaults.with_target,
    }
}

// Individual field defaults
fn default_system_process_name() -> String {
    default_config().identity.system_process_name
}

fn default_logon_provider() -> LogonProvider {
    default_config().identity.logon_provider
}

fn default_revert_on_drop() -> bool {
    default_config().identity.revert_on_drop
}

fn default_log_level() -> String {
    default_config().logging.level
}

fn default_with_target() -> bool {
    default_config().logging.with_target
}

impl Default for Config {
    fn default() -> Self {
        Config {
            identity: default_identity(),
            logging: default_logging(),
        }
    }
}
