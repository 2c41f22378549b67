//! Configuration validator for Identity-Manager
//!
//! Validates configuration values before a manager is built from them.

use super::loader::{Config, ConfigError, IdentityConfig, LoggingConfig};
use crate::windows::utils::extract_filename;

/// Log levels accepted by the `[logging]` section
pub const VALID_LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_identity(&config.identity)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates identity configuration
    fn validate_identity(identity: &IdentityConfig) -> Result<(), ConfigError> {
        let name = identity.system_process_name.as_str();
        if name.is_empty() {
            return Err(ConfigError::Invalid(
                "SYSTEM process name cannot be empty".to_string(),
            ));
        }

        // Matched against bare image names from the process snapshot
        if extract_filename(name) != name {
            return Err(ConfigError::Invalid(format!(
                "SYSTEM process name must be an image name, not a path: {}",
                name
            )));
        }

        if !name.to_ascii_lowercase().ends_with(".exe") || name.len() == ".exe".len() {
            return Err(ConfigError::Invalid(format!(
                "SYSTEM process name must end in .exe: {}",
                name
            )));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, VALID_LOG_LEVELS
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
