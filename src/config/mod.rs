//! Configuration module for Identity-Manager
//!
//! Provides configuration loading, validation, and default settings
//! for the identity manager and the probe binary.

mod defaults;
mod loader;
mod validator;

pub use defaults::{default_config, ConfigDefaults};
pub use loader::{load_config, ConfigLoader, CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE};
pub use validator::{validate_config, ConfigValidator, VALID_LOG_LEVELS};

// Re-export the configuration structures
pub use loader::{Config, IdentityConfig, LoggingConfig};

// Configuration-related error type
pub use loader::ConfigError;

// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;
