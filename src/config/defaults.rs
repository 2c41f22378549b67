//! Default configuration values for Identity-Manager

use crate::identity::DEFAULT_SYSTEM_PROCESS;
use crate::windows::types::LogonProvider;
use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub identity: IdentityDefaults,
    pub logging: LoggingDefaults,
}

/// Default identity manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityDefaults {
    pub system_process_name: String,
    pub logon_provider: LogonProvider,
    pub revert_on_drop: bool,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
    pub with_target: bool,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        identity: IdentityDefaults {
            system_process_name: DEFAULT_SYSTEM_PROCESS.to_string(),
            logon_provider: LogonProvider::WinNt50,
            revert_on_drop: true,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
            with_target: false,
        },
    }
}
