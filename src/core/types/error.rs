//! Custom error types for Identity-Manager

use crate::config::ConfigError;
use crate::core::types::IntegrityLevel;
use crate::windows::utils::ErrorCode;
use thiserror::Error;

/// Main error type for identity operations
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Failed to establish baseline token: {0}")]
    Baseline(String),

    #[error("{operation} failed: {code}")]
    Os {
        operation: &'static str,
        code: ErrorCode,
    },

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("SYSTEM token requires High integrity, current level is {0}")]
    SystemIneligible(IntegrityLevel),

    #[error("Malformed token information: {0}")]
    MalformedTokenInformation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for identity operations
pub type IdentityResult<T> = Result<T, IdentityError>;

impl IdentityError {
    /// Creates an error for a failed native call
    pub fn os(operation: &'static str, code: ErrorCode) -> Self {
        IdentityError::Os { operation, code }
    }

    /// Creates a construction-fatal baseline error
    pub fn baseline(reason: impl Into<String>) -> Self {
        IdentityError::Baseline(reason.into())
    }

    /// Creates a malformed token information error
    pub fn malformed(reason: impl Into<String>) -> Self {
        IdentityError::MalformedTokenInformation(reason.into())
    }

    /// Native error code carried by this error, if any
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            IdentityError::Os { code, .. } => Some(*code),
            _ => None,
        }
    }
}
