//! Core type definitions for Identity-Manager
//!
//! Error types, the logon credential record and integrity levels shared by
//! the identity manager, its configuration and the binary.

pub mod credential;
pub mod error;
pub mod integrity;

// Re-export all public types
pub use credential::{LogonCredential, LogonSummary};
pub use error::{IdentityError, IdentityResult};
pub use integrity::IntegrityLevel;
