//! Core module containing the fundamental types of Identity-Manager

pub mod types;

// Re-export commonly used types for convenience
pub use types::{IdentityError, IdentityResult, IntegrityLevel, LogonCredential};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
