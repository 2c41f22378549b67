//! Identity-Manager: per-thread Windows security identity management
//!
//! Tracks the identity a thread acts as, switches it through logon and
//! impersonation, reverts to the captured baseline, classifies integrity
//! levels and acquires SYSTEM tokens. Native calls are injected through
//! [`identity::TokenApi`], implemented for Windows by
//! `windows::Win32TokenApi`.

pub mod config;
pub mod core;
pub mod identity;
pub mod windows;

// Re-export main types
pub use crate::core::types::{
    IdentityError, IdentityResult, IntegrityLevel, LogonCredential, LogonSummary,
};
pub use crate::identity::{
    Identity, IdentityManager, IdentityOrigin, IdentitySnapshot, ManagerOptions, TokenApi,
};
pub use crate::windows::types::{Handle, RawHandle, ThreadHandle, TokenKind};
pub use crate::windows::utils::ErrorCode;

// Re-export core directly for full access
pub use crate::core::{AUTHORS, VERSION};
