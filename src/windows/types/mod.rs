//! Windows-specific type definitions and wrappers

pub mod handle;
pub mod token;

// Re-export commonly used types
pub use handle::{Handle, RawHandle, ThreadHandle};
pub use token::{
    AccessMask, ImpersonationLevel, LogonProvider, LogonType, TokenInformationClass, TokenKind,
};
