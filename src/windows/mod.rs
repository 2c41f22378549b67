//! Windows API layer for token management
//!
//! Handle and token types plus error codes are platform independent so the
//! identity manager can be exercised against fakes on any host. The FFI
//! bindings and [`Win32TokenApi`] only exist on Windows.

#[cfg(windows)]
pub mod api;
#[cfg(windows)]
pub mod bindings;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use types::{Handle, RawHandle, ThreadHandle};
pub use utils::ErrorCode;

#[cfg(windows)]
pub use api::Win32TokenApi;
