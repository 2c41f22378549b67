//! Windows API bindings
//!
//! Thin FFI wrappers over kernel32 and advapi32 that report failures as
//! [`ErrorCode`](crate::windows::utils::ErrorCode) values.

pub mod advapi32;
pub mod kernel32;
