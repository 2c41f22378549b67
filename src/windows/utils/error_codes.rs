//! Windows error code handling utilities

use std::fmt;

/// Common Windows error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Success,
    AccessDenied,
    InvalidHandle,
    InvalidParameter,
    InsufficientBuffer,
    NoToken,
    LogonFailure,
    BadImpersonationLevel,
    Unknown(u32),
}

impl From<u32> for ErrorCode {
    fn from(code: u32) -> Self {
        match code {
            0 => ErrorCode::Success,
            5 => ErrorCode::AccessDenied,
            6 => ErrorCode::InvalidHandle,
            87 => ErrorCode::InvalidParameter,
            122 => ErrorCode::InsufficientBuffer,
            1008 => ErrorCode::NoToken,
            1326 => ErrorCode::LogonFailure,
            1346 => ErrorCode::BadImpersonationLevel,
            _ => ErrorCode::Unknown(code),
        }
    }
}

impl From<ErrorCode> for u32 {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Success => 0,
            ErrorCode::AccessDenied => 5,
            ErrorCode::InvalidHandle => 6,
            ErrorCode::InvalidParameter => 87,
            ErrorCode::InsufficientBuffer => 122,
            ErrorCode::NoToken => 1008,
            ErrorCode::LogonFailure => 1326,
            ErrorCode::BadImpersonationLevel => 1346,
            ErrorCode::Unknown(code) => code,
        }
    }
}

impl ErrorCode {
    /// Get the last Windows error of the calling thread
    #[cfg(windows)]
    pub fn last_error() -> Self {
        unsafe { ErrorCode::from(winapi::um::errhandlingapi::GetLastError()) }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Success => write!(f, "Success"),
            ErrorCode::AccessDenied => write!(f, "Access denied"),
            ErrorCode::InvalidHandle => write!(f, "Invalid handle"),
            ErrorCode::InvalidParameter => write!(f, "Invalid parameter"),
            ErrorCode::InsufficientBuffer => write!(f, "Insufficient buffer"),
            ErrorCode::NoToken => write!(f, "No token"),
            ErrorCode::LogonFailure => write!(f, "Logon failure"),
            ErrorCode::BadImpersonationLevel => write!(f, "Bad impersonation level"),
            ErrorCode::Unknown(code) => write!(f, "Unknown error: {}", code),
        }
    }
}
