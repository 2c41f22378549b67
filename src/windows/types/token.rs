//! Token access rights and token-related enumerations

use serde::{Deserialize, Serialize};

/// Access rights requested when opening or duplicating a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessMask {
    value: u32,
}

impl AccessMask {
    /// `TOKEN_DUPLICATE`
    pub const TOKEN_DUPLICATE: Self = Self { value: 0x0002 };
    /// `TOKEN_IMPERSONATE`
    pub const TOKEN_IMPERSONATE: Self = Self { value: 0x0004 };
    /// `TOKEN_QUERY`
    pub const TOKEN_QUERY: Self = Self { value: 0x0008 };
    /// `TOKEN_ALL_ACCESS`
    pub const TOKEN_ALL_ACCESS: Self = Self { value: 0x000F_01FF };
    /// `PROCESS_QUERY_LIMITED_INFORMATION`
    pub const PROCESS_QUERY_LIMITED_INFORMATION: Self = Self { value: 0x1000 };
    /// `MAXIMUM_ALLOWED`
    pub const MAXIMUM_ALLOWED: Self = Self { value: 0x0200_0000 };

    /// Combine access rights
    pub fn combine(rights: &[Self]) -> Self {
        let mut value = 0;
        for right in rights {
            value |= right.value;
        }
        Self { value }
    }

    /// Check that every right in `other` is requested here
    pub fn contains(&self, other: Self) -> bool {
        self.value & other.value == other.value
    }

    /// Get raw value
    pub fn value(&self) -> u32 {
        self.value
    }
}

/// `TOKEN_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Primary,
    Impersonation,
}

impl TokenKind {
    /// Native `TOKEN_TYPE` value
    pub fn value(self) -> u32 {
        match self {
            TokenKind::Primary => 1,
            TokenKind::Impersonation => 2,
        }
    }
}

/// `SECURITY_IMPERSONATION_LEVEL`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImpersonationLevel {
    Anonymous,
    Identification,
    Impersonation,
    Delegation,
}

impl ImpersonationLevel {
    /// Native `SECURITY_IMPERSONATION_LEVEL` value
    pub fn value(self) -> u32 {
        match self {
            ImpersonationLevel::Anonymous => 0,
            ImpersonationLevel::Identification => 1,
            ImpersonationLevel::Impersonation => 2,
            ImpersonationLevel::Delegation => 3,
        }
    }
}

/// `TOKEN_INFORMATION_CLASS` values this crate queries or sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TokenInformationClass {
    IntegrityLevel,
}

impl TokenInformationClass {
    /// Native `TOKEN_INFORMATION_CLASS` value
    pub fn value(self) -> u32 {
        match self {
            TokenInformationClass::IntegrityLevel => 25,
        }
    }
}

/// `LOGON32_LOGON_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogonType {
    Interactive,
    /// Clones the caller's token and swaps only outbound network credentials
    NewCredentials,
}

impl LogonType {
    /// Native logon type value
    pub fn value(self) -> u32 {
        match self {
            LogonType::Interactive => 2,
            LogonType::NewCredentials => 9,
        }
    }
}

/// `LOGON32_PROVIDER_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogonProvider {
    Default,
    WinNt40,
    #[default]
    WinNt50,
}

impl LogonProvider {
    /// Native logon provider value
    pub fn value(self) -> u32 {
        match self {
            LogonProvider::Default => 0,
            LogonProvider::WinNt40 => 2,
            LogonProvider::WinNt50 => 3,
        }
    }
}
