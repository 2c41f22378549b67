//! Logon credential record

use crate::windows::types::LogonType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Plaintext-equivalent logon credential accepted by
/// [`IdentityManager::set_identity`](crate::identity::IdentityManager::set_identity).
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogonCredential {
    pub username: String,
    pub domain: String,
    pub password: String,
    /// Swap only outbound network credentials, keeping the local session
    #[serde(default)]
    pub net_only: bool,
}

impl LogonCredential {
    /// Create a new credential
    pub fn new(
        username: impl Into<String>,
        domain: impl Into<String>,
        password: impl Into<String>,
        net_only: bool,
    ) -> Self {
        LogonCredential {
            username: username.into(),
            domain: domain.into(),
            password: password.into(),
            net_only,
        }
    }

    /// Logon type implied by the `net_only` flag
    pub fn logon_type(&self) -> LogonType {
        if self.net_only {
            LogonType::NewCredentials
        } else {
            LogonType::Interactive
        }
    }

    /// Both username and password are present
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// `DOMAIN\user`, or just `user` when the domain is empty
    pub fn account_name(&self) -> String {
        if self.domain.is_empty() {
            self.username.clone()
        } else {
            format!("{}\\{}", self.domain, self.username)
        }
    }
}

impl fmt::Debug for LogonCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogonCredential")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("password", &"<redacted>")
            .field("net_only", &self.net_only)
            .finish()
    }
}

/// Credential view that is safe to serialize
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogonSummary {
    pub account: String,
    pub net_only: bool,
}

impl From<&LogonCredential> for LogonSummary {
    fn from(credential: &LogonCredential) -> Self {
        LogonSummary {
            account: credential.account_name(),
            net_only: credential.net_only,
        }
    }
}
