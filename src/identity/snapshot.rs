//! Serializable view of a manager's security context

use crate::core::types::{IntegrityLevel, LogonSummary};
use crate::identity::manager::IdentityManager;
use crate::identity::token::IdentityOrigin;
use serde::Serialize;

/// Point-in-time state of an [`IdentityManager`]. Never carries a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentitySnapshot {
    pub is_original: bool,
    pub integrity_level: IntegrityLevel,
    pub primary_origin: IdentityOrigin,
    pub impersonation_origin: IdentityOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logon: Option<LogonSummary>,
}

impl IdentityManager {
    pub fn snapshot(&self) -> IdentitySnapshot {
        IdentitySnapshot {
            is_original: self.is_original_identity(),
            integrity_level: self.integrity_level(),
            primary_origin: self.current_primary_identity().origin(),
            impersonation_origin: self.current_impersonation_identity().origin(),
            logon: self.current_logon_information().map(LogonSummary::from),
        }
    }
}
