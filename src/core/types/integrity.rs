//! Mandatory integrity levels

use serde::{Deserialize, Serialize};
use std::fmt;

/// `SECURITY_MANDATORY_UNTRUSTED_RID`
pub const SECURITY_MANDATORY_UNTRUSTED_RID: u32 = 0x0000;
/// `SECURITY_MANDATORY_LOW_RID`
pub const SECURITY_MANDATORY_LOW_RID: u32 = 0x1000;
/// `SECURITY_MANDATORY_MEDIUM_RID`
pub const SECURITY_MANDATORY_MEDIUM_RID: u32 = 0x2000;
/// `SECURITY_MANDATORY_HIGH_RID`
pub const SECURITY_MANDATORY_HIGH_RID: u32 = 0x3000;
/// `SECURITY_MANDATORY_SYSTEM_RID`
pub const SECURITY_MANDATORY_SYSTEM_RID: u32 = 0x4000;

/// Ordered privilege tier of a token
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityLevel {
    #[default]
    Untrusted,
    Low,
    Medium,
    High,
    System,
}

impl IntegrityLevel {
    /// Bucket the last sub-authority of a mandatory label SID
    pub fn from_rid(rid: u32) -> Self {
        if rid < SECURITY_MANDATORY_LOW_RID {
            IntegrityLevel::Untrusted
        } else if rid < SECURITY_MANDATORY_MEDIUM_RID {
            IntegrityLevel::Low
        } else if rid < SECURITY_MANDATORY_HIGH_RID {
            IntegrityLevel::Medium
        } else if rid < SECURITY_MANDATORY_SYSTEM_RID {
            IntegrityLevel::High
        } else {
            IntegrityLevel::System
        }
    }

    /// Well-known RID that labels a token with this level
    pub fn rid(self) -> u32 {
        match self {
            IntegrityLevel::Untrusted => SECURITY_MANDATORY_UNTRUSTED_RID,
            IntegrityLevel::Low => SECURITY_MANDATORY_LOW_RID,
            IntegrityLevel::Medium => SECURITY_MANDATORY_MEDIUM_RID,
            IntegrityLevel::High => SECURITY_MANDATORY_HIGH_RID,
            IntegrityLevel::System => SECURITY_MANDATORY_SYSTEM_RID,
        }
    }
}

impl fmt::Display for IntegrityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityLevel::Untrusted => write!(f, "Untrusted"),
            IntegrityLevel::Low => write!(f, "Low"),
            IntegrityLevel::Medium => write!(f, "Medium"),
            IntegrityLevel::High => write!(f, "High"),
            IntegrityLevel::System => write!(f, "System"),
        }
    }
}
