//! Integrity level classification and labelling of the impersonation token

use crate::core::types::{IdentityError, IdentityResult, IntegrityLevel};
use crate::identity::api::TokenApi;
use crate::identity::buffer::TokenInfoBuffer;
use crate::identity::manager::{failed, IdentityManager};
use crate::windows::types::{RawHandle, TokenInformationClass};
use tracing::{debug, info};

/// Last sub-authority of `token`'s mandatory label SID
pub(crate) fn integrity_rid(api: &dyn TokenApi, token: &RawHandle) -> IdentityResult<u32> {
    let buffer = TokenInfoBuffer::query(api, token, TokenInformationClass::IntegrityLevel)?;
    let sid = buffer.label_sid()?;

    let count = api
        .sid_sub_authority_count(sid)
        .ok_or_else(|| IdentityError::malformed("label SID is not valid"))?;
    if count == 0 {
        return Err(IdentityError::malformed("label SID has no sub-authorities"));
    }
    // `buffer` keeps the SID alive until here
    api.sid_sub_authority(sid, u32::from(count) - 1)
        .ok_or_else(|| IdentityError::malformed("label SID sub-authority out of range"))
}

impl IdentityManager {
    /// Integrity level of the current impersonation identity.
    ///
    /// A level that cannot be determined is reported as `Untrusted`.
    pub fn integrity_level(&self) -> IntegrityLevel {
        match integrity_rid(self.api.as_ref(), self.current().token()) {
            Ok(rid) => {
                let level = IntegrityLevel::from_rid(rid);
                debug!(rid, %level, "classified impersonation token");
                level
            }
            Err(err) => {
                debug!(%err, "integrity level indeterminate");
                IntegrityLevel::Untrusted
            }
        }
    }

    /// Label the current impersonation token with `level`
    pub fn set_integrity_level(&mut self, level: IntegrityLevel) -> IdentityResult<()> {
        let label = TokenInfoBuffer::mandatory_label(level.rid());
        self.api
            .set_token_information(
                self.current().token(),
                TokenInformationClass::IntegrityLevel,
                label.as_bytes(),
            )
            .map_err(failed("SetTokenInformation"))?;
        info!(%level, "integrity level applied to impersonation token");
        Ok(())
    }
}
