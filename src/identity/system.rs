//! Acquisition of a SYSTEM impersonation token

use crate::core::types::{IdentityError, IdentityResult, IntegrityLevel};
use crate::identity::api::Process;
use crate::identity::manager::{duplicate_for_impersonation, failed, IdentityManager};
use crate::windows::types::{AccessMask, Handle};
use tracing::{debug, info};

impl IdentityManager {
    /// Duplicate the token of the configured SYSTEM process.
    ///
    /// Only attempted when the current identity runs at exactly `High`
    /// integrity. The returned handle is owned by the caller; every
    /// intermediate handle is closed before returning.
    pub fn get_system(&self) -> IdentityResult<Handle> {
        let level = self.integrity_level();
        if level != IntegrityLevel::High {
            debug!(%level, "not eligible for a SYSTEM token");
            return Err(IdentityError::SystemIneligible(level));
        }

        let name = self.options.system_process_name.as_str();
        let pid = self
            .api
            .find_process_by_name(name)
            .map_err(failed("CreateToolhelp32Snapshot"))?
            .ok_or_else(|| IdentityError::ProcessNotFound(name.to_string()))?;
        debug!(process = name, pid, "found SYSTEM process");

        let process = self
            .api
            .open_process(pid, AccessMask::PROCESS_QUERY_LIMITED_INFORMATION)
            .map(|raw| Handle::new(self.api.clone(), raw))
            .map_err(failed("OpenProcess"))?;

        let access = AccessMask::combine(&[AccessMask::TOKEN_DUPLICATE, AccessMask::TOKEN_QUERY]);
        let process_token = self
            .api
            .open_process_token(Process::Handle(process.as_raw()), access)
            .map(|raw| Handle::new(self.api.clone(), raw))
            .map_err(failed("OpenProcessToken"))?;

        let duplicate = duplicate_for_impersonation(self.api.as_ref(), process_token.as_raw())
            .map(|raw| Handle::new(self.api.clone(), raw))
            .map_err(failed("DuplicateTokenEx"))?;
        if duplicate.is_null() {
            return Err(IdentityError::InvalidHandle(
                "DuplicateTokenEx returned a null token".to_string(),
            ));
        }

        info!(pid, token = duplicate.value(), "acquired SYSTEM token");
        Ok(duplicate)
    }
}
