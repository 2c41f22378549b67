//! Per-thread security context: baseline capture, identity switching, revert

use crate::config::{validate_config, Config};
use crate::core::types::{IdentityError, IdentityResult, LogonCredential};
use crate::identity::api::{Process, TokenApi};
use crate::identity::token::{Identity, IdentityOrigin};
use crate::windows::types::{
    AccessMask, Handle, ImpersonationLevel, LogonProvider, RawHandle, ThreadHandle, TokenKind,
};
use crate::windows::utils::ErrorCode;
use std::mem;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Default image name of a process running as `NT AUTHORITY\SYSTEM`
pub const DEFAULT_SYSTEM_PROCESS: &str = "winlogon.exe";

/// Options for an [`IdentityManager`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Process whose token is duplicated by [`IdentityManager::get_system`]
    pub system_process_name: String,
    /// Provider passed to `LogonUserW`
    pub logon_provider: LogonProvider,
    /// Restore the baseline token when the manager is dropped mid-impersonation
    pub revert_on_drop: bool,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        ManagerOptions {
            system_process_name: DEFAULT_SYSTEM_PROCESS.to_string(),
            logon_provider: LogonProvider::WinNt50,
            revert_on_drop: true,
        }
    }
}

/// Owns the security context of one thread.
///
/// The thread is fixed at construction. The manager is `!Send` and `!Sync`,
/// so every operation runs on the thread that created it.
pub struct IdentityManager {
    pub(crate) api: Rc<dyn TokenApi>,
    pub(crate) options: ManagerOptions,
    thread: ThreadHandle,
    original_identity: Identity,
    original_primary: Handle,
    current_primary: Identity,
    current_impersonation: Identity,
    stored_credential: Option<LogonCredential>,
    is_impersonating: bool,
}

/// Map a native failure to an error, logging it
pub(crate) fn failed(operation: &'static str) -> impl FnOnce(ErrorCode) -> IdentityError {
    move |code| {
        warn!(operation, %code, "native call failed");
        IdentityError::os(operation, code)
    }
}

/// Duplicate `token` as an impersonation token with maximum allowed access
pub(crate) fn duplicate_for_impersonation(
    api: &dyn TokenApi,
    token: &RawHandle,
) -> Result<RawHandle, ErrorCode> {
    api.duplicate_token(
        token,
        AccessMask::MAXIMUM_ALLOWED,
        ImpersonationLevel::Impersonation,
        TokenKind::Impersonation,
    )
}

impl IdentityManager {
    /// Capture the calling thread and its baseline tokens.
    ///
    /// Fails only when no usable baseline token can be established.
    pub fn new(api: Rc<dyn TokenApi>, options: ManagerOptions) -> IdentityResult<Self> {
        let thread = api.current_thread();
        let impersonation_baseline = Self::impersonation_baseline(&api, &thread)?;
        let original_primary = Self::primary_baseline(&api, &thread)?;
        let original_identity = Identity::wrap(
            impersonation_baseline,
            TokenKind::Impersonation,
            IdentityOrigin::Baseline,
        )?;

        debug!(
            thread = thread.value(),
            impersonation = original_identity.token().value(),
            primary = original_primary.value(),
            "captured baseline tokens"
        );

        Ok(IdentityManager {
            api,
            options,
            thread,
            current_primary: original_identity.clone(),
            current_impersonation: original_identity.clone(),
            original_identity,
            original_primary,
            stored_credential: None,
            is_impersonating: false,
        })
    }

    /// Create a manager with default options
    pub fn with_defaults(api: Rc<dyn TokenApi>) -> IdentityResult<Self> {
        Self::new(api, ManagerOptions::default())
    }

    /// Validate `config` and create a manager from its `[identity]` section.
    ///
    /// An invalid configuration fails before any token is opened.
    pub fn from_config(api: Rc<dyn TokenApi>, config: &Config) -> IdentityResult<Self> {
        validate_config(config)?;
        Self::new(api, ManagerOptions::from(&config.identity))
    }

    /// Thread token if present, else an impersonation duplicate of the process token
    fn impersonation_baseline(
        api: &Rc<dyn TokenApi>,
        thread: &ThreadHandle,
    ) -> IdentityResult<Handle> {
        let token = match api.open_thread_token(thread, AccessMask::TOKEN_ALL_ACCESS, true) {
            Ok(raw) => Handle::new(api.clone(), raw),
            Err(ErrorCode::NoToken) => {
                debug!("thread has no token, duplicating the process token");
                let process_token = api
                    .open_process_token(Process::Current, AccessMask::TOKEN_ALL_ACCESS)
                    .map(|raw| Handle::new(api.clone(), raw))
                    .map_err(|code| {
                        IdentityError::baseline(format!("OpenProcessToken failed: {}", code))
                    })?;
                duplicate_for_impersonation(api.as_ref(), process_token.as_raw())
                    .map(|raw| Handle::new(api.clone(), raw))
                    .map_err(|code| {
                        IdentityError::baseline(format!("DuplicateTokenEx failed: {}", code))
                    })?
            }
            Err(code) => {
                return Err(IdentityError::baseline(format!(
                    "OpenThreadToken failed: {}",
                    code
                )))
            }
        };

        if token.is_null() {
            Self::current_identity_token(api)
        } else {
            Ok(token)
        }
    }

    /// Thread token if present, else the process token
    fn primary_baseline(api: &Rc<dyn TokenApi>, thread: &ThreadHandle) -> IdentityResult<Handle> {
        let raw = match api.open_thread_token(thread, AccessMask::TOKEN_ALL_ACCESS, true) {
            Ok(raw) => raw,
            Err(ErrorCode::NoToken) => api
                .open_process_token(Process::Current, AccessMask::TOKEN_ALL_ACCESS)
                .map_err(|code| {
                    IdentityError::baseline(format!("OpenProcessToken failed: {}", code))
                })?,
            Err(code) => {
                return Err(IdentityError::baseline(format!(
                    "OpenThreadToken failed: {}",
                    code
                )))
            }
        };

        let token = Handle::new(api.clone(), raw);
        if token.is_null() {
            Self::current_identity_token(api)
        } else {
            Ok(token)
        }
    }

    /// Token of the identity the process runs as, used when a baseline open yields null
    fn current_identity_token(api: &Rc<dyn TokenApi>) -> IdentityResult<Handle> {
        debug!("baseline open returned a null token, falling back to the current identity");
        let access = AccessMask::combine(&[
            AccessMask::TOKEN_QUERY,
            AccessMask::TOKEN_DUPLICATE,
            AccessMask::TOKEN_IMPERSONATE,
        ]);
        let token = api
            .open_process_token(Process::Current, access)
            .map(|raw| Handle::new(api.clone(), raw))
            .map_err(|code| IdentityError::baseline(format!("OpenProcessToken failed: {}", code)))?;
        if token.is_null() {
            return Err(IdentityError::baseline("no usable token for the current identity"));
        }
        Ok(token)
    }

    /// No identity switch is in effect
    pub fn is_original_identity(&self) -> bool {
        !self.is_impersonating
    }

    /// Log on with `credential` and impersonate the result on the managed thread.
    ///
    /// Any active impersonation is reverted first. On failure the thread is
    /// back on its baseline token and no handle obtained here stays open.
    pub fn set_identity(&mut self, credential: LogonCredential) -> IdentityResult<()> {
        info!(
            account = %credential.account_name(),
            net_only = credential.net_only,
            "switching identity"
        );
        self.revert();

        let logon_type = credential.logon_type();
        let stored = self.stored_credential.insert(credential);
        let logon = self.api.logon_user(
            &stored.username,
            &stored.domain,
            &stored.password,
            logon_type,
            self.options.logon_provider,
        );
        let primary_raw = match logon {
            Ok(raw) => raw,
            Err(code) => {
                self.stored_credential = None;
                return Err(failed("LogonUserW")(code));
            }
        };
        debug!(token = primary_raw.value(), ?logon_type, "logon succeeded");

        let primary = Handle::new(self.api.clone(), primary_raw);
        self.current_primary =
            match Identity::wrap(primary, TokenKind::Primary, IdentityOrigin::Logon) {
                Ok(identity) => identity,
                Err(err) => {
                    self.revert();
                    return Err(err);
                }
            };

        let duplicate =
            match duplicate_for_impersonation(self.api.as_ref(), self.current_primary.token()) {
                Ok(raw) => Handle::new(self.api.clone(), raw),
                Err(code) => {
                    let err = failed("DuplicateTokenEx")(code);
                    self.revert();
                    return Err(err);
                }
            };
        debug!(token = duplicate.value(), "duplicated impersonation token");

        // Owned before installation so a later release cannot race the install
        self.current_impersonation =
            match Identity::wrap(duplicate, TokenKind::Impersonation, IdentityOrigin::Logon) {
                Ok(identity) => identity,
                Err(err) => {
                    self.revert();
                    return Err(err);
                }
            };

        if let Err(code) = self
            .api
            .set_thread_token(&self.thread, Some(self.current_impersonation.token()))
        {
            let err = failed("SetThreadToken")(code);
            self.current_impersonation = self.original_identity.clone();
            self.revert();
            return Err(err);
        }

        self.is_impersonating = true;
        info!(
            token = self.current_impersonation.token().value(),
            "impersonation applied"
        );
        Ok(())
    }

    /// Replace the primary identity without installing anything
    pub fn set_primary_identity(&mut self, identity: Identity) {
        self.current_primary = identity;
        self.is_impersonating = true;
    }

    /// Take ownership of `token` as the primary identity
    pub fn set_primary_token(&mut self, token: Handle) -> IdentityResult<()> {
        let identity = Identity::wrap(token, TokenKind::Primary, IdentityOrigin::Supplied)?;
        self.set_primary_identity(identity);
        Ok(())
    }

    /// Replace the impersonation identity without installing it.
    ///
    /// The caller is responsible for the thread actually running as `identity`.
    pub fn set_impersonation_identity(&mut self, identity: Identity) {
        self.current_impersonation = identity;
        self.is_impersonating = true;
    }

    /// Take ownership of `token` as the impersonation identity
    pub fn set_impersonation_token(&mut self, token: Handle) -> IdentityResult<()> {
        let identity = Identity::wrap(token, TokenKind::Impersonation, IdentityOrigin::Supplied)?;
        self.set_impersonation_identity(identity);
        Ok(())
    }

    /// Move a raw handle into an identity owned by this manager's capability layer
    pub fn wrap_token(&self, raw: RawHandle, kind: TokenKind) -> IdentityResult<Identity> {
        Identity::wrap(
            Handle::new(self.api.clone(), raw),
            kind,
            IdentityOrigin::Supplied,
        )
    }

    /// Reinstall the baseline token and drop any switched identity. Idempotent.
    pub fn revert(&mut self) {
        if let Err(code) = self
            .api
            .set_thread_token(&self.thread, Some(self.original_identity.token()))
        {
            warn!(%code, "failed to reinstall the baseline impersonation token");
        }
        self.stored_credential = None;

        let previous = mem::replace(
            &mut self.current_impersonation,
            self.original_identity.clone(),
        );
        if !previous.same_as(&self.original_identity) {
            debug!(
                token = previous.token().value(),
                "releasing impersonation identity"
            );
        }
        drop(previous);

        self.current_primary = self.original_identity.clone();
        self.is_impersonating = false;
    }

    /// The identity OS calls on the managed thread observe
    pub fn current(&self) -> &Identity {
        &self.current_impersonation
    }

    pub fn original(&self) -> &Identity {
        &self.original_identity
    }

    pub fn current_primary_identity(&self) -> &Identity {
        &self.current_primary
    }

    pub fn current_impersonation_identity(&self) -> &Identity {
        &self.current_impersonation
    }

    /// The stored credential, if both username and password are set
    pub fn current_logon_information(&self) -> Option<&LogonCredential> {
        self.stored_credential
            .as_ref()
            .filter(|credential| credential.is_complete())
    }

    /// Token reinstalled by [`revert`](Self::revert)
    pub fn original_impersonation_token(&self) -> &RawHandle {
        self.original_identity.token()
    }

    pub fn original_primary_token(&self) -> &RawHandle {
        self.original_primary.as_raw()
    }

    pub fn thread(&self) -> &ThreadHandle {
        &self.thread
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }
}

impl Drop for IdentityManager {
    fn drop(&mut self) {
        if self.options.revert_on_drop && self.is_impersonating {
            debug!("reverting impersonation on teardown");
            self.revert();
        }
    }
}
