//! Native capability surface consumed by the identity manager
//!
//! Every OS primitive the manager touches goes through [`TokenApi`]. The
//! production implementation is [`Win32TokenApi`](crate::windows::Win32TokenApi);
//! tests inject fakes that count handles and record calls.

use crate::windows::types::{
    AccessMask, ImpersonationLevel, LogonProvider, LogonType, RawHandle, ThreadHandle,
    TokenInformationClass, TokenKind,
};
use crate::windows::utils::ErrorCode;

/// Process whose primary token is opened
#[derive(Debug, Clone, Copy)]
pub enum Process<'a> {
    /// The calling process (pseudo-handle, never closed)
    Current,
    /// A process handle obtained from [`TokenApi::open_process`]
    Handle(&'a RawHandle),
}

/// Address of a SID inside a token information buffer.
///
/// Only meaningful while the buffer it was read from is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidPtr(pub usize);

impl SidPtr {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Native calls the identity manager depends on.
///
/// Calls are attempted once; a failure is reported as the OS error code.
pub trait TokenApi {
    /// Pseudo-handle of the calling thread
    fn current_thread(&self) -> ThreadHandle;

    /// `OpenThreadToken`
    fn open_thread_token(
        &self,
        thread: &ThreadHandle,
        access: AccessMask,
        open_as_self: bool,
    ) -> Result<RawHandle, ErrorCode>;

    /// `OpenProcessToken`
    fn open_process_token(
        &self,
        process: Process<'_>,
        access: AccessMask,
    ) -> Result<RawHandle, ErrorCode>;

    /// `DuplicateTokenEx`
    fn duplicate_token(
        &self,
        token: &RawHandle,
        access: AccessMask,
        level: ImpersonationLevel,
        kind: TokenKind,
    ) -> Result<RawHandle, ErrorCode>;

    /// `SetThreadToken`; `None` removes the thread's impersonation token
    fn set_thread_token(
        &self,
        thread: &ThreadHandle,
        token: Option<&RawHandle>,
    ) -> Result<(), ErrorCode>;

    /// `CloseHandle`
    fn close_handle(&self, handle: RawHandle) -> Result<(), ErrorCode>;

    /// `GetTokenInformation`.
    ///
    /// `return_length` receives the number of bytes written, or the number
    /// required when the call fails with [`ErrorCode::InsufficientBuffer`].
    fn get_token_information(
        &self,
        token: &RawHandle,
        class: TokenInformationClass,
        buffer: &mut [u8],
        return_length: &mut u32,
    ) -> Result<(), ErrorCode>;

    /// `SetTokenInformation`
    fn set_token_information(
        &self,
        token: &RawHandle,
        class: TokenInformationClass,
        buffer: &[u8],
    ) -> Result<(), ErrorCode>;

    /// `*GetSidSubAuthorityCount`, `None` if the SID is not valid
    fn sid_sub_authority_count(&self, sid: SidPtr) -> Option<u8>;

    /// `*GetSidSubAuthority`, `None` if the SID is not valid
    fn sid_sub_authority(&self, sid: SidPtr, index: u32) -> Option<u32>;

    /// `LogonUserW`
    fn logon_user(
        &self,
        username: &str,
        domain: &str,
        password: &str,
        logon_type: LogonType,
        provider: LogonProvider,
    ) -> Result<RawHandle, ErrorCode>;

    /// PID of the first running process with this image name (case-insensitive)
    fn find_process_by_name(&self, name: &str) -> Result<Option<u32>, ErrorCode>;

    /// `OpenProcess`
    fn open_process(&self, pid: u32, access: AccessMask) -> Result<RawHandle, ErrorCode>;
}
