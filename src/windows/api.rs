//! Production capability layer over the Win32 API

use crate::identity::api::{Process, SidPtr, TokenApi};
use crate::windows::bindings::{advapi32, kernel32};
use crate::windows::types::{
    AccessMask, ImpersonationLevel, LogonProvider, LogonType, RawHandle, ThreadHandle,
    TokenInformationClass, TokenKind,
};
use crate::windows::utils::ErrorCode;
use winapi::um::winnt::{HANDLE, PSID};

fn to_native(handle: &RawHandle) -> HANDLE {
    handle.value() as HANDLE
}

fn from_native(handle: HANDLE) -> RawHandle {
    RawHandle::from_raw(handle as usize)
}

/// [`TokenApi`] backed by kernel32 and advapi32
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32TokenApi;

impl Win32TokenApi {
    pub fn new() -> Self {
        Win32TokenApi
    }
}

impl TokenApi for Win32TokenApi {
    fn current_thread(&self) -> ThreadHandle {
        ThreadHandle::from_raw(kernel32::current_thread() as usize)
    }

    fn open_thread_token(
        &self,
        thread: &ThreadHandle,
        access: AccessMask,
        open_as_self: bool,
    ) -> Result<RawHandle, ErrorCode> {
        unsafe {
            advapi32::open_thread_token(thread.value() as HANDLE, access.value(), open_as_self)
                .map(from_native)
        }
    }

    fn open_process_token(
        &self,
        process: Process<'_>,
        access: AccessMask,
    ) -> Result<RawHandle, ErrorCode> {
        let process = match process {
            Process::Current => kernel32::current_process(),
            Process::Handle(handle) => to_native(handle),
        };
        unsafe { advapi32::open_process_token(process, access.value()).map(from_native) }
    }

    fn duplicate_token(
        &self,
        token: &RawHandle,
        access: AccessMask,
        level: ImpersonationLevel,
        kind: TokenKind,
    ) -> Result<RawHandle, ErrorCode> {
        unsafe {
            advapi32::duplicate_token_ex(to_native(token), access.value(), level.value(), kind.value())
                .map(from_native)
        }
    }

    fn set_thread_token(
        &self,
        thread: &ThreadHandle,
        token: Option<&RawHandle>,
    ) -> Result<(), ErrorCode> {
        let token = token.map_or(std::ptr::null_mut(), to_native);
        unsafe { advapi32::set_thread_token(thread.value() as HANDLE, token) }
    }

    fn close_handle(&self, handle: RawHandle) -> Result<(), ErrorCode> {
        unsafe { kernel32::close_handle(to_native(&handle)) }
    }

    fn get_token_information(
        &self,
        token: &RawHandle,
        class: TokenInformationClass,
        buffer: &mut [u8],
        return_length: &mut u32,
    ) -> Result<(), ErrorCode> {
        unsafe {
            advapi32::get_token_information(to_native(token), class.value(), buffer, return_length)
        }
    }

    fn set_token_information(
        &self,
        token: &RawHandle,
        class: TokenInformationClass,
        buffer: &[u8],
    ) -> Result<(), ErrorCode> {
        unsafe { advapi32::set_token_information(to_native(token), class.value(), buffer) }
    }

    fn sid_sub_authority_count(&self, sid: SidPtr) -> Option<u8> {
        unsafe { advapi32::sid_sub_authority_count(sid.0 as PSID) }
    }

    fn sid_sub_authority(&self, sid: SidPtr, index: u32) -> Option<u32> {
        unsafe { advapi32::sid_sub_authority(sid.0 as PSID, index) }
    }

    fn logon_user(
        &self,
        username: &str,
        domain: &str,
        password: &str,
        logon_type: LogonType,
        provider: LogonProvider,
    ) -> Result<RawHandle, ErrorCode> {
        advapi32::logon_user(username, domain, password, logon_type.value(), provider.value())
            .map(from_native)
    }

    fn find_process_by_name(&self, name: &str) -> Result<Option<u32>, ErrorCode> {
        kernel32::find_process_by_name(name)
    }

    fn open_process(&self, pid: u32, access: AccessMask) -> Result<RawHandle, ErrorCode> {
        kernel32::open_process(pid, access.value()).map(from_native)
    }
}
