//! Advapi32.dll bindings for access tokens, SIDs and logon

use crate::windows::utils::string_conv::string_to_wide;
use crate::windows::utils::ErrorCode;
use std::ptr;
use winapi::shared::minwindef::{DWORD, FALSE, LPVOID};
use winapi::um::processthreadsapi::{OpenProcessToken, OpenThreadToken, SetThreadToken};
use winapi::um::securitybaseapi::{
    DuplicateTokenEx, GetSidSubAuthority, GetSidSubAuthorityCount, GetTokenInformation,
    IsValidSid, SetTokenInformation,
};
use winapi::um::winbase::LogonUserW;
use winapi::um::winnt::{HANDLE, PSID};

/// Safe wrapper for OpenThreadToken
///
/// # Safety
/// `thread` must be a valid thread handle or the current-thread pseudo-handle
pub unsafe fn open_thread_token(
    thread: HANDLE,
    desired_access: u32,
    open_as_self: bool,
) -> Result<HANDLE, ErrorCode> {
    let mut token: HANDLE = ptr::null_mut();
    if OpenThreadToken(thread, desired_access, open_as_self as i32, &mut token) == FALSE {
        Err(ErrorCode::last_error())
    } else {
        Ok(token)
    }
}

/// Safe wrapper for OpenProcessToken
///
/// # Safety
/// `process` must be a valid process handle or the current-process pseudo-handle
pub unsafe fn open_process_token(process: HANDLE, desired_access: u32) -> Result<HANDLE, ErrorCode> {
    let mut token: HANDLE = ptr::null_mut();
    if OpenProcessToken(process, desired_access, &mut token) == FALSE {
        Err(ErrorCode::last_error())
    } else {
        Ok(token)
    }
}

/// Safe wrapper for DuplicateTokenEx with default security attributes
///
/// # Safety
/// `token` must be a valid token handle opened with `TOKEN_DUPLICATE`
pub unsafe fn duplicate_token_ex(
    token: HANDLE,
    desired_access: u32,
    impersonation_level: u32,
    token_type: u32,
) -> Result<HANDLE, ErrorCode> {
    let mut duplicate: HANDLE = ptr::null_mut();
    if DuplicateTokenEx(
        token,
        desired_access,
        ptr::null_mut(),
        impersonation_level,
        token_type,
        &mut duplicate,
    ) == FALSE
    {
        Err(ErrorCode::last_error())
    } else {
        Ok(duplicate)
    }
}

/// Safe wrapper for SetThreadToken; a null `token` removes impersonation
///
/// # Safety
/// `thread` must be a valid thread handle and `token` a valid impersonation token or null
pub unsafe fn set_thread_token(thread: HANDLE, token: HANDLE) -> Result<(), ErrorCode> {
    let mut thread = thread;
    if SetThreadToken(&mut thread, token) == FALSE {
        Err(ErrorCode::last_error())
    } else {
        Ok(())
    }
}

/// Safe wrapper for GetTokenInformation.
///
/// An empty `buffer` performs the sizing call.
///
/// # Safety
/// `token` must be a valid token handle opened with `TOKEN_QUERY`
pub unsafe fn get_token_information(
    token: HANDLE,
    class: u32,
    buffer: &mut [u8],
    return_length: &mut u32,
) -> Result<(), ErrorCode> {
    let data = if buffer.is_empty() {
        ptr::null_mut()
    } else {
        buffer.as_mut_ptr() as LPVOID
    };
    let mut length: DWORD = 0;
    let result = GetTokenInformation(token, class, data, buffer.len() as DWORD, &mut length);
    *return_length = length;
    if result == FALSE {
        Err(ErrorCode::last_error())
    } else {
        Ok(())
    }
}

/// Safe wrapper for SetTokenInformation
///
/// # Safety
/// `token` must be a valid token handle opened with `TOKEN_ADJUST_DEFAULT`, and
/// `buffer` a well-formed structure for `class` whose embedded pointers stay valid
pub unsafe fn set_token_information(token: HANDLE, class: u32, buffer: &[u8]) -> Result<(), ErrorCode> {
    if SetTokenInformation(token, class, buffer.as_ptr() as LPVOID, buffer.len() as DWORD) == FALSE {
        Err(ErrorCode::last_error())
    } else {
        Ok(())
    }
}

/// Number of sub-authorities of `sid`, `None` if it is not a valid SID
///
/// # Safety
/// `sid` must point into live memory holding a SID
pub unsafe fn sid_sub_authority_count(sid: PSID) -> Option<u8> {
    if sid.is_null() || IsValidSid(sid) == FALSE {
        return None;
    }
    let count = GetSidSubAuthorityCount(sid);
    if count.is_null() {
        None
    } else {
        Some(*count)
    }
}

/// Sub-authority `index` of `sid`, `None` if it is not a valid SID or out of range
///
/// # Safety
/// `sid` must point into live memory holding a SID
pub unsafe fn sid_sub_authority(sid: PSID, index: u32) -> Option<u32> {
    let count = sid_sub_authority_count(sid)?;
    if index >= u32::from(count) {
        return None;
    }
    let value = GetSidSubAuthority(sid, index);
    if value.is_null() {
        None
    } else {
        Some(*value)
    }
}

/// Safe wrapper for LogonUserW
pub fn logon_user(
    username: &str,
    domain: &str,
    password: &str,
    logon_type: u32,
    logon_provider: u32,
) -> Result<HANDLE, ErrorCode> {
    let username = string_to_wide(username);
    let domain = string_to_wide(domain);
    let password = string_to_wide(password);
    let mut token: HANDLE = ptr::null_mut();
    unsafe {
        if LogonUserW(
            username.as_ptr(),
            domain.as_ptr(),
            password.as_ptr(),
            logon_type,
            logon_provider,
            &mut token,
        ) == FALSE
        {
            Err(ErrorCode::last_error())
        } else {
            Ok(token)
        }
    }
}
