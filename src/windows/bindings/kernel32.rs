//! Kernel32.dll bindings for handles, threads and process lookup

use crate::windows::utils::string_conv::wide_to_string;
use crate::windows::utils::ErrorCode;
use std::mem;
use winapi::shared::minwindef::FALSE;
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::processthreadsapi::{GetCurrentProcess, GetCurrentThread, OpenProcess};
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use winapi::um::winnt::HANDLE;

/// Pseudo-handle of the calling thread; never needs closing
pub fn current_thread() -> HANDLE {
    unsafe { GetCurrentThread() }
}

/// Pseudo-handle of the calling process; never needs closing
pub fn current_process() -> HANDLE {
    unsafe { GetCurrentProcess() }
}

/// Safe wrapper for OpenProcess
pub fn open_process(pid: u32, desired_access: u32) -> Result<HANDLE, ErrorCode> {
    unsafe {
        let handle = OpenProcess(desired_access, FALSE, pid);
        if handle.is_null() {
            Err(ErrorCode::last_error())
        } else {
            Ok(handle)
        }
    }
}

/// Safe wrapper for CloseHandle
///
/// # Safety
/// The handle must be a valid Windows handle owned by the caller
pub unsafe fn close_handle(handle: HANDLE) -> Result<(), ErrorCode> {
    if handle.is_null() {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(ErrorCode::last_error())
    } else {
        Ok(())
    }
}

/// Closes a ToolHelp snapshot on drop
struct SnapshotGuard(HANDLE);

impl Drop for SnapshotGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// PID of the first running process whose image name equals `name`, ignoring case
pub fn find_process_by_name(name: &str) -> Result<Option<u32>, ErrorCode> {
    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0);
        if snapshot.is_null() || snapshot == INVALID_HANDLE_VALUE {
            return Err(ErrorCode::last_error());
        }
        let _guard = SnapshotGuard(snapshot);

        let mut entry: PROCESSENTRY32W = mem::zeroed();
        entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as u32;

        let mut more = Process32FirstW(snapshot, &mut entry) != FALSE;
        while more {
            if wide_to_string(&entry.szExeFile).eq_ignore_ascii_case(name) {
                return Ok(Some(entry.th32ProcessID));
            }
            more = Process32NextW(snapshot, &mut entry) != FALSE;
        }
        Ok(None)
    }
}
