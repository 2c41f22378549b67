//! Handle-counting capability layer for unit tests.
//!
//! Shares its method names and issued-by tags with the integration-test
//! fake in `tests/common`.

use crate::core::types::integrity::{SECURITY_MANDATORY_MEDIUM_RID, SECURITY_MANDATORY_SYSTEM_RID};
use crate::identity::api::{Process, SidPtr, TokenApi};
use crate::identity::buffer::MANDATORY_LABEL_SID_OFFSET;
use crate::windows::types::{
    AccessMask, ImpersonationLevel, LogonProvider, LogonType, RawHandle, ThreadHandle,
    TokenInformationClass, TokenKind,
};
use crate::windows::utils::ErrorCode;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::mem::size_of;

#[derive(Clone)]
struct Entry {
    issued_by: &'static str,
    rid: u32,
}

struct State {
    next: usize,
    live: HashMap<usize, Entry>,
    closed: Vec<usize>,
    installed: Option<usize>,
    calls: Vec<&'static str>,
    thread_token: bool,
    thread_error: Option<ErrorCode>,
    // opens succeed but hand back a null token
    null_thread_token: bool,
    null_process_token: bool,
    process_rid: u32,
    sizing_error: Option<ErrorCode>,
    failures: HashSet<&'static str>,
    processes: Vec<(&'static str, u32)>,
}

pub(crate) struct FakeApi {
    state: RefCell<State>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        FakeApi {
            state: RefCell::new(State {
                next: 0x100,
                live: HashMap::new(),
                closed: Vec::new(),
                installed: None,
                calls: Vec::new(),
                thread_token: false,
                thread_error: None,
                null_thread_token: false,
                null_process_token: false,
                process_rid: SECURITY_MANDATORY_MEDIUM_RID,
                sizing_error: None,
                failures: HashSet::new(),
                processes: vec![("winlogon.exe", 612)],
            }),
        }
    }

    pub(crate) fn with_thread_token(self) -> Self {
        self.state.borrow_mut().thread_token = true;
        self
    }

    pub(crate) fn with_thread_error(self, code: ErrorCode) -> Self {
        self.state.borrow_mut().thread_error = Some(code);
        self
    }

    pub(crate) fn with_null_thread_token(self) -> Self {
        self.state.borrow_mut().null_thread_token = true;
        self
    }

    pub(crate) fn with_null_process_token(self) -> Self {
        self.state.borrow_mut().null_process_token = true;
        self
    }

    pub(crate) fn with_rid(self, rid: u32) -> Self {
        self.state.borrow_mut().process_rid = rid;
        self
    }

    pub(crate) fn with_sizing_error(self, code: ErrorCode) -> Self {
        self.state.borrow_mut().sizing_error = Some(code);
        self
    }

    /// Fail every future invocation of `call`
    pub(crate) fn fail_always(&self, call: &'static str) {
        self.state.borrow_mut().failures.insert(call);
    }

    /// Call that issued a still-live handle
    pub(crate) fn issued_by(&self, handle: usize) -> Option<&'static str> {
        self.state
            .borrow()
            .live
            .get(&handle)
            .map(|entry| entry.issued_by)
    }

    pub(crate) fn live(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub(crate) fn closed(&self) -> Vec<usize> {
        self.state.borrow().closed.clone()
    }

    pub(crate) fn installed(&self) -> Option<usize> {
        self.state.borrow().installed
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn record(&self, call: &'static str) -> Result<(), ErrorCode> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if state.failures.contains(call) {
            Err(ErrorCode::AccessDenied)
        } else {
            Ok(())
        }
    }

    fn issue(&self, issued_by: &'static str, rid: u32) -> RawHandle {
        let mut state = self.state.borrow_mut();
        state.next += 4;
        let value = state.next;
        state.live.insert(value, Entry { issued_by, rid });
        RawHandle::from_raw(value)
    }

    fn lookup(&self, handle: &RawHandle) -> Result<Entry, ErrorCode> {
        self.state
            .borrow()
            .live
            .get(&handle.value())
            .cloned()
            .ok_or(ErrorCode::InvalidHandle)
    }
}

impl TokenApi for FakeApi {
    fn current_thread(&self) -> ThreadHandle {
        ThreadHandle::from_raw(usize::MAX - 1)
    }

    fn open_thread_token(
        &self,
        _thread: &ThreadHandle,
        _access: AccessMask,
        _open_as_self: bool,
    ) -> Result<RawHandle, ErrorCode> {
        self.record("open_thread_token")?;
        let (error, null, has_token, rid) = {
            let state = self.state.borrow();
            (
                state.thread_error,
                state.null_thread_token,
                state.thread_token,
                state.process_rid,
            )
        };
        if let Some(code) = error {
            return Err(code);
        }
        if null {
            Ok(RawHandle::null())
        } else if has_token {
            Ok(self.issue("open_thread_token", rid))
        } else {
            Err(ErrorCode::NoToken)
        }
    }

    fn open_process_token(
        &self,
        process: Process<'_>,
        _access: AccessMask,
    ) -> Result<RawHandle, ErrorCode> {
        self.record("open_process_token")?;
        let rid = match process {
            Process::Current => {
                let state = self.state.borrow();
                if state.null_process_token {
                    return Ok(RawHandle::null());
                }
                state.process_rid
            }
            Process::Handle(handle) => self.lookup(handle)?.rid,
        };
        Ok(self.issue("open_process_token", rid))
    }

    fn duplicate_token(
        &self,
        token: &RawHandle,
        _access: AccessMask,
        _level: ImpersonationLevel,
        _kind: TokenKind,
    ) -> Result<RawHandle, ErrorCode> {
        self.record("duplicate_token")?;
        let entry = self.lookup(token)?;
        Ok(self.issue("duplicate_token", entry.rid))
    }

    fn set_thread_token(
        &self,
        _thread: &ThreadHandle,
        token: Option<&RawHandle>,
    ) -> Result<(), ErrorCode> {
        self.record("set_thread_token")?;
        if let Some(token) = token {
            self.lookup(token)?;
        }
        self.state.borrow_mut().installed = token.map(RawHandle::value);
        Ok(())
    }

    fn close_handle(&self, handle: RawHandle) -> Result<(), ErrorCode> {
        self.record("close_handle")?;
        let mut state = self.state.borrow_mut();
        if state.live.remove(&handle.value()).is_none() {
            return Err(ErrorCode::InvalidHandle);
        }
        state.closed.push(handle.value());
        Ok(())
    }

    fn get_token_information(
        &self,
        token: &RawHandle,
        _class: TokenInformationClass,
        buffer: &mut [u8],
        return_length: &mut u32,
    ) -> Result<(), ErrorCode> {
        self.record("get_token_information")?;
        self.lookup(token)?;
        let required = 2 * size_of::<usize>();
        if buffer.is_empty() {
            if let Some(code) = self.state.borrow().sizing_error {
                return Err(code);
            }
            *return_length = required as u32;
            return Err(ErrorCode::InsufficientBuffer);
        }
        if buffer.len() < required {
            *return_length = required as u32;
            return Err(ErrorCode::InsufficientBuffer);
        }
        // The "SID pointer" is the token handle itself; see sid_sub_authority
        buffer[..size_of::<usize>()].copy_from_slice(&token.value().to_ne_bytes());
        *return_length = required as u32;
        Ok(())
    }

    fn set_token_information(
        &self,
        token: &RawHandle,
        _class: TokenInformationClass,
        buffer: &[u8],
    ) -> Result<(), ErrorCode> {
        self.record("set_token_information")?;
        self.lookup(token)?;
        let start = MANDATORY_LABEL_SID_OFFSET + 8;
        let rid_bytes: [u8; 4] = buffer
            .get(start..start + 4)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(ErrorCode::InvalidParameter)?;
        if let Some(entry) = self.state.borrow_mut().live.get_mut(&token.value()) {
            entry.rid = u32::from_ne_bytes(rid_bytes);
        }
        Ok(())
    }

    fn sid_sub_authority_count(&self, sid: SidPtr) -> Option<u8> {
        self.state.borrow().live.get(&sid.0).map(|_| 1)
    }

    fn sid_sub_authority(&self, sid: SidPtr, index: u32) -> Option<u32> {
        if index != 0 {
            return None;
        }
        self.state.borrow().live.get(&sid.0).map(|entry| entry.rid)
    }

    fn logon_user(
        &self,
        _username: &str,
        _domain: &str,
        _password: &str,
        _logon_type: LogonType,
        _provider: LogonProvider,
    ) -> Result<RawHandle, ErrorCode> {
        self.record("logon_user")?;
        Ok(self.issue("logon_user", SECURITY_MANDATORY_MEDIUM_RID))
    }

    fn find_process_by_name(&self, name: &str) -> Result<Option<u32>, ErrorCode> {
        self.record("find_process_by_name")?;
        Ok(self
            .state
            .borrow()
            .processes
            .iter()
            .find(|(image, _)| image.eq_ignore_ascii_case(name))
            .map(|(_, pid)| *pid))
    }

    fn open_process(&self, _pid: u32, _access: AccessMask) -> Result<RawHandle, ErrorCode> {
        self.record("open_process")?;
        Ok(self.issue("open_process", SECURITY_MANDATORY_SYSTEM_RID))
    }
}
