//! Shared test fixtures: a handle-counting, call-recording `TokenApi`

#![allow(dead_code)]

use identity_manager::core::types::integrity::SECURITY_MANDATORY_MEDIUM_RID;
use identity_manager::identity::{IdentityManager, ManagerOptions, Process, SidPtr, TokenApi};
use identity_manager::windows::types::{
    AccessMask, ImpersonationLevel, LogonProvider, LogonType, RawHandle, ThreadHandle,
    TokenInformationClass, TokenKind,
};
use identity_manager::ErrorCode;
use std::cell::RefCell;
use std::collections::HashMap;
use std::mem::size_of;
use std::rc::Rc;

/// What the zero-length `GetTokenInformation` sizing call does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingCall {
    /// Fails with `ERROR_INSUFFICIENT_BUFFER` and reports the size
    Sized,
    /// Fails with `ERROR_INSUFFICIENT_BUFFER` but reports zero bytes
    ZeroLength,
    /// Succeeds although no buffer was supplied
    Succeeds,
    /// Fails with this code
    Fails(ErrorCode),
}

#[derive(Debug, Clone)]
struct Token {
    issued_by: &'static str,
    rid: u32,
}

struct State {
    next: usize,
    live: HashMap<usize, Token>,
    closed: Vec<usize>,
    // every handle ever issued, with the call that issued it
    issued: Vec<(usize, &'static str)>,
    installed: Option<usize>,
    calls: Vec<&'static str>,
    counts: HashMap<&'static str, usize>,
    // call -> invocation numbers (1-based, counted from registration) that fail
    failures: HashMap<&'static str, Vec<usize>>,
    thread_token: bool,
    // opens succeed but hand back a null token
    null_thread_token: bool,
    null_process_token: bool,
    process_rid: u32,
    logon_rid: u32,
    sizing_call: SizingCall,
    sub_authority_count: Option<u8>,
    processes: Vec<(String, u32)>,
    logons: Vec<(String, String, LogonType, LogonProvider)>,
}

pub struct FakeTokenApi {
    state: RefCell<State>,
}

impl FakeTokenApi {
    pub fn new() -> Self {
        FakeTokenApi {
            state: RefCell::new(State {
                next: 0x1000,
                live: HashMap::new(),
                closed: Vec::new(),
                issued: Vec::new(),
                installed: None,
                calls: Vec::new(),
                counts: HashMap::new(),
                failures: HashMap::new(),
                thread_token: false,
                null_thread_token: false,
                null_process_token: false,
                process_rid: SECURITY_MANDATORY_MEDIUM_RID,
                logon_rid: SECURITY_MANDATORY_MEDIUM_RID,
                sizing_call: SizingCall::Sized,
                sub_authority_count: None,
                processes: vec![("System".to_string(), 4), ("winlogon.exe".to_string(), 700)],
                logons: Vec::new(),
            }),
        }
    }

    pub fn with_thread_token(self) -> Self {
        self.state.borrow_mut().thread_token = true;
        self
    }

    /// `open_thread_token` succeeds with a null token
    pub fn with_null_thread_token(self) -> Self {
        self.state.borrow_mut().null_thread_token = true;
        self
    }

    /// `open_process_token` on the current process succeeds with a null token
    pub fn with_null_process_token(self) -> Self {
        self.state.borrow_mut().null_process_token = true;
        self
    }

    pub fn with_rid(self, rid: u32) -> Self {
        self.state.borrow_mut().process_rid = rid;
        self
    }

    pub fn with_sizing_call(self, sizing_call: SizingCall) -> Self {
        self.state.borrow_mut().sizing_call = sizing_call;
        self
    }

    pub fn with_sub_authority_count(self, count: u8) -> Self {
        self.state.borrow_mut().sub_authority_count = Some(count);
        self
    }

    pub fn without_processes(self) -> Self {
        self.state.borrow_mut().processes.clear();
        self
    }

    /// Fail every future invocation of `call`
    pub fn fail_always(&self, call: &'static str) {
        self.state
            .borrow_mut()
            .failures
            .insert(call, (1..=10_000).collect());
    }

    /// Fail only the `nth` future invocation of `call`
    pub fn fail_nth(&self, call: &'static str, nth: usize) {
        let mut state = self.state.borrow_mut();
        let seen = state.counts.get(call).copied().unwrap_or(0);
        state.failures.entry(call).or_default().push(seen + nth);
    }

    pub fn live(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn closed(&self) -> Vec<usize> {
        self.state.borrow().closed.clone()
    }

    pub fn installed(&self) -> Option<usize> {
        self.state.borrow().installed
    }

    pub fn count(&self, call: &str) -> usize {
        self.state.borrow().counts.get(call).copied().unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Most recent handle issued by `call`, whether still live or not
    pub fn last_issued_by(&self, call: &str) -> Option<usize> {
        self.state
            .borrow()
            .issued
            .iter()
            .rev()
            .find(|(_, by)| *by == call)
            .map(|(value, _)| *value)
    }

    pub fn issued_by(&self, handle: usize) -> Option<&'static str> {
        self.state.borrow().live.get(&handle).map(|t| t.issued_by)
    }

    pub fn logons(&self) -> Vec<(String, String, LogonType, LogonProvider)> {
        self.state.borrow().logons.clone()
    }

    fn enter(&self, call: &'static str) -> Result<(), ErrorCode> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        let count = state.counts.entry(call).or_insert(0);
        *count += 1;
        let count = *count;
        let fails = state
            .failures
            .get(call)
            .map_or(false, |nths| nths.contains(&count));
        if fails {
            Err(ErrorCode::AccessDenied)
        } else {
            Ok(())
        }
    }

    fn issue(&self, issued_by: &'static str, rid: u32) -> RawHandle {
        let mut state = self.state.borrow_mut();
        state.next += 4;
        let value = state.next;
        state.live.insert(value, Token { issued_by, rid });
        state.issued.push((value, issued_by));
        RawHandle::from_raw(value)
    }

    fn token(&self, handle: &RawHandle) -> Result<Token, ErrorCode> {
        self.state
            .borrow()
            .live
            .get(&handle.value())
            .cloned()
            .ok_or(ErrorCode::InvalidHandle)
    }
}

impl TokenApi for FakeTokenApi {
    fn current_thread(&self) -> ThreadHandle {
        ThreadHandle::from_raw(usize::MAX - 1)
    }

    fn open_thread_token(
        &self,
        _thread: &ThreadHandle,
        _access: AccessMask,
        _open_as_self: bool,
    ) -> Result<RawHandle, ErrorCode> {
        self.enter("open_thread_token")?;
        let (has_token, null, rid) = {
            let state = self.state.borrow();
            (state.thread_token, state.null_thread_token, state.process_rid)
        };
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
        self.enter("open_process_token")?;
        let rid = match process {
            Process::Current => {
                let state = self.state.borrow();
                if state.null_process_token {
                    return Ok(RawHandle::null());
                }
                state.process_rid
            }
            Process::Handle(handle) => self.token(handle)?.rid,
        };
        Ok(self.issue("open_process_token", rid))
    }

    fn duplicate_token(
        &self,
        token: &RawHandle,
        access: AccessMask,
        level: ImpersonationLevel,
        kind: TokenKind,
    ) -> Result<RawHandle, ErrorCode> {
        self.enter("duplicate_token")?;
        assert_eq!(access, AccessMask::MAXIMUM_ALLOWED);
        assert_eq!(level, ImpersonationLevel::Impersonation);
        assert_eq!(kind, TokenKind::Impersonation);
        let rid = self.token(token)?.rid;
        Ok(self.issue("duplicate_token", rid))
    }

    fn set_thread_token(
        &self,
        _thread: &ThreadHandle,
        token: Option<&RawHandle>,
    ) -> Result<(), ErrorCode> {
        self.enter("set_thread_token")?;
        if let Some(token) = token {
            self.token(token)?;
        }
        self.state.borrow_mut().installed = token.map(RawHandle::value);
        Ok(())
    }

    fn close_handle(&self, handle: RawHandle) -> Result<(), ErrorCode> {
        self.enter("close_handle")?;
        let mut state = self.state.borrow_mut();
        if state.live.remove(&handle.value()).is_none() {
            panic!("double close of handle 0x{:X}", handle.value());
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
        self.enter("get_token_information")?;
        self.token(token)?;
        let word = size_of::<usize>();
        let required = 2 * word;
        if buffer.is_empty() {
            return match self.state.borrow().sizing_call {
                SizingCall::Sized => {
                    *return_length = required as u32;
                    Err(ErrorCode::InsufficientBuffer)
                }
                SizingCall::ZeroLength => {
                    *return_length = 0;
                    Err(ErrorCode::InsufficientBuffer)
                }
                SizingCall::Succeeds => Ok(()),
                SizingCall::Fails(code) => Err(code),
            };
        }
        buffer[..word].copy_from_slice(&token.value().to_ne_bytes());
        *return_length = required as u32;
        Ok(())
    }

    fn set_token_information(
        &self,
        token: &RawHandle,
        _class: TokenInformationClass,
        buffer: &[u8],
    ) -> Result<(), ErrorCode> {
        self.enter("set_token_information")?;
        self.token(token)?;
        // TOKEN_MANDATORY_LABEL: two words, then a one-sub-authority SID
        let start = 2 * size_of::<usize>() + 8;
        let rid = buffer
            .get(start..start + 4)
            .and_then(|bytes| bytes.try_into().ok())
            .map(u32::from_ne_bytes)
            .ok_or(ErrorCode::InvalidParameter)?;
        if let Some(entry) = self.state.borrow_mut().live.get_mut(&token.value()) {
            entry.rid = rid;
        }
        Ok(())
    }

    fn sid_sub_authority_count(&self, sid: SidPtr) -> Option<u8> {
        let state = self.state.borrow();
        state.live.get(&sid.0)?;
        Some(state.sub_authority_count.unwrap_or(1))
    }

    fn sid_sub_authority(&self, sid: SidPtr, index: u32) -> Option<u32> {
        let state = self.state.borrow();
        let count = state.sub_authority_count.unwrap_or(1);
        if index >= u32::from(count) {
            return None;
        }
        state.live.get(&sid.0).map(|token| token.rid)
    }

    fn logon_user(
        &self,
        username: &str,
        domain: &str,
        _password: &str,
        logon_type: LogonType,
        provider: LogonProvider,
    ) -> Result<RawHandle, ErrorCode> {
        self.state.borrow_mut().logons.push((
            username.to_string(),
            domain.to_string(),
            logon_type,
            provider,
        ));
        self.enter("logon_user")?;
        let rid = self.state.borrow().logon_rid;
        Ok(self.issue("logon_user", rid))
    }

    fn find_process_by_name(&self, name: &str) -> Result<Option<u32>, ErrorCode> {
        self.enter("find_process_by_name")?;
        Ok(self
            .state
            .borrow()
            .processes
            .iter()
            .find(|(image, _)| image.eq_ignore_ascii_case(name))
            .map(|(_, pid)| *pid))
    }

    fn open_process(&self, _pid: u32, access: AccessMask) -> Result<RawHandle, ErrorCode> {
        self.enter("open_process")?;
        assert_eq!(access, AccessMask::PROCESS_QUERY_LIMITED_INFORMATION);
        Ok(self.issue(
            "open_process",
            identity_manager::core::types::integrity::SECURITY_MANDATORY_SYSTEM_RID,
        ))
    }
}

pub fn manager(fake: &Rc<FakeTokenApi>) -> IdentityManager {
    IdentityManager::with_defaults(fake.clone()).expect("baseline capture")
}

pub fn manager_with(fake: &Rc<FakeTokenApi>, options: ManagerOptions) -> IdentityManager {
    IdentityManager::new(fake.clone(), options).expect("baseline capture")
}
