//! Token and thread handle wrappers with RAII semantics

use crate::identity::api::TokenApi;
use crate::windows::utils::ErrorCode;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::rc::Rc;
use tracing::warn;

/// A native handle value returned by the OS.
///
/// Not `Copy`: whoever holds a `RawHandle` is responsible for its single
/// release, either by moving it into a [`Handle`] or by passing it to
/// [`TokenApi::close_handle`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RawHandle(usize);

impl RawHandle {
    /// Wrap a handle value produced by a native call
    pub const fn from_raw(value: usize) -> Self {
        RawHandle(value)
    }

    /// The null handle
    pub const fn null() -> Self {
        RawHandle(0)
    }

    /// Check if handle is null
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Numeric handle value
    pub fn value(&self) -> usize {
        self.0
    }
}

/// Pseudo-handle of the thread whose impersonation token is managed.
///
/// Deliberately `!Send` and `!Sync`: a thread handle obtained on one thread
/// has no meaning on another.
#[derive(Debug, PartialEq, Eq)]
pub struct ThreadHandle {
    value: usize,
    _not_send: PhantomData<*const ()>,
}

impl ThreadHandle {
    /// Wrap a thread handle value
    pub const fn from_raw(value: usize) -> Self {
        ThreadHandle {
            value,
            _not_send: PhantomData,
        }
    }

    /// Numeric handle value
    pub fn value(&self) -> usize {
        self.value
    }
}

/// Owned native handle, closed through the capability layer on drop
pub struct Handle {
    raw: RawHandle,
    api: Rc<dyn TokenApi>,
}

impl Handle {
    /// Take ownership of `raw`; it will be closed exactly once
    pub fn new(api: Rc<dyn TokenApi>, raw: RawHandle) -> Self {
        Handle { raw, api }
    }

    /// Check if handle is null
    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    /// Borrow the raw handle for a native call
    pub fn as_raw(&self) -> &RawHandle {
        &self.raw
    }

    /// Numeric handle value
    pub fn value(&self) -> usize {
        self.raw.value()
    }

    /// Give up ownership, preventing automatic cleanup
    pub fn into_raw(mut self) -> RawHandle {
        mem::replace(&mut self.raw, RawHandle::null())
    }

    /// Close now and report the outcome instead of logging it
    pub fn close(mut self) -> Result<(), ErrorCode> {
        let raw = mem::replace(&mut self.raw, RawHandle::null());
        if raw.is_null() {
            return Ok(());
        }
        self.api.close_handle(raw)
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        let raw = mem::replace(&mut self.raw, RawHandle::null());
        if raw.is_null() {
            return;
        }
        let value = raw.value();
        // Ignore errors on cleanup
        if let Err(code) = self.api.close_handle(raw) {
            warn!(handle = value, %code, "failed to close handle");
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("raw", &format!("0x{:X}", self.raw.value()))
            .finish()
    }
}
