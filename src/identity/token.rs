//! Identities backed by owned token handles

use crate::core::types::{IdentityError, IdentityResult};
use crate::windows::types::{Handle, RawHandle, TokenKind};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// Where an identity's token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityOrigin {
    /// Captured when the manager was constructed
    Baseline,
    /// Derived from a credential through `LogonUserW`
    Logon,
    /// Handed in by a caller through one of the setter escape hatches
    Supplied,
}

/// A security identity: a shared, owned token handle plus its provenance.
///
/// Cloning shares the token; it is closed when the last clone drops. Equality
/// is identity of the underlying token object, not of its contents.
#[derive(Clone)]
pub struct Identity {
    token: Rc<Handle>,
    kind: TokenKind,
    origin: IdentityOrigin,
}

impl Identity {
    /// Take ownership of `token`. Fails, releasing nothing, on a null handle.
    pub fn wrap(token: Handle, kind: TokenKind, origin: IdentityOrigin) -> IdentityResult<Self> {
        if token.is_null() {
            return Err(IdentityError::InvalidHandle(format!(
                "cannot wrap a null {:?} token",
                kind
            )));
        }
        Ok(Identity {
            token: Rc::new(token),
            kind,
            origin,
        })
    }

    /// Borrow the token for a native call
    pub fn token(&self) -> &RawHandle {
        self.token.as_raw()
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn origin(&self) -> IdentityOrigin {
        self.origin
    }

    /// Both identities share the same token object
    pub fn same_as(&self, other: &Identity) -> bool {
        Rc::ptr_eq(&self.token, &other.token)
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for Identity {}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("token", &format!("0x{:X}", self.token.value()))
            .field("kind", &self.kind)
            .field("origin", &self.origin)
            .finish()
    }
}
