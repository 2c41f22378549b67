//! Thread identity management
//!
//! [`IdentityManager`] owns the security context of one thread: the baseline
//! tokens captured at construction, the identity currently in effect and the
//! credential it was derived from. All native calls go through [`TokenApi`].

pub mod api;
pub mod buffer;
pub mod integrity;
pub mod manager;
pub mod snapshot;
pub mod system;
pub mod token;

#[cfg(test)]
pub(crate) mod fake;

pub use api::{Process, SidPtr, TokenApi};
pub use buffer::TokenInfoBuffer;
pub use manager::{IdentityManager, ManagerOptions, DEFAULT_SYSTEM_PROCESS};
pub use snapshot::IdentitySnapshot;
pub use token::{Identity, IdentityOrigin};
