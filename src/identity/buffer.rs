//! Scoped buffers for variable-length token information

use crate::core::types::{IdentityError, IdentityResult};
use crate::identity::api::{SidPtr, TokenApi};
use crate::windows::types::{RawHandle, TokenInformationClass};
use crate::windows::utils::ErrorCode;
use std::mem::size_of;
use tracing::debug;

const WORD: usize = size_of::<usize>();

/// `SE_GROUP_INTEGRITY`
pub const SE_GROUP_INTEGRITY: u32 = 0x0000_0020;

/// `SECURITY_MANDATORY_LABEL_AUTHORITY`
const MANDATORY_LABEL_AUTHORITY: [u8; 6] = [0, 0, 0, 0, 0, 16];

/// Byte offset of the inline SID in a buffer built by [`TokenInfoBuffer::mandatory_label`]
pub const MANDATORY_LABEL_SID_OFFSET: usize = 2 * WORD;

/// Pointer-aligned heap buffer, released on drop.
///
/// Backed by `usize` words so that structures starting with a pointer
/// (`TOKEN_MANDATORY_LABEL`) can be read in place.
pub struct TokenInfoBuffer {
    words: Vec<usize>,
    len: usize,
}

impl TokenInfoBuffer {
    /// Allocate `len` zeroed bytes
    pub fn zeroed(len: usize) -> Self {
        TokenInfoBuffer {
            words: vec![0; (len + WORD - 1) / WORD],
            len,
        }
    }

    /// Query `class` for `token` with the two-call sizing protocol.
    ///
    /// The zero-length sizing call must fail with `ERROR_INSUFFICIENT_BUFFER` and
    /// report a non-zero size; any other outcome is an error.
    pub fn query(
        api: &dyn TokenApi,
        token: &RawHandle,
        class: TokenInformationClass,
    ) -> IdentityResult<Self> {
        let mut required = 0u32;
        match api.get_token_information(token, class, &mut [], &mut required) {
            Err(ErrorCode::InsufficientBuffer) if required > 0 => {}
            Err(code) => return Err(IdentityError::os("GetTokenInformation", code)),
            Ok(()) => {
                return Err(IdentityError::malformed(
                    "zero-length sizing call reported success",
                ))
            }
        }
        debug!(?class, required, "sizing call complete");

        let mut buffer = Self::zeroed(required as usize);
        let mut written = 0u32;
        api.get_token_information(token, class, buffer.as_mut_bytes(), &mut written)
            .map_err(|code| IdentityError::os("GetTokenInformation", code))?;
        Ok(buffer)
    }

    /// Build a `TOKEN_MANDATORY_LABEL` followed by its inline label SID
    pub fn mandatory_label(rid: u32) -> Self {
        let mut buffer = Self::zeroed(MANDATORY_LABEL_SID_OFFSET + 12);
        let sid_address = buffer.words.as_ptr() as usize + MANDATORY_LABEL_SID_OFFSET;

        let bytes = buffer.as_mut_bytes();
        bytes[..WORD].copy_from_slice(&sid_address.to_ne_bytes());
        bytes[WORD..WORD + 4].copy_from_slice(&SE_GROUP_INTEGRITY.to_ne_bytes());

        let sid = &mut bytes[MANDATORY_LABEL_SID_OFFSET..];
        sid[0] = 1; // revision
        sid[1] = 1; // sub-authority count
        sid[2..8].copy_from_slice(&MANDATORY_LABEL_AUTHORITY);
        sid[8..12].copy_from_slice(&rid.to_ne_bytes());
        buffer
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `words` owns at least `len` initialized bytes and u8 has no alignment requirement.
        unsafe { std::slice::from_raw_parts(self.words.as_ptr().cast::<u8>(), self.len) }
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_bytes`; the mutable borrow of `self` makes the slice unique.
        unsafe { std::slice::from_raw_parts_mut(self.words.as_mut_ptr().cast::<u8>(), self.len) }
    }

    /// Read a native-endian pointer-sized value at `offset`
    pub fn read_usize(&self, offset: usize) -> Option<usize> {
        let bytes = self.as_bytes().get(offset..offset.checked_add(WORD)?)?;
        let mut raw = [0u8; WORD];
        raw.copy_from_slice(bytes);
        Some(usize::from_ne_bytes(raw))
    }

    /// `TOKEN_MANDATORY_LABEL.Label.Sid`
    pub fn label_sid(&self) -> IdentityResult<SidPtr> {
        let sid = self
            .read_usize(0)
            .map(SidPtr)
            .ok_or_else(|| IdentityError::malformed("buffer shorter than TOKEN_MANDATORY_LABEL"))?;
        if sid.is_null() {
            return Err(IdentityError::malformed("null label SID"));
        }
        Ok(sid)
    }
}
