//! Kernel → user copy seam.
//!
//! [`UserCopy`] is the fault-checked primitive that writes into the *active*
//! address space. Callers go through [`copy_bytes_to_user`] /
//! [`copy_word_to_user`], which validate the destination range first.

use crate::user_ptr::{UserPtrError, UserVirtAddr};

pub trait UserCopy {
    /// Copy `src` to `dst` in the active address space.
    ///
    /// Must fail (never fault) when any byte of the destination is unmapped
    /// or not user-writable.
    fn copy_out(&mut self, dst: UserVirtAddr, src: &[u8]) -> Result<(), UserPtrError>;
}

pub fn copy_bytes_to_user(
    user: &mut dyn UserCopy,
    dst: u64,
    src: &[u8],
) -> Result<(), UserPtrError> {
    if src.is_empty() {
        return Ok(());
    }
    let dst = UserVirtAddr::try_new(dst, src.len())?;
    user.copy_out(dst, src)
}

/// Store one little-endian machine word.
pub fn copy_word_to_user(user: &mut dyn UserCopy, dst: u64, value: u64) -> Result<(), UserPtrError> {
    copy_bytes_to_user(user, dst, &value.to_le_bytes())
}
