//! User pointer validation for kernel → user copies.
//!
//! Every destination address the bootstrap computes on the new stack goes
//! through [`UserVirtAddr::try_new`] before it reaches the copy primitive, so
//! an underflowing cursor or a bogus stack top surfaces as an error, not as a
//! write into kernel memory. This is the Rust equivalent of Linux's
//! `access_ok()`.

use runprog_abi::addr::VirtAddr;

use crate::memory_layout_defs::{USER_SPACE_END_VA, USER_SPACE_START_VA};

/// Error type for user pointer validation and user copies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum UserPtrError {
    /// Pointer is null (address == 0)
    Null = 1,
    /// Address is not canonical (bits 48-63 don't match bit 47)
    NonCanonical = 2,
    /// Address is outside user space range [0, USER_SPACE_END_VA)
    OutOfUserRange = 3,
    /// Address + length would overflow u64
    Overflow = 4,
    /// Page is not mapped or not user-accessible in page tables
    NotMapped = 5,
    /// Copy operation failed during actual memory transfer
    CopyFailed = 6,
}

/// A validated user-space virtual address.
///
/// Guarantees at construction time that the address is non-null, canonical,
/// inside user space and that `address + len` neither overflows nor crosses
/// `USER_SPACE_END_VA`. It does NOT guarantee the memory is mapped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct UserVirtAddr(VirtAddr);

impl UserVirtAddr {
    pub fn try_new(addr: u64, len: usize) -> Result<Self, UserPtrError> {
        if addr == 0 {
            return Err(UserPtrError::Null);
        }

        if !VirtAddr::is_canonical(addr) {
            return Err(UserPtrError::NonCanonical);
        }

        if addr < USER_SPACE_START_VA || addr >= USER_SPACE_END_VA {
            return Err(UserPtrError::OutOfUserRange);
        }

        let end = addr.checked_add(len as u64).ok_or(UserPtrError::Overflow)?;
        if end > USER_SPACE_END_VA {
            return Err(UserPtrError::Overflow);
        }

        Ok(Self(VirtAddr(addr)))
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0.as_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_null_and_kernel_addresses() {
        assert_eq!(UserVirtAddr::try_new(0, 1), Err(UserPtrError::Null));
        assert_eq!(
            UserVirtAddr::try_new(0x0000_8000_0000_0000, 1),
            Err(UserPtrError::NonCanonical)
        );
        assert_eq!(
            UserVirtAddr::try_new(0xFFFF_8000_0000_0000, 8),
            Err(UserPtrError::OutOfUserRange)
        );
    }

    #[test]
    fn rejects_ranges_crossing_user_end() {
        assert_eq!(
            UserVirtAddr::try_new(USER_SPACE_END_VA - 4, 8),
            Err(UserPtrError::Overflow)
        );
        assert!(UserVirtAddr::try_new(USER_SPACE_END_VA - 8, 8).is_ok());
    }

    #[test]
    fn keeps_raw_value() {
        let addr = UserVirtAddr::try_new(0x7FFF_0000_1000, 16).unwrap();
        assert_eq!(addr.as_u64(), 0x7FFF_0000_1000);
    }
}
