//! Virtual address type for user stack construction.
//!
//! [`VirtAddr`] is a zero-cost `#[repr(transparent)]` wrapper around the raw
//! `u64`. Every address the bootstrap writes into a new address space, and
//! every address it hands to the started program, is carried as one.

/// A virtual memory address.
///
/// On x86_64, virtual addresses must be "canonical" - bits 48-63 must be copies
/// of bit 47 (sign extension).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct VirtAddr(pub u64);

impl VirtAddr {
    /// The null virtual address.
    pub const NULL: Self = Self(0);

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Move the address down by `len` bytes, returning None on underflow.
    #[inline]
    pub const fn checked_sub(self, len: u64) -> Option<Self> {
        match self.0.checked_sub(len) {
            Some(addr) => Some(Self(addr)),
            None => None,
        }
    }

    /// Number of bytes from `self` up to `upper`. Zero when `upper` is lower.
    #[inline]
    pub const fn distance_to(self, upper: Self) -> u64 {
        upper.0.saturating_sub(self.0)
    }

    /// Returns true if the raw address is canonical on x86_64.
    #[inline]
    pub const fn is_canonical(addr: u64) -> bool {
        let sign = (addr >> 47) & 1;
        let upper = addr >> 48;
        if sign == 0 {
            upper == 0
        } else {
            upper == 0xFFFF
        }
    }
}

impl From<VirtAddr> for u64 {
    #[inline]
    fn from(addr: VirtAddr) -> Self {
        addr.0
    }
}

impl core::fmt::LowerHex for VirtAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::LowerHex::fmt(&self.0, f)
    }
}

impl core::fmt::UpperHex for VirtAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::UpperHex::fmt(&self.0, f)
    }
}
