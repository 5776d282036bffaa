//! Filesystem ABI types shared between kernel and userland.

use bitflags::bitflags;

/// Maximum path length for filesystem operations
pub const USER_PATH_MAX: usize = 256;

bitflags! {
    /// Access mode requested when opening a file.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const READ = 0x1;
        const WRITE = 0x2;
    }
}

/// File permission bits that allow execution by anyone.
pub const MODE_EXEC_ANY: u16 = 0o111;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_flags_bits() {
        assert_eq!(OpenFlags::READ.bits(), 0x1);
        assert!((OpenFlags::READ | OpenFlags::WRITE).contains(OpenFlags::READ));
        assert!(!OpenFlags::READ.contains(OpenFlags::WRITE));
    }
}
