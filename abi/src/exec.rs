//! Register contract for the first instruction of a started program.

use crate::addr::VirtAddr;

/// Everything the mode-transfer primitive needs to start a program.
///
/// `argc` travels in the first argument register and `argv` in the second,
/// so a standard `_start(argc, argv)` entry sees them without touching the
/// stack. `argv[argc]` is null.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserEntry {
    pub argc: u64,
    pub argv: VirtAddr,
    pub stack_pointer: VirtAddr,
    pub entry: VirtAddr,
}

#[cfg(test)]
mod tests {
    use super::UserEntry;
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout_is_stable() {
        assert_eq!(size_of::<UserEntry>(), 32);
        assert_eq!(offset_of!(UserEntry, argc), 0);
        assert_eq!(offset_of!(UserEntry, argv), 8);
        assert_eq!(offset_of!(UserEntry, stack_pointer), 16);
        assert_eq!(offset_of!(UserEntry, entry), 24);
    }
}
