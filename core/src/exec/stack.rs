//! Initial user stack layout.
//!
//! From high to low address the new stack holds:
//!
//! ```text
//! region_top ->  +---------------------------+
//!                | padding                   |
//!                | argv[argc-1] bytes, NUL   |  each slot rounded up to 4
//!                | ...                       |
//!                | argv[0] bytes, NUL        |
//!                | NULL                      |  argv[argc]
//!                | &argv[argc-1]             |
//!                | ...                       |
//! argv        -> | &argv[0]                  |  one 8-byte word each
//!                +---------------------------+
//! sp          -> region_top - align_up(region_top - argv, 8)
//! ```
//!
//! Strings and pointers are both written highest index first, so index 0
//! always lands at the lowest address of its group.

use alloc::vec::Vec;
use core::mem::size_of;

use runprog_abi::addr::VirtAddr;
use runprog_lib::{align_up_u64, klog_debug};
use runprog_mm::{UserCopy, copy_bytes_to_user, copy_word_to_user};

use super::ExecError;
use super::args::ArgTable;

/// Alignment of each argument string's slot.
pub const ARG_ALIGN: u64 = 4;
/// Alignment of the final stack pointer, measured from the region top.
pub const STACK_ALIGN: u64 = 8;
/// Size of one argv pointer slot.
pub const USER_WORD: u64 = size_of::<u64>() as u64;

/// Stack bytes reserved for a string of `len_with_nul` bytes.
pub const fn arg_slot_len(len_with_nul: usize) -> u64 {
    align_up_u64(len_with_nul as u64, ARG_ALIGN)
}

/// Final stack pointer for a cursor that stopped at `sp`.
///
/// Rounds the *distance* from `region_top`, not the address itself. `None`
/// when the rounded distance reaches below address zero.
pub const fn aligned_stack_pointer(region_top: VirtAddr, sp: VirtAddr) -> Option<VirtAddr> {
    let used = sp.distance_to(region_top);
    region_top.checked_sub(align_up_u64(used, STACK_ALIGN))
}

/// Downward-growing write cursor over the top of a user stack.
pub struct StackCursor<'u> {
    region_top: VirtAddr,
    sp: VirtAddr,
    user: &'u mut dyn UserCopy,
}

impl<'u> StackCursor<'u> {
    pub fn new(
        region_top: VirtAddr,
        initial_sp: VirtAddr,
        user: &'u mut dyn UserCopy,
    ) -> Result<Self, ExecError> {
        if initial_sp > region_top {
            return Err(ExecError::Fault);
        }
        Ok(Self {
            region_top,
            sp: initial_sp,
            user,
        })
    }

    pub fn sp(&self) -> VirtAddr {
        self.sp
    }

    /// Reserve `reserve` bytes below the cursor and copy `bytes` to the
    /// start of the reservation. Returns the new cursor.
    pub fn push_bytes(&mut self, bytes: &[u8], reserve: u64) -> Result<VirtAddr, ExecError> {
        debug_assert!(bytes.len() as u64 <= reserve);
        let dst = self.sp.checked_sub(reserve).ok_or(ExecError::Fault)?;
        copy_bytes_to_user(&mut *self.user, dst.as_u64(), bytes)?;
        self.sp = dst;
        Ok(dst)
    }

    pub fn push_word(&mut self, value: u64) -> Result<VirtAddr, ExecError> {
        let dst = self.sp.checked_sub(USER_WORD).ok_or(ExecError::Fault)?;
        copy_word_to_user(&mut *self.user, dst.as_u64(), value)?;
        self.sp = dst;
        Ok(dst)
    }

    /// Stack pointer to hand to the program.
    pub fn finish(self) -> Result<VirtAddr, ExecError> {
        aligned_stack_pointer(self.region_top, self.sp).ok_or(ExecError::Fault)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgStack {
    pub argc: usize,
    pub argv: VirtAddr,
    pub stack_pointer: VirtAddr,
}

pub fn build_arg_stack(
    args: &ArgTable<'_>,
    region_top: VirtAddr,
    initial_sp: VirtAddr,
    user: &mut dyn UserCopy,
) -> Result<ArgStack, ExecError> {
    let argc = args.argc();
    let mut cursor = StackCursor::new(region_top, initial_sp, user)?;

    let mut arg_ptrs: Vec<u64> = Vec::new();
    arg_ptrs
        .try_reserve_exact(argc + 1)
        .map_err(|_| ExecError::NoMem)?;
    arg_ptrs.resize(argc + 1, 0);

    for i in (0..argc).rev() {
        let bytes = args.get(i).ok_or(ExecError::Fault)?.to_bytes_with_nul();
        let dst = cursor.push_bytes(bytes, arg_slot_len(bytes.len()))?;
        klog_debug!("exec: argv[{}] ({} bytes) at {:#x}", i, bytes.len(), dst);
        arg_ptrs[i] = dst.as_u64();
    }
    arg_ptrs[argc] = 0;

    for &ptr in arg_ptrs.iter().rev() {
        cursor.push_word(ptr)?;
    }

    let argv = cursor.sp();
    let stack_pointer = cursor.finish()?;
    Ok(ArgStack {
        argc,
        argv,
        stack_pointer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use runprog_mm::{UserPtrError, UserVirtAddr};

    struct Sink {
        copies: usize,
    }

    impl UserCopy for Sink {
        fn copy_out(&mut self, _dst: UserVirtAddr, _src: &[u8]) -> Result<(), UserPtrError> {
            self.copies += 1;
            Ok(())
        }
    }

    #[test]
    fn slot_lengths_round_to_four() {
        assert_eq!(arg_slot_len(1), 4);
        assert_eq!(arg_slot_len(2), 4);
        assert_eq!(arg_slot_len(4), 4);
        assert_eq!(arg_slot_len(5), 8);
    }

    #[test]
    fn alignment_is_relative_to_region_top() {
        // A region top that is only 4-aligned: the result must be a multiple
        // of 8 *below the top*, not a multiple of 8 in absolute terms.
        let top = VirtAddr(0x7000_0004);
        let sp = aligned_stack_pointer(top, VirtAddr(0x7000_0004 - 20)).unwrap();
        assert_eq!(sp, VirtAddr(0x7000_0004 - 24));
        assert_eq!(sp.distance_to(top) % STACK_ALIGN, 0);

        assert_eq!(aligned_stack_pointer(top, top), Some(top));
    }

    #[test]
    fn rounding_below_address_zero_is_a_fault() {
        // 12 bytes used under a top of 0xD rounds to 16, past zero.
        assert_eq!(aligned_stack_pointer(VirtAddr(0xD), VirtAddr(0x1)), None);
        assert_eq!(aligned_stack_pointer(VirtAddr(0xD), VirtAddr(0x5)), Some(VirtAddr(0x5)));

        let mut sink = Sink { copies: 0 };
        let mut cursor = StackCursor::new(VirtAddr(0xD), VirtAddr(0xD), &mut sink).unwrap();
        cursor.push_bytes(b"abcdefghijk\0", 12).unwrap();
        assert!(matches!(cursor.finish(), Err(ExecError::Fault)));
    }

    #[test]
    fn cursor_rejects_sp_above_top() {
        let mut sink = Sink { copies: 0 };
        let result = StackCursor::new(VirtAddr(0x1000), VirtAddr(0x1008), &mut sink);
        assert!(matches!(result, Err(ExecError::Fault)));
    }

    #[test]
    fn cursor_underflow_is_a_fault() {
        let mut sink = Sink { copies: 0 };
        let mut cursor = StackCursor::new(VirtAddr(0x10), VirtAddr(0x10), &mut sink).unwrap();
        assert!(matches!(cursor.push_bytes(b"0123456789abcdef\0", 20), Err(ExecError::Fault)));
        // Landing exactly on address zero is rejected by user pointer validation.
        assert!(matches!(cursor.push_word(0), Ok(_)));
        assert!(matches!(cursor.push_word(0), Err(ExecError::Fault)));
    }

    #[test]
    fn copies_one_string_and_one_word_per_slot() {
        let mut sink = Sink { copies: 0 };
        let table = ArgTable::materialize(&[c"x", c"yy"], &super::super::ExecLimits::DEFAULT)
            .unwrap();
        let top = VirtAddr(0x7000_0000);
        let stack = build_arg_stack(&table, top, top, &mut sink).unwrap();
        assert_eq!(sink.copies, 2 + 3);
        assert_eq!(stack.argc, 2);
        assert_eq!(stack.argv, VirtAddr(0x7000_0000 - 8 - 24));
    }
}
