//! Kernel → user mode transfer.

use runprog_abi::exec::UserEntry;

pub trait ModeTransfer {
    /// Start executing `entry` in user mode. Does not return on success;
    /// returning at all is a broken invariant the caller treats as fatal.
    fn enter_new_process(&mut self, entry: &UserEntry);
}

#[cfg(target_arch = "x86_64")]
pub use self::x86_64_iretq::IretqTransfer;

#[cfg(target_arch = "x86_64")]
mod x86_64_iretq {
    use core::arch::asm;

    use x86_64::PrivilegeLevel;
    use x86_64::registers::rflags::RFlags;
    use x86_64::structures::gdt::SegmentSelector;

    use super::{ModeTransfer, UserEntry};

    /// GDT slots of the user segments; data precedes code for SYSRET.
    const USER_DATA_INDEX: u16 = 3;
    const USER_CODE_INDEX: u16 = 4;

    /// RFLAGS bit 1 is reserved and must be set.
    const RFLAGS_RESERVED_ONE: u64 = 1 << 1;

    /// Enters ring 3 with `iretq`.
    ///
    /// `rdi = argc`, `rsi = argv`, every segment register the CPU checks in
    /// 64-bit mode set to the user data selector, interrupts enabled.
    pub struct IretqTransfer;

    impl ModeTransfer for IretqTransfer {
        fn enter_new_process(&mut self, entry: &UserEntry) {
            let user_cs = SegmentSelector::new(USER_CODE_INDEX, PrivilegeLevel::Ring3).0 as u64;
            let user_ss = SegmentSelector::new(USER_DATA_INDEX, PrivilegeLevel::Ring3).0 as u64;
            let rflags = RFlags::INTERRUPT_FLAG.bits() | RFLAGS_RESERVED_ONE;

            // SAFETY: the caller activated the address space holding `entry`
            // and the stack; the selectors index user segments in the GDT.
            unsafe {
                asm!(
                    "mov ds, {data_sel:x}",
                    "mov es, {data_sel:x}",
                    "push {data_sel}",
                    "push {user_sp}",
                    "push {flags}",
                    "push {code_sel}",
                    "push {target}",
                    "iretq",
                    data_sel = in(reg) user_ss,
                    user_sp = in(reg) entry.stack_pointer.as_u64(),
                    flags = in(reg) rflags,
                    code_sel = in(reg) user_cs,
                    target = in(reg) entry.entry.as_u64(),
                    in("rdi") entry.argc,
                    in("rsi") entry.argv.as_u64(),
                    options(noreturn)
                );
            }
        }
    }
}
