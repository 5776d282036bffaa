//! User virtual address space layout for x86_64.

/// User space start virtual address.
pub const USER_SPACE_START_VA: u64 = 0x0000_0000_0000_0000;

/// User space end virtual address (up to canonical hole).
pub const USER_SPACE_END_VA: u64 = 0x0000_8000_0000_0000;

/// Process code segment start virtual address.
pub const PROCESS_CODE_START_VA: u64 = 0x0000_0000_0040_0000;

/// Process stack top virtual address.
///
/// The stack grows down from here; it is also the reference point the
/// initial stack pointer is aligned against.
pub const PROCESS_STACK_TOP_VA: u64 = 0x0000_7FFF_FF00_0000;

/// Process stack size in bytes (1 MB).
pub const PROCESS_STACK_SIZE_BYTES: u64 = 0x0000_0000_0010_0000;

/// Lowest address of the initial stack mapping.
pub const PROCESS_STACK_BOTTOM_VA: u64 = PROCESS_STACK_TOP_VA - PROCESS_STACK_SIZE_BYTES;

const _: () = assert!(PROCESS_STACK_TOP_VA < USER_SPACE_END_VA);
const _: () = assert!(PROCESS_STACK_TOP_VA % 16 == 0);
