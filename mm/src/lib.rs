#![no_std]

#[cfg(test)]
extern crate std;

pub mod address_space;
pub mod error;
pub mod memory_layout_defs;
pub mod user_copy;
pub mod user_ptr;

pub use address_space::AddressSpaceOps;
pub use error::{MmError, MmResult};
pub use user_copy::{UserCopy, copy_bytes_to_user, copy_word_to_user};
pub use user_ptr::{UserPtrError, UserVirtAddr};
