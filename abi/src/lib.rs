//! Kernel-userland ABI types for the program bootstrap.
//!
//! Everything a started program can observe about how it was launched lives
//! here: the address newtype, the errno values returned to callers, the open
//! flags used on images and the register contract of the first user-mode
//! instruction.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod addr;
pub mod errno;
pub mod exec;
pub mod fs;

pub use addr::*;
pub use errno::*;
pub use exec::*;
pub use fs::*;
