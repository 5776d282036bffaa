#![no_std]

extern crate alloc;

pub const MAX_PATH_LEN: usize = runprog_abi::fs::USER_PATH_MAX;

pub mod image_table;
pub mod vfs;

#[cfg(test)]
extern crate std;

pub use image_table::{ImageEntry, StaticImages};
pub use vfs::{ExecPath, FileType, ImageHandle, ImageSource, InodeId, VfsError, VfsResult};
