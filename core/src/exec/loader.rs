//! Executable loader seam.

use core::fmt;

use runprog_abi::addr::VirtAddr;
use runprog_fs::ImageHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// Not a recognised executable format.
    BadFormat,
    /// Recognised, but for another machine or with unsupported features.
    Unsupported,
    Io,
    NoMemory,
    /// A segment could not be placed in the address space.
    Fault,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadFormat => write!(f, "bad executable format"),
            Self::Unsupported => write!(f, "unsupported executable"),
            Self::Io => write!(f, "I/O error reading image"),
            Self::NoMemory => write!(f, "out of memory loading image"),
            Self::Fault => write!(f, "segment outside user space"),
        }
    }
}

/// Populates an address space from an open image.
pub trait ImageLoader<S> {
    /// Map the image's segments into `space` (already active) and return
    /// the entry address.
    fn load(&mut self, image: &ImageHandle, space: &mut S) -> Result<VirtAddr, LoadError>;
}
