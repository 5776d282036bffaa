//! Filesystem seam used to resolve an executable image.
//!
//! Path resolution, mounts and permissions live behind [`ImageSource`]; the
//! program bootstrap only opens one image, hands it to the loader and closes
//! it again.

use runprog_abi::errno;
use runprog_abi::fs::OpenFlags;

use super::path::ExecPath;

/// Unique identifier for an inode within a filesystem.
pub type InodeId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FileType {
    Regular = 1,
    Directory = 2,
}

/// Result type for VFS operations.
pub type VfsResult<T> = Result<T, VfsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VfsError {
    /// File or directory not found (ENOENT)
    NotFound,
    /// Path component is not a directory (ENOTDIR)
    NotDirectory,
    /// Operation not permitted on a directory (EISDIR)
    IsDirectory,
    /// Permission denied (EACCES)
    PermissionDenied,
    /// Filename too long (ENAMETOOLONG)
    NameTooLong,
    /// I/O error (EIO)
    IoError,
    /// Out of kernel memory while resolving
    NoMemory,
}

impl VfsError {
    pub const fn errno(self) -> i32 {
        match self {
            Self::NotFound => errno::ENOENT,
            Self::NotDirectory => errno::ENOTDIR,
            Self::IsDirectory => errno::EISDIR,
            Self::PermissionDenied => errno::EACCES,
            Self::NameTooLong => errno::ENAMETOOLONG,
            Self::IoError => errno::EIO,
            Self::NoMemory => errno::ENOMEM,
        }
    }
}

/// An open executable image.
///
/// Not `Clone`: the one handle returned by [`ImageSource::open`] must be
/// given back to [`ImageSource::close`].
#[derive(Debug, PartialEq, Eq)]
pub struct ImageHandle {
    pub inode: InodeId,
    /// Size in bytes.
    pub size: u64,
    /// Unix permission bits (rwxrwxrwx).
    pub mode: u16,
}

impl ImageHandle {
    pub const fn is_executable(&self) -> bool {
        self.mode & runprog_abi::fs::MODE_EXEC_ANY != 0
    }
}

pub trait ImageSource {
    /// Resolve `path` and open the file it names.
    ///
    /// The path is consumed: resolution may rewrite it in place, so the
    /// caller never gets it back.
    fn open(&mut self, path: ExecPath, flags: OpenFlags) -> VfsResult<ImageHandle>;

    fn close(&mut self, handle: ImageHandle);
}
