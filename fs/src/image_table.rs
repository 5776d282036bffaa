//! Boot-time image table.
//!
//! Resolves paths against a fixed list of images linked into the kernel,
//! before (or instead of) a mounted root filesystem. Entries are matched by
//! exact path; a path that runs *through* a regular file fails with
//! `NotDirectory`, like a real lookup would.

use runprog_abi::fs::OpenFlags;
use runprog_lib::klog_debug;

use crate::vfs::{ExecPath, FileType, ImageHandle, ImageSource, InodeId, VfsError, VfsResult};

#[derive(Clone, Copy, Debug)]
pub struct ImageEntry {
    pub path: &'static [u8],
    pub inode: InodeId,
    pub size: u64,
    pub mode: u16,
    pub file_type: FileType,
}

impl ImageEntry {
    pub const fn program(path: &'static [u8], inode: InodeId, size: u64) -> Self {
        Self {
            path,
            inode,
            size,
            mode: 0o755,
            file_type: FileType::Regular,
        }
    }

    pub const fn directory(path: &'static [u8], inode: InodeId) -> Self {
        Self {
            path,
            inode,
            size: 0,
            mode: 0o755,
            file_type: FileType::Directory,
        }
    }
}

pub struct StaticImages {
    entries: &'static [ImageEntry],
    open_handles: usize,
}

impl StaticImages {
    pub const fn new(entries: &'static [ImageEntry]) -> Self {
        Self {
            entries,
            open_handles: 0,
        }
    }

    /// Handles returned by `open` and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.open_handles
    }

    fn lookup(&self, path: &[u8]) -> VfsResult<&ImageEntry> {
        if let Some(entry) = self.entries.iter().find(|e| e.path == path) {
            return Ok(entry);
        }
        let through_file = path
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == b'/')
            .any(|(i, _)| {
                self.entries
                    .iter()
                    .any(|e| e.file_type == FileType::Regular && e.path == &path[..i])
            });
        if through_file {
            Err(VfsError::NotDirectory)
        } else {
            Err(VfsError::NotFound)
        }
    }
}

impl ImageSource for StaticImages {
    fn open(&mut self, path: ExecPath, flags: OpenFlags) -> VfsResult<ImageHandle> {
        if flags.contains(OpenFlags::WRITE) {
            return Err(VfsError::PermissionDenied);
        }
        let entry = self.lookup(path.as_bytes())?;
        if entry.file_type == FileType::Directory {
            return Err(VfsError::IsDirectory);
        }
        let handle = ImageHandle {
            inode: entry.inode,
            size: entry.size,
            mode: entry.mode,
        };
        self.open_handles += 1;
        klog_debug!("image_table: opened inode {} ({} bytes)", handle.inode, handle.size);
        Ok(handle)
    }

    fn close(&mut self, handle: ImageHandle) {
        debug_assert!(self.open_handles > 0, "close without open");
        self.open_handles = self.open_handles.saturating_sub(1);
        klog_debug!("image_table: closed inode {}", handle.inode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static ENTRIES: [ImageEntry; 3] = [
        ImageEntry::directory(b"/bin", 1),
        ImageEntry::program(b"/bin/sh", 2, 4096),
        ImageEntry {
            path: b"/etc/motd",
            inode: 3,
            size: 12,
            mode: 0o644,
            file_type: FileType::Regular,
        },
    ];

    fn path(p: &[u8]) -> ExecPath {
        ExecPath::new(p).unwrap()
    }

    #[test]
    fn open_and_close_balance() {
        let mut images = StaticImages::new(&ENTRIES);
        let handle = images.open(path(b"/bin/sh"), OpenFlags::READ).unwrap();
        assert_eq!(handle.inode, 2);
        assert!(handle.is_executable());
        assert_eq!(images.open_handles(), 1);
        images.close(handle);
        assert_eq!(images.open_handles(), 0);
    }

    #[test]
    fn lookup_errors() {
        let mut images = StaticImages::new(&ENTRIES);
        assert_eq!(
            images.open(path(b"/bin/nope"), OpenFlags::READ),
            Err(VfsError::NotFound)
        );
        assert_eq!(
            images.open(path(b"/bin"), OpenFlags::READ),
            Err(VfsError::IsDirectory)
        );
        assert_eq!(
            images.open(path(b"/bin/sh/x"), OpenFlags::READ),
            Err(VfsError::NotDirectory)
        );
        assert_eq!(
            images.open(path(b"/bin/sh"), OpenFlags::READ | OpenFlags::WRITE),
            Err(VfsError::PermissionDenied)
        );
        assert_eq!(images.open_handles(), 0);
    }

    #[test]
    fn non_executable_mode_is_reported() {
        let mut images = StaticImages::new(&ENTRIES);
        let handle = images.open(path(b"/etc/motd"), OpenFlags::READ).unwrap();
        assert!(!handle.is_executable());
        images.close(handle);
    }
}
