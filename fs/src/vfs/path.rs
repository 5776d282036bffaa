use alloc::vec::Vec;

use super::traits::{VfsError, VfsResult};
use crate::MAX_PATH_LEN;

/// An owned, validated path to an executable.
///
/// Bytes after the first NUL are ignored, so both `b"/bin/sh"` and
/// `b"/bin/sh\0"` name the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecPath {
    bytes: Vec<u8>,
}

fn trim_nul_bytes(bytes: &[u8]) -> &[u8] {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..len]
}

impl ExecPath {
    pub fn new(raw: &[u8]) -> VfsResult<Self> {
        let trimmed = trim_nul_bytes(raw);
        if trimmed.is_empty() {
            return Err(VfsError::NotFound);
        }
        if trimmed.len() > MAX_PATH_LEN {
            return Err(VfsError::NameTooLong);
        }
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(trimmed.len())
            .map_err(|_| VfsError::NoMemory)?;
        bytes.extend_from_slice(trimmed);
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
