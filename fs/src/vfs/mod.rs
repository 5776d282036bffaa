pub mod path;
pub mod traits;

pub use path::ExecPath;
pub use traits::{FileType, ImageHandle, ImageSource, InodeId, VfsError, VfsResult};
