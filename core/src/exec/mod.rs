//! Program bootstrap: load an image into a fresh address space and start it
//! in user mode with `argc`/`argv`.
//!
//! The caller is a process with no address space yet. On success control
//! never comes back; on failure the process is left with no current space
//! and every transient allocation released.

pub mod args;
pub mod config;
pub mod loader;
pub mod stack;
pub mod transfer;
pub mod unwind;


use core::ffi::CStr;
use core::fmt;

use runprog_abi::addr::VirtAddr;
use runprog_abi::errno;
use runprog_abi::exec::UserEntry;
use runprog_abi::fs::OpenFlags;
use runprog_fs::{ExecPath, ImageHandle, ImageSource, VfsError};
use runprog_lib::{klog_error, klog_info};
use runprog_mm::{AddressSpaceOps, MmError, UserCopy, UserPtrError};

use crate::process::Process;
use args::ArgTable;
use stack::build_arg_stack;
use unwind::{Unwind, unwind};

pub use config::ExecLimits;
pub use loader::{ImageLoader, LoadError};
pub use transfer::ModeTransfer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExecError {
    NoEntry = -errno::ENOENT,
    IoError = -errno::EIO,
    TooManyArgs = -errno::E2BIG,
    NoExec = -errno::ENOEXEC,
    NoMem = -errno::ENOMEM,
    PermissionDenied = -errno::EACCES,
    Fault = -errno::EFAULT,
    NotDirectory = -errno::ENOTDIR,
    IsDirectory = -errno::EISDIR,
    NameTooLong = -errno::ENAMETOOLONG,
}

impl ExecError {
    /// Negated errno, as returned to the caller.
    pub const fn errno(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoEntry => "no such file",
            Self::IoError => "I/O error",
            Self::TooManyArgs => "argument list too long",
            Self::NoExec => "exec format error",
            Self::NoMem => "out of memory",
            Self::PermissionDenied => "permission denied",
            Self::Fault => "bad user address",
            Self::NotDirectory => "not a directory",
            Self::IsDirectory => "is a directory",
            Self::NameTooLong => "file name too long",
        };
        write!(f, "{} ({})", text, self.errno())
    }
}

impl From<VfsError> for ExecError {
    fn from(err: VfsError) -> Self {
        match err {
            VfsError::NotFound => ExecError::NoEntry,
            VfsError::NotDirectory => ExecError::NotDirectory,
            VfsError::IsDirectory => ExecError::IsDirectory,
            VfsError::PermissionDenied => ExecError::PermissionDenied,
            VfsError::NameTooLong => ExecError::NameTooLong,
            VfsError::IoError => ExecError::IoError,
            VfsError::NoMemory => ExecError::NoMem,
        }
    }
}

impl From<LoadError> for ExecError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::BadFormat | LoadError::Unsupported => ExecError::NoExec,
            LoadError::Io => ExecError::IoError,
            LoadError::NoMemory => ExecError::NoMem,
            LoadError::Fault => ExecError::Fault,
        }
    }
}

impl From<MmError> for ExecError {
    fn from(err: MmError) -> Self {
        match err {
            MmError::NoMemory => ExecError::NoMem,
            MmError::MappingFailed | MmError::InvalidAddress | MmError::NoStack => {
                ExecError::Fault
            }
        }
    }
}

impl From<UserPtrError> for ExecError {
    fn from(_: UserPtrError) -> Self {
        ExecError::Fault
    }
}

/// The collaborators a bootstrap runs against, passed explicitly.
pub struct ExecContext<'a, S> {
    pub fs: &'a mut dyn ImageSource,
    pub vm: &'a mut dyn AddressSpaceOps<Space = S>,
    pub loader: &'a mut dyn ImageLoader<S>,
    pub user: &'a mut dyn UserCopy,
    pub cpu: &'a mut dyn ModeTransfer,
    pub limits: ExecLimits,
}

fn admit_image(image: &ImageHandle, limits: &ExecLimits) -> Result<(), ExecError> {
    if !image.is_executable() || image.size == 0 || image.size > limits.max_image_size {
        return Err(ExecError::NoExec);
    }
    Ok(())
}

/// Open `path`, build a new address space for `process`, load the image
/// and lay out `args` on its stack.
///
/// Returns the register state the program must start with. The new space
/// is current and active on success.
///
/// # Panics
///
/// Panics if `process` already has an address space. The check runs after
/// the image is opened and the handle is not closed on that path.
pub fn prepare_program<S>(
    ctx: &mut ExecContext<'_, S>,
    process: &Process<S>,
    path: ExecPath,
    args: &[&CStr],
) -> Result<UserEntry, ExecError> {
    if path.len() > ctx.limits.max_path {
        return Err(ExecError::NameTooLong);
    }
    let table = ArgTable::materialize(args, &ctx.limits)?;

    let image = ctx.fs.open(path, OpenFlags::READ)?;

    assert!(
        !process.has_space(),
        "exec: pid {} already has an address space",
        process.pid()
    );

    if let Err(err) = admit_image(&image, &ctx.limits) {
        ctx.fs.close(image);
        return Err(err);
    }

    let space = match ctx.vm.create() {
        Ok(space) => space,
        Err(err) => {
            ctx.fs.close(image);
            return Err(err.into());
        }
    };
    process.set_space(Some(space));
    process.with_space(|space| ctx.vm.activate(space));

    match populate(ctx, process, image, &table) {
        Ok(entry) => {
            klog_info!(
                "exec: pid {} ready, entry={:#x}, stack={:#x}, argv={:#x}, argc={}",
                process.pid(),
                entry.entry,
                entry.stack_pointer,
                entry.argv,
                entry.argc
            );
            Ok(entry)
        }
        Err(failure) => Err(unwind(&mut *ctx.vm, process, failure)),
    }
}

/// Everything between installation and a ready stack. Each error carries
/// the reclaim policy for the stage it happened in.
fn populate<S>(
    ctx: &mut ExecContext<'_, S>,
    process: &Process<S>,
    image: ImageHandle,
    table: &ArgTable<'_>,
) -> Result<UserEntry, Unwind> {
    let loaded = process
        .with_space(|space| ctx.loader.load(&image, space))
        .unwrap_or(Err(LoadError::Fault));
    ctx.fs.close(image);
    let entry = loaded.map_err(|err| Unwind::deferred(err.into()))?;

    let (initial_sp, region_top) = process
        .with_space(|space| -> Result<(VirtAddr, VirtAddr), MmError> {
            let sp = ctx.vm.define_stack(space)?;
            Ok((sp, ctx.vm.stack_region_top(space)))
        })
        .unwrap_or(Err(MmError::NoStack))
        .map_err(|err| Unwind::deferred(err.into()))?;

    let stack = build_arg_stack(table, region_top, initial_sp, &mut *ctx.user)
        .map_err(Unwind::inline)?;

    Ok(UserEntry {
        argc: stack.argc as u64,
        argv: stack.argv,
        stack_pointer: stack.stack_pointer,
        entry,
    })
}

/// Bootstrap `process` and transfer control to it.
///
/// Only returns on failure, with the error for the caller.
///
/// # Panics
///
/// Panics if `process` already has an address space (leaving the opened
/// image handle unclosed, as in [`prepare_program`]), or if the mode
/// transfer comes back.
pub fn run_program<S>(
    ctx: &mut ExecContext<'_, S>,
    process: &Process<S>,
    path: ExecPath,
    args: &[&CStr],
) -> ExecError {
    let entry = match prepare_program(ctx, process, path, args) {
        Ok(entry) => entry,
        Err(err) => return err,
    };
    ctx.cpu.enter_new_process(&entry);
    klog_error!("exec: pid {} came back from user mode entry", process.pid());
    panic!("enter_new_process returned");
}
