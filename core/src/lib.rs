#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod exec;
pub mod process;

pub use exec::{
    ExecContext, ExecError, ExecLimits, ImageLoader, LoadError, ModeTransfer, prepare_program,
    run_program,
};
pub use process::Process;
