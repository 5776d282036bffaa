//! The address-space seam used by the program bootstrap.
//!
//! An implementation owns page tables, VMAs and the per-CPU "active space"
//! register. The bootstrap only drives the lifecycle:
//!
//! ```text
//! create -> activate -> (loader populates) -> define_stack -> owned by process
//!                    \-> deactivate -> detach -> destroy | defer to teardown
//! ```
//!
//! Detaching is a property of the process record, not of the space, so it is
//! not part of this trait.

use runprog_abi::addr::VirtAddr;

use crate::error::MmResult;
use crate::memory_layout_defs::PROCESS_STACK_TOP_VA;

pub trait AddressSpaceOps {
    type Space;

    /// Allocate a new, empty address space.
    fn create(&mut self) -> MmResult<Self::Space>;

    /// Bind `space` to the running processor.
    fn activate(&mut self, space: &Self::Space);

    /// Unbind whatever space is bound to the running processor.
    fn deactivate(&mut self);

    /// Map the user stack region and return the initial stack pointer.
    fn define_stack(&mut self, space: &mut Self::Space) -> MmResult<VirtAddr>;

    /// Top of the user stack region; the final stack pointer is aligned
    /// relative to this address.
    fn stack_region_top(&self, _space: &Self::Space) -> VirtAddr {
        VirtAddr(PROCESS_STACK_TOP_VA)
    }

    /// Release every resource held by `space`.
    fn destroy(&mut self, space: Self::Space);
}
