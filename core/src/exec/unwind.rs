//! Failure cleanup once a new address space is installed.
//!
//! Whatever failed, the space stops being current: it is unbound from the
//! processor and detached from the process. What happens to it afterwards is
//! chosen by [`Reclaim`].

use runprog_lib::klog_warn;
use runprog_mm::AddressSpaceOps;

use super::ExecError;
use crate::process::Process;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reclaim {
    /// Park the space on the process; `Process::teardown` destroys it.
    AtTeardown,
    /// Destroy the space now.
    Inline,
}

/// A failure after installation, with the reclaim policy for its stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unwind {
    pub error: ExecError,
    pub reclaim: Reclaim,
}

impl Unwind {
    pub const fn deferred(error: ExecError) -> Self {
        Self {
            error,
            reclaim: Reclaim::AtTeardown,
        }
    }

    pub const fn inline(error: ExecError) -> Self {
        Self {
            error,
            reclaim: Reclaim::Inline,
        }
    }
}

/// Deactivate and detach the current space, then reclaim it per policy.
/// Returns the error to report.
pub fn unwind<S>(
    vm: &mut dyn AddressSpaceOps<Space = S>,
    process: &Process<S>,
    failure: Unwind,
) -> ExecError {
    vm.deactivate();
    match process.set_space(None) {
        Some(space) => match failure.reclaim {
            Reclaim::AtTeardown => {
                process.defer_reclaim(space);
                klog_warn!(
                    "exec: pid {} bootstrap failed: {}; address space deferred to teardown",
                    process.pid(),
                    failure.error
                );
            }
            Reclaim::Inline => {
                vm.destroy(space);
                klog_warn!(
                    "exec: pid {} bootstrap failed: {}; address space destroyed",
                    process.pid(),
                    failure.error
                );
            }
        },
        None => klog_warn!(
            "exec: pid {} bootstrap failed: {}; no address space to unwind",
            process.pid(),
            failure.error
        ),
    }
    failure.error
}
