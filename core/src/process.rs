//! Per-process address-space ownership.
//!
//! A process owns at most one *current* address space, plus any spaces that
//! failed mid-bootstrap and were parked for reclamation. Parking is explicit
//! ([`Process::defer_reclaim`]): a doomed space is never current, but it is
//! not leaked either; [`Process::teardown`] destroys it with the rest of the
//! process.

use alloc::vec::Vec;

use runprog_lib::klog_debug;
use runprog_mm::AddressSpaceOps;
use spin::Mutex;

struct SpaceSlots<S> {
    current: Option<S>,
    reclaim: Vec<S>,
}

pub struct Process<S> {
    pid: u32,
    spaces: Mutex<SpaceSlots<S>>,
}

impl<S> Process<S> {
    pub const fn new(pid: u32) -> Self {
        Self {
            pid,
            spaces: Mutex::new(SpaceSlots {
                current: None,
                reclaim: Vec::new(),
            }),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn has_space(&self) -> bool {
        self.spaces.lock().current.is_some()
    }

    /// Install `space` as current (or detach with `None`); returns the
    /// previous current space.
    pub fn set_space(&self, space: Option<S>) -> Option<S> {
        core::mem::replace(&mut self.spaces.lock().current, space)
    }

    /// Run `f` on the current space. `None` if the process has none.
    pub fn with_space<R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        self.spaces.lock().current.as_mut().map(f)
    }

    /// Hand a detached space to process teardown.
    pub fn defer_reclaim(&self, space: S) {
        self.spaces.lock().reclaim.push(space);
    }

    /// Spaces waiting for [`Process::teardown`].
    pub fn pending_reclaim(&self) -> usize {
        self.spaces.lock().reclaim.len()
    }

    /// Destroy the current space and every parked one. Returns how many
    /// spaces were destroyed.
    ///
    /// Must run on the CPU the process last ran on: a current space is
    /// always the one bound there (bootstrap activates on install and
    /// `unwind` deactivates before detaching), so only the current space is
    /// deactivated. Parked spaces are never bound and are destroyed as is.
    pub fn teardown(&self, vm: &mut dyn AddressSpaceOps<Space = S>) -> usize {
        let (current, parked) = {
            let mut slots = self.spaces.lock();
            (slots.current.take(), core::mem::take(&mut slots.reclaim))
        };
        let mut destroyed = 0;
        if let Some(space) = current {
            vm.deactivate();
            vm.destroy(space);
            destroyed += 1;
        }
        for space in parked {
            vm.destroy(space);
            destroyed += 1;
        }
        klog_debug!("process {}: teardown destroyed {} address space(s)", self.pid, destroyed);
        destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runprog_abi::addr::VirtAddr;
    use runprog_mm::MmResult;
    use std::vec::Vec;

    #[derive(Default)]
    struct Ledger {
        next: u32,
        destroyed: Vec<u32>,
        deactivations: usize,
    }

    impl AddressSpaceOps for Ledger {
        type Space = u32;

        fn create(&mut self) -> MmResult<u32> {
            self.next += 1;
            Ok(self.next)
        }

        fn activate(&mut self, _space: &u32) {}

        fn deactivate(&mut self) {
            self.deactivations += 1;
        }

        fn define_stack(&mut self, _space: &mut u32) -> MmResult<VirtAddr> {
            Ok(VirtAddr(0x7000_0000))
        }

        fn destroy(&mut self, space: u32) {
            self.destroyed.push(space);
        }
    }

    #[test]
    fn set_space_returns_previous() {
        let proc = Process::new(1);
        assert!(!proc.has_space());
        assert_eq!(proc.set_space(Some(7u32)), None);
        assert!(proc.has_space());
        assert_eq!(proc.with_space(|s| *s), Some(7));
        assert_eq!(proc.set_space(None), Some(7));
        assert!(!proc.has_space());
        assert_eq!(proc.with_space(|s| *s), None);
    }

    #[test]
    fn teardown_destroys_current_and_parked() {
        let mut vm = Ledger::default();
        let proc = Process::new(2);
        proc.defer_reclaim(3u32);
        proc.defer_reclaim(4);
        proc.set_space(Some(5));
        assert_eq!(proc.pending_reclaim(), 2);

        assert_eq!(proc.teardown(&mut vm), 3);
        assert_eq!(vm.destroyed, std::vec![5, 3, 4]);
        assert_eq!(vm.deactivations, 1);
        assert_eq!(proc.pending_reclaim(), 0);
        assert!(!proc.has_space());
    }

    #[test]
    fn parked_spaces_are_destroyed_without_deactivation() {
        let mut vm = Ledger::default();
        let proc = Process::new(4);
        proc.defer_reclaim(8u32);

        assert_eq!(proc.teardown(&mut vm), 1);
        assert_eq!(vm.destroyed, std::vec![8]);
        assert_eq!(vm.deactivations, 0);
    }

    #[test]
    fn teardown_of_empty_process_is_noop() {
        let mut vm = Ledger::default();
        let proc: Process<u32> = Process::new(3);
        assert_eq!(proc.teardown(&mut vm), 0);
        assert_eq!(vm.deactivations, 0);
    }
}
