//! Argument vector materialization.
//!
//! The table aliases the caller's strings; it never copies or frees them.
//! The borrow on `'a` is what keeps the caller's storage alive for the
//! whole bootstrap.

use alloc::vec::Vec;
use core::ffi::CStr;

use super::ExecError;
use super::config::ExecLimits;

/// `argc` borrowed arguments followed by a `None` sentinel.
pub struct ArgTable<'a> {
    slots: Vec<Option<&'a CStr>>,
}

impl<'a> ArgTable<'a> {
    pub fn materialize(args: &[&'a CStr], limits: &ExecLimits) -> Result<Self, ExecError> {
        if args.len() > limits.max_args {
            return Err(ExecError::TooManyArgs);
        }
        if args.iter().any(|arg| arg.count_bytes() > limits.max_arg_len) {
            return Err(ExecError::TooManyArgs);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(args.len() + 1)
            .map_err(|_| ExecError::NoMem)?;
        slots.extend(args.iter().map(|&arg| Some(arg)));
        slots.push(None);
        Ok(Self { slots })
    }

    pub fn argc(&self) -> usize {
        self.slots.len() - 1
    }

    /// Argument `index`; `None` at `argc` and beyond.
    pub fn get(&self, index: usize) -> Option<&'a CStr> {
        self.slots.get(index).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sentinel_terminated() {
        let args = [c"prog", c"a"];
        let table = ArgTable::materialize(&args, &ExecLimits::DEFAULT).unwrap();
        assert_eq!(table.argc(), 2);
        assert_eq!(table.get(0), Some(c"prog"));
        assert_eq!(table.get(1), Some(c"a"));
        assert_eq!(table.get(2), None);
        assert_eq!(table.slots.len(), 3);
    }

    #[test]
    fn entries_alias_caller_storage() {
        let owned = std::ffi::CString::new("alias").unwrap();
        let args = [owned.as_c_str()];
        let table = ArgTable::materialize(&args, &ExecLimits::DEFAULT).unwrap();
        assert_eq!(table.get(0).unwrap().as_ptr(), owned.as_ptr());
    }

    #[test]
    fn empty_vector_has_only_sentinel() {
        let table = ArgTable::materialize(&[], &ExecLimits::DEFAULT).unwrap();
        assert_eq!(table.argc(), 0);
        assert_eq!(table.get(0), None);
    }

    #[test]
    fn limits_are_enforced() {
        let limits = ExecLimits {
            max_args: 2,
            max_arg_len: 3,
            ..ExecLimits::DEFAULT
        };
        assert!(matches!(
            ArgTable::materialize(&[c"a", c"b", c"c"], &limits),
            Err(ExecError::TooManyArgs)
        ));
        assert!(matches!(
            ArgTable::materialize(&[c"abcd"], &limits),
            Err(ExecError::TooManyArgs)
        ));
        assert!(ArgTable::materialize(&[c"abc", c"de"], &limits).is_ok());
    }
}
