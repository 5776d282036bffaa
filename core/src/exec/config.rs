//! Bootstrap limits, overridable from the kernel command line.

/// Also the ceiling for `exec.max_path=`; `ExecPath` rejects anything longer.
pub const EXEC_MAX_PATH: usize = runprog_fs::MAX_PATH_LEN;
pub const EXEC_MAX_ARG_STRLEN: usize = 4096;
pub const EXEC_MAX_ARGS: usize = 32;
pub const EXEC_MAX_IMAGE_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecLimits {
    pub max_args: usize,
    /// Longest accepted argument, terminator excluded.
    pub max_arg_len: usize,
    pub max_path: usize,
    pub max_image_size: u64,
}

impl ExecLimits {
    pub const DEFAULT: Self = Self {
        max_args: EXEC_MAX_ARGS,
        max_arg_len: EXEC_MAX_ARG_STRLEN,
        max_path: EXEC_MAX_PATH,
        max_image_size: EXEC_MAX_IMAGE_SIZE,
    };

    /// Start from the defaults and apply any `exec.*=` tokens.
    pub fn from_cmdline(cmdline: Option<&str>) -> Self {
        let mut limits = Self::DEFAULT;
        let Some(cmdline) = cmdline else {
            return limits;
        };
        for token in cmdline.split_whitespace() {
            if let Some(value) = token.strip_prefix("exec.max_args=") {
                if let Ok(parsed) = value.parse::<usize>() {
                    limits.max_args = parsed;
                }
            } else if let Some(value) = token.strip_prefix("exec.max_arg_len=") {
                if let Ok(parsed) = value.parse::<usize>() {
                    limits.max_arg_len = parsed;
                }
            } else if let Some(value) = token.strip_prefix("exec.max_path=") {
                if let Ok(parsed) = value.parse::<usize>() {
                    limits.max_path = parsed.min(EXEC_MAX_PATH);
                }
            } else if let Some(value) = token.strip_prefix("exec.max_image=") {
                if let Some(parsed) = parse_size(value) {
                    limits.max_image_size = parsed;
                }
            }
        }
        limits
    }
}

impl Default for ExecLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn parse_size(value: &str) -> Option<u64> {
    let (digits, shift) = if let Some(d) = value.strip_suffix(['k', 'K']) {
        (d, 10)
    } else if let Some(d) = value.strip_suffix(['m', 'M']) {
        (d, 20)
    } else {
        (value, 0)
    };
    digits.parse::<u64>().ok()?.checked_mul(1u64 << shift)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cmdline_gives_defaults() {
        assert_eq!(ExecLimits::from_cmdline(None), ExecLimits::default());
        assert_eq!(ExecLimits::from_cmdline(Some("")), ExecLimits::DEFAULT);
    }

    #[test]
    fn overrides_are_applied() {
        let limits = ExecLimits::from_cmdline(Some(
            "root=/dev/vda exec.max_args=4 exec.max_arg_len=64 exec.max_path=32 exec.max_image=2m",
        ));
        assert_eq!(limits.max_args, 4);
        assert_eq!(limits.max_arg_len, 64);
        assert_eq!(limits.max_path, 32);
        assert_eq!(limits.max_image_size, 2 * 1024 * 1024);
    }

    #[test]
    fn path_limit_cannot_exceed_exec_path_bound() {
        let loose = ExecLimits::from_cmdline(Some("exec.max_path=512"));
        assert_eq!(loose.max_path, EXEC_MAX_PATH);

        // Anything ExecPath accepts must also pass the configured bound.
        let longest = [b'a'; EXEC_MAX_PATH];
        let path = runprog_fs::ExecPath::new(&longest).unwrap();
        assert!(path.len() <= loose.max_path);
        assert_eq!(
            runprog_fs::ExecPath::new(&[b'a'; EXEC_MAX_PATH + 1]),
            Err(runprog_fs::VfsError::NameTooLong)
        );

        let tight = ExecLimits::from_cmdline(Some("exec.max_path=64"));
        assert_eq!(tight.max_path, 64);
    }

    #[test]
    fn malformed_values_are_ignored() {
        let limits = ExecLimits::from_cmdline(Some("exec.max_args=lots exec.max_image=12q"));
        assert_eq!(limits, ExecLimits::DEFAULT);
    }

    #[test]
    fn size_suffixes() {
        assert_eq!(parse_size("512"), Some(512));
        assert_eq!(parse_size("4k"), Some(4096));
        assert_eq!(parse_size("1M"), Some(1 << 20));
        assert_eq!(parse_size("k"), None);
    }
}
