//! Process exit codes, trimmed to the subset this workspace's error
//! taxonomy (§7) actually produces. Numbering follows upstream rsync's
//! `errcode.h` for the codes that still apply to a local filesystem
//! replication tool; codes tied to the protocol, daemon, or remote-shell
//! layers (`RERR_PROTOCOL`, `RERR_SOCKETIO`, `RERR_CMD_*`, ...) have no
//! counterpart here and are not reproduced.

use std::fmt;

/// Exit codes returned by `reflect-sync`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful completion (`RERR_OK`).
    Ok = 0,
    /// Syntax or usage error: bad arguments, malformed size/digest spec.
    Syntax = 1,
    /// Errors selecting input/output files or directories (`RERR_FILESELECT`).
    FileSelect = 3,
    /// Requested action not supported on this platform (`RERR_UNSUPPORTED`).
    Unsupported = 4,
    /// Error in file I/O during a copy or metadata write (`RERR_FILEIO`).
    FileIo = 11,
    /// Partial run: the `ignore` policy let per-node errors continue, but
    /// at least one was logged (`RERR_PARTIAL`).
    PartialTransfer = 23,
    /// A comparator invariant was violated. Not part of upstream's table;
    /// reserved for bugs in this implementation rather than environment or
    /// input problems.
    Internal = 99,
}

impl ExitCode {
    /// Returns the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns a human-readable description of this exit code.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::Syntax => "syntax or usage error",
            Self::FileSelect => "errors selecting input/output files, dirs",
            Self::Unsupported => "requested action not supported",
            Self::FileIo => "error in file IO",
            Self::PartialTransfer => "partial run due to error",
            Self::Internal => "internal invariant violation",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_is_zero() {
        assert_eq!(ExitCode::Ok.as_i32(), 0);
    }

    #[test]
    fn partial_transfer_matches_upstream_numbering() {
        assert_eq!(ExitCode::PartialTransfer.as_i32(), 23);
    }

    #[test]
    fn display_includes_code_and_description() {
        assert_eq!(
            ExitCode::Unsupported.to_string(),
            "requested action not supported (4)"
        );
    }
}
