//! Shared fixtures for the replication engine's integration tests.
//!
//! Mirrors the teacher workspace's `test-support` crate: a tiny grab-bag of
//! helpers for building scratch trees and asserting on their metadata,
//! shared across `flist`, `engine`, `metadata` and `cli` test suites so each
//! crate doesn't reinvent temp-tree scaffolding.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

/// Creates a fresh temporary directory for a test scenario.
#[must_use]
pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().expect("create scratch directory")
}

/// Writes `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, contents).expect("write fixture file");
}

/// Sets both the access and modification time of `path` to `when`.
pub fn set_mtime(path: &Path, when: SystemTime) {
    let ft = filetime::FileTime::from_system_time(when);
    filetime::set_file_times(path, ft, ft).expect("set file times");
}

/// Returns a `SystemTime` `secs` seconds before now, truncated to whole
/// seconds so comparisons are not sensitive to sub-second filesystem
/// resolution differences across platforms.
#[must_use]
pub fn seconds_ago(secs: u64) -> SystemTime {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("system clock before epoch");
    SystemTime::UNIX_EPOCH + Duration::from_secs(now.as_secs().saturating_sub(secs))
}

/// Reads the modification time of `path`.
#[must_use]
pub fn mtime_of(path: &Path) -> SystemTime {
    fs::metadata(path)
        .expect("stat fixture path")
        .modified()
        .expect("platform supports mtime")
}

#[cfg(unix)]
/// Returns the POSIX mode bits (permission + type) of `path`, without following symlinks.
#[must_use]
pub fn lmode_of(path: &Path) -> u32 {
    use std::os::unix::fs::MetadataExt;
    fs::symlink_metadata(path)
        .expect("lstat fixture path")
        .mode()
}
