#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `platform` isolates the handful of syscalls needed to *create* a
//! filesystem node of a given type — as opposed to [`metadata`], which
//! inspects and restores attributes on nodes that already exist. The
//! replication driver calls here once per "destination missing" dispatch
//! (§4.I) to materialize the new object before handing it to the metadata
//! writer.
//!
//! # Design
//!
//! Built on `nix`, matching the platform-facing crates elsewhere in this
//! workspace rather than hand-rolling raw `libc` FFI for straightforward,
//! well-covered syscalls (`mkfifo`, `mknod`). `AF_UNIX` socket nodes are
//! created via `std::os::unix::net::UnixListener::bind`, which is already
//! the idiomatic std API for this and needs no extra crate.

use std::io;
use std::os::unix::net::UnixListener;
use std::path::Path;

use nix::sys::stat::{Mode, SFlag, mknod};
use nix::unistd::{Gid, mkfifo};

/// A device node's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Block device.
    Block,
    /// Character device.
    Char,
}

/// A node-creation failure.
#[derive(Debug, thiserror::Error)]
#[error("{operation}: {source}")]
pub struct PlatformError {
    operation: &'static str,
    #[source]
    source: SourceError,
}

#[derive(Debug, thiserror::Error)]
enum SourceError {
    #[error(transparent)]
    Nix(#[from] nix::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PlatformError {
    fn from_nix(operation: &'static str, source: nix::Error) -> Self {
        Self {
            operation,
            source: SourceError::Nix(source),
        }
    }

    fn from_io(operation: &'static str, source: io::Error) -> Self {
        Self {
            operation,
            source: SourceError::Io(source),
        }
    }
}

/// Creates a FIFO (named pipe) at `path` with the given permission bits.
pub fn make_fifo(path: &Path, mode: u32) -> Result<(), PlatformError> {
    mkfifo(path, Mode::from_bits_truncate(mode)).map_err(|err| PlatformError::from_nix("mkfifo", err))
}

/// Creates a block or character device node at `path`.
pub fn make_device(path: &Path, kind: DeviceKind, mode: u32, rdev: u64) -> Result<(), PlatformError> {
    let sflag = match kind {
        DeviceKind::Block => SFlag::S_IFBLK,
        DeviceKind::Char => SFlag::S_IFCHR,
    };
    mknod(path, sflag, Mode::from_bits_truncate(mode), rdev)
        .map_err(|err| PlatformError::from_nix("mknod", err))
}

/// Creates an `AF_UNIX` socket node at `path` by binding and immediately
/// dropping a listener — the kernel leaves the socket inode behind.
pub fn make_socket(path: &Path) -> Result<(), PlatformError> {
    UnixListener::bind(path)
        .map(drop)
        .map_err(|err| PlatformError::from_io("bind", err))
}

/// The calling process's supplementary group ids, used to decide whether
/// `node_compare`'s gid-divergence bit applies to a non-root caller.
pub fn supplementary_groups() -> Result<Vec<u32>, PlatformError> {
    nix::unistd::getgroups()
        .map(|groups: Vec<Gid>| groups.into_iter().map(Gid::as_raw).collect())
        .map_err(|err| PlatformError::from_nix("getgroups", err))
}

/// Whether the calling process is root (effective uid 0).
#[must_use]
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// The calling process's effective user id.
#[must_use]
pub fn effective_uid() -> u32 {
    nix::unistd::geteuid().as_raw()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn make_fifo_creates_a_fifo_node() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipe");
        make_fifo(&path, 0o600).expect("mkfifo");
        let stat = std::fs::symlink_metadata(&path).expect("stat");
        assert!(std::os::unix::fs::FileTypeExt::is_fifo(&stat.file_type()));
    }

    #[test]
    fn make_socket_leaves_a_socket_node() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sock");
        make_socket(&path).expect("bind socket");
        let stat = std::fs::symlink_metadata(&path).expect("stat");
        assert!(std::os::unix::fs::FileTypeExt::is_socket(&stat.file_type()));
    }

    #[test]
    fn effective_uid_matches_libc() {
        assert_eq!(effective_uid(), unsafe { libc::geteuid() });
    }
}
