use std::fs::Metadata;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::time::SystemTime;

/// The POSIX file type bits, reduced to the variants the replication engine
/// routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Regular file.
    Regular,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Block device.
    BlockDevice,
    /// Character device.
    CharDevice,
    /// Named pipe (FIFO).
    Fifo,
    /// `AF_UNIX` socket.
    Socket,
}

impl FileKind {
    /// Classifies a [`std::fs::Metadata`] obtained via `lstat`.
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_block_device() {
            Self::BlockDevice
        } else if file_type.is_char_device() {
            Self::CharDevice
        } else if file_type.is_fifo() {
            Self::Fifo
        } else if file_type.is_socket() {
            Self::Socket
        } else {
            Self::Regular
        }
    }
}

/// The subset of `struct stat` the engine's comparator and writer consult.
///
/// Always obtained via the link-not-following variant (`lstat`): the engine
/// never implicitly follows symlinks when inspecting a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    /// Node type.
    pub kind: FileKind,
    /// Full mode word, including the type bits.
    pub mode: u32,
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
    /// Size in bytes (meaningful for regular files).
    pub size: u64,
    /// Device number for block/char nodes.
    pub rdev: u64,
    /// Last access time.
    pub atime: SystemTime,
    /// Last modification time.
    pub mtime: SystemTime,
    /// BSD `st_flags` word. Always `0` on platforms without a flags word
    /// (Linux); populated from a raw `lstat` on BSD-like targets since
    /// `std::fs::Metadata` does not expose it portably.
    pub flags: u32,
}

impl Stat {
    /// Builds a [`Stat`] from `std::fs` metadata obtained without following
    /// symlinks. `flags` defaults to `0`; callers on BSD-like platforms
    /// overwrite it with a raw `lstat` result.
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            kind: FileKind::from_metadata(metadata),
            mode: metadata.mode(),
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
            rdev: metadata.rdev(),
            atime: metadata.accessed().unwrap_or(SystemTime::UNIX_EPOCH),
            mtime: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            flags: 0,
        }
    }
}
