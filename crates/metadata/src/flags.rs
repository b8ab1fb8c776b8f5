//! BSD-style file flags (`st_flags` / `chflags(2)`).
//!
//! Grounded directly on `pc.c`'s `UF_ARCHIVE` handling: flags are applied to
//! the destination with the archive bit masked out, and separately, when
//! the archive policy is active, cleared on the *source* after a
//! successful replication. Linux has no `chflags` family and every
//! operation here reports [`MetadataErrorKind::Unsupported`](crate::error::MetadataErrorKind::Unsupported).

use std::path::Path;

use crate::error::MetadataError;

#[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
const UF_ARCHIVE: u32 = libc::UF_ARCHIVE as u32;

#[cfg(not(any(target_os = "freebsd", target_os = "dragonfly")))]
const UF_ARCHIVE: u32 = 0;

/// Mask applied to strip the archive bit before comparing or applying flags.
#[must_use]
pub fn without_archive_bit(flags: u32) -> u32 {
    flags & !UF_ARCHIVE
}

/// Whether the archive bit is set.
#[must_use]
pub fn has_archive_bit(flags: u32) -> bool {
    UF_ARCHIVE != 0 && flags & UF_ARCHIVE != 0
}

/// Names every recognized BSD flag bit set in `flags`, for console-line
/// rendering. Empty on platforms without a flags word.
#[must_use]
pub fn flag_names(flags: u32) -> Vec<&'static str> {
    #[cfg(any(
        target_os = "macos",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ))]
    {
        let mut names = Vec::new();
        if flags & (libc::UF_NODUMP as u32) != 0 {
            names.push("nodump");
        }
        if flags & (libc::UF_IMMUTABLE as u32) != 0 {
            names.push("uchg");
        }
        if flags & (libc::UF_APPEND as u32) != 0 {
            names.push("uappnd");
        }
        if flags & (libc::UF_OPAQUE as u32) != 0 {
            names.push("opaque");
        }
        names
    }

    #[cfg(not(any(
        target_os = "macos",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    )))]
    {
        let _ = flags;
        Vec::new()
    }
}

#[cfg(any(
    target_os = "macos",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
pub fn lchflags(path: &Path, flags: u32) -> Result<(), MetadataError> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        MetadataError::from_io("lchflags", std::io::Error::from(std::io::ErrorKind::InvalidInput))
    })?;
    let rc = unsafe { libc::lchflags(c_path.as_ptr(), libc::c_ulong::from(flags)) };
    if rc != 0 {
        return Err(MetadataError::from_io("lchflags", std::io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(not(any(
    target_os = "macos",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
pub fn lchflags(_path: &Path, _flags: u32) -> Result<(), MetadataError> {
    Err(MetadataError::unsupported("lchflags"))
}
