//! The default `PlatformFs` implementation for POSIX targets.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::acl::{Acl, AclKind};
use crate::error::MetadataError;
use crate::stat::Stat;
use crate::xattr::Namespace;
use crate::{acl, xattr};

/// The metadata adapter surface the replication engine drives everything
/// through. The sole layer aware of any particular kernel's calling
/// conventions; every other crate in the workspace talks to this trait,
/// never to `libc` directly.
pub trait PlatformFs {
    /// `lstat(2)`: never follows a trailing symlink.
    fn lstat(&self, path: &Path) -> Result<Stat, MetadataError>;
    /// `readlink(2)`.
    fn readlink(&self, path: &Path) -> Result<PathBuf, MetadataError>;

    /// Reads the ACL of `kind` from `path`.
    fn acl_get(&self, path: &Path, kind: AclKind, follow: bool) -> Result<Option<Acl>, MetadataError>;
    /// Applies `acl` of `kind` to `path`.
    fn acl_set(&self, path: &Path, kind: AclKind, acl: &Acl, follow: bool) -> Result<(), MetadataError>;

    /// Lists extended attribute names in namespace `ns`.
    fn xattr_list(&self, path: &Path, ns: Namespace, follow: bool) -> Result<Vec<String>, MetadataError>;
    /// Reads an extended attribute's value.
    fn xattr_get(&self, path: &Path, ns: Namespace, name: &str, follow: bool) -> Result<Vec<u8>, MetadataError>;
    /// Sets an extended attribute's value.
    fn xattr_set(
        &self,
        path: &Path,
        ns: Namespace,
        name: &str,
        value: &[u8],
        follow: bool,
    ) -> Result<(), MetadataError>;
    /// Removes an extended attribute.
    fn xattr_delete(&self, path: &Path, ns: Namespace, name: &str, follow: bool) -> Result<(), MetadataError>;

    /// `chmod(2)`: follows symlinks.
    fn chmod(&self, path: &Path, mode: u32) -> Result<(), MetadataError>;
    /// `lchmod(2)` where the platform offers it; `Unsupported` otherwise
    /// (notably on Linux, which has no symlink-mode concept).
    fn lchmod(&self, path: &Path, mode: u32) -> Result<(), MetadataError>;
    /// `lchown(2)`. `None` leaves that id unchanged.
    fn lchown(&self, path: &Path, uid: Option<u32>, gid: Option<u32>) -> Result<(), MetadataError>;
    /// Restores access and modification times, optionally without following
    /// a trailing symlink.
    fn set_times(&self, path: &Path, atime: SystemTime, mtime: SystemTime, follow: bool) -> Result<(), MetadataError>;
    /// BSD file flags (`chflags(2)` family). `Unsupported` on platforms
    /// without a flags word (Linux).
    fn lchflags(&self, path: &Path, flags: u32) -> Result<(), MetadataError>;
}

#[cfg(any(
    target_os = "macos",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
fn raw_lstat_flags(path: &Path) -> Result<u32, MetadataError> {
    let c_path = path_cstring(path)?;
    let mut buf: libc::stat = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::lstat(c_path.as_ptr(), &mut buf) };
    if rc != 0 {
        return Err(MetadataError::from_io("lstat", std::io::Error::last_os_error()));
    }
    Ok(buf.st_flags as u32)
}

#[cfg(not(any(
    target_os = "macos",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
fn raw_lstat_flags(_path: &Path) -> Result<u32, MetadataError> {
    Ok(0)
}

fn path_cstring(path: &Path) -> Result<CString, MetadataError> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        MetadataError::from_io("path", std::io::Error::from(std::io::ErrorKind::InvalidInput))
    })
}

/// The default, Unix-flavored [`PlatformFs`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixFs;

impl PlatformFs for UnixFs {
    fn lstat(&self, path: &Path) -> Result<Stat, MetadataError> {
        let metadata = std::fs::symlink_metadata(path)
            .map_err(|err| MetadataError::from_io("lstat", err))?;
        let mut stat = Stat::from_metadata(&metadata);
        stat.flags = raw_lstat_flags(path)?;
        Ok(stat)
    }

    fn readlink(&self, path: &Path) -> Result<PathBuf, MetadataError> {
        std::fs::read_link(path).map_err(|err| MetadataError::from_io("readlink", err))
    }

    fn acl_get(&self, path: &Path, kind: AclKind, follow: bool) -> Result<Option<Acl>, MetadataError> {
        acl::acl_get(path, kind, follow)
    }

    fn acl_set(&self, path: &Path, kind: AclKind, value: &Acl, follow: bool) -> Result<(), MetadataError> {
        acl::acl_set(path, kind, value, follow)
    }

    fn xattr_list(&self, path: &Path, ns: Namespace, follow: bool) -> Result<Vec<String>, MetadataError> {
        xattr::xattr_list(path, ns, follow)
    }

    fn xattr_get(&self, path: &Path, ns: Namespace, name: &str, follow: bool) -> Result<Vec<u8>, MetadataError> {
        xattr::xattr_get(path, ns, name, follow)
    }

    fn xattr_set(
        &self,
        path: &Path,
        ns: Namespace,
        name: &str,
        value: &[u8],
        follow: bool,
    ) -> Result<(), MetadataError> {
        xattr::xattr_set(path, ns, name, value, follow)
    }

    fn xattr_delete(&self, path: &Path, ns: Namespace, name: &str, follow: bool) -> Result<(), MetadataError> {
        xattr::xattr_delete(path, ns, name, follow)
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<(), MetadataError> {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .map_err(|err| MetadataError::from_io("chmod", err))
    }

    #[cfg(any(target_os = "macos", target_os = "freebsd", target_os = "netbsd", target_os = "openbsd"))]
    fn lchmod(&self, path: &Path, mode: u32) -> Result<(), MetadataError> {
        let c_path = path_cstring(path)?;
        let rc = unsafe { libc::lchmod(c_path.as_ptr(), mode as libc::mode_t) };
        if rc != 0 {
            return Err(MetadataError::from_io("lchmod", std::io::Error::last_os_error()));
        }
        Ok(())
    }

    #[cfg(not(any(target_os = "macos", target_os = "freebsd", target_os = "netbsd", target_os = "openbsd")))]
    fn lchmod(&self, _path: &Path, _mode: u32) -> Result<(), MetadataError> {
        Err(MetadataError::unsupported("lchmod"))
    }

    fn lchown(&self, path: &Path, uid: Option<u32>, gid: Option<u32>) -> Result<(), MetadataError> {
        let c_path = path_cstring(path)?;
        // -1 (cast to the platform's unsigned id type) leaves that id unchanged.
        let uid = uid.map_or(u32::MAX, |v| v) as libc::uid_t;
        let gid = gid.map_or(u32::MAX, |v| v) as libc::gid_t;
        let rc = unsafe { libc::lchown(c_path.as_ptr(), uid, gid) };
        if rc != 0 {
            return Err(MetadataError::from_io("lchown", std::io::Error::last_os_error()));
        }
        Ok(())
    }

    fn set_times(&self, path: &Path, atime: SystemTime, mtime: SystemTime, follow: bool) -> Result<(), MetadataError> {
        let atime = filetime::FileTime::from_system_time(atime);
        let mtime = filetime::FileTime::from_system_time(mtime);
        let result = if follow {
            filetime::set_file_times(path, atime, mtime)
        } else {
            filetime::set_symlink_file_times(path, atime, mtime)
        };
        result.map_err(|err| MetadataError::from_io("set_times", err))
    }

    fn lchflags(&self, path: &Path, flags: u32) -> Result<(), MetadataError> {
        crate::flags::lchflags(path, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::{scratch_dir, write_file};

    #[test]
    fn lstat_reports_regular_file_kind_and_size() {
        let dir = scratch_dir();
        let path = dir.path().join("a.txt");
        write_file(&path, b"hello");

        let stat = UnixFs.lstat(&path).expect("lstat");
        assert_eq!(stat.kind, crate::stat::FileKind::Regular);
        assert_eq!(stat.size, 5);
    }

    #[test]
    fn lstat_does_not_follow_symlinks() {
        let dir = scratch_dir();
        let target = dir.path().join("target.txt");
        write_file(&target, b"data");
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).expect("create symlink");

        let stat = UnixFs.lstat(&link).expect("lstat");
        assert_eq!(stat.kind, crate::stat::FileKind::Symlink);
    }

    #[test]
    fn readlink_returns_target() {
        let dir = scratch_dir();
        let target = dir.path().join("target.txt");
        write_file(&target, b"data");
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).expect("create symlink");

        assert_eq!(UnixFs.readlink(&link).unwrap(), target);
    }

    #[test]
    fn chmod_changes_permission_bits() {
        let dir = scratch_dir();
        let path = dir.path().join("a.txt");
        write_file(&path, b"hello");

        UnixFs.chmod(&path, 0o640).expect("chmod");
        let stat = UnixFs.lstat(&path).expect("lstat");
        assert_eq!(stat.mode & 0o777, 0o640);
    }

    #[test]
    fn xattr_round_trips_user_namespace() {
        let dir = scratch_dir();
        let path = dir.path().join("a.txt");
        write_file(&path, b"hello");

        if xattr::xattr_set(&path, Namespace::User, "greeting", b"hi", true).is_err() {
            // Filesystem under the test runner may not support xattrs (e.g. overlayfs/tmpfs
            // without the feature); skip rather than fail.
            return;
        }
        let names = xattr::xattr_list(&path, Namespace::User, true).expect("list");
        assert!(names.contains(&"greeting".to_string()));
        let value = xattr::xattr_get(&path, Namespace::User, "greeting", true).expect("get");
        assert_eq!(value, b"hi");
        xattr::xattr_delete(&path, Namespace::User, "greeting", true).expect("delete");
        let names = xattr::xattr_list(&path, Namespace::User, true).expect("list");
        assert!(!names.contains(&"greeting".to_string()));
    }

    #[test]
    fn set_times_restores_mtime_past_2038() {
        let dir = scratch_dir();
        let path = dir.path().join("a.txt");
        write_file(&path, b"hello");

        // 2040-01-01T00:00:00Z, past the 32-bit time_t rollover.
        let when = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(2_208_988_800);
        UnixFs.set_times(&path, when, when, true).expect("set_times");
        let stat = UnixFs.lstat(&path).expect("lstat");
        assert_eq!(
            stat.mtime
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap()
                .as_secs(),
            2_208_988_800
        );
    }
}
