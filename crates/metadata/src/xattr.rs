//! Extended attribute access, normalized across platforms.
//!
//! Linux and macOS disagree on the wire format `listxattr` returns (both use
//! a flat buffer of NUL-terminated names, but the size-probing and
//! follow/no-follow calling conventions differ: Linux exposes distinct
//! `l*xattr` syscalls, macOS threads an `XATTR_NOFOLLOW` flag through the
//! same entry point). This module hides that behind a single
//! `Vec<String>`-returning API, mirroring `attrs.c`'s `extattr_*` macro
//! layer (see `DESIGN.md`).

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::error::MetadataError;

/// Extended attribute namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `user.*` namespace.
    User,
    /// `system.*` namespace (ACLs surface here on some platforms; this
    /// engine reaches it only through [`Namespace::System`] xattr calls,
    /// never through the ACL adapter).
    System,
}

impl Namespace {
    fn qualify(self, name: &str) -> String {
        match self {
            Self::User => format!("user.{name}"),
            Self::System => format!("system.{name}"),
        }
    }

    fn strip(self, qualified: &str) -> Option<String> {
        let prefix = match self {
            Self::User => "user.",
            Self::System => "system.",
        };
        qualified.strip_prefix(prefix).map(str::to_owned)
    }
}

fn path_cstring(path: &Path) -> Result<CString, MetadataError> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| MetadataError::from_io("xattr", std::io::Error::from(std::io::ErrorKind::InvalidInput)))
}

fn name_cstring(name: &str) -> Result<CString, MetadataError> {
    CString::new(name)
        .map_err(|_| MetadataError::from_io("xattr", std::io::Error::from(std::io::ErrorKind::InvalidInput)))
}

fn last_errno_result(op: &'static str, rc: libc::ssize_t) -> Result<usize, MetadataError> {
    if rc < 0 {
        Err(MetadataError::from_io(op, std::io::Error::last_os_error()))
    } else {
        Ok(rc as usize)
    }
}

#[cfg(target_os = "linux")]
mod sys {
    use super::*;

    pub fn list(path: &Path, follow: bool) -> Result<Vec<u8>, MetadataError> {
        let c_path = path_cstring(path)?;
        let probe = |buf: *mut libc::c_char, size: libc::size_t| -> libc::ssize_t {
            if follow {
                unsafe { libc::listxattr(c_path.as_ptr(), buf, size) }
            } else {
                unsafe { libc::llistxattr(c_path.as_ptr(), buf, size) }
            }
        };
        let len = last_errno_result("xattr_list", probe(std::ptr::null_mut(), 0))?;
        if len == 0 {
            return Ok(Vec::new());
        }
        let mut buf = vec![0_u8; len];
        let written = last_errno_result(
            "xattr_list",
            probe(buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()),
        )?;
        buf.truncate(written);
        Ok(buf)
    }

    pub fn get(path: &Path, name: &str, follow: bool) -> Result<Vec<u8>, MetadataError> {
        let c_path = path_cstring(path)?;
        let c_name = name_cstring(name)?;
        let probe = |buf: *mut libc::c_void, size: libc::size_t| -> libc::ssize_t {
            if follow {
                unsafe { libc::getxattr(c_path.as_ptr(), c_name.as_ptr(), buf, size) }
            } else {
                unsafe { libc::lgetxattr(c_path.as_ptr(), c_name.as_ptr(), buf, size) }
            }
        };
        let len = last_errno_result("xattr_get", probe(std::ptr::null_mut(), 0))?;
        let mut buf = vec![0_u8; len];
        let written = last_errno_result("xattr_get", probe(buf.as_mut_ptr().cast::<libc::c_void>(), buf.len()))?;
        buf.truncate(written);
        Ok(buf)
    }

    pub fn set(path: &Path, name: &str, value: &[u8], follow: bool) -> Result<(), MetadataError> {
        let c_path = path_cstring(path)?;
        let c_name = name_cstring(name)?;
        let rc = if follow {
            unsafe {
                libc::setxattr(
                    c_path.as_ptr(),
                    c_name.as_ptr(),
                    value.as_ptr().cast::<libc::c_void>(),
                    value.len(),
                    0,
                )
            }
        } else {
            unsafe {
                libc::lsetxattr(
                    c_path.as_ptr(),
                    c_name.as_ptr(),
                    value.as_ptr().cast::<libc::c_void>(),
                    value.len(),
                    0,
                )
            }
        };
        last_errno_result("xattr_set", libc::ssize_t::from(rc)).map(|_| ())
    }

    pub fn delete(path: &Path, name: &str, follow: bool) -> Result<(), MetadataError> {
        let c_path = path_cstring(path)?;
        let c_name = name_cstring(name)?;
        let rc = if follow {
            unsafe { libc::removexattr(c_path.as_ptr(), c_name.as_ptr()) }
        } else {
            unsafe { libc::lremovexattr(c_path.as_ptr(), c_name.as_ptr()) }
        };
        last_errno_result("xattr_delete", libc::ssize_t::from(rc)).map(|_| ())
    }
}

#[cfg(target_os = "macos")]
mod sys {
    use super::*;

    pub fn list(path: &Path, follow: bool) -> Result<Vec<u8>, MetadataError> {
        let c_path = path_cstring(path)?;
        let flags = if follow { 0 } else { libc::XATTR_NOFOLLOW };
        let len = last_errno_result(
            "xattr_list",
            unsafe { libc::listxattr(c_path.as_ptr(), std::ptr::null_mut(), 0, flags) },
        )?;
        if len == 0 {
            return Ok(Vec::new());
        }
        let mut buf = vec![0_u8; len];
        let written = last_errno_result("xattr_list", unsafe {
            libc::listxattr(c_path.as_ptr(), buf.as_mut_ptr().cast::<libc::c_char>(), buf.len(), flags)
        })?;
        buf.truncate(written);
        Ok(buf)
    }

    pub fn get(path: &Path, name: &str, follow: bool) -> Result<Vec<u8>, MetadataError> {
        let c_path = path_cstring(path)?;
        let c_name = name_cstring(name)?;
        let flags = if follow { 0 } else { libc::XATTR_NOFOLLOW };
        let len = last_errno_result("xattr_get", unsafe {
            libc::getxattr(c_path.as_ptr(), c_name.as_ptr(), std::ptr::null_mut(), 0, 0, flags)
        })?;
        let mut buf = vec![0_u8; len];
        let written = last_errno_result("xattr_get", unsafe {
            libc::getxattr(
                c_path.as_ptr(),
                c_name.as_ptr(),
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
                0,
                flags,
            )
        })?;
        buf.truncate(written);
        Ok(buf)
    }

    pub fn set(path: &Path, name: &str, value: &[u8], follow: bool) -> Result<(), MetadataError> {
        let c_path = path_cstring(path)?;
        let c_name = name_cstring(name)?;
        let flags = if follow { 0 } else { libc::XATTR_NOFOLLOW };
        let rc = unsafe {
            libc::setxattr(
                c_path.as_ptr(),
                c_name.as_ptr(),
                value.as_ptr().cast::<libc::c_void>(),
                value.len(),
                0,
                flags,
            )
        };
        last_errno_result("xattr_set", libc::ssize_t::from(rc)).map(|_| ())
    }

    pub fn delete(path: &Path, name: &str, follow: bool) -> Result<(), MetadataError> {
        let c_path = path_cstring(path)?;
        let c_name = name_cstring(name)?;
        let flags = if follow { 0 } else { libc::XATTR_NOFOLLOW };
        let rc = unsafe { libc::removexattr(c_path.as_ptr(), c_name.as_ptr(), flags) };
        last_errno_result("xattr_delete", libc::ssize_t::from(rc)).map(|_| ())
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod sys {
    use super::*;

    pub fn list(_path: &Path, _follow: bool) -> Result<Vec<u8>, MetadataError> {
        Err(MetadataError::unsupported("xattr_list"))
    }

    pub fn get(_path: &Path, _name: &str, _follow: bool) -> Result<Vec<u8>, MetadataError> {
        Err(MetadataError::unsupported("xattr_get"))
    }

    pub fn set(_path: &Path, _name: &str, _value: &[u8], _follow: bool) -> Result<(), MetadataError> {
        Err(MetadataError::unsupported("xattr_set"))
    }

    pub fn delete(_path: &Path, _name: &str, _follow: bool) -> Result<(), MetadataError> {
        Err(MetadataError::unsupported("xattr_delete"))
    }
}

/// Lists the names of every extended attribute in `ns` on `path`, stripped
/// of their namespace prefix.
pub fn xattr_list(path: &Path, ns: Namespace, follow: bool) -> Result<Vec<String>, MetadataError> {
    let raw = sys::list(path, follow)?;
    Ok(raw
        .split(|&b| b == 0)
        .filter(|chunk| !chunk.is_empty())
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .filter_map(|qualified| ns.strip(qualified))
        .collect())
}

/// Reads the value of extended attribute `name` in namespace `ns`.
pub fn xattr_get(
    path: &Path,
    ns: Namespace,
    name: &str,
    follow: bool,
) -> Result<Vec<u8>, MetadataError> {
    sys::get(path, &ns.qualify(name), follow)
}

/// Sets extended attribute `name` in namespace `ns` to `value`.
pub fn xattr_set(
    path: &Path,
    ns: Namespace,
    name: &str,
    value: &[u8],
    follow: bool,
) -> Result<(), MetadataError> {
    sys::set(path, &ns.qualify(name), value, follow)
}

/// Removes extended attribute `name` from namespace `ns`.
pub fn xattr_delete(path: &Path, ns: Namespace, name: &str, follow: bool) -> Result<(), MetadataError> {
    sys::delete(path, &ns.qualify(name), follow)
}
