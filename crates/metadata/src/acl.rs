//! Access control list handling.
//!
//! ACLs are treated as opaque blobs by every layer above this module: the
//! comparator never inspects individual entries, only the canonical text
//! form returned by [`Acl::to_text`]. This mirrors the reference tool this
//! crate is modeled on, which compares ACLs purely by `acl_to_text` output
//! (see `DESIGN.md`).

use std::path::Path;

use crate::error::MetadataError;

/// Which kind of ACL a path carries.
///
/// `Nfs4` corresponds to the unified NFSv4-style ACL model `exacl` exposes
/// on macOS and FreeBSD; `Access` and `Default` are the two POSIX.1e ACL
/// types (`ACL_TYPE_ACCESS` / `ACL_TYPE_DEFAULT`), the latter meaningful
/// only on directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclKind {
    /// NFSv4/ZFS-style ACL.
    Nfs4,
    /// POSIX.1e access ACL.
    Access,
    /// POSIX.1e default (inherited) ACL, directories only.
    Default,
}

/// An opaque ACL handle. Two ACLs are compared by [`Acl::to_text`] equality,
/// never structurally.
#[derive(Debug, Clone)]
pub struct Acl {
    text: String,
    #[cfg(feature = "acl")]
    entries: Vec<exacl::AclEntry>,
}

impl Acl {
    /// The canonical UTF-8 text representation used for equality checks.
    #[must_use]
    pub fn to_text(&self) -> &str {
        &self.text
    }
}

impl PartialEq for Acl {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

#[cfg(feature = "acl")]
fn exacl_options(kind: AclKind, follow: bool) -> exacl::AclOption {
    let mut opts = exacl::AclOption::empty();
    if kind == AclKind::Default {
        opts |= exacl::AclOption::DEFAULT_ACL;
    }
    if !follow {
        opts |= exacl::AclOption::SYMLINK_ACL;
    }
    opts
}

/// Reads the ACL of `kind` from `path`. Returns `Ok(None)` when the path
/// carries no ACL of that kind (e.g. no default ACL on a file, or an NFSv4
/// query on a platform without NFSv4 ACL support).
#[cfg(feature = "acl")]
pub fn acl_get(path: &Path, kind: AclKind, follow: bool) -> Result<Option<Acl>, MetadataError> {
    if kind == AclKind::Nfs4 && !cfg!(any(target_os = "macos", target_os = "freebsd")) {
        return Ok(None);
    }
    match exacl::getfacl(path, Some(exacl_options(kind, follow))) {
        Ok(entries) => {
            let text = exacl::to_platform_text(&entries);
            Ok(Some(Acl { text, entries }))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(MetadataError::from_io("acl_get", err)),
    }
}

#[cfg(not(feature = "acl"))]
#[allow(clippy::missing_errors_doc)]
pub fn acl_get(_path: &Path, _kind: AclKind, _follow: bool) -> Result<Option<Acl>, MetadataError> {
    Err(MetadataError::unsupported("acl_get"))
}

/// Applies `acl` to `path`.
#[cfg(feature = "acl")]
pub fn acl_set(path: &Path, kind: AclKind, acl: &Acl, follow: bool) -> Result<(), MetadataError> {
    exacl::setfacl(&[path], &acl.entries, Some(exacl_options(kind, follow)))
        .map_err(|err| MetadataError::from_io("acl_set", err))
}

#[cfg(not(feature = "acl"))]
#[allow(clippy::missing_errors_doc)]
pub fn acl_set(
    _path: &Path,
    _kind: AclKind,
    _acl: &Acl,
    _follow: bool,
) -> Result<(), MetadataError> {
    Err(MetadataError::unsupported("acl_set"))
}
