//! The in-memory node: one filesystem object's full captured state.
//!
//! Mirrors `pc.c`'s `NODE` struct field-for-field: a path, a `stat` triple, a
//! symlink target when applicable, the three ACL kinds, the two xattr
//! namespaces, and a content digest buffer. Unlike the C original, nothing
//! here is conditionally compiled out by platform `#ifdef`s — absence is
//! expressed as `None` or an empty map, decided once at load time by
//! [`LoadOptions`].

use std::path::PathBuf;

use metadata::{Acl, MetadataError, PlatformFs, Stat};
use ordered_map::OrderedMap;

use checksums::digest::DigestTag;

/// Which optional captures a directory load should perform.
///
/// Populating these costs syscalls (ACL/xattr lookups) or a full file read
/// (digest), so the loader only does the work a given replication run's
/// active policy actually needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Capture ACLs (`nfs4`, `access`, `default`).
    pub acls: bool,
    /// Capture extended attributes (`user`, `system`).
    pub xattrs: bool,
    /// Compute a content digest of this algorithm for regular files.
    pub digest: Option<DigestTag>,
}

/// The three ACL kinds a node may carry, as captured at load time.
#[derive(Debug, Clone, Default)]
pub struct NodeAcls {
    /// NFSv4/ZFS-style ACL.
    pub nfs4: Option<Acl>,
    /// POSIX access ACL.
    pub access: Option<Acl>,
    /// POSIX default ACL (directories only).
    pub default: Option<Acl>,
}

/// Extended attributes captured for a node, by namespace.
#[derive(Debug, Clone, Default)]
pub struct NodeXattrs {
    /// `user.*` namespace: name to value.
    pub user: OrderedMap<Vec<u8>>,
    /// `system.*` namespace: name to value.
    pub system: OrderedMap<Vec<u8>>,
}

/// One filesystem object's captured state.
#[derive(Debug, Clone)]
pub struct Node {
    /// Full path to the node as loaded.
    pub path: PathBuf,
    /// `lstat` result.
    pub stat: Stat,
    /// Symlink target, present only when `stat.kind` is `Symlink`.
    pub link_target: Option<PathBuf>,
    /// Captured ACLs, populated only when [`LoadOptions::acls`] was set.
    pub acls: NodeAcls,
    /// Captured extended attributes, populated only when
    /// [`LoadOptions::xattrs`] was set.
    pub xattrs: NodeXattrs,
    /// Content digest, populated only when [`LoadOptions::digest`] names an
    /// algorithm and `stat.kind` is `Regular`.
    pub digest: Option<Vec<u8>>,
}

impl Node {
    /// Loads a single node's state from `path`.
    pub fn load(
        path: PathBuf,
        options: LoadOptions,
        fs: &dyn PlatformFs,
    ) -> Result<Self, MetadataError> {
        let stat = fs.lstat(&path)?;
        let is_symlink = stat.kind == metadata::FileKind::Symlink;

        let link_target = if is_symlink {
            Some(fs.readlink(&path)?)
        } else {
            None
        };

        let acls = if options.acls {
            load_acls(&path, is_symlink, fs)
        } else {
            NodeAcls::default()
        };

        let xattrs = if options.xattrs {
            load_xattrs(&path, !is_symlink, fs)?
        } else {
            NodeXattrs::default()
        };

        let digest = match options.digest {
            Some(tag) if stat.kind == metadata::FileKind::Regular => {
                Some(digest_file(&path, tag)?)
            }
            _ => None,
        };

        Ok(Self {
            path,
            stat,
            link_target,
            acls,
            xattrs,
            digest,
        })
    }
}

fn load_acls(path: &std::path::Path, is_symlink: bool, fs: &dyn PlatformFs) -> NodeAcls {
    let follow = !is_symlink;
    NodeAcls {
        nfs4: fs
            .acl_get(path, metadata::AclKind::Nfs4, follow)
            .ok()
            .flatten(),
        access: fs
            .acl_get(path, metadata::AclKind::Access, follow)
            .ok()
            .flatten(),
        default: fs
            .acl_get(path, metadata::AclKind::Default, follow)
            .ok()
            .flatten(),
    }
}

fn load_xattrs(
    path: &std::path::Path,
    follow: bool,
    fs: &dyn PlatformFs,
) -> Result<NodeXattrs, MetadataError> {
    let mut xattrs = NodeXattrs::default();
    for (ns, map) in [
        (metadata::Namespace::User, &mut xattrs.user),
        (metadata::Namespace::System, &mut xattrs.system),
    ] {
        match fs.xattr_list(path, ns, follow) {
            Ok(names) => {
                for name in names {
                    let value = fs.xattr_get(path, ns, &name, follow)?;
                    map.upsert(name, value);
                }
            }
            Err(err) if err.kind() == metadata::MetadataErrorKind::Unsupported => {}
            Err(err) => return Err(err),
        }
    }
    Ok(xattrs)
}

/// Digest read-and-hash error: either the read itself failed, or the
/// pipeline rejected the tag (unreachable in practice — the tag comes from
/// a build that already validated it via `DigestTag::from_name`, but callers
/// still need somewhere to route the failure).
#[derive(Debug, thiserror::Error)]
pub enum DigestFileError {
    /// Reading the file failed.
    #[error("reading {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The digest pipeline rejected the operation.
    #[error("digest: {0}")]
    Digest(#[from] checksums::digest::DigestError),
}

impl From<DigestFileError> for MetadataError {
    fn from(err: DigestFileError) -> Self {
        match err {
            DigestFileError::Io { source, .. } => MetadataError::from_io("digest", source),
            DigestFileError::Digest(_) => MetadataError::unsupported("digest"),
        }
    }
}

fn digest_file(path: &std::path::Path, tag: DigestTag) -> Result<Vec<u8>, DigestFileError> {
    use std::io::Read;

    let mut digest = checksums::digest::Digest::new();
    digest.init(tag)?;

    let mut file = std::fs::File::open(path).map_err(|source| DigestFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut buf = [0_u8; 128 * 1024];
    loop {
        let read = file.read(&mut buf).map_err(|source| DigestFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if read == 0 {
            break;
        }
        digest.update(&buf[..read])?;
    }

    let len = tag.digest_len().unwrap_or(0);
    let mut out = vec![0_u8; len];
    digest.finalize_into(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadata::UnixFs;
    use test_support::{scratch_dir, write_file};

    #[test]
    fn load_captures_regular_file_digest() {
        let dir = scratch_dir();
        let path = dir.path().join("a.txt");
        write_file(&path, b"hello world");

        let node = Node::load(
            path,
            LoadOptions {
                digest: Some(DigestTag::Sha256),
                ..Default::default()
            },
            &UnixFs,
        )
        .expect("load node");

        assert_eq!(node.digest.as_deref(), Some(checksums::strong::Sha256::digest(b"hello world").as_slice()));
    }

    #[test]
    fn load_captures_symlink_target() {
        let dir = scratch_dir();
        let target = dir.path().join("target.txt");
        write_file(&target, b"data");
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).expect("create symlink");

        let node = Node::load(link, LoadOptions::default(), &UnixFs).expect("load node");
        assert_eq!(node.link_target.as_deref(), Some(target.as_path()));
    }

    #[test]
    fn load_without_digest_option_skips_hashing() {
        let dir = scratch_dir();
        let path = dir.path().join("a.txt");
        write_file(&path, b"hello world");

        let node = Node::load(path, LoadOptions::default(), &UnixFs).expect("load node");
        assert!(node.digest.is_none());
    }
}
