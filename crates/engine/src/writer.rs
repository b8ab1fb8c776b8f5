//! The metadata writer (`node_update`, spec §4.G): applies `src`'s captured
//! metadata onto an existing destination path in the prescribed order —
//! ownership, mode, xattrs, ACLs, times, flags — so that an earlier step
//! never undoes or is undone by a later one (most notably: ownership before
//! mode, since some kernels clear setuid/setgid bits on `chown`).

use std::path::Path;

use core::{Config, Error};
use flist::Node;
use metadata::{AclKind, MetadataErrorKind, Namespace, PlatformFs, Stat};

/// Applies `src`'s metadata onto `dst_path`, whose freshly observed
/// [`Stat`] is `dst_stat` (used to skip a mode-apply that would be a
/// no-op). Honors every policy flag in `config` independently — callers
/// that only want a subset of steps applied (e.g. the driver's
/// "destination missing" branch always restores everything the active
/// policy names) pass the same `config` used for comparison.
///
/// On failure, returns the first failing step's error unless
/// [`Config::ignore`] is set, in which case every step still runs and the
/// *last* failure observed is returned.
pub fn apply_metadata(
    dst_path: &Path,
    src: &Node,
    dst_stat: &Stat,
    config: &Config,
    fs: &dyn PlatformFs,
) -> Result<(), Error> {
    let is_symlink = src.stat.kind == metadata::FileKind::Symlink;
    let mut last_err: Option<Error> = None;

    macro_rules! step {
        ($result:expr) => {
            if let Err(err) = $result {
                if config.ignore {
                    last_err = Some(err);
                } else {
                    return Err(err);
                }
            }
        };
    }

    if config.owner {
        step!(apply_ownership(dst_path, src, fs));
    }
    if config.preserve_mode {
        step!(apply_mode(dst_path, src, dst_stat, is_symlink, fs));
    }
    if config.xattrs {
        step!(apply_xattrs(dst_path, src, is_symlink, config, fs));
    }
    if config.acls {
        step!(apply_acls(dst_path, src, is_symlink, fs));
    }
    if config.restores_times() {
        step!(apply_times(dst_path, src, is_symlink, fs));
    }
    if config.file_flags {
        step!(apply_flags(dst_path, src, is_symlink, fs));
    }
    if config.archive_flag && metadata::flags::has_archive_bit(src.stat.flags) {
        step!(clear_source_archive_bit(src, fs));
    }

    match last_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Ownership (step 1). Attempted only if the caller is root or already owns
/// the source uid; tolerates `EPERM` silently rather than surfacing it,
/// since an unprivileged run routinely can't change ownership and that is
/// not a failure of the replication itself.
fn apply_ownership(dst_path: &Path, src: &Node, fs: &dyn PlatformFs) -> Result<(), Error> {
    let caller_owns_uid = platform::effective_uid() == src.stat.uid;
    if !(platform::is_root() || caller_owns_uid) {
        return Ok(());
    }
    match fs.lchown(dst_path, Some(src.stat.uid), Some(src.stat.gid)) {
        Ok(()) => Ok(()),
        Err(err) if err.is_permission() => Ok(()),
        Err(err) => Err(Error::from(err).with_path(dst_path)),
    }
}

/// Mode bits (step 2). Skipped outright when the destination already
/// matches, so a no-op run never touches `ctime` needlessly.
fn apply_mode(
    dst_path: &Path,
    src: &Node,
    dst_stat: &Stat,
    is_symlink: bool,
    fs: &dyn PlatformFs,
) -> Result<(), Error> {
    let mode_bits = src.stat.mode & 0o7777;
    if dst_stat.mode & 0o7777 == mode_bits {
        return Ok(());
    }

    let result = if is_symlink {
        fs.lchmod(dst_path, mode_bits)
    } else {
        fs.chmod(dst_path, mode_bits)
    };

    match result {
        Ok(()) => Ok(()),
        Err(err) if is_symlink && err.kind() == MetadataErrorKind::Unsupported => Ok(()),
        Err(err) => Err(Error::from(err).with_path(dst_path)),
    }
}

/// Extended attributes (step 3): install every source entry missing or
/// differing byte-for-byte on the destination; under the *expunge* policy
/// also delete destination entries absent from source.
fn apply_xattrs(
    dst_path: &Path,
    src: &Node,
    is_symlink: bool,
    config: &Config,
    fs: &dyn PlatformFs,
) -> Result<(), Error> {
    let follow = !is_symlink;
    for (ns, src_map) in [
        (Namespace::User, &src.xattrs.user),
        (Namespace::System, &src.xattrs.system),
    ] {
        for (name, value) in src_map.iter() {
            let needs_set = match fs.xattr_get(dst_path, ns, name, follow) {
                Ok(existing) => existing != *value,
                Err(_) => true,
            };
            if needs_set {
                fs.xattr_set(dst_path, ns, name, value, follow)
                    .map_err(|err| Error::from(err).with_path(dst_path))?;
            }
        }

        if config.expunge {
            let dest_names = match fs.xattr_list(dst_path, ns, follow) {
                Ok(names) => names,
                Err(err) if err.kind() == MetadataErrorKind::Unsupported => Vec::new(),
                Err(err) => return Err(Error::from(err).with_path(dst_path)),
            };
            for name in dest_names {
                if !src_map.contains(&name) {
                    fs.xattr_delete(dst_path, ns, &name, follow)
                        .map_err(|err| Error::from(err).with_path(dst_path))?;
                }
            }
        }
    }
    Ok(())
}

/// ACLs (step 4): compared by canonical text, applied only when differing.
/// Symlinks prefer the link-scoped variant; a platform unable to set an ACL
/// on a symlink records a no-op rather than failing the run.
fn apply_acls(dst_path: &Path, src: &Node, is_symlink: bool, fs: &dyn PlatformFs) -> Result<(), Error> {
    let follow = !is_symlink;
    for (kind, acl) in [
        (AclKind::Nfs4, &src.acls.nfs4),
        (AclKind::Access, &src.acls.access),
        (AclKind::Default, &src.acls.default),
    ] {
        let Some(acl) = acl else { continue };
        if kind == AclKind::Default && src.stat.kind != metadata::FileKind::Directory {
            continue;
        }

        let current = fs.acl_get(dst_path, kind, follow).ok().flatten();
        if current.as_ref().map(metadata::Acl::to_text) == Some(acl.to_text()) {
            continue;
        }

        match fs.acl_set(dst_path, kind, acl, follow) {
            Ok(()) => {}
            Err(err) if err.kind() == MetadataErrorKind::Unsupported => {
                logging::debug_log!(2, "no-op: cannot set {:?} ACL on {}", kind, dst_path.display());
            }
            Err(err) => return Err(Error::from(err).with_path(dst_path)),
        }
    }
    Ok(())
}

/// Times (step 5), only when the times policy is at "restore" level
/// ([`Config::restores_times`]).
fn apply_times(dst_path: &Path, src: &Node, is_symlink: bool, fs: &dyn PlatformFs) -> Result<(), Error> {
    fs.set_times(dst_path, src.stat.atime, src.stat.mtime, !is_symlink)
        .map_err(|err| Error::from(err).with_path(dst_path))
}

/// BSD file flags (step 6): every flag except the archive bit is applied to
/// the destination. The archive bit itself is handled separately, on the
/// source, by [`clear_source_archive_bit`].
fn apply_flags(dst_path: &Path, src: &Node, is_symlink: bool, fs: &dyn PlatformFs) -> Result<(), Error> {
    let _ = is_symlink;
    let flags = metadata::flags::without_archive_bit(src.stat.flags);
    match fs.lchflags(dst_path, flags) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == MetadataErrorKind::Unsupported => Ok(()),
        Err(err) => Err(Error::from(err).with_path(dst_path)),
    }
}

/// The archive-bit two-step (spec Design Note / supplemented feature):
/// after a successful replication, clear the archive bit on the *source*
/// rather than the destination, mirroring the reference tool's post-copy
/// `UF_ARCHIVE` clear. Gated by [`Config::archive_flag`] and a no-op on
/// platforms without a flags word.
fn clear_source_archive_bit(src: &Node, fs: &dyn PlatformFs) -> Result<(), Error> {
    let cleared = metadata::flags::without_archive_bit(src.stat.flags);
    match fs.lchflags(&src.path, cleared) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == MetadataErrorKind::Unsupported => Ok(()),
        Err(err) => Err(Error::from(err).with_path(src.path.as_path())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flist::LoadOptions;
    use metadata::UnixFs;
    use test_support::{scratch_dir, write_file};

    fn load(path: &Path) -> Node {
        Node::load(path.to_path_buf(), LoadOptions::default(), &UnixFs).expect("load node")
    }

    #[test]
    fn mode_is_skipped_when_already_matching() {
        let dir = scratch_dir();
        let a = dir.path().join("a.txt");
        write_file(&a, b"x");
        UnixFs.chmod(&a, 0o640).unwrap();
        let src = load(&a);
        let dst_stat = src.stat;

        let config = Config {
            preserve_mode: true,
            ..Config::default()
        };
        apply_metadata(&a, &src, &dst_stat, &config, &UnixFs).expect("apply");
        assert_eq!(UnixFs.lstat(&a).unwrap().mode & 0o777, 0o640);
    }

    #[test]
    fn mode_is_applied_when_differing() {
        let dir = scratch_dir();
        let src_path = dir.path().join("src.txt");
        let dst_path = dir.path().join("dst.txt");
        write_file(&src_path, b"x");
        write_file(&dst_path, b"x");
        UnixFs.chmod(&src_path, 0o600).unwrap();
        UnixFs.chmod(&dst_path, 0o644).unwrap();

        let src = load(&src_path);
        let dst_stat = UnixFs.lstat(&dst_path).unwrap();
        let config = Config {
            preserve_mode: true,
            ..Config::default()
        };
        apply_metadata(&dst_path, &src, &dst_stat, &config, &UnixFs).expect("apply");
        assert_eq!(UnixFs.lstat(&dst_path).unwrap().mode & 0o777, 0o600);
    }

    #[test]
    fn xattr_missing_on_destination_is_installed() {
        let dir = scratch_dir();
        let src_path = dir.path().join("src.txt");
        let dst_path = dir.path().join("dst.txt");
        write_file(&src_path, b"x");
        write_file(&dst_path, b"x");

        if metadata::xattr::xattr_set(&src_path, Namespace::User, "greeting", b"hi", true).is_err() {
            return;
        }

        let src = Node::load(
            src_path,
            LoadOptions {
                xattrs: true,
                ..Default::default()
            },
            &UnixFs,
        )
        .unwrap();
        let dst_stat = UnixFs.lstat(&dst_path).unwrap();
        let config = Config {
            xattrs: true,
            ..Config::default()
        };
        apply_metadata(&dst_path, &src, &dst_stat, &config, &UnixFs).expect("apply");

        let value = metadata::xattr::xattr_get(&dst_path, Namespace::User, "greeting", true).unwrap();
        assert_eq!(value, b"hi");
    }

    #[test]
    fn ignore_policy_continues_past_a_failing_step_and_reports_last_error() {
        let dir = scratch_dir();
        let missing_dst = dir.path().join("does-not-exist");
        let src_path = dir.path().join("src.txt");
        write_file(&src_path, b"x");
        let src = load(&src_path);
        let dst_stat = src.stat;

        let config = Config {
            preserve_mode: true,
            xattrs: true,
            ignore: true,
            ..Config::default()
        };
        let result = apply_metadata(&missing_dst, &src, &dst_stat, &config, &UnixFs);
        assert!(result.is_err());
    }
}
