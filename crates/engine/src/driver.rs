//! The replication driver (spec §4.I): per-name dispatch over a [`DirPair`],
//! recursing into matched directories, routing type transitions, and
//! running the destination-side removal pass when the *expunge* policy is
//! active.
//!
//! ```text
//!             ┌──> Missing-in-dst ──> Create  ──┐
//! Observed ──┼──> Type-changed    ──> Replace ──┼──> Metadata-apply ──> Refresh
//!             └──> Same-type       ──> (Compare)┘
//!                                   │
//!                                   └── if divergent ── Content/ACL/Xattr/Flags/Times apply
//! ```

use std::path::Path;

use core::{Config, Error, ErrorKind};
use flist::{DirNode, DirPair, LoadOptions, Node};
use logging_sink::{Descriptor, Sigil};
use metadata::{FileKind, PlatformFs};
use ordered_map::OrderedMap;

use crate::compare::{self, bits};
use crate::writer::apply_metadata;

/// Tally of what a [`Driver::run`] call did, surfaced to the CLI for a
/// final summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Destination objects created.
    pub created: u64,
    /// Destination objects removed (expunge pass).
    pub removed: u64,
    /// Destination objects replaced (type change or non-directory content
    /// divergence).
    pub replaced: u64,
    /// Nodes whose residual metadata was updated without a full replace.
    pub updated: u64,
    /// Per-node failures recorded under the `ignore` policy.
    pub errors: u64,
}

/// Runs the per-name dispatch described in spec §4.I over a [`DirPair`].
pub struct Driver<'a> {
    config: &'a Config,
    fs: &'a dyn PlatformFs,
}

impl<'a> Driver<'a> {
    /// Builds a driver bound to `config`'s active policy and `fs` as the
    /// sole kernel-facing surface.
    #[must_use]
    pub fn new(config: &'a Config, fs: &'a dyn PlatformFs) -> Self {
        Self { config, fs }
    }

    /// Walks `pair`, dispatching creates, replaces, and metadata updates
    /// on the source side, then (if [`Config::expunge`]) removals on the
    /// destination side.
    pub fn run(&self, pair: DirPair) -> Result<Summary, Error> {
        let mut summary = Summary::default();
        self.visit_dir_pair(pair, &mut summary)?;
        Ok(summary)
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            acls: self.config.acls,
            xattrs: self.config.xattrs,
            digest: self.config.digest,
        }
    }

    fn recurse_into(
        &self,
        src_dir_path: &Path,
        dst_dir_path: &Path,
        summary: &mut Summary,
    ) -> Result<(), Error> {
        let options = self.load_options();
        let src_dir = flist::load_directory(src_dir_path, true, options, self.fs)?;
        let dst_dir = flist::load_directory(dst_dir_path, true, options, self.fs)?;
        self.visit_dir_pair(DirPair { src: src_dir, dst: dst_dir }, summary)
    }

    /// Recurses into an existing destination directory with no source
    /// counterpart, so the expunge pass removes its contents depth-first
    /// before the directory itself is replaced or removed.
    fn empty_out(&self, dst_dir_path: &Path, summary: &mut Summary) -> Result<(), Error> {
        let dst_dir = flist::load_directory(dst_dir_path, true, self.load_options(), self.fs)?;
        let empty_src = DirNode {
            path: dst_dir_path.to_path_buf(),
            nodes: OrderedMap::new(),
        };
        self.visit_dir_pair(
            DirPair {
                src: empty_src,
                dst: dst_dir,
            },
            summary,
        )
    }

    fn visit_dir_pair(&self, pair: DirPair, summary: &mut Summary) -> Result<(), Error> {
        let DirPair { src, dst } = pair;
        let dst_dir_path = dst.path.clone();

        for (name, src_node) in src.nodes.iter() {
            let dst_path = dst_dir_path.join(name);
            let result = match dst.nodes.search(name) {
                None => self.handle_missing(&dst_path, src_node, summary),
                Some(dst_node) => {
                    if src_node.stat.kind == dst_node.stat.kind {
                        self.handle_same_type(&dst_path, src_node, dst_node, summary)
                    } else {
                        self.handle_type_changed(&dst_path, src_node, dst_node, summary)
                    }
                }
            };
            self.record_outcome(result, summary)?;
        }

        if self.config.expunge {
            for (name, dst_node) in dst.nodes.iter() {
                if !src.nodes.contains(name) {
                    let dst_path = dst_dir_path.join(name);
                    let result = self.handle_remove(&dst_path, dst_node, summary);
                    self.record_outcome(result, summary)?;
                }
            }
        }

        Ok(())
    }

    /// Per-node failure semantics: abort immediately unless `ignore` is on,
    /// in which case the failure is logged and counted but does not stop
    /// the walk — and does not roll back the work already committed for
    /// earlier names or completed subtrees.
    fn record_outcome(&self, result: Result<(), Error>, summary: &mut Summary) -> Result<(), Error> {
        match result {
            Ok(()) => Ok(()),
            Err(err) => {
                summary.errors += 1;
                if self.config.ignore {
                    logging::info_log!(0, "error: {err}");
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }

    fn handle_missing(&self, dst_path: &Path, src_node: &Node, summary: &mut Summary) -> Result<(), Error> {
        self.log_action(Sigil::Created, dst_path, src_node);
        summary.created += 1;
        if self.config.dry_run {
            return Ok(());
        }

        self.create_object(dst_path, src_node)?;
        if self.config.recurse && src_node.stat.kind == FileKind::Directory {
            self.recurse_into(&src_node.path, dst_path, summary)?;
        }
        self.refresh_and_apply(dst_path, src_node)
    }

    fn handle_type_changed(
        &self,
        dst_path: &Path,
        src_node: &Node,
        dst_node: &Node,
        summary: &mut Summary,
    ) -> Result<(), Error> {
        self.log_action(Sigil::Removed, dst_path, dst_node);
        self.log_action(Sigil::Created, dst_path, src_node);
        summary.replaced += 1;
        if self.config.dry_run {
            return Ok(());
        }

        match (src_node.stat.kind, dst_node.stat.kind) {
            (FileKind::Directory, _) => {
                remove_nondirectory(dst_path)?;
                create_dir(dst_path)?;
                if self.config.recurse {
                    self.recurse_into(&src_node.path, dst_path, summary)?;
                }
            }
            (_, FileKind::Directory) => {
                if self.config.recurse {
                    self.empty_out(dst_path, summary)?;
                }
                remove_dir(dst_path)?;
                self.create_object(dst_path, src_node)?;
            }
            (_, _) => {
                remove_nondirectory(dst_path)?;
                self.create_object(dst_path, src_node)?;
            }
        }

        self.refresh_and_apply(dst_path, src_node)
    }

    fn handle_same_type(
        &self,
        dst_path: &Path,
        src_node: &Node,
        dst_node: &Node,
        summary: &mut Summary,
    ) -> Result<(), Error> {
        if src_node.stat.kind == FileKind::Directory && self.config.recurse {
            self.recurse_into(&src_node.path, dst_path, summary)?;
        }

        let mask = compare::compare(Some(src_node), Some(dst_node), self.config);
        debug_assert!(mask >= 0, "same-type comparison never yields the missing sentinel");
        let mask = mask.max(0) as u32;

        if mask == 0 && !self.config.force {
            return Ok(());
        }

        self.log_action(Sigil::Divergent, dst_path, src_node);
        summary.updated += 1;
        if self.config.dry_run {
            return Ok(());
        }

        let content_divergent = self.config.force || mask & bits::CONTENT != 0;
        match src_node.stat.kind {
            FileKind::Regular if content_divergent && self.config.copy_content => {
                fast_io::copy_file(
                    &src_node.path,
                    dst_path,
                    src_node.stat.mode & 0o7777,
                    self.config.copy_options(),
                )?;
            }
            FileKind::Symlink if self.config.force || mask & bits::SYMLINK_TARGET != 0 => {
                remove_nondirectory(dst_path)?;
                self.create_object(dst_path, src_node)?;
            }
            FileKind::BlockDevice | FileKind::CharDevice
                if self.config.force || mask & bits::RDEV != 0 =>
            {
                remove_nondirectory(dst_path)?;
                self.create_object(dst_path, src_node)?;
            }
            _ => {}
        }

        self.refresh_and_apply(dst_path, src_node)
    }

    fn handle_remove(&self, dst_path: &Path, dst_node: &Node, summary: &mut Summary) -> Result<(), Error> {
        self.log_action(Sigil::Removed, dst_path, dst_node);
        summary.removed += 1;
        if self.config.dry_run {
            return Ok(());
        }

        if dst_node.stat.kind == FileKind::Directory {
            let children = flist::load_directory(dst_path, true, self.load_options(), self.fs)?;
            for (name, child) in children.nodes.iter() {
                let result = self.handle_remove(&dst_path.join(name), child, summary);
                self.record_outcome(result, summary)?;
            }
            remove_dir(dst_path)
        } else {
            remove_nondirectory(dst_path)
        }
    }

    fn create_object(&self, dst_path: &Path, src_node: &Node) -> Result<(), Error> {
        let mode = src_node.stat.mode & 0o7777;
        match src_node.stat.kind {
            FileKind::Directory => create_dir(dst_path),
            FileKind::Regular => {
                if self.config.copy_content {
                    fast_io::copy_file(&src_node.path, dst_path, mode, self.config.copy_options())?;
                    Ok(())
                } else {
                    create_empty_regular(dst_path, mode)
                }
            }
            FileKind::Symlink => {
                let target = src_node.link_target.as_deref().ok_or_else(|| {
                    Error::internal("symlink node loaded with no link_target")
                })?;
                std::os::unix::fs::symlink(target, dst_path)
                    .map_err(|err| io_error(dst_path, err))
            }
            FileKind::BlockDevice => {
                platform::make_device(dst_path, platform::DeviceKind::Block, mode, src_node.stat.rdev)?;
                Ok(())
            }
            FileKind::CharDevice => {
                platform::make_device(dst_path, platform::DeviceKind::Char, mode, src_node.stat.rdev)?;
                Ok(())
            }
            FileKind::Fifo => {
                platform::make_fifo(dst_path, mode)?;
                Ok(())
            }
            FileKind::Socket => {
                platform::make_socket(dst_path)?;
                Ok(())
            }
        }
    }

    fn refresh_and_apply(&self, dst_path: &Path, src_node: &Node) -> Result<(), Error> {
        let dst_stat = self
            .fs
            .lstat(dst_path)
            .map_err(|err| Error::from(err).with_path(dst_path))?;
        apply_metadata(dst_path, src_node, &dst_stat, self.config, self.fs)
    }

    fn log_action(&self, sigil: Sigil, path: &Path, node: &Node) {
        if !logging::info_enabled(1) {
            return;
        }
        let descriptor = Descriptor {
            nfs4_acl: node.acls.nfs4.is_some(),
            access_acl: node.acls.access.is_some(),
            default_acl: node.acls.default.is_some(),
            user_xattrs: !node.xattrs.user.is_empty(),
            system_xattrs: !node.xattrs.system.is_empty(),
            bsd_flags: metadata::flags::flag_names(node.stat.flags),
        };
        let is_directory = node.stat.kind == FileKind::Directory;
        let line = logging_sink::render_line(sigil, path, is_directory, node.stat.kind, &descriptor);
        logging::info_log!(1, "{line}");
    }
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::new(ErrorKind::Io, Some(path.to_path_buf()), source)
}

fn create_dir(path: &Path) -> Result<(), Error> {
    std::fs::create_dir(path).map_err(|err| io_error(path, err))
}

fn remove_dir(path: &Path) -> Result<(), Error> {
    std::fs::remove_dir(path).map_err(|err| io_error(path, err))
}

fn remove_nondirectory(path: &Path) -> Result<(), Error> {
    std::fs::remove_file(path).map_err(|err| io_error(path, err))
}

fn create_empty_regular(path: &Path, mode: u32) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;
    let file = std::fs::File::create(path).map_err(|err| io_error(path, err))?;
    file.set_permissions(std::fs::Permissions::from_mode(mode))
        .map_err(|err| io_error(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flist::load_directory;
    use metadata::UnixFs;
    use test_support::{scratch_dir, write_file};

    fn pair(src: &Path, dst: &Path, config: &Config) -> DirPair {
        let options = LoadOptions {
            acls: config.acls,
            xattrs: config.xattrs,
            digest: config.digest,
        };
        DirPair {
            src: load_directory(src, true, options, &UnixFs).unwrap(),
            dst: load_directory(dst, true, options, &UnixFs).unwrap(),
        }
    }

    #[test]
    fn creates_missing_regular_file() {
        let root = scratch_dir();
        let src = root.path().join("src");
        let dst = root.path().join("dst");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dst).unwrap();
        write_file(&src.join("a.txt"), b"hello");

        let config = Config::default();
        let driver = Driver::new(&config, &UnixFs);
        let summary = driver.run(pair(&src, &dst, &config)).expect("run");

        assert_eq!(summary.created, 1);
        assert_eq!(std::fs::read(dst.join("a.txt")).unwrap(), b"hello");
    }

    #[test]
    fn recurses_into_matching_directories() {
        let root = scratch_dir();
        let src = root.path().join("src");
        let dst = root.path().join("dst");
        std::fs::create_dir_all(src.join("sub")).unwrap();
        std::fs::create_dir_all(&dst).unwrap();
        write_file(&src.join("sub/a.txt"), b"nested");

        let config = Config {
            recurse: true,
            ..Config::default()
        };
        let driver = Driver::new(&config, &UnixFs);
        let summary = driver.run(pair(&src, &dst, &config)).expect("run");

        assert!(summary.created >= 2);
        assert_eq!(std::fs::read(dst.join("sub/a.txt")).unwrap(), b"nested");
    }

    #[test]
    fn expunge_removes_destination_only_entries() {
        let root = scratch_dir();
        let src = root.path().join("src");
        let dst = root.path().join("dst");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dst).unwrap();
        write_file(&dst.join("stale.txt"), b"old");

        let config = Config {
            expunge: true,
            ..Config::default()
        };
        let driver = Driver::new(&config, &UnixFs);
        let summary = driver.run(pair(&src, &dst, &config)).expect("run");

        assert_eq!(summary.removed, 1);
        assert!(!dst.join("stale.txt").exists());
    }

    #[test]
    fn dry_run_reports_without_mutating() {
        let root = scratch_dir();
        let src = root.path().join("src");
        let dst = root.path().join("dst");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dst).unwrap();
        write_file(&src.join("a.txt"), b"hello");

        let config = Config {
            dry_run: true,
            ..Config::default()
        };
        let driver = Driver::new(&config, &UnixFs);
        let summary = driver.run(pair(&src, &dst, &config)).expect("run");

        assert_eq!(summary.created, 1);
        assert!(!dst.join("a.txt").exists());
    }

    #[test]
    fn type_change_replaces_regular_file_with_directory() {
        let root = scratch_dir();
        let src = root.path().join("src");
        let dst = root.path().join("dst");
        std::fs::create_dir_all(src.join("name")).unwrap();
        std::fs::create_dir_all(&dst).unwrap();
        write_file(&dst.join("name"), b"was a file");

        let config = Config {
            recurse: true,
            ..Config::default()
        };
        let driver = Driver::new(&config, &UnixFs);
        let summary = driver.run(pair(&src, &dst, &config)).expect("run");

        assert_eq!(summary.replaced, 1);
        assert!(dst.join("name").is_dir());
    }

    #[test]
    fn ignore_policy_continues_after_a_failing_node() {
        let root = scratch_dir();
        let src = root.path().join("src");
        let dst = root.path().join("dst");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&dst).unwrap();
        write_file(&src.join("a.txt"), b"a");
        write_file(&src.join("b.txt"), b"b");
        // "a.txt" is a non-empty directory on the destination and recursion is
        // off, so replacing it with a regular file fails with ENOTEMPTY.
        write_file(&dst.join("a.txt/child"), b"occupied");

        let config = Config {
            ignore: true,
            ..Config::default()
        };
        let driver = Driver::new(&config, &UnixFs);
        let summary = driver.run(pair(&src, &dst, &config)).expect("run");

        assert_eq!(summary.errors, 1);
        assert_eq!(std::fs::read(dst.join("b.txt")).unwrap(), b"b");
    }
}
