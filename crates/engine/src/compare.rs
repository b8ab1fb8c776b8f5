//! The comparator (`node_compare`, spec §4.F): a pure function from a pair
//! of optional [`Node`]s to a 32-bit divergence bitmask.
//!
//! The bit layout is stable and grouped by category so [`driver`](crate::driver)
//! can route a divergent pair to the right remediation (content re-copy,
//! ACL apply, xattr reconcile, ...) without re-deriving what changed.

use core::Config;
use flist::Node;
use metadata::FileKind;

/// One bit per divergence category. Values match the table in spec §4.F;
/// bit positions are stable across builds, not an implementation detail.
pub mod bits {
    /// File-type mode bits differ (type transition, handled outside
    /// [`super::compare`] by the driver before this mask is even computed).
    pub const TYPE: u32 = 0x0000_0001;
    /// Owning uid differs.
    pub const UID: u32 = 0x0000_0002;
    /// Owning gid differs.
    pub const GID: u32 = 0x0000_0004;
    /// Symlink target differs.
    pub const SYMLINK_TARGET: u32 = 0x0000_0010;
    /// Device `rdev` differs on a block/char node.
    pub const RDEV: u32 = 0x0000_0020;
    /// mtime differs under the active times policy.
    pub const MTIME: u32 = 0x0000_0100;
    /// Regular-file size differs.
    pub const SIZE: u32 = 0x0000_1000;
    /// Digest length differs (implies a different or unreadable algorithm).
    pub const DIGEST_LEN: u32 = 0x0001_0000;
    /// Digest bytes differ.
    pub const DIGEST_BYTES: u32 = 0x0002_0000;
    /// NFSv4 ACL text differs.
    pub const ACL_NFS4: u32 = 0x0010_0000;
    /// POSIX access ACL text differs.
    pub const ACL_ACCESS: u32 = 0x0020_0000;
    /// POSIX default ACL text differs.
    pub const ACL_DEFAULT: u32 = 0x0040_0000;
    /// `user.*` extended attributes differ.
    pub const XATTR_USER: u32 = 0x0100_0000;
    /// `system.*` extended attributes differ.
    pub const XATTR_SYSTEM: u32 = 0x0200_0000;
    /// BSD file flags (other than the archive bit) differ.
    pub const FLAGS: u32 = 0x1000_0000;
    /// The archive bit requires handling (set on source, archive policy
    /// active).
    pub const ARCHIVE: u32 = 0x2000_0000;

    /// Any bit that implies the regular-file content branch (full re-copy).
    pub const CONTENT: u32 = MTIME | SIZE | DIGEST_LEN | DIGEST_BYTES | ARCHIVE;
}

/// Sentinel returned when exactly one side of the pair is present. Not a
/// real bitmask — the driver's "destination missing" (or, symmetrically,
/// "source missing") dispatch handles this case directly instead of
/// inspecting bits.
pub const MISSING: i64 = -1;

/// Compares `src` against `dst`, returning a divergence bitmask, `0` for
/// "identical under the active policy", or [`MISSING`] when exactly one
/// side is absent.
///
/// Callers only invoke this once both sides are known to be the same file
/// type; type transitions are routed by the driver before reaching here, so
/// [`bits::TYPE`] is present in the table for completeness but never set by
/// this function in practice.
#[must_use]
pub fn compare(src: Option<&Node>, dst: Option<&Node>, config: &Config) -> i64 {
    match (src, dst) {
        (None, None) => 0,
        (None, Some(_)) | (Some(_), None) => MISSING,
        (Some(src), Some(dst)) => i64::from(compare_present(src, dst, config)),
    }
}

fn compare_present(src: &Node, dst: &Node, config: &Config) -> u32 {
    let mut mask = 0_u32;

    if src.stat.kind != dst.stat.kind {
        mask |= bits::TYPE;
    }

    if config.owner {
        if src.stat.uid != dst.stat.uid {
            mask |= bits::UID;
        }
        if src.stat.gid != dst.stat.gid && gid_apply_allowed(dst.stat.gid) {
            mask |= bits::GID;
        }
    }

    if src.stat.kind == FileKind::Symlink && src.link_target != dst.link_target {
        mask |= bits::SYMLINK_TARGET;
    }

    if matches!(src.stat.kind, FileKind::BlockDevice | FileKind::CharDevice)
        && src.stat.rdev != dst.stat.rdev
    {
        mask |= bits::RDEV;
    }

    if config.restores_times() {
        if src.stat.mtime != dst.stat.mtime {
            mask |= bits::MTIME;
        }
    } else if config.compares_mtime() && src.stat.mtime > dst.stat.mtime {
        mask |= bits::MTIME;
    }

    if src.stat.kind == FileKind::Regular {
        if src.stat.size != dst.stat.size {
            mask |= bits::SIZE;
        }
        mask |= digest_bits(src, dst);
    }

    if config.acls {
        mask |= acl_bits(src, dst);
    }

    if config.xattrs {
        mask |= xattr_bits(src, dst, config.expunge);
    }

    if config.file_flags
        && metadata::flags::without_archive_bit(src.stat.flags)
            != metadata::flags::without_archive_bit(dst.stat.flags)
    {
        mask |= bits::FLAGS;
    }

    if config.archive_flag && metadata::flags::has_archive_bit(src.stat.flags) {
        mask |= bits::ARCHIVE;
    }

    mask
}

fn gid_apply_allowed(target_gid: u32) -> bool {
    platform::is_root()
        || platform::supplementary_groups()
            .map(|groups| groups.contains(&target_gid))
            .unwrap_or(false)
}

fn digest_bits(src: &Node, dst: &Node) -> u32 {
    match (&src.digest, &dst.digest) {
        (Some(a), Some(b)) if a.len() != b.len() => bits::DIGEST_LEN,
        (Some(a), Some(b)) if a != b => bits::DIGEST_BYTES,
        _ => 0,
    }
}

fn acl_bits(src: &Node, dst: &Node) -> u32 {
    let mut mask = 0;
    if acl_text_differs(&src.acls.nfs4, &dst.acls.nfs4) {
        mask |= bits::ACL_NFS4;
    }
    if acl_text_differs(&src.acls.access, &dst.acls.access) {
        mask |= bits::ACL_ACCESS;
    }
    if src.stat.kind == FileKind::Directory && acl_text_differs(&src.acls.default, &dst.acls.default)
    {
        mask |= bits::ACL_DEFAULT;
    }
    mask
}

fn acl_text_differs(src: &Option<metadata::Acl>, dst: &Option<metadata::Acl>) -> bool {
    match (src, dst) {
        (None, None) => false,
        (Some(a), Some(b)) => a.to_text() != b.to_text(),
        _ => true,
    }
}

fn xattr_bits(src: &Node, dst: &Node, strict: bool) -> u32 {
    let mut mask = 0;
    if xattr_map_differs(&src.xattrs.user, &dst.xattrs.user, strict) {
        mask |= bits::XATTR_USER;
    }
    if xattr_map_differs(&src.xattrs.system, &dst.xattrs.system, strict) {
        mask |= bits::XATTR_SYSTEM;
    }
    mask
}

/// `strict` (the "remove" policy) requires the destination to carry no
/// extra attributes; otherwise a one-way subset check suffices, matching
/// spec §4.F's "mutual subset with byte-exact values" / "one-way" rule.
fn xattr_map_differs(
    src: &ordered_map::OrderedMap<Vec<u8>>,
    dst: &ordered_map::OrderedMap<Vec<u8>>,
    strict: bool,
) -> bool {
    if strict && src.len() != dst.len() {
        return true;
    }
    for (name, value) in src.iter() {
        match dst.search(name) {
            Some(existing) if existing == value => {}
            _ => return true,
        }
    }
    false
}
