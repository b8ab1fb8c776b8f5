#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging-sink` renders the per-action console line spec §6 defines:
//! `<sigil> <dst-path>[/]` followed by a node descriptor letter and flag
//! summary. The driver calls [`render_line`] once per dispatched action and
//! hands the result to [`logging::info_log!`].
//!
//! # Design
//!
//! Kept as pure string formatting with no I/O of its own, so the driver
//! decides whether/where a line is printed.

use std::fmt::Write as _;
use std::path::Path;

use metadata::FileKind;

/// Which action the driver took on a name, rendered as a one-character
/// sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sigil {
    /// `+`: destination object created.
    Created,
    /// `-`: destination object removed.
    Removed,
    /// `*`: destination object replaced (type unchanged, node re-created).
    Replaced,
    /// `!`: metadata-divergent, residual attributes applied.
    Divergent,
    /// `?`: unrecognized node type.
    Unknown,
}

impl Sigil {
    /// The single character printed at the start of a console line.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Created => '+',
            Self::Removed => '-',
            Self::Replaced => '*',
            Self::Divergent => '!',
            Self::Unknown => '?',
        }
    }
}

/// The type-letter a node descriptor opens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLetter {
    /// Directory.
    Directory,
    /// Regular file.
    Regular,
    /// Block device.
    Block,
    /// Character device.
    Char,
    /// Symbolic link.
    Symlink,
    /// FIFO (named pipe).
    Fifo,
    /// `AF_UNIX` socket.
    Socket,
    /// A node type this build cannot classify.
    Unknown,
}

impl TypeLetter {
    /// The single character used in the descriptor.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Directory => 'd',
            Self::Regular => 'f',
            Self::Block => 'b',
            Self::Char => 'c',
            Self::Symlink => 'l',
            Self::Fifo => 'p',
            Self::Socket => 's',
            Self::Unknown => '?',
        }
    }
}

impl From<FileKind> for TypeLetter {
    fn from(kind: FileKind) -> Self {
        match kind {
            FileKind::Directory => Self::Directory,
            FileKind::Regular => Self::Regular,
            FileKind::Symlink => Self::Symlink,
            FileKind::BlockDevice => Self::Block,
            FileKind::CharDevice => Self::Char,
            FileKind::Fifo => Self::Fifo,
            FileKind::Socket => Self::Socket,
        }
    }
}

/// Which optional attributes a node carries, summarized into the
/// descriptor's flag letters and brace-wrapped BSD flag names.
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    /// Node carries an NFSv4/ZFS-style ACL.
    pub nfs4_acl: bool,
    /// Node carries a POSIX access ACL.
    pub access_acl: bool,
    /// Node (a directory) carries a POSIX default ACL.
    pub default_acl: bool,
    /// Node carries `user.*` extended attributes.
    pub user_xattrs: bool,
    /// Node carries `system.*` extended attributes.
    pub system_xattrs: bool,
    /// Names of any BSD file flags set on the node (e.g. `"uchg"`), in the
    /// order they should be rendered.
    pub bsd_flags: Vec<&'static str>,
}

impl Descriptor {
    /// Renders the `<type-letter>[<flags>]` portion of a console line.
    #[must_use]
    pub fn render(&self, kind: FileKind) -> String {
        let mut out = String::new();
        out.push(TypeLetter::from(kind).as_char());

        for (present, letter) in [
            (self.nfs4_acl, 'N'),
            (self.access_acl, 'A'),
            (self.default_acl, 'D'),
            (self.user_xattrs, 'U'),
            (self.system_xattrs, 'S'),
        ] {
            if present {
                out.push(letter);
            }
        }

        if !self.bsd_flags.is_empty() {
            let _ = write!(out, "{{{}}}", self.bsd_flags.join(","));
        }

        out
    }
}

/// Renders one complete console line for a dispatched action.
///
/// `is_directory` controls whether `path` gets the trailing `/` spec §6
/// specifies for directory entries.
#[must_use]
pub fn render_line(
    sigil: Sigil,
    path: &Path,
    is_directory: bool,
    kind: FileKind,
    descriptor: &Descriptor,
) -> String {
    let trailing = if is_directory { "/" } else { "" };
    format!(
        "{} {}{trailing} {}",
        sigil.as_char(),
        path.display(),
        descriptor.render(kind)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_regular_file_with_no_attributes() {
        let line = render_line(
            Sigil::Created,
            Path::new("foo.txt"),
            false,
            FileKind::Regular,
            &Descriptor::default(),
        );
        assert_eq!(line, "+ foo.txt f");
    }

    #[test]
    fn divergent_directory_gets_trailing_slash() {
        let line = render_line(
            Sigil::Divergent,
            Path::new("sub"),
            true,
            FileKind::Directory,
            &Descriptor::default(),
        );
        assert_eq!(line, "! sub/ d");
    }

    #[test]
    fn descriptor_renders_acl_and_xattr_letters_in_order() {
        let descriptor = Descriptor {
            access_acl: true,
            system_xattrs: true,
            ..Descriptor::default()
        };
        assert_eq!(descriptor.render(FileKind::Regular), "fAS");
    }

    #[test]
    fn descriptor_renders_bsd_flags_in_braces() {
        let descriptor = Descriptor {
            bsd_flags: vec!["uchg", "nodump"],
            ..Descriptor::default()
        };
        assert_eq!(descriptor.render(FileKind::Regular), "f{uchg,nodump}");
    }

    #[test]
    fn type_letter_maps_every_file_kind() {
        assert_eq!(TypeLetter::from(FileKind::Directory).as_char(), 'd');
        assert_eq!(TypeLetter::from(FileKind::Regular).as_char(), 'f');
        assert_eq!(TypeLetter::from(FileKind::BlockDevice).as_char(), 'b');
        assert_eq!(TypeLetter::from(FileKind::CharDevice).as_char(), 'c');
        assert_eq!(TypeLetter::from(FileKind::Symlink).as_char(), 'l');
        assert_eq!(TypeLetter::from(FileKind::Fifo).as_char(), 'p');
        assert_eq!(TypeLetter::from(FileKind::Socket).as_char(), 's');
    }
}
