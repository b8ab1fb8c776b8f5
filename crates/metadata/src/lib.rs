#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `metadata` is the sole layer in the replication engine that talks to the
//! kernel. Every other crate in the workspace — the comparator, the
//! metadata writer, the CLI — goes through the [`unix::PlatformFs`] trait
//! rather than calling `libc` or `std::fs` platform primitives itself.
//!
//! # Design
//!
//! - [`stat`] — the reduced `struct stat` view ([`stat::Stat`],
//!   [`stat::FileKind`]) the engine's comparator consults.
//! - [`acl`] — opaque ACL handles ([`acl::Acl`]) compared only by their
//!   canonical text form, backed by `exacl` behind the `acl` feature.
//! - [`xattr`] — namespace-qualified extended attribute access, normalized
//!   to `Vec<String>` regardless of the platform's wire format.
//! - [`flags`] — BSD `st_flags`, including the archive-bit convention
//!   `pc.c` uses to drive re-copy decisions.
//! - [`unix`] — [`unix::PlatformFs`], the trait every consumer depends on,
//!   and [`unix::UnixFs`], its default implementation.
//!
//! # Errors
//!
//! Every fallible operation returns [`error::MetadataError`], which
//! classifies failures into [`error::MetadataErrorKind`] independent of the
//! underlying platform's errno numbering.

pub mod acl;
pub mod error;
pub mod flags;
pub mod stat;
pub mod unix;
pub mod xattr;

pub use acl::{Acl, AclKind};
pub use error::{MetadataError, MetadataErrorKind};
pub use stat::{FileKind, Stat};
pub use unix::{PlatformFs, UnixFs};
pub use xattr::Namespace;
