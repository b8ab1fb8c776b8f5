#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `core` is the replication engine's shared foundation: [`config::Config`]
//! is the single record the comparator, metadata writer, and copy engine all
//! take by reference; [`error::Error`]/[`error::ErrorKind`] is the taxonomy
//! every subsystem's own typed error converts into; [`exit_code::ExitCode`]
//! is what the driver ultimately reports to the shell.
//!
//! # Design
//!
//! Kept deliberately thin — this crate owns no filesystem or hashing logic
//! of its own, only the types the other crates agree to speak through.

/// The shared `Config` record (spec Design Note 3).
pub mod config;
/// The `Error`/`ErrorKind` taxonomy (spec §7).
pub mod error;
/// Process exit codes.
pub mod exit_code;
/// Test-only assertion helpers re-exported for use from other crates' test
/// suites.
pub mod test_utils;

pub use config::Config;
pub use error::{Error, ErrorKind};
pub use exit_code::ExitCode;
