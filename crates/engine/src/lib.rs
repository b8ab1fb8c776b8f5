#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` is where the replication decisions get made: [`compare`]
//! (`node_compare`, spec §4.F) is the pure comparator producing a
//! divergence bitmask; [`writer`] (`node_update`, spec §4.G) applies a
//! source node's metadata onto a destination in the ordering that avoids
//! policy loss; [`driver`] (spec §4.I) is the per-name dispatch loop that
//! drives both across a [`flist::DirPair`].
//!
//! # Design
//!
//! `compare` and `writer` are free functions with no state of their own —
//! [`driver::Driver`] is the only stateful piece, and it holds nothing but
//! a `&Config` and a `&dyn PlatformFs` borrowed for the run.

/// The comparator (`node_compare`).
pub mod compare;
/// The replication driver (per-name dispatch, recursion, removal pass).
pub mod driver;
/// The metadata writer (`node_update`).
pub mod writer;

pub use compare::{compare, MISSING};
pub use driver::{Driver, Summary};
pub use writer::apply_metadata;
