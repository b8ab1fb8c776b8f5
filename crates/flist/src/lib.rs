#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `flist` is the in-memory directory tree model the replication engine
//! compares and reconciles: [`node::Node`] captures one filesystem object's
//! state, [`dir::DirNode`] is an ordered collection of a directory's
//! immediate children, and [`dir::DirPair`] pairs a source and destination
//! [`dir::DirNode`] for the driver to walk together.
//!
//! # Design
//!
//! The node and directory shapes are grounded directly in the reference
//! tool's `NODE`/`DIRNODE`/`DIRPAIR` structs (see `DESIGN.md`); the
//! directory loader ([`dir::load_directory`]) implements the contents-mode
//! and trailing-separator rules that decide whether a path is expanded into
//! its children or inserted as a single leaf entry.

pub mod dir;
pub mod node;

pub use dir::{DirNode, DirPair, load_directory};
pub use node::{LoadOptions, Node, NodeAcls, NodeXattrs};
