#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the content-digest primitives used by the
//! replication engine's comparator and copy stages. Every algorithm the
//! engine can be configured to use lives behind one state machine so the
//! rest of the workspace never has to match on a concrete hasher type.
//!
//! # Design
//!
//! The crate offers two modules:
//!
//! - [`strong`] implements each concrete algorithm (Adler-32, CRC-32, MD5,
//!   SHA-2, SHA-3) behind the [`strong::StrongDigest`] trait.
//! - [`digest`] wraps them in a single [`digest::Digest`] type that mirrors
//!   the pluggable digest pipeline's `NONE → INIT → UPDATE → FINAL` state
//!   machine, with case-insensitive name lookup and alias handling.
//!
//! # Errors
//!
//! [`digest::DigestError`] reports digest algorithms unavailable in this
//! build, undersized output buffers, and operations attempted out of state
//! order.
//!
//! # Examples
//!
//! ```
//! use checksums::digest::{Digest, DigestTag};
//!
//! let mut digest = Digest::new();
//! digest.init(DigestTag::from_name("sha-256").unwrap()).unwrap();
//! digest.update(b"hello").unwrap();
//! let mut out = [0u8; 32];
//! digest.finalize_into(&mut out).unwrap();
//! ```

pub mod digest;
pub mod strong;
