#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the command-line frontend: [`args`] parses spec §6's flag
//! table into a [`core::Config`] and a list of positional paths; [`run`]
//! builds the initial [`flist::DirPair`] from those paths the way `pc.c`'s
//! `main()` does (`dst` always loaded as directory contents, each `src`
//! merged into a synthetic top-level directory keyed by its own basename),
//! hands it to [`engine::Driver`], and prints a one-line summary.
//!
//! # Design
//!
//! Argument parsing uses `clap`'s builder API rather than its derive
//! macros, matching how this workspace's other option-heavy surfaces are
//! built.

/// Flag-table parsing (spec §6) into a [`core::Config`].
pub mod args;
/// Suffixed buffer-size parsing for `-B`/`--buffer-size`.
pub mod size;

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use core::{Config, ExitCode};
use flist::{DirNode, DirPair};
use metadata::{PlatformFs, UnixFs};
use ordered_map::OrderedMap;

/// Parses `args`, runs the replication, and writes progress/errors to
/// `stdout`/`stderr`. Returns the [`ExitCode`] the process should exit
/// with.
pub fn run<I, T, Out, Err>(args: I, stdout: &mut Out, stderr: &mut Err) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let parsed = match args::parse(args) {
        Ok(parsed) => parsed,
        Err(err) => {
            use clap::error::ErrorKind;
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = write!(stdout, "{err}");
                return ExitCode::Ok;
            }
            let _ = write!(stderr, "{err}");
            return ExitCode::Syntax;
        }
    };

    logging::init(parsed.config.verbosity);

    match run_replication(&parsed.srcs, &parsed.dst, &parsed.config, &UnixFs) {
        Ok(summary) => {
            let _ = writeln!(
                stdout,
                "created {}, replaced {}, updated {}, removed {}, errors {}",
                summary.created, summary.replaced, summary.updated, summary.removed, summary.errors
            );
            if summary.errors > 0 {
                ExitCode::PartialTransfer
            } else {
                ExitCode::Ok
            }
        }
        Err(err) => {
            let _ = writeln!(stderr, "{err}");
            err.exit_code()
        }
    }
}

/// Converts a run's [`ExitCode`] into the process's [`std::process::ExitCode`].
#[must_use]
pub fn exit_code_from(status: ExitCode) -> std::process::ExitCode {
    std::process::ExitCode::from(status.as_i32() as u8)
}

/// Builds the top-level [`DirPair`] from positional CLI arguments, mirroring
/// `pc.c`'s `dirnode_alloc`/`dirnode_add`: `dst` is always loaded in
/// directory-contents mode, and each `src` is loaded as a single leaf
/// (unless it carries a trailing separator) and merged by its own basename
/// into a synthetic, initially empty top-level source directory. This
/// applies uniformly whether one or several `src` arguments are given.
fn run_replication(
    srcs: &[std::path::PathBuf],
    dst: &Path,
    config: &Config,
    fs: &dyn PlatformFs,
) -> Result<engine::Summary, core::Error> {
    let options = flist::LoadOptions {
        acls: config.acls,
        xattrs: config.xattrs,
        digest: config.digest,
    };

    let dst_dir = flist::load_directory(dst, true, options, fs)?;

    let mut src_dir = DirNode {
        path: std::path::PathBuf::new(),
        nodes: OrderedMap::new(),
    };
    for src in srcs {
        let leaf = flist::load_directory(src, false, options, fs)?;
        for (name, node) in leaf.nodes {
            src_dir.nodes.upsert(name, node);
        }
    }

    let driver = engine::Driver::new(config, fs);
    driver.run(DirPair { src: src_dir, dst: dst_dir })
}
