//! Command-line surface (spec §6): a `clap` builder-style [`clap::Command`]
//! covering exactly the flag table this tool recognizes, and [`parse`],
//! which turns a matched [`clap::ArgMatches`] into a [`Parsed`] — the
//! positional source/destination paths plus a fully populated
//! [`core::Config`].

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};
use core::Config;

use crate::size::parse_buffer_size;

/// Parsed command-line input: the positional paths and the resulting
/// policy [`Config`].
#[derive(Debug, Clone)]
pub struct Parsed {
    /// One or more source paths (positional args before the last).
    pub srcs: Vec<PathBuf>,
    /// The destination path (the final positional arg).
    pub dst: PathBuf,
    /// The policy this run should apply.
    pub config: Config,
}

/// Builds the `clap` command describing every flag in spec §6.
#[must_use]
pub fn command() -> Command {
    Command::new("reflect-sync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Differential filesystem replication engine")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase verbosity (0=silent, 1=per-action, 2=+progress, 3=+per-node detail)"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::Count)
                .help("Increase debug output"),
        )
        .arg(
            Arg::new("dry_run")
                .short('n')
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Disable all mutations; diff only"),
        )
        .arg(
            Arg::new("force")
                .short('f')
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Treat every compared node as divergent"),
        )
        .arg(
            Arg::new("ignore")
                .short('i')
                .long("ignore")
                .action(ArgAction::SetTrue)
                .help("Continue past per-node errors"),
        )
        .arg(
            Arg::new("recurse")
                .short('r')
                .long("recurse")
                .action(ArgAction::SetTrue)
                .help("Descend into directories"),
        )
        .arg(
            Arg::new("preserve")
                .short('p')
                .long("preserve")
                .action(ArgAction::SetTrue)
                .help("Restore mode bits"),
        )
        .arg(
            Arg::new("owner")
                .short('o')
                .long("owner")
                .action(ArgAction::SetTrue)
                .help("Restore uid/gid"),
        )
        .arg(
            Arg::new("times")
                .short('t')
                .long("times")
                .action(ArgAction::Count)
                .help("Level 1 compares mtime; level 2 also restores atime/mtime"),
        )
        .arg(
            Arg::new("expunge")
                .short('x')
                .long("expunge")
                .action(ArgAction::SetTrue)
                .help("Enable the destination-side removal pass"),
        )
        .arg(
            Arg::new("no_copy")
                .short('u')
                .long("no-copy")
                .action(ArgAction::SetTrue)
                .help("Skip regular-file content replication (metadata only)"),
        )
        .arg(
            Arg::new("zero_fill")
                .short('z')
                .long("zero-fill")
                .action(ArgAction::SetTrue)
                .help("Sparse-hole zero blocks on copy"),
        )
        .arg(
            Arg::new("acls")
                .short('A')
                .long("acls")
                .action(ArgAction::SetTrue)
                .help("Replicate ACLs"),
        )
        .arg(
            Arg::new("attributes")
                .short('X')
                .long("attributes")
                .action(ArgAction::SetTrue)
                .help("Replicate extended attributes"),
        )
        .arg(
            Arg::new("file_flags")
                .short('F')
                .long("file-flags")
                .action(ArgAction::SetTrue)
                .help("Replicate BSD file flags"),
        )
        .arg(
            Arg::new("archive_flag")
                .short('U')
                .long("archive-flag")
                .action(ArgAction::SetTrue)
                .help("Handle and clear the source archive bit"),
        )
        .arg(
            Arg::new("archive")
                .short('a')
                .long("archive")
                .action(ArgAction::SetTrue)
                .help("Equivalent to -rpottAXFU"),
        )
        .arg(
            Arg::new("mirror")
                .short('M')
                .long("mirror")
                .action(ArgAction::SetTrue)
                .help("Equivalent to -ax"),
        )
        .arg(
            Arg::new("buffer_size")
                .short('B')
                .long("buffer-size")
                .value_name("SIZE")
                .help("Copy buffer size (accepts K, M, G, Ki, Mi, Gi suffixes)"),
        )
        .arg(
            Arg::new("digest")
                .short('D')
                .long("digest")
                .value_name("NAME")
                .help("Content digest algorithm"),
        )
        .arg(
            Arg::new("paths")
                .value_name("PATH")
                .num_args(2..)
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("<src-1> [... <src-N>] <dst>"),
        )
}

/// Converts matched arguments into a [`Parsed`] invocation.
pub fn parse<I, T>(args: I) -> Result<Parsed, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let matches = command().try_get_matches_from(args)?;

    let mut paths: Vec<PathBuf> = matches
        .get_many::<PathBuf>("paths")
        .expect("required")
        .cloned()
        .collect();
    let dst = paths.pop().expect("num_args(2..) guarantees at least one");
    let srcs = paths;

    let archive = matches.get_flag("archive");
    let mirror = matches.get_flag("mirror");
    let archive_or_mirror = archive || mirror;

    let times_level = matches.get_count("times").min(2);
    let times = if archive_or_mirror { times_level.max(2) } else { times_level };

    let buffer_size = match matches.get_one::<String>("buffer_size") {
        Some(text) => parse_buffer_size(text)
            .map_err(|err| clap::Error::raw(clap::error::ErrorKind::InvalidValue, err.to_string()))?,
        None => Config::default().buffer_size,
    };

    let digest = match matches.get_one::<String>("digest") {
        Some(name) => Some(checksums::digest::DigestTag::from_name(name).ok_or_else(|| {
            clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("unrecognized digest algorithm {name:?}"),
            )
        })?),
        None => None,
    };

    let config = Config {
        dry_run: matches.get_flag("dry_run"),
        force: matches.get_flag("force"),
        ignore: matches.get_flag("ignore"),
        recurse: matches.get_flag("recurse") || archive_or_mirror,
        preserve_mode: matches.get_flag("preserve") || archive_or_mirror,
        owner: matches.get_flag("owner") || archive_or_mirror,
        times,
        expunge: matches.get_flag("expunge") || mirror,
        copy_content: !matches.get_flag("no_copy"),
        zero_fill: matches.get_flag("zero_fill"),
        acls: matches.get_flag("acls") || archive_or_mirror,
        xattrs: matches.get_flag("attributes") || archive_or_mirror,
        file_flags: matches.get_flag("file_flags") || archive_or_mirror,
        archive_flag: matches.get_flag("archive_flag") || archive_or_mirror,
        buffer_size,
        digest,
        verbosity: logging::VerbosityConfig::from_levels(
            matches.get_count("verbose").min(3),
            matches.get_count("debug").min(3),
        ),
    };

    Ok(Parsed { srcs, dst, config })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(args: &[&str]) -> Parsed {
        parse(args.iter().copied()).expect("parse")
    }

    #[test]
    fn single_source_and_destination() {
        let parsed = parse_ok(&["reflect-sync", "src", "dst"]);
        assert_eq!(parsed.srcs, vec![PathBuf::from("src")]);
        assert_eq!(parsed.dst, PathBuf::from("dst"));
    }

    #[test]
    fn multiple_sources_are_preserved_in_order() {
        let parsed = parse_ok(&["reflect-sync", "a", "b", "dst"]);
        assert_eq!(parsed.srcs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(parsed.dst, PathBuf::from("dst"));
    }

    #[test]
    fn archive_expands_to_its_component_flags() {
        let parsed = parse_ok(&["reflect-sync", "-a", "src", "dst"]);
        assert!(parsed.config.recurse);
        assert!(parsed.config.preserve_mode);
        assert!(parsed.config.owner);
        assert_eq!(parsed.config.times, 2);
        assert!(parsed.config.acls);
        assert!(parsed.config.xattrs);
        assert!(parsed.config.file_flags);
        assert!(parsed.config.archive_flag);
        assert!(!parsed.config.expunge);
    }

    #[test]
    fn mirror_expands_to_archive_plus_expunge() {
        let parsed = parse_ok(&["reflect-sync", "-M", "src", "dst"]);
        assert!(parsed.config.recurse);
        assert!(parsed.config.expunge);
    }

    #[test]
    fn repeated_short_flags_combine() {
        let parsed = parse_ok(&["reflect-sync", "-rAX", "src", "dst"]);
        assert!(parsed.config.recurse);
        assert!(parsed.config.acls);
        assert!(parsed.config.xattrs);
    }

    #[test]
    fn verbose_count_clamps_at_three() {
        let parsed = parse_ok(&["reflect-sync", "-vvvv", "src", "dst"]);
        assert_eq!(parsed.config.verbosity.verbose, 3);
    }

    #[test]
    fn buffer_size_suffix_is_parsed() {
        let parsed = parse_ok(&["reflect-sync", "-B", "64Ki", "src", "dst"]);
        assert_eq!(parsed.config.buffer_size, 64 * 1024);
    }

    #[test]
    fn invalid_buffer_size_is_rejected() {
        let err = parse(["reflect-sync", "-B", "bogus", "src", "dst"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn digest_name_resolves_aliases() {
        let parsed = parse_ok(&["reflect-sync", "-D", "sha-256", "src", "dst"]);
        assert_eq!(parsed.config.digest, Some(checksums::digest::DigestTag::Sha256));
    }

    #[test]
    fn unrecognized_digest_is_rejected() {
        let err = parse(["reflect-sync", "-D", "bogus", "src", "dst"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn single_positional_argument_is_rejected() {
        let err = parse(["reflect-sync", "only-one"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::TooFewValues);
    }
}
