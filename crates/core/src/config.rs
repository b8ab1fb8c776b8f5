//! The single configuration record (spec Design Note 3) passed by reference
//! into the comparator, the metadata writer, and the copy engine, instead of
//! each stage threading its own subset of flags.

use checksums::digest::DigestTag;
use logging::VerbosityConfig;

/// Every policy knob spec §6 names, gathered into one record.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// `-n`/`--dry-run`: disable all mutations, diff only.
    pub dry_run: bool,
    /// `-f`/`--force`: treat every compared node as divergent.
    pub force: bool,
    /// `-i`/`--ignore`: continue past per-node errors.
    pub ignore: bool,
    /// `-r`/`--recurse`: descend into directories.
    pub recurse: bool,
    /// `-p`/`--preserve`: restore mode bits.
    pub preserve_mode: bool,
    /// `-o`/`--owner`: restore uid/gid.
    pub owner: bool,
    /// `-t`/`--times`: `0` untouched, `1` compares mtime, `2` also restores
    /// atime/mtime.
    pub times: u8,
    /// `-x`/`--expunge`: enable the destination-side removal pass.
    pub expunge: bool,
    /// `-u`/`--no-copy` is the inverse of this: when `false`, regular-file
    /// content replication is skipped and only metadata is applied.
    pub copy_content: bool,
    /// `-z`/`--zero-fill`: elide all-zero blocks into sparse holes on copy.
    pub zero_fill: bool,
    /// `-A`/`--acls`: replicate ACLs.
    pub acls: bool,
    /// `-X`/`--attributes`: replicate extended attributes.
    pub xattrs: bool,
    /// `-F`/`--file-flags`: replicate BSD file flags.
    pub file_flags: bool,
    /// `-U`/`--archive-flag`: handle and clear the source archive bit.
    pub archive_flag: bool,
    /// `-B`/`--buffer-size`: copy buffer size in bytes.
    pub buffer_size: usize,
    /// `-D`/`--digest`: content digest algorithm, or `None` to compare by
    /// mtime/size alone.
    pub digest: Option<DigestTag>,
    /// `-v`/`-d` counters.
    pub verbosity: VerbosityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dry_run: false,
            force: false,
            ignore: false,
            recurse: false,
            preserve_mode: false,
            owner: false,
            times: 0,
            expunge: false,
            copy_content: true,
            zero_fill: false,
            acls: false,
            xattrs: false,
            file_flags: false,
            archive_flag: false,
            buffer_size: fast_io::DEFAULT_BLOCK_SIZE,
            digest: None,
            verbosity: VerbosityConfig::default(),
        }
    }
}

impl Config {
    /// Whether mtime should factor into the comparator's divergence mask at
    /// all (`-t` given at least once).
    #[must_use]
    pub const fn compares_mtime(&self) -> bool {
        self.times >= 1
    }

    /// Whether atime/mtime should be restored by the metadata writer
    /// (`-t` given twice).
    #[must_use]
    pub const fn restores_times(&self) -> bool {
        self.times >= 2
    }

    /// The [`fast_io::CopyOptions`] this config implies for a content copy.
    #[must_use]
    pub const fn copy_options(&self) -> fast_io::CopyOptions {
        fast_io::CopyOptions {
            block_size: self.buffer_size,
            zero_fill: self.zero_fill,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_copies_content_and_uses_default_block_size() {
        let config = Config::default();
        assert!(config.copy_content);
        assert_eq!(config.buffer_size, fast_io::DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn times_level_gates_compare_and_restore_independently() {
        let mut config = Config {
            times: 1,
            ..Config::default()
        };
        assert!(config.compares_mtime());
        assert!(!config.restores_times());

        config.times = 2;
        assert!(config.restores_times());
    }

    #[test]
    fn copy_options_reflects_buffer_size_and_zero_fill() {
        let config = Config {
            buffer_size: 4096,
            zero_fill: true,
            ..Config::default()
        };
        let options = config.copy_options();
        assert_eq!(options.block_size, 4096);
        assert!(options.zero_fill);
    }
}
