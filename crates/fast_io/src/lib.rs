#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `fast_io` is the replication engine's content-copy stage: streaming a
//! regular file's bytes from a source path to a destination path, detecting
//! runs of NUL bytes and turning them into holes via `lseek` rather than
//! writing them out.
//!
//! # Design
//!
//! [`SparseWriteState`] tracks how many zero bytes are owed to the
//! destination stream. Each call to [`SparseWriteState::write`] either
//! accumulates a fully-zero block into that debt, or flushes the debt (a
//! single seek) before writing real bytes. [`SparseWriteState::finish`]
//! settles any remaining debt by writing one trailing zero byte so the
//! destination reaches the correct length even on filesystems that do not
//! lazily allocate a file's last block on seek-past-end.
//!
//! [`copy_file`] drives this state machine over a fixed-size read buffer,
//! creating the destination with the source's mode and `O_TRUNC` semantics.
//! The engine only ships the one buffered backend below; alternative
//! backends (double-buffered async reads, `sendfile`) are a build-time
//! extension point this crate's contract leaves room for, not something
//! this workspace currently needs.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Default block size for [`copy_file`] reads, matching the spec's stated
/// default.
pub const DEFAULT_BLOCK_SIZE: usize = 128 * 1024;

/// Tunable knobs for [`copy_file`].
#[derive(Debug, Clone, Copy)]
pub struct CopyOptions {
    /// Size of each read/write chunk.
    pub block_size: usize,
    /// Whether all-zero blocks are elided into holes instead of written.
    pub zero_fill: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            zero_fill: true,
        }
    }
}

/// A `copy_file` failure, tagged with which side (`src`/`dst`) and path
/// triggered it.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// Reading from the source failed.
    #[error("reading {path}: {source}")]
    Read {
        /// Source path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing to the destination failed.
    #[error("writing {path}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl CopyError {
    fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Tracks a run of not-yet-written zero bytes on a seekable destination
/// stream.
///
/// `write` decides per-chunk whether to accumulate (all-zero) or flush then
/// write (anything else); `finish` must be called once the source is
/// exhausted to settle any trailing debt.
#[derive(Debug, Default)]
pub struct SparseWriteState {
    pending: u64,
}

impl SparseWriteState {
    /// Starts with no pending zero debt.
    #[must_use]
    pub fn new() -> Self {
        Self { pending: 0 }
    }

    /// Bytes of zero debt accumulated so far.
    #[must_use]
    pub fn pending(&self) -> u64 {
        self.pending
    }

    /// Adds `n` bytes of zero debt.
    pub fn accumulate(&mut self, n: usize) {
        self.pending = self.pending.saturating_add(n as u64);
    }

    /// Seeks `writer` forward by the pending debt, clearing it, without
    /// writing anything.
    pub fn flush<W: Seek>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.pending > 0 {
            writer.seek(SeekFrom::Current(seek_delta(self.pending)))?;
            self.pending = 0;
        }
        Ok(())
    }

    /// Writes `data` to `writer`, eliding it into hole debt if every byte is
    /// zero, otherwise flushing prior debt first and writing the real bytes.
    /// Returns the number of input bytes consumed (always `data.len()`).
    pub fn write<W: Write + Seek>(&mut self, writer: &mut W, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        if data.iter().all(|&byte| byte == 0) {
            self.accumulate(data.len());
        } else {
            self.flush(writer)?;
            writer.write_all(data)?;
        }
        Ok(data.len())
    }

    /// Settles any remaining zero debt: seeks to one byte short of the debt
    /// and writes a single zero, so the destination's length is correct even
    /// when the filesystem doesn't lazily allocate the final block of a
    /// seek-extended file. Returns the writer's resulting stream position.
    pub fn finish<W: Write + Seek>(&mut self, writer: &mut W) -> io::Result<u64> {
        if self.pending > 0 {
            writer.seek(SeekFrom::Current(seek_delta(self.pending - 1)))?;
            writer.write_all(&[0_u8])?;
            self.pending = 0;
        }
        writer.stream_position()
    }
}

fn seek_delta(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

/// Stream-copies the regular file at `src_path` to `dst_path`, creating the
/// destination with `src_mode` and truncating any existing content.
///
/// Returns the number of bytes read from the source. When
/// [`CopyOptions::zero_fill`] is set, blocks that are entirely NUL bytes are
/// turned into holes rather than written, with [`SparseWriteState`] settling
/// the destination's final length once the source is exhausted.
pub fn copy_file(
    src_path: &Path,
    dst_path: &Path,
    src_mode: u32,
    options: CopyOptions,
) -> Result<u64, CopyError> {
    let mut src = File::open(src_path).map_err(|err| CopyError::read(src_path, err))?;
    let mut dst = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(src_mode)
        .open(dst_path)
        .map_err(|err| CopyError::write(dst_path, err))?;

    let block_size = options.block_size.max(1);
    let mut buf = vec![0_u8; block_size];
    let mut state = SparseWriteState::new();
    let mut total = 0_u64;
    let mut holes_elided = false;

    loop {
        let read = src
            .read(&mut buf)
            .map_err(|err| CopyError::read(src_path, err))?;
        if read == 0 {
            break;
        }
        let chunk = &buf[..read];
        if options.zero_fill {
            let pending_before = state.pending();
            state
                .write(&mut dst, chunk)
                .map_err(|err| CopyError::write(dst_path, err))?;
            if state.pending() > pending_before {
                holes_elided = true;
            }
        } else {
            dst.write_all(chunk)
                .map_err(|err| CopyError::write(dst_path, err))?;
        }
        total += read as u64;
    }

    if options.zero_fill {
        state
            .finish(&mut dst)
            .map_err(|err| CopyError::write(dst_path, err))?;
    }

    if holes_elided {
        tracing::debug!(path = %dst_path.display(), bytes = total, "copied file with sparse holes");
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::os::unix::fs::{MetadataExt, PermissionsExt};
    use test_support::scratch_dir;

    #[test]
    fn sparse_state_initial_pending_is_zero() {
        let state = SparseWriteState::new();
        assert_eq!(state.pending(), 0);
    }

    #[test]
    fn sparse_state_accumulate_multiple_calls() {
        let mut state = SparseWriteState::new();
        state.accumulate(10);
        state.accumulate(20);
        state.accumulate(30);
        assert_eq!(state.pending(), 60);
    }

    #[test]
    fn sparse_state_saturating_accumulate_does_not_panic() {
        let mut state = SparseWriteState::new();
        state.accumulate(usize::MAX);
        state.accumulate(usize::MAX);
        assert!(state.pending() > 0);
    }

    #[test]
    fn sparse_state_flush_seeks_by_pending_amount() {
        let mut state = SparseWriteState::new();
        state.accumulate(100);
        let mut cursor = Cursor::new(vec![0_u8; 200]);
        state.flush(&mut cursor).expect("flush");
        assert_eq!(cursor.position(), 100);
        assert_eq!(state.pending(), 0);
    }

    #[test]
    fn sparse_state_write_all_zeros_accumulates_without_writing() {
        let mut state = SparseWriteState::new();
        let mut cursor = Cursor::new(vec![0_u8; 1000]);
        let zeros = [0_u8; 500];
        let written = state.write(&mut cursor, &zeros).expect("write zeros");
        assert_eq!(written, 500);
        assert_eq!(state.pending(), 500);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn sparse_state_write_non_zero_flushes_then_writes() {
        let mut state = SparseWriteState::new();
        let mut cursor = Cursor::new(vec![0_u8; 100]);
        state.accumulate(10);
        let written = state.write(&mut cursor, b"hi").expect("write");
        assert_eq!(written, 2);
        assert_eq!(cursor.position(), 12);
        assert_eq!(state.pending(), 0);
    }

    #[test]
    fn sparse_state_finish_writes_single_trailing_zero() {
        let mut state = SparseWriteState::new();
        state.accumulate(10);
        let mut cursor = Cursor::new(vec![1_u8; 20]);
        let pos = state.finish(&mut cursor).expect("finish");
        assert_eq!(pos, 10);
        let buffer = cursor.into_inner();
        assert_eq!(buffer[9], 0);
    }

    #[test]
    fn sparse_state_finish_with_no_pending_is_noop() {
        let mut state = SparseWriteState::new();
        let mut cursor = Cursor::new(vec![0_u8; 10]);
        let pos = state.finish(&mut cursor).expect("finish empty");
        assert_eq!(pos, 0);
    }

    #[test]
    fn copy_file_reproduces_content_and_mode() {
        let dir = scratch_dir();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        std::fs::write(&src, b"hello world").unwrap();
        std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o640)).unwrap();

        let total = copy_file(&src, &dst, 0o640, CopyOptions::default()).expect("copy");
        assert_eq!(total, 11);
        assert_eq!(std::fs::read(&dst).unwrap(), b"hello world");
        let mode = std::fs::metadata(&dst).unwrap().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn copy_file_elides_zero_blocks_into_holes() {
        let dir = scratch_dir();
        let src = dir.path().join("sparse.bin");
        let dst = dir.path().join("sparse_out.bin");

        let mut content = vec![0xAA_u8; 4096];
        content.extend(vec![0_u8; 256 * 1024]);
        content.extend(vec![0xBB_u8; 4096]);
        std::fs::write(&src, &content).unwrap();

        let total = copy_file(
            &src,
            &dst,
            0o600,
            CopyOptions {
                block_size: 64 * 1024,
                zero_fill: true,
            },
        )
        .expect("copy");
        assert_eq!(total, content.len() as u64);

        let copied = std::fs::read(&dst).unwrap();
        assert_eq!(copied, content);

        let meta = std::fs::metadata(&dst).unwrap();
        assert_eq!(meta.len(), content.len() as u64);
        let dense_blocks = meta.len() / 512;
        assert!(meta.blocks() < dense_blocks);
    }

    #[test]
    fn copy_file_without_zero_fill_writes_holes_verbatim() {
        let dir = scratch_dir();
        let src = dir.path().join("plain.bin");
        let dst = dir.path().join("plain_out.bin");
        let content = vec![0_u8; 8192];
        std::fs::write(&src, &content).unwrap();

        let total = copy_file(
            &src,
            &dst,
            0o600,
            CopyOptions {
                zero_fill: false,
                ..CopyOptions::default()
            },
        )
        .expect("copy");
        assert_eq!(total, content.len() as u64);
        assert_eq!(std::fs::read(&dst).unwrap(), content);
    }

    #[test]
    fn copy_file_empty_source_yields_empty_destination() {
        let dir = scratch_dir();
        let src = dir.path().join("empty.bin");
        let dst = dir.path().join("empty_out.bin");
        std::fs::write(&src, b"").unwrap();

        let total = copy_file(&src, &dst, 0o600, CopyOptions::default()).expect("copy");
        assert_eq!(total, 0);
        assert_eq!(std::fs::metadata(&dst).unwrap().len(), 0);
    }
}
