//! Pluggable, stateful content-digest pipeline.
//!
//! A [`Digest`] is a small state machine: `NONE` → `INIT` (via
//! [`Digest::init`]) → `UPDATE` (via [`Digest::update`], repeatable) →
//! `FINAL` (via [`Digest::finalize_into`]). The same instance is reused
//! across a file's blocks so the engine never allocates a fresh hasher per
//! read.

use crate::strong::{Adler32, Crc32, Md5, Sha256, Sha3_256, Sha3_512, Sha512, StrongDigest};

/// Every content-digest algorithm the pipeline's taxonomy recognizes.
///
/// `Skein256` and `Skein1024` are recognized names but always fail
/// [`Digest::init`] with [`DigestError::Unsupported`]: no vetted, actively
/// maintained Skein crate exists for this build, matching how the reference
/// tool this pipeline is modeled on gates Skein support to platforms that
/// ship it natively (see `DESIGN.md`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DigestTag {
    /// No digest requested; `node_compare` skips content comparison.
    None,
    /// 32-bit Adler checksum.
    Adler32,
    /// 32-bit CRC (IEEE 802.3 polynomial).
    Crc32,
    /// 128-bit MD5.
    Md5,
    /// 256-bit Skein. Recognized but unsupported in this build.
    Skein256,
    /// 1024-bit Skein. Recognized but unsupported in this build.
    Skein1024,
    /// 256-bit SHA-2.
    Sha256,
    /// 512-bit SHA-2.
    Sha512,
    /// 256-bit SHA-3.
    Sha3_256,
    /// 512-bit SHA-3.
    Sha3_512,
}

impl DigestTag {
    /// Byte width of the final digest, or `None` for [`DigestTag::None`].
    #[must_use]
    pub fn digest_len(self) -> Option<usize> {
        match self {
            Self::None => None,
            Self::Adler32 | Self::Crc32 => Some(4),
            Self::Md5 => Some(16),
            Self::Skein256 | Self::Sha256 | Self::Sha3_256 => Some(32),
            Self::Sha512 | Self::Sha3_512 => Some(64),
            Self::Skein1024 => Some(128),
        }
    }

    /// Canonical upper-case name for this tag.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Adler32 => "ADLER32",
            Self::Crc32 => "CRC32",
            Self::Md5 => "MD5",
            Self::Skein256 => "SKEIN256",
            Self::Skein1024 => "SKEIN1024",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
            Self::Sha3_256 => "SHA3-256",
            Self::Sha3_512 => "SHA3-512",
        }
    }

    /// Parses a digest name, case-insensitively and accepting common
    /// aliases (`"SHA-256"`, `"SHA2-256"`, `"SHA256"` all resolve to
    /// [`DigestTag::Sha256`]).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_uppercase)
            .collect();
        match normalized.as_str() {
            "NONE" => Some(Self::None),
            "ADLER32" => Some(Self::Adler32),
            "CRC32" => Some(Self::Crc32),
            "MD5" => Some(Self::Md5),
            "SKEIN256" => Some(Self::Skein256),
            "SKEIN1024" => Some(Self::Skein1024),
            "SHA256" | "SHA2256" => Some(Self::Sha256),
            "SHA512" | "SHA2512" => Some(Self::Sha512),
            "SHA3256" => Some(Self::Sha3_256),
            "SHA3512" => Some(Self::Sha3_512),
            _ => None,
        }
    }
}

/// Errors raised by the digest pipeline's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    /// The requested algorithm is not compiled into this build.
    #[error("digest algorithm is not supported by this build")]
    Unsupported,
    /// `finalize_into` was given a buffer shorter than the digest's width.
    #[error("digest buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Bytes required to hold the digest.
        needed: usize,
        /// Bytes actually supplied.
        got: usize,
    },
    /// An operation was attempted out of order (e.g. `update` before `init`).
    #[error("digest operation invalid in the current state")]
    InvalidState,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
    None,
    Init,
    Update,
    Final,
}

enum Algorithm {
    Adler32(Adler32),
    Crc32(Crc32),
    Md5(Md5),
    Sha256(Sha256),
    Sha512(Sha512),
    Sha3_256(Sha3_256),
    Sha3_512(Sha3_512),
}

impl Algorithm {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Adler32(h) => h.update(data),
            Self::Crc32(h) => h.update(data),
            Self::Md5(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Sha3_256(h) => h.update(data),
            Self::Sha3_512(h) => h.update(data),
        }
    }

    fn finalize_into(self, out: &mut [u8]) {
        match self {
            Self::Adler32(h) => out.copy_from_slice(&h.finalize()),
            Self::Crc32(h) => out.copy_from_slice(&h.finalize()),
            Self::Md5(h) => out.copy_from_slice(&h.finalize()),
            Self::Sha256(h) => out.copy_from_slice(&h.finalize()),
            Self::Sha512(h) => out.copy_from_slice(&h.finalize()),
            Self::Sha3_256(h) => out.copy_from_slice(&h.finalize()),
            Self::Sha3_512(h) => out.copy_from_slice(&h.finalize()),
        }
    }
}

/// A pluggable, stateful content digest.
///
/// ```
/// use checksums::digest::{Digest, DigestTag};
///
/// let mut digest = Digest::new();
/// digest.init(DigestTag::Sha256).unwrap();
/// digest.update(b"hello ").unwrap();
/// digest.update(b"world").unwrap();
/// let mut out = [0u8; 32];
/// let len = digest.finalize_into(&mut out).unwrap();
/// assert_eq!(len, 32);
/// ```
pub struct Digest {
    tag: DigestTag,
    state: State,
    algo: Option<Algorithm>,
}

impl Default for Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest {
    /// Creates an instance in the `NONE` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag: DigestTag::None,
            state: State::None,
            algo: None,
        }
    }

    /// Which algorithm this instance was last initialized with.
    #[must_use]
    pub fn tag(&self) -> DigestTag {
        self.tag
    }

    /// Transitions from `NONE` to `INIT`, selecting `tag` as the active
    /// algorithm. Fails with [`DigestError::Unsupported`] if the build lacks
    /// the algorithm (currently true of `SKEIN256`/`SKEIN1024`).
    pub fn init(&mut self, tag: DigestTag) -> Result<(), DigestError> {
        let algo = match tag {
            DigestTag::None => None,
            DigestTag::Adler32 => Some(Algorithm::Adler32(Adler32::new())),
            DigestTag::Crc32 => Some(Algorithm::Crc32(Crc32::new())),
            DigestTag::Md5 => Some(Algorithm::Md5(Md5::new())),
            DigestTag::Sha256 => Some(Algorithm::Sha256(Sha256::new())),
            DigestTag::Sha512 => Some(Algorithm::Sha512(Sha512::new())),
            DigestTag::Sha3_256 => Some(Algorithm::Sha3_256(Sha3_256::new())),
            DigestTag::Sha3_512 => Some(Algorithm::Sha3_512(Sha3_512::new())),
            DigestTag::Skein256 | DigestTag::Skein1024 => return Err(DigestError::Unsupported),
        };
        self.tag = tag;
        self.algo = algo;
        self.state = State::Init;
        Ok(())
    }

    /// Feeds `data` into the digest. Valid in `INIT` or `UPDATE`; transitions
    /// to `UPDATE`.
    pub fn update(&mut self, data: &[u8]) -> Result<(), DigestError> {
        match self.state {
            State::Init | State::Update => {}
            State::None | State::Final => return Err(DigestError::InvalidState),
        }
        if let Some(algo) = &mut self.algo {
            algo.update(data);
        }
        self.state = State::Update;
        Ok(())
    }

    /// Writes the finalized digest into `out`, transitioning to `FINAL`.
    /// Valid in `INIT` or `UPDATE`. Returns the number of bytes written.
    /// Fails with [`DigestError::BufferTooSmall`] if `out` is shorter than
    /// the algorithm's digest width.
    pub fn finalize_into(mut self, out: &mut [u8]) -> Result<usize, DigestError> {
        match self.state {
            State::Init | State::Update => {}
            State::None | State::Final => return Err(DigestError::InvalidState),
        }
        let needed = self.tag.digest_len().unwrap_or(0);
        if out.len() < needed {
            return Err(DigestError::BufferTooSmall {
                needed,
                got: out.len(),
            });
        }
        if let Some(algo) = self.algo.take() {
            algo.finalize_into(&mut out[..needed]);
        }
        self.state = State::Final;
        Ok(needed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trips_through_aliases() {
        assert_eq!(DigestTag::from_name("sha-256"), Some(DigestTag::Sha256));
        assert_eq!(DigestTag::from_name("SHA2-256"), Some(DigestTag::Sha256));
        assert_eq!(DigestTag::from_name("sha256"), Some(DigestTag::Sha256));
        assert_eq!(DigestTag::from_name("SHA3-512"), Some(DigestTag::Sha3_512));
        assert_eq!(DigestTag::from_name("bogus"), None);
    }

    #[test]
    fn update_before_init_is_invalid_state() {
        let mut digest = Digest::new();
        assert_eq!(digest.update(b"x"), Err(DigestError::InvalidState));
    }

    #[test]
    fn skein_is_recognized_but_unsupported() {
        let mut digest = Digest::new();
        assert_eq!(
            digest.init(DigestTag::Skein256),
            Err(DigestError::Unsupported)
        );
        assert_eq!(
            digest.init(DigestTag::Skein1024),
            Err(DigestError::Unsupported)
        );
    }

    #[test]
    fn finalize_rejects_undersized_buffer() {
        let mut digest = Digest::new();
        digest.init(DigestTag::Sha256).unwrap();
        digest.update(b"data").unwrap();
        let mut out = [0u8; 8];
        assert_eq!(
            digest.finalize_into(&mut out),
            Err(DigestError::BufferTooSmall {
                needed: 32,
                got: 8
            })
        );
    }

    #[test]
    fn md5_digest_matches_known_vector() {
        let mut digest = Digest::new();
        digest.init(DigestTag::Md5).unwrap();
        digest.update(b"abc").unwrap();
        let mut out = [0u8; 16];
        let len = digest.finalize_into(&mut out).unwrap();
        assert_eq!(len, 16);
        assert_eq!(out, Md5::digest(b"abc"));
    }

    #[test]
    fn crc32_is_serialized_big_endian() {
        let mut digest = Digest::new();
        digest.init(DigestTag::Crc32).unwrap();
        digest.update(b"abc").unwrap();
        let mut out = [0u8; 4];
        digest.finalize_into(&mut out).unwrap();
        assert_eq!(u32::from_be_bytes(out), 0x3524_41c2);
    }
}
