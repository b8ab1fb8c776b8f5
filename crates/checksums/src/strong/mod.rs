//! Strong, fixed-width checksum implementations backed by well-known hash
//! algorithms and 32-bit sums.
//!
//! This module exposes streaming wrappers for every algorithm the digest
//! pipeline's taxonomy recognizes ([`super::digest::DigestTag`]) so the
//! pipeline's state machine can compose the desired algorithm without
//! reimplementing the hashing primitives itself.

mod adler32;
mod crc32;
mod md5;
#[cfg(feature = "openssl")]
mod openssl_support;
mod sha256;
mod sha3_256;
mod sha3_512;
mod sha512;

pub use adler32::Adler32;
pub use crc32::Crc32;
pub use md5::Md5;
#[cfg(feature = "openssl")]
pub use openssl_support::openssl_acceleration_available;
#[cfg(not(feature = "openssl"))]
#[inline]
pub const fn openssl_acceleration_available() -> bool {
    false
}
pub use sha256::Sha256;
pub use sha3_256::Sha3_256;
pub use sha3_512::Sha3_512;
pub use sha512::Sha512;

/// Trait implemented by strong checksum algorithms used by the digest pipeline.
///
/// Implementors provide a streaming interface: callers feed data
/// incrementally via [`Self::update`] and then obtain the final digest
/// through [`Self::finalize`]. The associated
/// [`DIGEST_LEN`](Self::DIGEST_LEN) constant exposes the byte width of the
/// resulting hash so higher layers can size buffers without hard-coding
/// algorithm-specific knowledge.
///
/// # Examples
///
/// Compute an MD5 digest through the trait without depending on the concrete
/// hasher type.
///
/// ```
/// use checksums::strong::{Md5, StrongDigest};
///
/// let mut hasher = Md5::new();
/// hasher.update(b"example");
/// let digest = hasher.finalize();
/// assert_eq!(digest.as_ref().len(), Md5::DIGEST_LEN);
/// ```
pub trait StrongDigest: Sized {
    /// Type used to parameterise a new digest instance.
    type Seed: Default;

    /// Type returned when finalising the digest.
    type Digest: AsRef<[u8]> + Copy;

    /// Length of the final digest in bytes.
    const DIGEST_LEN: usize;

    /// Creates a new hasher with an empty state.
    fn new() -> Self {
        Self::with_seed(Default::default())
    }

    /// Creates a new hasher using the provided seed value.
    fn with_seed(seed: Self::Seed) -> Self;

    /// Feeds additional bytes into the digest state.
    fn update(&mut self, data: &[u8]);

    /// Finalises the digest and returns the resulting hash.
    fn finalize(self) -> Self::Digest;

    /// Convenience helper that hashes `data` in a single call.
    fn digest(data: &[u8]) -> Self::Digest {
        Self::digest_with_seed(Default::default(), data)
    }

    /// Convenience helper that hashes `data` using an explicit seed value.
    fn digest_with_seed(seed: Self::Seed, data: &[u8]) -> Self::Digest {
        let mut hasher = Self::with_seed(seed);
        hasher.update(data);
        hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::{Adler32, Crc32, Md5, Sha256, Sha3_256, Sha3_512, Sha512, StrongDigest};

    #[cfg(feature = "openssl")]
    #[test]
    fn openssl_detection_succeeds_when_feature_enabled() {
        assert!(super::openssl_acceleration_available());
    }

    #[test]
    fn md5_trait_round_trip_matches_inherent_api() {
        let input = b"trait-check";

        let mut via_trait = Md5::new();
        via_trait.update(input);
        let trait_digest = via_trait.finalize();

        assert_eq!(trait_digest.as_ref(), Md5::digest(input).as_ref());
    }

    #[test]
    fn sha256_trait_matches_inherent_api() {
        let input = b"sha256-check";

        let mut via_trait = Sha256::new();
        via_trait.update(input);
        let trait_digest = via_trait.finalize();

        assert_eq!(trait_digest.as_ref(), Sha256::digest(input).as_ref());
    }

    #[test]
    fn sha512_trait_matches_inherent_api() {
        let input = b"sha512-check";

        let mut via_trait = Sha512::new();
        via_trait.update(input);
        let trait_digest = via_trait.finalize();

        assert_eq!(trait_digest.as_ref(), Sha512::digest(input).as_ref());
    }

    #[test]
    fn sha3_256_trait_matches_inherent_api() {
        let input = b"sha3-256-check";

        let mut via_trait = Sha3_256::new();
        via_trait.update(input);
        let trait_digest = via_trait.finalize();

        assert_eq!(trait_digest.as_ref(), Sha3_256::digest(input).as_ref());
    }

    #[test]
    fn sha3_512_trait_matches_inherent_api() {
        let input = b"sha3-512-check";

        let mut via_trait = Sha3_512::new();
        via_trait.update(input);
        let trait_digest = via_trait.finalize();

        assert_eq!(trait_digest.as_ref(), Sha3_512::digest(input).as_ref());
    }

    #[test]
    fn adler32_trait_matches_inherent_api() {
        let input = b"adler-check";

        let mut via_trait = Adler32::new();
        via_trait.update(input);
        let trait_digest = via_trait.finalize();

        assert_eq!(trait_digest.as_ref(), Adler32::digest(input).as_ref());
    }

    #[test]
    fn crc32_trait_matches_inherent_api() {
        let input = b"crc-check";

        let mut via_trait = Crc32::new();
        via_trait.update(input);
        let trait_digest = via_trait.finalize();

        assert_eq!(trait_digest.as_ref(), Crc32::digest(input).as_ref());
    }
}
