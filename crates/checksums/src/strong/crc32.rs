use super::StrongDigest;

/// Streaming CRC-32 (IEEE) checksum, serialized big-endian per the digest
/// pipeline's wire convention for 32-bit sums.
#[derive(Clone, Debug)]
pub struct Crc32 {
    inner: crc32fast::Hasher,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    /// Creates a hasher with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: crc32fast::Hasher::new(),
        }
    }

    /// Feeds additional bytes into the checksum state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalises the checksum, returning its big-endian byte representation.
    #[must_use]
    pub fn finalize(self) -> [u8; 4] {
        self.inner.finalize().to_be_bytes()
    }

    /// Convenience helper that computes the CRC-32 checksum for `data` in one shot.
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; 4] {
        <Self as StrongDigest>::digest(data)
    }
}

impl StrongDigest for Crc32 {
    type Seed = ();
    type Digest = [u8; 4];
    const DIGEST_LEN: usize = 4;

    fn with_seed((): Self::Seed) -> Self {
        Crc32::new()
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn finalize(self) -> Self::Digest {
        self.inner.finalize().to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_matches_known_vectors() {
        assert_eq!(Crc32::digest(b""), 0u32.to_be_bytes());
        assert_eq!(Crc32::digest(b"abc"), 0x3524_41c2u32.to_be_bytes());
    }

    #[test]
    fn crc32_streaming_matches_one_shot() {
        let input = b"message digest";
        let mut hasher = Crc32::new();
        hasher.update(&input[..7]);
        hasher.update(&input[7..]);
        assert_eq!(hasher.finalize(), Crc32::digest(input));
    }
}
