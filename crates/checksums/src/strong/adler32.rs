use super::StrongDigest;

/// Streaming Adler-32 checksum, serialized big-endian per the digest pipeline's
/// wire convention for 32-bit sums.
#[derive(Clone, Debug)]
pub struct Adler32 {
    inner: adler::Adler32,
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Adler32 {
    /// Creates a hasher with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: adler::Adler32::new(),
        }
    }

    /// Feeds additional bytes into the checksum state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.write_slice(data);
    }

    /// Finalises the checksum, returning its big-endian byte representation.
    #[must_use]
    pub fn finalize(self) -> [u8; 4] {
        self.inner.checksum().to_be_bytes()
    }

    /// Convenience helper that computes the Adler-32 checksum for `data` in one shot.
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; 4] {
        <Self as StrongDigest>::digest(data)
    }
}

impl StrongDigest for Adler32 {
    type Seed = ();
    type Digest = [u8; 4];
    const DIGEST_LEN: usize = 4;

    fn with_seed((): Self::Seed) -> Self {
        Adler32::new()
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.write_slice(data);
    }

    fn finalize(self) -> Self::Digest {
        self.inner.checksum().to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adler32_matches_known_vectors() {
        assert_eq!(Adler32::digest(b""), 1u32.to_be_bytes());
        assert_eq!(Adler32::digest(b"abc"), 0x024d_0127u32.to_be_bytes());
    }

    #[test]
    fn adler32_streaming_matches_one_shot() {
        let input = b"message digest";
        let mut hasher = Adler32::new();
        hasher.update(&input[..7]);
        hasher.update(&input[7..]);
        assert_eq!(hasher.finalize(), Adler32::digest(input));
    }
}
