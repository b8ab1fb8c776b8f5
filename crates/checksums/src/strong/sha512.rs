use digest::Digest;

use super::StrongDigest;

/// Streaming SHA-512 hasher used by rsync when peers negotiate the strongest daemon authentication digest.
#[derive(Clone, Debug)]
pub struct Sha512 {
    inner: sha2::Sha512,
}

impl Default for Sha512 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha512 {
    /// Creates a hasher with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: sha2::Sha512::new(),
        }
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalises the digest and returns the 512-bit SHA-512 output.
    #[must_use]
    pub fn finalize(self) -> [u8; 64] {
        self.inner.finalize().into()
    }

    /// Convenience helper that computes the SHA-512 digest for `data` in one shot.
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; 64] {
        <Self as StrongDigest>::digest(data)
    }
}

impl StrongDigest for Sha512 {
    type Seed = ();
    type Digest = [u8; 64];
    const DIGEST_LEN: usize = 64;

    fn with_seed((): Self::Seed) -> Self {
        Sha512::new()
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn finalize(self) -> Self::Digest {
        self.inner.finalize().into()
    }
}
