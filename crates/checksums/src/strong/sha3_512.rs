use digest::Digest;

use super::StrongDigest;

/// Streaming SHA3-512 hasher.
#[derive(Clone, Debug)]
pub struct Sha3_512 {
    inner: sha3::Sha3_512,
}

impl Default for Sha3_512 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha3_512 {
    /// Creates a hasher with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: sha3::Sha3_512::new(),
        }
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalises the digest and returns the 512-bit SHA3-512 output.
    #[must_use]
    pub fn finalize(self) -> [u8; 64] {
        self.inner.finalize().into()
    }

    /// Convenience helper that computes the SHA3-512 digest for `data` in one shot.
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; 64] {
        <Self as StrongDigest>::digest(data)
    }
}

impl StrongDigest for Sha3_512 {
    type Seed = ();
    type Digest = [u8; 64];
    const DIGEST_LEN: usize = 64;

    fn with_seed((): Self::Seed) -> Self {
        Sha3_512::new()
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn finalize(self) -> Self::Digest {
        self.inner.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_hex(bytes: &[u8]) -> String {
        use std::fmt::Write as _;

        let mut out = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            write!(&mut out, "{byte:02x}").expect("write! to String cannot fail");
        }
        out
    }

    #[test]
    fn sha3_512_streaming_matches_nist_vectors() {
        let vectors = [
            (
                b"".as_slice(),
                "a69f73cca23a9ac5c8b567dc185a756e97c982164fe25859e0d1dcc1475c80a615b2123af1f5f94c11e3e9402c3ac558f500199d95b6d3e301758586281dcd26",
            ),
            (
                b"abc".as_slice(),
                "b751850b1a57168a5693cd924b6b096e08f621827444f70d884f5d0240d2712e10e116e9192af3c91a7ec57647e3934057340b4cf408d5a56592f8274eec53f0",
            ),
        ];

        for (input, expected_hex) in vectors {
            let mut hasher = Sha3_512::new();
            let mid = input.len() / 2;
            hasher.update(&input[..mid]);
            hasher.update(&input[mid..]);
            let digest = hasher.finalize();
            assert_eq!(to_hex(&digest), expected_hex);

            let one_shot = Sha3_512::digest(input);
            assert_eq!(to_hex(&one_shot), expected_hex);
        }
    }
}
