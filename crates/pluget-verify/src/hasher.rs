use sha2::Digest;

use crate::Algorithm;

/// Incremental digest accumulator.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

pub struct Md5Hasher(md5::Context);

impl Hasher for Md5Hasher {
    fn update(&mut self, data: &[u8]) { self.0.consume(data); }
    fn finalize(self) -> Vec<u8> { self.0.compute().0.to_vec() }
}

impl Default for Md5Hasher {
    fn default() -> Self { Self::new() }
}

impl Md5Hasher {
    pub fn new() -> Self { Self(md5::Context::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { md5::compute(data).0.to_vec() }
}

pub struct Sha256Hasher(sha2::Sha256);

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

impl Default for Sha256Hasher {
    fn default() -> Self { Self::new() }
}

impl Sha256Hasher {
    pub fn new() -> Self { Self(sha2::Sha256::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { sha2::Sha256::digest(data).to_vec() }
}

/// A hasher chosen at runtime from an [`Algorithm`].
pub enum AnyHasher {
    Md5(Md5Hasher),
    Sha256(Sha256Hasher),
}

impl AnyHasher {
    pub fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Md5 => Self::Md5(Md5Hasher::new()),
            Algorithm::Sha256 => Self::Sha256(Sha256Hasher::new()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Md5(_) => Algorithm::Md5,
            Self::Sha256(_) => Algorithm::Sha256,
        }
    }
}

impl Hasher for AnyHasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Md5(h) => h.finalize(),
            Self::Sha256(h) => h.finalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hasher() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");

        let expected =
            hex::decode("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9")
                .unwrap();
        assert_eq!(hasher.finalize(), expected);
    }

    #[test]
    fn test_md5_hasher_matches_one_shot_digest() {
        let mut hasher = Md5Hasher::new();
        for chunk in b"the quick brown fox".chunks(3) {
            hasher.update(chunk);
        }
        assert_eq!(hasher.finalize(), Md5Hasher::digest(b"the quick brown fox"));
    }

    #[test]
    fn test_any_hasher_reports_algorithm() {
        assert_eq!(AnyHasher::new(Algorithm::Md5).algorithm(), Algorithm::Md5);
        assert_eq!(AnyHasher::new(Algorithm::Sha256).algorithm(), Algorithm::Sha256);
    }
}
