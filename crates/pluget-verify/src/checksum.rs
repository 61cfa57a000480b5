use std::fmt;
use std::str::FromStr;

use crate::{AnyHasher, VerifyError};

/// Digest algorithms a registry may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Md5,
    Sha256,
}

impl Algorithm {
    /// Digest length in bytes.
    pub fn digest_length(self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha256 => 32,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Md5 => "MD5",
            Algorithm::Sha256 => "SHA-256",
        }
    }

    pub fn hasher(self) -> AnyHasher { AnyHasher::new(self) }

    fn from_hex_len(len: usize) -> Option<Self> {
        match len {
            32 => Some(Algorithm::Md5),
            64 => Some(Algorithm::Sha256),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// An expected digest, stored as lowercase hex.
///
/// The algorithm is implied by the digest length: 32 hex characters for MD5,
/// 64 for SHA-256.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    algorithm: Algorithm,
    hex:       String,
}

impl Checksum {
    pub fn algorithm(&self) -> Algorithm { self.algorithm }

    pub fn as_hex(&self) -> &str { &self.hex }

    /// Compare against a computed digest.
    pub fn verify(&self, actual: &[u8]) -> crate::Result<()> {
        let actual = hex::encode(actual);
        if actual.eq_ignore_ascii_case(&self.hex) {
            Ok(())
        } else {
            Err(VerifyError::Mismatch { expected: self.hex.clone(), actual })
        }
    }
}

impl FromStr for Checksum {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason| VerifyError::Invalid { value: s.to_string(), reason };

        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("not a hex string"));
        }
        let algorithm =
            Algorithm::from_hex_len(s.len()).ok_or_else(|| invalid("unsupported digest length"))?;

        Ok(Self { algorithm, hex: s.to_ascii_lowercase() })
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.hex) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Hasher, Md5Hasher, Sha256Hasher};

    #[test]
    fn parse_detects_algorithm_from_length() {
        let md5: Checksum = "5eb63bbbe01eeed093cb22bb8f5acdc3".parse().unwrap();
        assert_eq!(md5.algorithm(), Algorithm::Md5);

        let sha: Checksum = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
            .parse()
            .unwrap();
        assert_eq!(sha.algorithm(), Algorithm::Sha256);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(
            "xyz".parse::<Checksum>(),
            Err(VerifyError::Invalid { reason: "not a hex string", .. })
        ));
        assert!(matches!(
            "abcd".parse::<Checksum>(),
            Err(VerifyError::Invalid { reason: "unsupported digest length", .. })
        ));
    }

    #[test]
    fn verify_is_case_insensitive() {
        let expected: Checksum = "5EB63BBBE01EEED093CB22BB8F5ACDC3".parse().unwrap();
        assert_eq!(expected.as_hex(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
        expected.verify(&Md5Hasher::digest(b"hello world")).unwrap();
    }

    #[test]
    fn verify_reports_both_digests_on_mismatch() {
        let expected: Checksum = "00".repeat(32).parse().unwrap();
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello world");

        match expected.verify(&hasher.finalize()) {
            Err(VerifyError::Mismatch { expected, actual }) => {
                assert_eq!(expected, "00".repeat(32));
                assert_eq!(
                    actual,
                    "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
                );
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }
}
