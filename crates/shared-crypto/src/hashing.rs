//! # SHA-256 Hashing
//!
//! SHA-256 is used for every hashable entity: block hashes,
//! VRF round inputs, Merkle leaves. This module keeps the one-shot-function
//! plus streaming-hasher shape used throughout the crate for other
//! primitives, just over `sha2` instead of an XOF.

use sha2::{Digest, Sha256};

/// A SHA-256 digest.
pub type Hash = [u8; 32];

/// Stateful SHA-256 hasher, for incremental input.
pub struct Sha256Hasher {
    inner: Sha256,
}

impl Sha256Hasher {
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash several inputs as if they were concatenated, without materializing
/// the concatenation.
pub fn sha256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Sha256Hasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        // SHA256("") per FIPS 180-4 test vectors.
        let hash = sha256(b"");
        assert_eq!(
            hex::encode(hash),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn test_deterministic() {
        let h1 = sha256(b"test");
        let h2 = sha256(b"test");
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_different_inputs() {
        let h1 = sha256(b"input1");
        let h2 = sha256(b"input2");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let one_shot = sha256(b"hello world");

        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ").update(b"world");
        let streaming = hasher.finalize();

        assert_eq!(one_shot, streaming);
    }

    #[test]
    fn test_many_matches_concatenation() {
        let concatenated = sha256(b"ab cd");
        let many = sha256_many(&[b"ab ", b"cd"]);
        assert_eq!(concatenated, many);
    }
}
