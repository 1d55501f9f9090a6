//! # Keccak-256 Hashing
//!
//! The hash function used for block headers, change-log roots, and account
//! trie roots throughout the consensus core.

use sha3::{Digest, Keccak256};

/// Keccak-256 hash output (256-bit).
pub type Hash = [u8; 32];

/// Stateful Keccak-256 hasher.
pub struct KeccakHasher {
    inner: Keccak256,
}

impl KeccakHasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }

    /// Reset hasher for reuse.
    pub fn reset(&mut self) {
        self.inner = Keccak256::new();
    }
}

impl Default for KeccakHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Hash the concatenation of multiple inputs, in order, without allocating an
/// intermediate buffer.
pub fn keccak256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = KeccakHasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_hash() {
        let hash = keccak256(b"Hello, World!");
        assert_eq!(hash.len(), 32);
    }

    #[test]
    fn test_deterministic() {
        let h1 = keccak256(b"test");
        let h2 = keccak256(b"test");
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_different_inputs() {
        let h1 = keccak256(b"input1");
        let h2 = keccak256(b"input2");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let hash_oneshot = keccak256(b"hello world");

        let mut hasher = KeccakHasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");
        let hash_streaming = hasher.finalize();

        assert_eq!(hash_oneshot, hash_streaming);
    }

    #[test]
    fn test_empty_input_matches_known_constant() {
        // Keccak-256("") per shared_types::entities::EMPTY_CODE_HASH.
        let hash = keccak256(b"");
        assert_eq!(hash[0], 0xc5);
        assert_eq!(hash[31], 0x70);
    }
}
