//! # Keccak-256 Hashing
//!
//! Address derivation uses keccak-256 over the uncompressed public key,
//! matching the convention the rest of the ecosystem expects. Chain digests
//! (blocks, transactions, state roots) use SHA-256 via `shared-types`.

use sha3::{Digest, Keccak256};

/// Keccak-256 hash output (256-bit).
pub type KeccakDigest = [u8; 32];

/// Hash data with keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> KeccakDigest {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(keccak256(b"forge"), keccak256(b"forge"));
    }

    #[test]
    fn test_different_inputs() {
        assert_ne!(keccak256(b"input1"), keccak256(b"input2"));
    }

    #[test]
    fn test_known_vector() {
        // keccak256 of the empty string
        let digest = keccak256(b"");
        assert_eq!(
            hex::encode(digest),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}
