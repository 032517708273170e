//! # Merkle Tree (Subsystem 3)
//!
//! Builds a binary hash tree over an ordered list of block transactions and
//! exposes the root hash and leaf membership proofs. The root is the
//! `trans_root` committed in every block header.

pub mod errors;
pub mod tree;

pub use errors::MerkleError;
pub use tree::{merkle_root, MerkleProof, MerkleTree, ProofStep};
