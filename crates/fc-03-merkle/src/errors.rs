//! Error types for Merkle tree operations.

use thiserror::Error;

/// Errors raised during proof generation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    /// Requested leaf index does not exist in the tree.
    #[error("leaf index {index} out of range (tree has {leaf_count} leaves)")]
    LeafOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of leaves in the tree.
        leaf_count: usize,
    },
}
