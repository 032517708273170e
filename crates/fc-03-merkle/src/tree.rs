//! # Merkle Tree
//!
//! Binary hash tree over an ordered list of transaction leaves.
//!
//! ALGORITHM: each non-leaf node is `H(left || right)` where `H` is SHA-256.
//! A level with an odd node count duplicates its final node, so every level
//! pairs cleanly without sentinel padding.
//!
//! ## Invariants Enforced
//!
//! - Determinism: the same ordered leaves always produce the same root.
//! - Sensitivity: altering any single leaf changes the root.
//! - The empty tree's root is the zero hash.

use crate::errors::MerkleError;
use sha2::{Digest, Sha256};
use shared_types::{BlockHash, BlockTransaction};

/// One step of an audit path: the sibling digest and which side it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofStep {
    pub hash: BlockHash,
    /// True when the sibling is the left input of the parent hash.
    pub sibling_is_left: bool,
}

/// A membership proof: the audit path from a leaf up to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    pub leaf: BlockHash,
    pub path: Vec<ProofStep>,
}

impl MerkleProof {
    /// Fold the audit path and compare against `root`.
    pub fn verify(&self, root: &BlockHash) -> bool {
        let mut current = self.leaf;
        for step in &self.path {
            current = if step.sibling_is_left {
                hash_pair(&step.hash, &current)
            } else {
                hash_pair(&current, &step.hash)
            };
        }
        current == *root
    }
}

fn hash_pair(left: &BlockHash, right: &BlockHash) -> BlockHash {
    let mut hasher = Sha256::new();
    hasher.update(left.0);
    hasher.update(right.0);
    BlockHash(hasher.finalize().into())
}

/// A binary Merkle tree with all levels retained for proof generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// Levels bottom-up: `levels[0]` holds the leaves, the last level holds
    /// exactly the root.
    levels: Vec<Vec<BlockHash>>,
}

impl MerkleTree {
    /// Build a tree from ordered leaf digests.
    pub fn from_leaves(leaves: Vec<BlockHash>) -> Self {
        if leaves.is_empty() {
            return Self { levels: vec![] };
        }

        let mut levels = vec![leaves];
        while levels.last().map(Vec::len).unwrap_or(0) > 1 {
            let previous = levels.last().expect("non-empty by construction");
            let mut next = Vec::with_capacity((previous.len() + 1) / 2);
            for pair in previous.chunks(2) {
                let left = pair[0];
                // An odd level duplicates its final node
                let right = *pair.get(1).unwrap_or(&pair[0]);
                next.push(hash_pair(&left, &right));
            }
            levels.push(next);
        }

        Self { levels }
    }

    /// Build a tree over the ordered block transactions.
    pub fn from_transactions(transactions: &[BlockTransaction]) -> Self {
        Self::from_leaves(transactions.iter().map(BlockTransaction::hash).collect())
    }

    /// The root digest; zero for the empty tree.
    pub fn root(&self) -> BlockHash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(BlockHash::ZERO)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map(Vec::len).unwrap_or(0)
    }

    /// Membership proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(MerkleError::LeafOutOfRange {
                index,
                leaf_count,
            });
        }

        let leaf = self.levels[0][index];
        let mut path = Vec::new();
        let mut position = index;

        // Walk every level below the root, collecting the sibling at each
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = if position % 2 == 0 {
                position + 1
            } else {
                position - 1
            };
            // Odd levels duplicate their final node as their own sibling
            let sibling = *level.get(sibling_index).unwrap_or(&level[position]);
            path.push(ProofStep {
                hash: sibling,
                sibling_is_left: position % 2 == 1,
            });
            position /= 2;
        }

        Ok(MerkleProof { leaf, path })
    }
}

/// Root over ordered block transactions without keeping the tree.
pub fn merkle_root(transactions: &[BlockTransaction]) -> BlockHash {
    MerkleTree::from_transactions(transactions).root()
}
