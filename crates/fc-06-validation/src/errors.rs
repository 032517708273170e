//! Error types for the Validation Engine.
//!
//! A check failure is consensus divergence, not a fault: the block is
//! discarded with a warning, local state stays untouched, and the next
//! consensus round reconciles. Store and state errors are the only variants
//! that signal a genuinely broken operation.

use fc_01_accounts::AccountError;
use fc_02_chain_store::ChainStoreError;
use shared_types::{Address, BlockHash};
use thiserror::Error;

/// Reasons a proposed block is rejected, plus operational failures.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Block number is not parent.number + 1.
    #[error("block number {got}, expected {expected}")]
    NumberGap {
        /// parent.number + 1.
        expected: u64,
        /// Number carried by the proposed header.
        got: u64,
    },

    /// prev_block_hash does not point at the local latest block.
    #[error("parent mismatch: block links {linked}, local latest is {local}")]
    ParentMismatch {
        /// Hash the proposed header links to.
        linked: BlockHash,
        /// This node's latest hash.
        local: BlockHash,
    },

    /// Difficulty fell below the parent's.
    #[error("difficulty regression: {got} < parent {parent}")]
    DifficultyRegression {
        /// Parent difficulty.
        parent: u32,
        /// Proposed difficulty.
        got: u32,
    },

    /// Cached block hash does not match the recomputed header digest.
    #[error("block hash {declared} does not match recomputed header digest")]
    HashMismatch {
        /// Hash declared by the sender.
        declared: BlockHash,
    },

    /// PoW hash misses the difficulty target.
    #[error("hash {hash} misses difficulty target {difficulty}")]
    PowTargetMissed {
        /// The header hash.
        hash: BlockHash,
        /// Required leading zero nibbles.
        difficulty: u32,
    },

    /// Declared state root disagrees with this node's accounting: the
    /// proposer's ledger and ours have diverged — the block is fraudulent
    /// from this node's perspective.
    #[error("state root mismatch: declared {declared}, local {local}")]
    StateRootMismatch {
        /// Root declared in the proposed header.
        declared: BlockHash,
        /// Root this node computes.
        local: BlockHash,
    },

    /// Declared transaction root disagrees with the recomputed Merkle root.
    #[error("transaction root mismatch: declared {declared}, computed {computed}")]
    TransRootMismatch {
        /// Root declared in the proposed header.
        declared: BlockHash,
        /// Root recomputed from the block transactions.
        computed: BlockHash,
    },

    /// PoA block carries no header signature.
    #[error("missing authority signature on block {0}")]
    MissingAuthoritySignature(BlockHash),

    /// Header signature does not recover to the genesis authority.
    #[error("header signature on block {0} does not recover to the genesis authority")]
    AuthorityMismatch(BlockHash),

    /// Chain store access failed.
    #[error(transparent)]
    Store(#[from] ChainStoreError),

    /// Balance application failed (e.g. insufficient sender funds).
    #[error("state application failed for sender {sender}: {source}")]
    Apply {
        /// Sender whose transfer failed.
        sender: Address,
        #[source]
        source: AccountError,
    },
}

impl ValidationError {
    /// True for consensus-divergence rejections (warn and carry on), false
    /// for operational failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Store(_) | Self::Apply { .. })
    }
}
