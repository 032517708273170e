//! Error types for the Block/Chain Store.

use shared_types::BlockHash;
use thiserror::Error;

/// Errors from the key-value backend.
#[derive(Debug, Error)]
pub enum KVStoreError {
    /// Backend I/O failure.
    #[error("storage I/O error: {message}")]
    IoError {
        /// Backend-provided description.
        message: String,
    },
}

/// Errors raised by chain-level storage operations.
#[derive(Debug, Error)]
pub enum ChainStoreError {
    /// Underlying key-value backend failed.
    #[error(transparent)]
    Backend(#[from] KVStoreError),

    /// Block could not be encoded or decoded.
    #[error("block serialization failed: {0}")]
    Serialization(String),

    /// Attempt to overwrite an existing block (entries are append-only).
    #[error("block {0} already stored")]
    DuplicateBlock(BlockHash),

    /// Requested block is not present locally.
    #[error("unknown block {0}")]
    UnknownBlock(BlockHash),

    /// Stored payload failed the hash integrity check on read.
    #[error("corrupt block {stored}: header digest recomputes to {computed}")]
    CorruptBlock {
        /// Hash the payload was stored under.
        stored: BlockHash,
        /// Digest recomputed from the decoded header.
        computed: BlockHash,
    },

    /// The latest-hash pointer is missing or unparseable.
    #[error("latest hash pointer missing or invalid")]
    MissingLatestHash,
}
