//! # Chain Store
//!
//! Persistent map of block-hash → `BlockData` plus the "latest hash"
//! pointer, layered over the `KeyValueStore` port.
//!
//! ## Key Conventions
//!
//! - `blockdata-<0xhex>` → bincode `BlockData`
//! - `lasthash`          → UTF-8 latest block hash rendering
//! - `account-<0xhex>`   → bincode `Account` (clean-shutdown checkpoint)
//!
//! ## Invariants Enforced
//!
//! - Append-only: a stored block is never mutated; re-inserting an existing
//!   hash is rejected.
//! - Integrity on read: the stored hash must equal the recomputed header
//!   digest or the read fails.

use crate::errors::ChainStoreError;
use crate::ports::KeyValueStore;
use parking_lot::RwLock;
use shared_types::{Account, BlockData, BlockHash};
use tracing::debug;

const BLOCK_KEY_PREFIX: &str = "blockdata-";
const ACCOUNT_KEY_PREFIX: &str = "account-";
const LATEST_HASH_KEY: &[u8] = b"lasthash";

/// The Block/Chain Store.
///
/// Thread-safe: the backend sits behind a single `RwLock`; each operation is
/// one lock acquisition. Shared across workers via `Arc`.
pub struct ChainStore {
    kv: RwLock<Box<dyn KeyValueStore>>,
}

impl ChainStore {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self {
            kv: RwLock::new(kv),
        }
    }

    fn block_key(hash: &BlockHash) -> Vec<u8> {
        format!("{BLOCK_KEY_PREFIX}{}", hash.to_hex()).into_bytes()
    }

    fn account_key(account: &Account) -> Vec<u8> {
        format!("{ACCOUNT_KEY_PREFIX}{}", account.address.to_hex()).into_bytes()
    }

    /// Persist a new block. Entries are append-only: an existing hash is a
    /// `DuplicateBlock` error, never an overwrite.
    pub fn put_block(&self, block: &BlockData) -> Result<(), ChainStoreError> {
        let key = Self::block_key(&block.hash);
        let encoded = bincode::serialize(block)
            .map_err(|e| ChainStoreError::Serialization(e.to_string()))?;

        let mut kv = self.kv.write();
        if kv.exists(&key)? {
            return Err(ChainStoreError::DuplicateBlock(block.hash));
        }
        kv.put(&key, &encoded)?;
        debug!("[fc-02] stored block {} number={}", block.hash, block.header.number);
        Ok(())
    }

    /// Read a block by hash, verifying integrity against the recomputed
    /// header digest.
    pub fn get_block(&self, hash: &BlockHash) -> Result<Option<BlockData>, ChainStoreError> {
        let Some(encoded) = self.kv.read().get(&Self::block_key(hash))? else {
            return Ok(None);
        };
        let block: BlockData = bincode::deserialize(&encoded)
            .map_err(|e| ChainStoreError::Serialization(e.to_string()))?;
        if !block.is_intact() || block.hash != *hash {
            return Err(ChainStoreError::CorruptBlock {
                stored: *hash,
                computed: block.computed_hash(),
            });
        }
        Ok(Some(block))
    }

    /// Read a block that must exist.
    pub fn require_block(&self, hash: &BlockHash) -> Result<BlockData, ChainStoreError> {
        self.get_block(hash)?
            .ok_or(ChainStoreError::UnknownBlock(*hash))
    }

    /// True when a block with this hash is stored locally.
    pub fn has_block(&self, hash: &BlockHash) -> Result<bool, ChainStoreError> {
        Ok(self.kv.read().exists(&Self::block_key(hash))?)
    }

    /// The latest-hash pointer, absent on a virgin store.
    pub fn latest_hash(&self) -> Result<Option<BlockHash>, ChainStoreError> {
        let Some(raw) = self.kv.read().get(LATEST_HASH_KEY)? else {
            return Ok(None);
        };
        let rendered =
            String::from_utf8(raw).map_err(|_| ChainStoreError::MissingLatestHash)?;
        let hash =
            BlockHash::from_hex(&rendered).map_err(|_| ChainStoreError::MissingLatestHash)?;
        Ok(Some(hash))
    }

    /// The latest-hash pointer on an initialized store.
    pub fn require_latest_hash(&self) -> Result<BlockHash, ChainStoreError> {
        self.latest_hash()?.ok_or(ChainStoreError::MissingLatestHash)
    }

    /// Advance the latest-hash pointer.
    pub fn set_latest_hash(&self, hash: &BlockHash) -> Result<(), ChainStoreError> {
        self.kv
            .write()
            .put(LATEST_HASH_KEY, hash.to_hex().as_bytes())?;
        Ok(())
    }

    /// Every stored block, ordered by block number (replay order).
    pub fn all_blocks(&self) -> Result<Vec<BlockData>, ChainStoreError> {
        let entries = self.kv.read().prefix_scan(BLOCK_KEY_PREFIX.as_bytes())?;
        let mut blocks = Vec::with_capacity(entries.len());
        for (_, encoded) in entries {
            let block: BlockData = bincode::deserialize(&encoded)
                .map_err(|e| ChainStoreError::Serialization(e.to_string()))?;
            blocks.push(block);
        }
        blocks.sort_by_key(|block| block.header.number);
        Ok(blocks)
    }

    /// Write an account checkpoint (clean shutdown only; authoritative state
    /// is rebuilt by replay).
    pub fn checkpoint_accounts(&self, accounts: &[Account]) -> Result<(), ChainStoreError> {
        let mut kv = self.kv.write();
        for account in accounts {
            let encoded = bincode::serialize(account)
                .map_err(|e| ChainStoreError::Serialization(e.to_string()))?;
            kv.put(&Self::account_key(account), &encoded)?;
        }
        Ok(())
    }
}
