//! # Genesis Document
//!
//! The chain parameters document loaded at startup. It fixes the chain id,
//! the mining economics, the premined balances, and (for proof-of-authority
//! chains) the single authority public key for the life of the chain.
//!
//! The document is stored as JSON next to the data directory; all other
//! encodings in the system are bincode.

use crate::entities::{Account, Address};
use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chain parameters fixed at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    /// Human-readable chain launch date.
    pub date: String,
    /// Chain identifier bound into every transaction.
    pub chain_id: u16,
    /// Mempool batch size: a block is assembled only from exactly this many
    /// transactions.
    pub transactions_per_block: usize,
    /// Proof-of-work target in leading zero hex nibbles.
    pub difficulty: u32,
    /// Reward credited to a block's beneficiary.
    pub mining_reward: u64,
    /// Gas price fixed for every transaction selected into a block.
    pub gas_price: u64,
    /// Premined balances, keyed by `0x`-prefixed address rendering.
    /// BTreeMap keeps the seeding order deterministic.
    pub balances: BTreeMap<String, u64>,
    /// Compressed secp256k1 public key (hex, 33 bytes) of the PoA authority.
    /// Absent on pure proof-of-work chains.
    pub authority: Option<String>,
}

impl Genesis {
    /// The premined accounts, in address order.
    pub fn premine(&self) -> Result<Vec<Account>, TypeError> {
        self.balances
            .iter()
            .map(|(addr, balance)| Ok(Account::new(Address::from_hex(addr)?, *balance)))
            .collect()
    }

    /// Decoded authority public key, if this chain runs proof-of-authority.
    pub fn authority_key(&self) -> Result<Option<[u8; 33]>, TypeError> {
        let Some(rendered) = &self.authority else {
            return Ok(None);
        };
        let stripped = rendered
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::MissingHexPrefix(rendered.clone()))?;
        let bytes =
            hex::decode(stripped).map_err(|_| TypeError::InvalidHex(rendered.clone()))?;
        let key: [u8; 33] = bytes
            .try_into()
            .map_err(|_| TypeError::InvalidLength { expected: 33 })?;
        Ok(Some(key))
    }
}

impl Default for Genesis {
    fn default() -> Self {
        Self {
            date: "2026-01-01".to_string(),
            chain_id: 1,
            transactions_per_block: 3,
            difficulty: 4,
            mining_reward: 700,
            gas_price: 15,
            balances: BTreeMap::new(),
            authority: None,
        }
    }
}
