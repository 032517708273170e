//! # Core Domain Entities
//!
//! Defines the core chain entities shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Chain**: `BlockHeader`, `BlockData`, `RecoverableSignature`
//! - **Transactions**: `Transaction`, `SignedTransaction`, `BlockTransaction`
//! - **State**: `Account`
//!
//! ## Hashing Convention
//!
//! Every digest in this module is SHA-256 over the bincode encoding of the
//! value. Bincode is deterministic for a fixed struct layout, so two nodes
//! holding equal values always compute equal digests. The hash of a
//! non-genesis block is the digest of its *header only*, never the body.

use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest.
///
/// Rendered as a 66-character lowercase hex string with a fixed `0x` prefix
/// for storage keys, wire payloads, and logs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct BlockHash(pub [u8; 32]);

impl BlockHash {
    /// The zero-hash sentinel. A header whose `prev_block_hash` equals this
    /// value is the genesis block.
    pub const ZERO: BlockHash = BlockHash([0u8; 32]);

    /// Render as `0x` + 64 lowercase hex characters (66 total).
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse the 66-character `0x`-prefixed rendering.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let stripped = s
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::MissingHexPrefix(s.to_string()))?;
        let bytes = hex::decode(stripped).map_err(|_| TypeError::InvalidHex(s.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TypeError::InvalidLength { expected: 32 })?;
        Ok(Self(arr))
    }

    /// True when the first `n` hex nibbles of the digest are zero.
    ///
    /// This is the proof-of-work target check: the 66-character rendering of
    /// a winning hash carries `n` zeros immediately after the `0x` prefix.
    pub fn has_leading_zero_nibbles(&self, n: u32) -> bool {
        let mut remaining = n;
        for byte in &self.0 {
            if remaining == 0 {
                return true;
            }
            if remaining == 1 {
                return byte >> 4 == 0;
            }
            if *byte != 0 {
                return false;
            }
            remaining -= 2;
        }
        remaining == 0
    }

    /// True when this is the zero-hash sentinel.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl std::fmt::Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A 20-byte account address, the trailing 20 bytes of the keccak-256
/// digest of the uncompressed secp256k1 public key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Render as `0x` + 40 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse the `0x`-prefixed rendering.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let stripped = s
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::MissingHexPrefix(s.to_string()))?;
        let bytes = hex::decode(stripped).map_err(|_| TypeError::InvalidHex(s.to_string()))?;
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| TypeError::InvalidLength { expected: 20 })?;
        Ok(Self(arr))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// SHA-256 over the bincode encoding of a value.
///
/// # Panics
///
/// Bincode encoding of the entity types in this module cannot fail (no
/// unserializable fields, no length limits in play), so the internal
/// serialization is infallible in practice.
pub fn digest_of<T: Serialize>(value: &T) -> BlockHash {
    let encoded = bincode::serialize(value).expect("entity encoding is infallible");
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    BlockHash(hasher.finalize().into())
}

/// An ECDSA signature in recoverable `{v, r, s}` form.
///
/// `v` is the recovery id (0 or 1); `r` and `s` are the 32-byte scalar
/// components. Used both for transaction signatures and for PoA header
/// signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RecoverableSignature {
    pub v: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl RecoverableSignature {
    /// True when either scalar component is all zeros (no real signature
    /// ever produces a zero scalar).
    pub fn is_missing(&self) -> bool {
        self.r == [0u8; 32] || self.s == [0u8; 32]
    }
}

/// An unsigned value transfer. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Chain this transaction is bound to (replay protection across chains).
    pub chain_id: u16,
    /// Sequence number recorded against the account (see `Account::nonce`).
    pub nonce: u64,
    /// Sender address.
    pub from: Address,
    /// Recipient address.
    pub to: Address,
    /// Transfer amount in base units.
    pub value: u64,
    /// Priority tip paid to the block beneficiary.
    pub tip: u64,
    /// Arbitrary payload bytes.
    pub data: Vec<u8>,
}

impl Transaction {
    /// The digest a signer commits to.
    pub fn digest(&self) -> BlockHash {
        digest_of(self)
    }
}

/// A transaction plus the signer's recoverable ECDSA signature.
///
/// The signature commits to `Transaction::digest()`. A signed transaction is
/// invalid when the address recovered from `{v, r, s}` differs from `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub v: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl SignedTransaction {
    pub fn new(transaction: Transaction, signature: RecoverableSignature) -> Self {
        Self {
            transaction,
            v: signature.v,
            r: signature.r,
            s: signature.s,
        }
    }

    /// The signature components as one value.
    pub fn signature(&self) -> RecoverableSignature {
        RecoverableSignature {
            v: self.v,
            r: self.r,
            s: self.s,
        }
    }

    /// Identifying digest of the signed form.
    pub fn hash(&self) -> BlockHash {
        digest_of(self)
    }
}

/// The form a transaction takes inside a mined block: the signed transaction
/// plus the execution metadata fixed at block-assembly time.
///
/// `hash()` and `Eq` give block transactions Merkle-leaf semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTransaction {
    pub signed: SignedTransaction,
    /// Unix timestamp at which the transaction was selected for a block.
    pub timestamp: u64,
    /// Gas price fixed by the assembling node's configuration.
    pub gas_price: u64,
    /// Gas units charged for the transfer.
    pub gas_units: u64,
}

impl BlockTransaction {
    /// Merkle leaf digest.
    pub fn hash(&self) -> BlockHash {
        digest_of(self)
    }

    /// Total fee paid on top of `value`: gas plus tip.
    pub fn fee(&self) -> u64 {
        self.gas_price * self.gas_units + self.signed.transaction.tip
    }
}

/// Block metadata and commitment roots.
///
/// `number == 0 && prev_block_hash == BlockHash::ZERO` identifies genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Block height in the chain.
    pub number: u64,
    /// Hash of the parent block header (creates the chain linkage).
    pub prev_block_hash: BlockHash,
    /// Unix timestamp when the block was assembled.
    pub timestamp: u64,
    /// Address credited with the mining reward and fees.
    pub beneficiary: Address,
    /// Proof-of-work target: required leading zero hex nibbles.
    pub difficulty: u32,
    /// Reward credited to the beneficiary for this block.
    pub mining_reward: u64,
    /// Account State Store hash at block-assembly time (fraud anchor).
    pub state_root: BlockHash,
    /// Merkle root of the block's transactions.
    pub trans_root: BlockHash,
    /// Proof-of-work nonce (unused under proof-of-authority).
    pub nonce: u64,
}

impl BlockHeader {
    /// The block hash: digest of the header only, never the body.
    pub fn hash(&self) -> BlockHash {
        digest_of(self)
    }

    /// True for the genesis header.
    pub fn is_genesis(&self) -> bool {
        self.number == 0 && self.prev_block_hash.is_zero()
    }
}

/// The serializable projection of a block used for storage and transfer.
///
/// `hash` is the cached header digest; readers recompute and compare it
/// before trusting the payload. `header_signature` is present only on chains
/// running proof-of-authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    pub hash: BlockHash,
    pub header: BlockHeader,
    pub header_signature: Option<RecoverableSignature>,
    pub transactions: Vec<BlockTransaction>,
}

impl BlockData {
    pub fn new(
        header: BlockHeader,
        header_signature: Option<RecoverableSignature>,
        transactions: Vec<BlockTransaction>,
    ) -> Self {
        Self {
            hash: header.hash(),
            header,
            header_signature,
            transactions,
        }
    }

    /// Recompute the header digest; must equal `hash` for an intact block.
    pub fn computed_hash(&self) -> BlockHash {
        self.header.hash()
    }

    /// True when the cached hash matches the recomputed header digest.
    pub fn is_intact(&self) -> bool {
        self.hash == self.computed_hash()
    }
}

/// The state of an account.
///
/// Balance is never negative after a correctly validated chain. The nonce is
/// the counter updated against the account that *receives* a transaction
/// during block application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Account {
    pub address: Address,
    pub nonce: u64,
    pub balance: u64,
}

impl Account {
    pub fn new(address: Address, balance: u64) -> Self {
        Self {
            address,
            nonce: 0,
            balance,
        }
    }
}
