//! # Shared Types - Chain Data Model
//!
//! The Single Source of Truth for type definitions across all Forge-Chain
//! subsystems: hashes, addresses, transactions in their three lifecycle
//! forms (`Transaction` → `SignedTransaction` → `BlockTransaction`), block
//! headers and their serializable `BlockData` projection, accounts, and the
//! genesis document.
//!
//! Subsystem crates depend on this crate and never on each other's entity
//! definitions.

pub mod entities;
pub mod errors;
pub mod genesis;

// Re-export main types
pub use entities::{
    digest_of, Account, Address, BlockData, BlockHash, BlockHeader, BlockTransaction,
    RecoverableSignature, SignedTransaction, Transaction,
};
pub use errors::TypeError;
pub use genesis::Genesis;

/// Gas units charged for a plain value transfer.
pub const TRANSFER_GAS_UNITS: u64 = 1;
