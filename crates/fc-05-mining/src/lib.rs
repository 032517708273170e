//! # Mining Engine (Subsystem 5)
//!
//! Assembles candidate blocks from promoted mempool batches and earns their
//! acceptance either by proof-of-work nonce search or by proof-of-authority
//! header signature, then persists, applies, and broadcasts the result.

pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use config::{AuthorityConfig, ConsensusMode, MiningConfig};
pub use errors::MiningError;
pub use ports::Keystore;
pub use service::MiningEngine;
