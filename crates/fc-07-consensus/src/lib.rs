//! # Consensus & Sync Protocols (Subsystem 7)
//!
//! Majority-vote reconciliation of the "latest hash" across connected peers,
//! and the request/response chain catch-up that walks `prev_block_hash`
//! back to a shared ancestor when this node falls behind.

pub mod errors;
pub mod service;
pub mod sync;
pub mod tally;

pub use errors::ConsensusError;
pub use service::{ConsensusConfig, ConsensusWorker, RoundOutcome};
pub use sync::{CatchUpOutcome, ChainSynchronizer};
pub use tally::tally;
