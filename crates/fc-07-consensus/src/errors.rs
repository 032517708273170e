//! Error types for the consensus and sync protocols.
//!
//! Per the propagation policy, transient network conditions (peer
//! unreachable, timeout, empty peer set) never surface here — they cost a
//! vote or end a catch-up branch and the next round retries. Only local
//! storage failures abort a round.

use fc_01_accounts::AccountError;
use fc_02_chain_store::ChainStoreError;
use thiserror::Error;

/// Errors that abort a consensus round or catch-up walk.
#[derive(Debug, Error)]
pub enum ConsensusError {
    /// Chain store access failed.
    #[error(transparent)]
    Store(#[from] ChainStoreError),

    /// State replay failed while adopting a fetched chain.
    #[error("state replay failed: {0}")]
    Replay(#[from] AccountError),
}
