//! Error types for the Mining Engine.
//!
//! Every error aborts the current cycle, restores the drained batch for
//! retry, and is logged; none of them stops the worker loop.

use fc_01_accounts::AccountError;
use fc_02_chain_store::ChainStoreError;
use shared_crypto::CryptoError;
use shared_types::Address;
use thiserror::Error;

/// Errors raised during one mining cycle.
#[derive(Debug, Error)]
pub enum MiningError {
    /// Chain store access failed.
    #[error(transparent)]
    Store(#[from] ChainStoreError),

    /// State application failed after persistence.
    #[error(transparent)]
    State(#[from] AccountError),

    /// PoA: the unlocked key is not the genesis authority.
    #[error("keystore address {address} does not hold the genesis authority key")]
    NotAuthority {
        /// The keystore address that was unlocked.
        address: Address,
    },

    /// PoA: no authority identity configured.
    #[error("proof-of-authority mode requires an authority identity")]
    MissingAuthority,

    /// Keystore could not produce the signing key.
    #[error("keystore error: {0}")]
    Keystore(String),

    /// Header signing failed.
    #[error(transparent)]
    Signing(#[from] CryptoError),

    /// Proof-of-work search observed the cancellation flag.
    #[error("mining cancelled by shutdown")]
    Cancelled,

    /// The nonce-search task was torn down before reporting.
    #[error("mining task aborted: {0}")]
    TaskAborted(String),
}
