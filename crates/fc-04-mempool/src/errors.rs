//! Error types for the mempool subsystem.
//!
//! Every variant is a synchronous rejection: the submitting caller is told
//! immediately and the transaction is never retried.

use shared_crypto::CryptoError;
use shared_types::Address;
use thiserror::Error;

/// Reasons a submitted transaction is refused entry to the pool.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MempoolError {
    /// Transaction is bound to a different chain.
    #[error("wrong chain id: expected {expected}, got {got}")]
    WrongChainId {
        /// This node's chain id.
        expected: u16,
        /// Chain id carried by the transaction.
        got: u16,
    },

    /// Zero-value transfers carry nothing and are refused.
    #[error("transaction value must be non-zero")]
    ZeroValue,

    /// Sender and recipient are the same address.
    #[error("self transfer from {0} refused")]
    SelfTransfer(Address),

    /// One of the signature scalars is absent (all zeros).
    #[error("transaction signature is missing")]
    MissingSignature,

    /// The signature does not recover to the claimed sender.
    #[error("signature recovers to {recovered}, claimed sender is {claimed}")]
    SignatureMismatch {
        /// Address the signature actually recovers to.
        recovered: Address,
        /// Address the transaction claims as sender.
        claimed: Address,
    },

    /// Signature bytes do not form a valid curve signature at all.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
