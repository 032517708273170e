//! Error types for the Account State Store.

use shared_types::Address;
use thiserror::Error;

/// Errors raised while mutating account state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    /// Debit would push the sender's balance below zero.
    #[error("insufficient balance for {address}: have {balance}, need {required}")]
    InsufficientBalance {
        /// Account being debited.
        address: Address,
        /// Current balance.
        balance: u64,
        /// Amount the transaction requires.
        required: u64,
    },

    /// The debited account does not exist.
    #[error("unknown account {0}")]
    UnknownAccount(Address),
}
