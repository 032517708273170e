//! # Account State Store
//!
//! In-memory map of address → account, owned for the process lifetime and
//! rebuilt at startup by replaying the persisted chain.
//!
//! ## Invariants Enforced
//!
//! - State-root determinism: `hash_state()` sorts accounts by address before
//!   digesting, so equal account sets always hash equally regardless of
//!   insertion order.
//! - No negative balances: a debit that cannot be covered fails without
//!   touching either side of the transfer.
//!
//! ## Locking
//!
//! A single `parking_lot::RwLock` guards the map; every operation acquires
//! and releases it internally, so callers never hold a lock across calls.
//! Cycle-level exclusion between mining and validation is the caller's
//! responsibility (the shared mining/validation lock).

use crate::errors::AccountError;
use parking_lot::RwLock;
use shared_types::{digest_of, Account, Address, BlockHash, BlockHeader, BlockTransaction};
use std::collections::HashMap;
use tracing::debug;

/// The Account State Store.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: RwLock<HashMap<Address, Account>>,
}

impl AccountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the given accounts.
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        let store = Self::new();
        store.replace_all(accounts);
        store
    }

    /// Insert or overwrite an account record.
    pub fn upsert(&self, account: Account) {
        self.accounts.write().insert(account.address, account);
    }

    /// Look up an account by address.
    pub fn get_by_address(&self, address: &Address) -> Option<Account> {
        self.accounts.read().get(address).copied()
    }

    /// Snapshot of every account, in no particular order.
    pub fn list_all(&self) -> Vec<Account> {
        self.accounts.read().values().copied().collect()
    }

    /// Number of known accounts.
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// True when no accounts are known.
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    /// Drop every account and install `accounts` instead (chain replay).
    pub fn replace_all(&self, accounts: Vec<Account>) {
        let mut guard = self.accounts.write();
        guard.clear();
        for account in accounts {
            guard.insert(account.address, account);
        }
    }

    /// The canonical state root: SHA-256 over the bincode encoding of all
    /// accounts sorted by address.
    ///
    /// Map iteration order is arbitrary, so the sort is mandatory: any two
    /// correctly functioning nodes holding the same transaction history must
    /// produce an identical root. This value is embedded in every new block
    /// header and is the fraud-detection anchor.
    pub fn hash_state(&self) -> BlockHash {
        let mut accounts: Vec<Account> = self.accounts.read().values().copied().collect();
        accounts.sort_by_key(|account| account.address);
        digest_of(&accounts)
    }

    /// Apply one block transaction's balance deltas.
    ///
    /// Debits the sender by `value + fee`, credits the recipient with
    /// `value`, credits the block beneficiary with the fee, and records the
    /// block header nonce against the *recipient* account. Fails without
    /// mutating anything when the sender cannot cover the debit.
    pub fn apply_transaction(
        &self,
        header: &BlockHeader,
        block_tx: &BlockTransaction,
    ) -> Result<(), AccountError> {
        let tx = &block_tx.signed.transaction;
        let fee = block_tx.fee();
        let required = tx.value + fee;

        let mut guard = self.accounts.write();

        let sender = guard
            .get(&tx.from)
            .copied()
            .ok_or(AccountError::UnknownAccount(tx.from))?;
        if sender.balance < required {
            return Err(AccountError::InsufficientBalance {
                address: tx.from,
                balance: sender.balance,
                required,
            });
        }

        guard
            .entry(tx.from)
            .and_modify(|account| account.balance -= required);

        let recipient = guard.entry(tx.to).or_insert_with(|| Account::new(tx.to, 0));
        recipient.balance += tx.value;
        recipient.nonce = header.nonce;

        let beneficiary = guard
            .entry(header.beneficiary)
            .or_insert_with(|| Account::new(header.beneficiary, 0));
        beneficiary.balance += fee;

        debug!(
            "[fc-01] applied transfer {} -> {} value={} fee={}",
            tx.from, tx.to, tx.value, fee
        );
        Ok(())
    }

    /// Credit the block reward to the beneficiary.
    pub fn apply_mining_reward(&self, beneficiary: Address, reward: u64) {
        let mut guard = self.accounts.write();
        let account = guard
            .entry(beneficiary)
            .or_insert_with(|| Account::new(beneficiary, 0));
        account.balance += reward;
    }
}
