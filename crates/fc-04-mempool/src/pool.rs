//! # Transaction Pool and Threshold Promotion
//!
//! The mempool holds signed, not-yet-mined transactions. Once the pool
//! reaches `transactions_per_block`, the whole batch moves into the
//! pending-block queue owned by the Mining Engine and the pool is cleared.
//!
//! ## Invariants Enforced
//!
//! - Acceptance validation: chain id, non-zero value, non-self transfer,
//!   present signature scalars, and sender recovery all pass before a
//!   transaction enters the pool.
//! - Atomic promotion: the list+clear pair runs under one promotion lock, so
//!   no transaction is lost or duplicated between listing and clearing.
//! - No partial batches: promotion never fires below the threshold.

use crate::errors::MempoolError;
use parking_lot::Mutex;
use shared_types::{BlockHash, SignedTransaction};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Mempool configuration.
#[derive(Debug, Clone)]
pub struct MempoolConfig {
    /// Chain every accepted transaction must be bound to.
    pub chain_id: u16,
    /// Batch size that triggers promotion into the pending-block queue.
    pub transactions_per_block: usize,
}

/// Transactions already selected for the block currently being assembled.
///
/// Owned by the Mining Engine's poll loop: `drain` hands the batch to one
/// mining cycle, `restore` puts it back when the cycle aborts.
#[derive(Debug, Default)]
pub struct PendingBlockQueue {
    batch: Mutex<Vec<SignedTransaction>>,
}

impl PendingBlockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the whole queued batch, leaving the queue empty.
    pub fn drain(&self) -> Vec<SignedTransaction> {
        std::mem::take(&mut *self.batch.lock())
    }

    /// Return an aborted batch to the front of the queue for retry.
    pub fn restore(&self, mut batch: Vec<SignedTransaction>) {
        let mut guard = self.batch.lock();
        batch.append(&mut guard);
        *guard = batch;
    }

    /// Append a freshly promoted batch.
    pub fn push(&self, mut batch: Vec<SignedTransaction>) {
        self.batch.lock().append(&mut batch);
    }

    pub fn len(&self) -> usize {
        self.batch.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.lock().is_empty()
    }
}

/// The mempool service: pending pool plus promotion into the pending-block
/// queue.
pub struct Mempool {
    config: MempoolConfig,
    /// Pending pool keyed by transaction hash; BTreeMap keeps listing order
    /// deterministic across nodes.
    pool: Mutex<BTreeMap<BlockHash, SignedTransaction>>,
    /// Serializes the list+clear promotion pair.
    promote_lock: Mutex<()>,
}

impl Mempool {
    pub fn new(config: MempoolConfig) -> Self {
        Self {
            config,
            pool: Mutex::new(BTreeMap::new()),
            promote_lock: Mutex::new(()),
        }
    }

    /// Validate and admit a signed transaction.
    ///
    /// Re-submitting the same transaction overwrites its pool entry (upsert
    /// semantics); the pool count does not grow.
    pub fn upsert(&self, signed: SignedTransaction) -> Result<usize, MempoolError> {
        self.validate(&signed)?;

        let hash = signed.hash();
        let mut pool = self.pool.lock();
        pool.insert(hash, signed);
        debug!("[fc-04] admitted transaction {} pool_len={}", hash, pool.len());
        Ok(pool.len())
    }

    fn validate(&self, signed: &SignedTransaction) -> Result<(), MempoolError> {
        let tx = &signed.transaction;

        if tx.chain_id != self.config.chain_id {
            return Err(MempoolError::WrongChainId {
                expected: self.config.chain_id,
                got: tx.chain_id,
            });
        }
        if tx.value == 0 {
            return Err(MempoolError::ZeroValue);
        }
        if tx.from == tx.to {
            return Err(MempoolError::SelfTransfer(tx.from));
        }
        if signed.signature().is_missing() {
            return Err(MempoolError::MissingSignature);
        }

        let recovered = shared_crypto::transaction_signer(signed)?;
        if recovered != tx.from {
            return Err(MempoolError::SignatureMismatch {
                recovered,
                claimed: tx.from,
            });
        }
        Ok(())
    }

    /// Snapshot of the pending pool in hash order.
    pub fn list_all(&self) -> Vec<SignedTransaction> {
        self.pool.lock().values().cloned().collect()
    }

    /// Clear the pending pool.
    pub fn delete_all(&self) {
        self.pool.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.pool.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.lock().is_empty()
    }

    /// Move the batch into `queue` when the pool has reached the threshold.
    ///
    /// Returns the promoted batch size, or `None` when below threshold. The
    /// whole check+list+clear sequence holds the promotion lock, so two
    /// racing callers can never promote the same batch twice.
    pub fn promote_if_ready(&self, queue: &PendingBlockQueue) -> Option<usize> {
        let _guard = self.promote_lock.lock();

        let batch = {
            let mut pool = self.pool.lock();
            if pool.len() < self.config.transactions_per_block {
                return None;
            }
            let batch: Vec<SignedTransaction> = pool.values().cloned().collect();
            pool.clear();
            batch
        };

        let promoted = batch.len();
        queue.push(batch);
        info!("[fc-04] promoted {} transactions to pending-block queue", promoted);
        Some(promoted)
    }
}
