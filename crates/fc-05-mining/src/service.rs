//! # Mining Engine Service
//!
//! The poll-driven worker that turns promoted mempool batches into blocks.
//!
//! ## Cycle
//!
//! 1. No-op when the pending-block queue is empty.
//! 2. Take the shared mining/validation lock for the whole cycle.
//! 3. Drain the batch; fetch the parent at the latest hash.
//! 4. Build the Merkle tree and snapshot the state root.
//! 5. PoW: nonce search on a blocking thread, cancellable every iteration.
//!    PoA: authority signature over the header hash.
//! 6. Persist the block, advance the latest hash, apply balances and the
//!    mining reward, broadcast best-effort.
//!
//! A failed cycle restores the drained batch for retry and logs the error;
//! the worker loop never stops on cycle errors. In-flight candidates are
//! abandoned on shutdown, never persisted.

use crate::config::{ConsensusMode, MiningConfig};
use crate::domain::{search_nonce, sign_header, SearchOutcome};
use crate::errors::MiningError;
use crate::ports::Keystore;
use fc_01_accounts::AccountStore;
use fc_02_chain_store::ChainStore;
use fc_03_merkle::MerkleTree;
use fc_04_mempool::PendingBlockQueue;
use fc_08_peer_net::PeerNetwork;
use shared_types::{
    BlockData, BlockHeader, BlockTransaction, SignedTransaction, TRANSFER_GAS_UNITS,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

/// The Mining Engine.
pub struct MiningEngine {
    config: MiningConfig,
    accounts: Arc<AccountStore>,
    chain: Arc<ChainStore>,
    queue: Arc<PendingBlockQueue>,
    network: Arc<dyn PeerNetwork>,
    keystore: Option<Arc<dyn Keystore>>,
    /// Shared with the Validation Engine: one full cycle at a time.
    cycle_lock: Arc<Mutex<()>>,
    /// Observed by the PoW inner loop every iteration.
    cancel: Arc<AtomicBool>,
}

impl MiningEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: MiningConfig,
        accounts: Arc<AccountStore>,
        chain: Arc<ChainStore>,
        queue: Arc<PendingBlockQueue>,
        network: Arc<dyn PeerNetwork>,
        keystore: Option<Arc<dyn Keystore>>,
        cycle_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            config,
            accounts,
            chain,
            queue,
            network,
            keystore,
            cycle_lock,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The PoW cancellation flag (set by shutdown).
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Worker loop: one mining attempt per poll interval until shutdown.
    pub async fn run(self: Arc<Self>, shutdown: watch::Receiver<bool>) {
        // Mirror shutdown into the blocking nonce search
        {
            let cancel = Arc::clone(&self.cancel);
            let mut rx = shutdown.clone();
            tokio::spawn(async move {
                let _ = rx.changed().await;
                cancel.store(true, Ordering::Relaxed);
            });
        }

        let mut shutdown = shutdown;
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        info!("[fc-05] mining worker started mode={:?}", self.config.mode);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.mine_once().await {
                        Ok(Some(block)) => {
                            info!(
                                "[fc-05] mined block {} number={} txs={}",
                                block.hash,
                                block.header.number,
                                block.transactions.len()
                            );
                        }
                        Ok(None) => {}
                        Err(MiningError::Cancelled) => {
                            debug!("[fc-05] in-flight candidate abandoned");
                        }
                        Err(e) => {
                            error!("[fc-05] mining cycle failed: {e}");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("[fc-05] shutdown signal received");
                    break;
                }
            }
        }
    }

    /// Run one mining cycle. Returns `None` when there is nothing to mine.
    pub async fn mine_once(&self) -> Result<Option<BlockData>, MiningError> {
        if self.queue.is_empty() {
            return Ok(None);
        }

        let _cycle = self.cycle_lock.lock().await;

        let batch = self.queue.drain();
        if batch.is_empty() {
            return Ok(None);
        }

        match self.assemble_and_commit(&batch).await {
            Ok(block) => Ok(Some(block)),
            Err(e) => {
                // Leave the batch intact for retry on the next poll
                self.queue.restore(batch);
                Err(e)
            }
        }
    }

    async fn assemble_and_commit(
        &self,
        batch: &[SignedTransaction],
    ) -> Result<BlockData, MiningError> {
        let latest = self.chain.require_latest_hash()?;
        let parent = self.chain.require_block(&latest)?;

        let timestamp = unix_now();
        let transactions: Vec<BlockTransaction> = batch
            .iter()
            .cloned()
            .map(|signed| BlockTransaction {
                signed,
                timestamp,
                gas_price: self.config.gas_price,
                gas_units: TRANSFER_GAS_UNITS,
            })
            .collect();

        let tree = MerkleTree::from_transactions(&transactions);
        let state_root = self.accounts.hash_state();

        let mut header = BlockHeader {
            number: parent.header.number + 1,
            prev_block_hash: parent.hash,
            timestamp,
            beneficiary: self.config.beneficiary,
            difficulty: self.config.difficulty,
            mining_reward: self.config.mining_reward,
            state_root,
            trans_root: tree.root(),
            nonce: 0,
        };

        let header_signature = match self.config.mode {
            ConsensusMode::ProofOfWork => {
                debug!(
                    "[fc-05] searching nonce for block number={} difficulty={}",
                    header.number, header.difficulty
                );
                let cancel = Arc::clone(&self.cancel);
                let candidate = header.clone();
                let outcome =
                    tokio::task::spawn_blocking(move || search_nonce(candidate, &cancel))
                        .await
                        .map_err(|e| MiningError::TaskAborted(e.to_string()))?;
                match outcome {
                    SearchOutcome::Solved { nonce, .. } => {
                        header.nonce = nonce;
                        None
                    }
                    SearchOutcome::Cancelled => return Err(MiningError::Cancelled),
                }
            }
            ConsensusMode::ProofOfAuthority => {
                let authority = self
                    .config
                    .authority
                    .as_ref()
                    .ok_or(MiningError::MissingAuthority)?;
                let keystore = self
                    .keystore
                    .as_ref()
                    .ok_or_else(|| MiningError::Keystore("no keystore configured".to_string()))?;
                let keypair = keystore.unlock(&authority.address, &authority.password)?;
                Some(sign_header(authority, &keypair, &header.hash())?)
            }
        };

        let block = BlockData::new(header, header_signature, transactions);

        self.chain.put_block(&block)?;
        self.chain.set_latest_hash(&block.hash)?;

        for block_tx in &block.transactions {
            self.accounts.apply_transaction(&block.header, block_tx)?;
        }
        self.accounts
            .apply_mining_reward(block.header.beneficiary, block.header.mining_reward);

        if let Err(e) = self.network.broadcast_block(block.clone()).await {
            // Unreached peers catch up via the consensus protocol
            warn!("[fc-05] broadcast of {} failed: {e}", block.hash);
        }

        Ok(block)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
