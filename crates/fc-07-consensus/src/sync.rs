//! # Chain Catch-Up
//!
//! Point-to-point block fetching: given a target hash not present locally,
//! request it from a randomly selected connected peer, persist it, and walk
//! `prev_block_hash` backwards until a locally known block or genesis. The
//! walk is an iterative loop with an explicit frontier variable, so stack
//! depth stays flat on long chains.
//!
//! After a completed walk the account state is rebuilt from genesis forward
//! along the adopted chain's ancestry, and the latest-hash pointer advances
//! to the target.

use crate::errors::ConsensusError;
use fc_01_accounts::AccountStore;
use fc_02_chain_store::ChainStore;
use fc_08_peer_net::{PeerNetwork, WireMessage};
use rand::seq::SliceRandom;
use shared_types::{Account, BlockData, BlockHash};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one catch-up walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchUpOutcome {
    /// The walk reached a known block or genesis; the target was adopted.
    Completed {
        /// Blocks fetched from peers.
        fetched: usize,
    },
    /// A branch ended early (no peers, peer lacked the block, bad payload).
    /// Nothing was adopted; the next consensus tick retries.
    Incomplete {
        /// Blocks fetched before the walk stalled.
        fetched: usize,
    },
}

/// Fetches missing chain segments and rebuilds state.
pub struct ChainSynchronizer {
    accounts: Arc<AccountStore>,
    chain: Arc<ChainStore>,
    network: Arc<dyn PeerNetwork>,
    /// Premined genesis accounts, the seed of every replay.
    premine: Vec<Account>,
}

impl ChainSynchronizer {
    pub fn new(
        accounts: Arc<AccountStore>,
        chain: Arc<ChainStore>,
        network: Arc<dyn PeerNetwork>,
        premine: Vec<Account>,
    ) -> Self {
        Self {
            accounts,
            chain,
            network,
            premine,
        }
    }

    /// Fetch the chain segment ending at `target` and adopt it.
    pub async fn catch_up(&self, target: BlockHash) -> Result<CatchUpOutcome, ConsensusError> {
        let mut frontier = target;
        let mut fetched = 0usize;

        loop {
            if self.chain.has_block(&frontier)? {
                break;
            }

            let Some(block) = self.fetch_from_random_peer(&frontier).await else {
                return Ok(CatchUpOutcome::Incomplete { fetched });
            };

            if !block.is_intact() || block.hash != frontier {
                warn!(
                    "[fc-07] discarding tampered block payload for {} from network",
                    frontier
                );
                return Ok(CatchUpOutcome::Incomplete { fetched });
            }

            self.chain.put_block(&block)?;
            fetched += 1;
            debug!(
                "[fc-07] fetched block {} number={}",
                block.hash, block.header.number
            );

            // Never recurse past genesis
            if block.header.prev_block_hash.is_zero() {
                break;
            }
            frontier = block.header.prev_block_hash;
        }

        self.replay_state(&target)?;
        self.chain.set_latest_hash(&target)?;
        info!(
            "[fc-07] adopted chain head {} after fetching {} blocks",
            target, fetched
        );
        Ok(CatchUpOutcome::Completed { fetched })
    }

    async fn fetch_from_random_peer(&self, hash: &BlockHash) -> Option<BlockData> {
        let peers = self.network.connected_peers().await;
        let peer = peers.choose(&mut rand::thread_rng())?;

        let request = WireMessage::BlockDataRequest {
            from_peer: self.network.local_peer(),
            hash: *hash,
        };
        match self.network.request(peer, request).await {
            Ok(WireMessage::BlockDataResponse { payload }) => {
                if payload.is_none() {
                    // The peer does not have the block either; the gap stays
                    // unresolved this round
                    debug!("[fc-07] {} has no block {}", peer, hash);
                }
                payload
            }
            Ok(other) => {
                warn!("[fc-07] {} answered block request with {:?}", peer, other);
                None
            }
            Err(e) => {
                warn!("[fc-07] block request to {} failed: {e}", peer);
                None
            }
        }
    }

    /// Rebuild the Account State Store by replaying the ancestry of `head`
    /// from genesis forward over the premined balances.
    pub fn replay_state(&self, head: &BlockHash) -> Result<(), ConsensusError> {
        let mut lineage = Vec::new();
        let mut cursor = *head;
        loop {
            let block = self.chain.require_block(&cursor)?;
            let prev = block.header.prev_block_hash;
            let is_genesis = block.header.is_genesis();
            lineage.push(block);
            if is_genesis || prev.is_zero() {
                break;
            }
            cursor = prev;
        }
        lineage.reverse();

        self.accounts.replace_all(self.premine.clone());
        for block in &lineage {
            if block.header.is_genesis() {
                continue;
            }
            for block_tx in &block.transactions {
                self.accounts.apply_transaction(&block.header, block_tx)?;
            }
            self.accounts
                .apply_mining_reward(block.header.beneficiary, block.header.mining_reward);
        }
        Ok(())
    }
}
