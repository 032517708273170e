//! # Consensus Worker
//!
//! Timer-driven majority-vote reconciliation of the "latest hash" across
//! the network. Each round queries every connected peer, tallies the
//! responses, and invokes chain catch-up when the winning hash differs from
//! the local one.
//!
//! Zero connected peers skips the round silently; an unresponsive peer
//! simply loses its vote. Only a local storage failure aborts a round, and
//! the worker loop logs it and keeps ticking.

use crate::errors::ConsensusError;
use crate::sync::{CatchUpOutcome, ChainSynchronizer};
use crate::tally::tally;
use fc_02_chain_store::ChainStore;
use fc_08_peer_net::{PeerNetwork, WireMessage};
use shared_types::BlockHash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Consensus protocol configuration.
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    /// Interval between rounds.
    pub round_interval: Duration,
    /// Per-peer response deadline within a round.
    pub round_timeout: Duration,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            round_interval: Duration::from_secs(5),
            round_timeout: Duration::from_secs(10),
        }
    }
}

/// What one consensus round concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// No peers connected; round skipped.
    NoPeers,
    /// Peers connected but none answered in time.
    NoVotes,
    /// The winning hash matches the local latest hash.
    InAgreement,
    /// The node was behind and adopted the winning chain.
    Resynced {
        /// Blocks fetched during catch-up.
        fetched: usize,
    },
    /// Catch-up could not complete this round; retried on the next tick.
    SyncIncomplete,
}

/// The consensus client worker.
pub struct ConsensusWorker {
    config: ConsensusConfig,
    chain: Arc<ChainStore>,
    network: Arc<dyn PeerNetwork>,
    sync: ChainSynchronizer,
}

impl ConsensusWorker {
    pub fn new(
        config: ConsensusConfig,
        chain: Arc<ChainStore>,
        network: Arc<dyn PeerNetwork>,
        sync: ChainSynchronizer,
    ) -> Self {
        Self {
            config,
            chain,
            network,
            sync,
        }
    }

    /// Worker loop: one round per interval until shutdown.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.round_interval);
        info!("[fc-07] consensus worker started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_round().await {
                        Ok(RoundOutcome::Resynced { fetched }) => {
                            info!("[fc-07] resynced, fetched {fetched} blocks");
                        }
                        Ok(outcome) => {
                            debug!("[fc-07] round outcome: {outcome:?}");
                        }
                        Err(e) => {
                            error!("[fc-07] consensus round aborted: {e}");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("[fc-07] shutdown signal received");
                    break;
                }
            }
        }
    }

    /// Execute one majority-vote round.
    pub async fn run_round(&self) -> Result<RoundOutcome, ConsensusError> {
        let peers = self.network.connected_peers().await;
        if peers.is_empty() {
            debug!("[fc-07] no peers connected, skipping round");
            return Ok(RoundOutcome::NoPeers);
        }

        let round_id = Uuid::new_v4();
        let mut votes: Vec<BlockHash> = Vec::with_capacity(peers.len());

        for peer in &peers {
            let exchange = self.network.request(peer, WireMessage::LatestHashRequest);
            let response = match tokio::time::timeout(self.config.round_timeout, exchange).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    // The peer's vote is simply absent this round
                    debug!("[fc-07] round {round_id}: {} unreachable: {e}", peer);
                    continue;
                }
                Err(_) => {
                    debug!("[fc-07] round {round_id}: {} timed out", peer);
                    continue;
                }
            };

            match response {
                WireMessage::LatestHashResponse { content } => {
                    match BlockHash::from_hex(&content) {
                        Ok(hash) => votes.push(hash),
                        Err(e) => {
                            warn!(
                                "[fc-07] round {round_id}: {} sent unparseable hash: {e}",
                                peer
                            );
                        }
                    }
                }
                other => {
                    warn!(
                        "[fc-07] round {round_id}: {} answered with {:?}",
                        peer, other
                    );
                }
            }
        }

        let Some(winner) = tally(&votes) else {
            debug!("[fc-07] round {round_id}: no votes collected");
            return Ok(RoundOutcome::NoVotes);
        };

        let local = self.chain.require_latest_hash()?;
        if winner == local {
            return Ok(RoundOutcome::InAgreement);
        }

        info!(
            "[fc-07] round {round_id}: behind the network (local {local}, majority {winner})"
        );
        match self.sync.catch_up(winner).await? {
            CatchUpOutcome::Completed { fetched } => Ok(RoundOutcome::Resynced { fetched }),
            CatchUpOutcome::Incomplete { .. } => Ok(RoundOutcome::SyncIncomplete),
        }
    }
}
