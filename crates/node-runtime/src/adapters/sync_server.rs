//! # Sync Server Adapter
//!
//! The server side of the sync protocol: answers inbound latest-hash and
//! block-data requests from the local stores, and forwards block
//! announcements into the Validation Engine's inbound channel.

use async_trait::async_trait;
use fc_02_chain_store::ChainStore;
use fc_08_peer_net::{PeerId, RequestHandler, WireMessage};
use shared_types::BlockData;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Serves peer requests from the local chain store.
pub struct SyncServer {
    chain: Arc<ChainStore>,
    /// Announced blocks flow to the validation worker.
    announcements: mpsc::Sender<BlockData>,
}

impl SyncServer {
    pub fn new(chain: Arc<ChainStore>, announcements: mpsc::Sender<BlockData>) -> Self {
        Self {
            chain,
            announcements,
        }
    }
}

#[async_trait]
impl RequestHandler for SyncServer {
    async fn handle(&self, from: &PeerId, message: WireMessage) -> WireMessage {
        match message {
            WireMessage::LatestHashRequest => {
                let content = match self.chain.require_latest_hash() {
                    Ok(hash) => hash.to_hex(),
                    Err(e) => {
                        warn!("[runtime] latest-hash request failed: {e}");
                        String::new()
                    }
                };
                WireMessage::LatestHashResponse { content }
            }
            WireMessage::BlockDataRequest { hash, .. } => {
                let payload = match self.chain.get_block(&hash) {
                    Ok(block) => block,
                    Err(e) => {
                        warn!("[runtime] block-data request for {hash} failed: {e}");
                        None
                    }
                };
                WireMessage::BlockDataResponse { payload }
            }
            WireMessage::BlockAnnounce { payload } => {
                debug!(
                    "[runtime] block {} announced by {}",
                    payload.hash, from
                );
                if let Err(e) = self.announcements.try_send(payload) {
                    // A saturated validation queue drops the announcement;
                    // consensus reconciles on the next round
                    warn!("[runtime] announcement dropped: {e}");
                }
                WireMessage::Ack
            }
            other => {
                debug!("[runtime] ignoring unexpected message {:?} from {}", other, from);
                WireMessage::Ack
            }
        }
    }
}
