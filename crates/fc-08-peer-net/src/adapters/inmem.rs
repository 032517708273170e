//! # In-Memory Network Adapter
//!
//! A process-local hub connecting any number of node handles. Requests are
//! dispatched directly to the target node's `RequestHandler`, so multi-node
//! behavior is fully deterministic. Used by the unified test suite and by
//! single-process cluster simulations.

use crate::errors::NetworkError;
use crate::ports::{PeerId, PeerNetwork, RequestHandler};
use crate::wire::WireMessage;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::BlockData;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// The shared hub: peer id → request handler.
#[derive(Default)]
pub struct InMemoryHub {
    nodes: RwLock<HashMap<PeerId, Arc<dyn RequestHandler>>>,
}

impl InMemoryHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a node and get its network handle.
    pub fn register(
        self: &Arc<Self>,
        peer: PeerId,
        handler: Arc<dyn RequestHandler>,
    ) -> InMemoryNetwork {
        self.nodes.write().insert(peer.clone(), handler);
        InMemoryNetwork {
            hub: Arc::clone(self),
            local: peer,
        }
    }

    /// Remove a node (simulates a peer dropping off the network).
    pub fn deregister(&self, peer: &PeerId) {
        self.nodes.write().remove(peer);
    }

    fn handler_for(&self, peer: &PeerId) -> Option<Arc<dyn RequestHandler>> {
        self.nodes.read().get(peer).cloned()
    }

    fn peers_except(&self, local: &PeerId) -> Vec<PeerId> {
        self.nodes
            .read()
            .keys()
            .filter(|peer| *peer != local)
            .cloned()
            .collect()
    }
}

/// One node's handle onto the hub.
pub struct InMemoryNetwork {
    hub: Arc<InMemoryHub>,
    local: PeerId,
}

#[async_trait]
impl PeerNetwork for InMemoryNetwork {
    fn local_peer(&self) -> PeerId {
        self.local.clone()
    }

    async fn connected_peers(&self) -> Vec<PeerId> {
        let mut peers = self.hub.peers_except(&self.local);
        peers.sort_by(|a, b| a.0.cmp(&b.0));
        peers
    }

    async fn request(
        &self,
        peer: &PeerId,
        message: WireMessage,
    ) -> Result<WireMessage, NetworkError> {
        let handler = self
            .hub
            .handler_for(peer)
            .ok_or_else(|| NetworkError::UnknownPeer(peer.clone()))?;
        Ok(handler.handle(&self.local, message).await)
    }

    async fn broadcast_block(&self, block: BlockData) -> Result<usize, NetworkError> {
        let mut delivered = 0;
        for peer in self.hub.peers_except(&self.local) {
            let Some(handler) = self.hub.handler_for(&peer) else {
                continue;
            };
            let response = handler
                .handle(
                    &self.local,
                    WireMessage::BlockAnnounce {
                        payload: block.clone(),
                    },
                )
                .await;
            if matches!(response, WireMessage::Ack) {
                delivered += 1;
            }
        }
        debug!(
            "[fc-08] broadcast block {} to {} peers",
            block.hash, delivered
        );
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Echo handler answering with a fixed latest hash.
    struct FixedHash(String);

    #[async_trait]
    impl RequestHandler for FixedHash {
        async fn handle(&self, _from: &PeerId, message: WireMessage) -> WireMessage {
            match message {
                WireMessage::LatestHashRequest => WireMessage::LatestHashResponse {
                    content: self.0.clone(),
                },
                WireMessage::BlockAnnounce { .. } => WireMessage::Ack,
                _ => WireMessage::BlockDataResponse { payload: None },
            }
        }
    }

    #[tokio::test]
    async fn test_request_dispatches_to_target() {
        let hub = InMemoryHub::new();
        let a = hub.register(PeerId::new("a"), Arc::new(FixedHash("0xaa".into())));
        let _b = hub.register(PeerId::new("b"), Arc::new(FixedHash("0xbb".into())));

        let response = a
            .request(&PeerId::new("b"), WireMessage::LatestHashRequest)
            .await
            .unwrap();
        assert_eq!(
            response,
            WireMessage::LatestHashResponse { content: "0xbb".into() }
        );
    }

    #[tokio::test]
    async fn test_connected_peers_excludes_self() {
        let hub = InMemoryHub::new();
        let a = hub.register(PeerId::new("a"), Arc::new(FixedHash("0xaa".into())));
        let _b = hub.register(PeerId::new("b"), Arc::new(FixedHash("0xbb".into())));
        let _c = hub.register(PeerId::new("c"), Arc::new(FixedHash("0xcc".into())));

        let peers = a.connected_peers().await;
        assert_eq!(peers, vec![PeerId::new("b"), PeerId::new("c")]);
    }

    #[tokio::test]
    async fn test_unknown_peer_rejected() {
        let hub = InMemoryHub::new();
        let a = hub.register(PeerId::new("a"), Arc::new(FixedHash("0xaa".into())));

        let err = a
            .request(&PeerId::new("ghost"), WireMessage::LatestHashRequest)
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::UnknownPeer(_)));
    }

    #[tokio::test]
    async fn test_deregistered_peer_drops_out() {
        let hub = InMemoryHub::new();
        let a = hub.register(PeerId::new("a"), Arc::new(FixedHash("0xaa".into())));
        let _b = hub.register(PeerId::new("b"), Arc::new(FixedHash("0xbb".into())));

        hub.deregister(&PeerId::new("b"));
        assert!(a.connected_peers().await.is_empty());
    }
}
