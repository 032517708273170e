//! Transport ports.
//!
//! The consensus and sync protocols consume `PeerNetwork`; the node runtime
//! implements `RequestHandler` to answer inbound requests from its local
//! stores. Rendezvous discovery and host identity live with the concrete
//! transport, outside the protocol core.

use crate::errors::NetworkError;
use crate::wire::WireMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::BlockData;

/// Addressable peer identity (host:port for TCP, a node name in-memory).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bidirectional stream messaging over the peer set.
#[async_trait]
pub trait PeerNetwork: Send + Sync {
    /// This node's own identity.
    fn local_peer(&self) -> PeerId;

    /// Peers currently reachable. An empty list is a normal condition, not
    /// an error: protocol rounds skip silently.
    async fn connected_peers(&self) -> Vec<PeerId>;

    /// Point-to-point request/response exchange with one peer.
    async fn request(
        &self,
        peer: &PeerId,
        message: WireMessage,
    ) -> Result<WireMessage, NetworkError>;

    /// Best-effort announcement of a block to every connected peer.
    /// Returns the number of peers that acknowledged.
    async fn broadcast_block(&self, block: BlockData) -> Result<usize, NetworkError>;
}

/// Server side of the sync protocol: answers one inbound message from the
/// local stores.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, from: &PeerId, message: WireMessage) -> WireMessage;
}
