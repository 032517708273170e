//! # TCP Network Adapter
//!
//! Production transport: one short-lived TCP stream per request/response
//! exchange, frames per the wire codec. A listener task serves inbound
//! requests by delegating to the node's `RequestHandler`.
//!
//! Peer discovery is static here: the reachable peer set comes from
//! configuration (bootstrap list). Rendezvous/DHT discovery belongs to the
//! external transport layer and plugs in by swapping this adapter.

use crate::errors::NetworkError;
use crate::ports::{PeerId, PeerNetwork, RequestHandler};
use crate::wire::{read_frame, write_frame, WireMessage, DEFAULT_MAX_FRAME_BYTES};
use async_trait::async_trait;
use shared_types::BlockData;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// TCP transport configuration.
#[derive(Debug, Clone)]
pub struct TcpNetworkConfig {
    /// Address this node listens on (`host:port`); doubles as its identity.
    pub listen_addr: String,
    /// Statically configured peer addresses.
    pub peers: Vec<String>,
    /// Per-exchange deadline covering connect, send, and receive.
    pub request_timeout: Duration,
    /// Inbound frame size cap.
    pub max_frame_bytes: u32,
}

impl Default for TcpNetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9200".to_string(),
            peers: Vec::new(),
            request_timeout: Duration::from_secs(10),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

/// TCP-backed `PeerNetwork`.
pub struct TcpNetwork {
    config: TcpNetworkConfig,
    local: PeerId,
}

impl TcpNetwork {
    pub fn new(config: TcpNetworkConfig) -> Self {
        let local = PeerId::new(config.listen_addr.clone());
        Self { config, local }
    }

    /// Spawn the listener task answering inbound requests until shutdown.
    pub async fn spawn_listener(
        &self,
        handler: Arc<dyn RequestHandler>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<JoinHandle<()>, NetworkError> {
        let listener = TcpListener::bind(&self.config.listen_addr).await?;
        let local = self.local.clone();
        let max_frame_bytes = self.config.max_frame_bytes;
        info!("[fc-08] listening on {}", self.config.listen_addr);

        Ok(tokio::spawn(async move {
            loop {
                tokio::select! {
                    accepted = listener.accept() => {
                        match accepted {
                            Ok((stream, remote)) => {
                                let handler = Arc::clone(&handler);
                                tokio::spawn(async move {
                                    if let Err(e) =
                                        serve_one(stream, remote, handler, max_frame_bytes).await
                                    {
                                        debug!("[fc-08] inbound exchange failed: {e}");
                                    }
                                });
                            }
                            Err(e) => {
                                warn!("[fc-08] accept failed: {e}");
                            }
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("[fc-08] listener on {} shutting down", local);
                        break;
                    }
                }
            }
        }))
    }

    async fn exchange(
        &self,
        peer: &PeerId,
        message: &WireMessage,
    ) -> Result<WireMessage, NetworkError> {
        let mut stream = TcpStream::connect(&peer.0).await?;
        write_frame(&mut stream, message).await?;
        read_frame(&mut stream, self.config.max_frame_bytes).await
    }
}

async fn serve_one(
    mut stream: TcpStream,
    remote: std::net::SocketAddr,
    handler: Arc<dyn RequestHandler>,
    max_frame_bytes: u32,
) -> Result<(), NetworkError> {
    let request = read_frame(&mut stream, max_frame_bytes).await?;
    let from = PeerId::new(remote.to_string());
    let response = handler.handle(&from, request).await;
    write_frame(&mut stream, &response).await
}

#[async_trait]
impl PeerNetwork for TcpNetwork {
    fn local_peer(&self) -> PeerId {
        self.local.clone()
    }

    async fn connected_peers(&self) -> Vec<PeerId> {
        self.config
            .peers
            .iter()
            .filter(|addr| **addr != self.config.listen_addr)
            .map(PeerId::new)
            .collect()
    }

    async fn request(
        &self,
        peer: &PeerId,
        message: WireMessage,
    ) -> Result<WireMessage, NetworkError> {
        tokio::time::timeout(self.config.request_timeout, self.exchange(peer, &message))
            .await
            .map_err(|_| NetworkError::Timeout(peer.clone()))?
    }

    async fn broadcast_block(&self, block: BlockData) -> Result<usize, NetworkError> {
        let mut delivered = 0;
        for peer in self.connected_peers().await {
            let announce = WireMessage::BlockAnnounce {
                payload: block.clone(),
            };
            match self.request(&peer, announce).await {
                Ok(WireMessage::Ack) => delivered += 1,
                Ok(other) => {
                    debug!("[fc-08] {} answered announce with {:?}", peer, other);
                }
                Err(e) => {
                    // Best-effort: unreachable peers miss the announcement
                    // and catch up via consensus instead
                    debug!("[fc-08] announce to {} failed: {e}", peer);
                }
            }
        }
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::BlockHash;

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

    async fn bound_network() -> (TcpNetwork, watch::Sender<bool>, PeerId) {
        // Bind to an ephemeral port first to learn a free address
        let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = probe.local_addr().unwrap().to_string();
        drop(probe);

        let network = TcpNetwork::new(TcpNetworkConfig {
            listen_addr: addr.clone(),
            peers: vec![],
            request_timeout: Duration::from_secs(2),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let latest = BlockHash([0x66; 32]).to_hex();
        network
            .spawn_listener(Arc::new(FixedHash(latest)), shutdown_rx)
            .await
            .unwrap();
        (network, shutdown_tx, PeerId::new(addr))
    }

    #[tokio::test]
    async fn test_request_over_tcp() {
        let (server, _shutdown, server_id) = bound_network().await;
        let _keepalive = &server;

        let client = TcpNetwork::new(TcpNetworkConfig {
            listen_addr: "127.0.0.1:1".to_string(),
            peers: vec![server_id.0.clone()],
            request_timeout: Duration::from_secs(2),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        });

        let response = client
            .request(&server_id, WireMessage::LatestHashRequest)
            .await
            .unwrap();
        assert_eq!(
            response,
            WireMessage::LatestHashResponse {
                content: BlockHash([0x66; 32]).to_hex()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_peer_times_out_or_errors() {
        let client = TcpNetwork::new(TcpNetworkConfig {
            listen_addr: "127.0.0.1:1".to_string(),
            peers: vec![],
            request_timeout: Duration::from_millis(300),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        });

        // Reserved port with nothing listening
        let ghost = PeerId::new("127.0.0.1:9");
        let result = client.request(&ghost, WireMessage::LatestHashRequest).await;
        assert!(result.is_err());
    }
}
