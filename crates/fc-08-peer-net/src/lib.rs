//! # Peer Transport (Subsystem 8)
//!
//! The networking boundary consumed by the consensus and sync protocols:
//! the length-prefixed wire codec, the `PeerNetwork` outbound port, the
//! `RequestHandler` inbound port, and two adapters — a deterministic
//! in-memory hub for tests and a TCP transport for production.

pub mod adapters;
pub mod errors;
pub mod ports;
pub mod wire;

pub use adapters::{InMemoryHub, InMemoryNetwork, TcpNetwork, TcpNetworkConfig};
pub use errors::NetworkError;
pub use ports::{PeerId, PeerNetwork, RequestHandler};
pub use wire::{WireMessage, DEFAULT_MAX_FRAME_BYTES};
