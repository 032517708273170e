//! Error types for the peer transport boundary.
//!
//! Everything here is transient by taxonomy: callers log at warn/debug,
//! skip the round, and retry on their own poll interval.

use crate::ports::PeerId;
use thiserror::Error;

/// Errors raised by wire codec and transport operations.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Socket-level failure.
    #[error("network I/O error: {0}")]
    Io(String),

    /// Payload could not be encoded or decoded.
    #[error("wire codec error: {0}")]
    Codec(String),

    /// Inbound frame declared a length above the configured cap.
    #[error("frame of {len} bytes exceeds cap of {max}")]
    FrameTooLarge {
        /// Declared frame length.
        len: u32,
        /// Configured maximum.
        max: u32,
    },

    /// Peer did not answer within the round timeout.
    #[error("request to {0} timed out")]
    Timeout(PeerId),

    /// Target peer is not registered with this transport.
    #[error("unknown peer {0}")]
    UnknownPeer(PeerId),

    /// Peer answered with a message of the wrong family.
    #[error("unexpected response from {0}")]
    UnexpectedResponse(PeerId),
}

impl From<std::io::Error> for NetworkError {
    fn from(e: std::io::Error) -> Self {
        NetworkError::Io(e.to_string())
    }
}
