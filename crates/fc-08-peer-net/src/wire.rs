//! # Wire Codec
//!
//! Peer protocol message shapes and framing. Every message is the bincode
//! encoding of a `WireMessage`, length-prefixed with a 4-byte little-endian
//! length header. Frames above the configured cap are rejected before any
//! allocation.

use crate::errors::NetworkError;
use crate::ports::PeerId;
use serde::{Deserialize, Serialize};
use shared_types::{BlockData, BlockHash};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default inbound frame cap: a full block with a deep transaction list
/// stays far below this.
pub const DEFAULT_MAX_FRAME_BYTES: u32 = 10 * 1024 * 1024;

/// The two request/response families of the sync protocol, plus the gossip
/// announcement and its acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireMessage {
    /// Ask a peer for its latest block hash. Carries no payload.
    LatestHashRequest,
    /// A peer's latest hash, in the 66-character `0x` rendering.
    LatestHashResponse { content: String },
    /// Ask a peer for the full `BlockData` stored under `hash`.
    BlockDataRequest { from_peer: PeerId, hash: BlockHash },
    /// The requested block, or `None` when the peer does not have it either.
    BlockDataResponse { payload: Option<BlockData> },
    /// Best-effort announcement of a freshly accepted block.
    BlockAnnounce { payload: BlockData },
    /// Bare acknowledgement for fire-and-forget messages.
    Ack,
}

/// Encode a message into one length-prefixed frame.
pub fn encode_frame(message: &WireMessage) -> Result<Vec<u8>, NetworkError> {
    let payload = bincode::serialize(message).map_err(|e| NetworkError::Codec(e.to_string()))?;
    let len = u32::try_from(payload.len())
        .map_err(|_| NetworkError::FrameTooLarge {
            len: u32::MAX,
            max: DEFAULT_MAX_FRAME_BYTES,
        })?;
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode one frame's payload bytes (length header already stripped).
pub fn decode_payload(payload: &[u8]) -> Result<WireMessage, NetworkError> {
    bincode::deserialize(payload).map_err(|e| NetworkError::Codec(e.to_string()))
}

/// Write one framed message to an async stream.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &WireMessage,
) -> Result<(), NetworkError> {
    let frame = encode_frame(message)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed message from an async stream, enforcing `max_frame_bytes`.
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_frame_bytes: u32,
) -> Result<WireMessage, NetworkError> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes).await?;
    let len = u32::from_le_bytes(len_bytes);

    if len > max_frame_bytes {
        return Err(NetworkError::FrameTooLarge {
            len,
            max: max_frame_bytes,
        });
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    decode_payload(&payload)
}
