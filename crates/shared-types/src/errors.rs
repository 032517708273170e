//! Shared error types for entity parsing and encoding.

use thiserror::Error;

/// Errors raised while parsing or validating entity renderings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// Hex rendering did not carry the mandatory `0x` prefix.
    #[error("missing 0x prefix: {0}")]
    MissingHexPrefix(String),

    /// Rendering contained non-hex characters.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded byte string had the wrong length.
    #[error("invalid length, expected {expected} bytes")]
    InvalidLength {
        /// Required byte count.
        expected: usize,
    },
}
