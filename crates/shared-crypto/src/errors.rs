//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature did not recover to the expected signer
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Signature components do not form a valid curve signature
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Recovery id outside the valid range
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signing operation failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}
