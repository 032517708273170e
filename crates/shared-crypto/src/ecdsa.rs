//! # Recoverable ECDSA (secp256k1)
//!
//! Transaction and PoA header signatures in recoverable `{v, r, s}` form.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalized signatures
//! - Signer addresses recovered from the signature, never trusted from the
//!   payload
//!
//! ## Use Cases
//!
//! - Transaction signing and sender recovery
//! - PoA authority header signatures

use crate::errors::CryptoError;
use crate::hashing::keccak256;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use shared_types::{Address, BlockHash, RecoverableSignature};
use zeroize::Zeroize;

/// Compressed secp256k1 public key (33 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    /// Create from compressed bytes (33 bytes, starting with 0x02 or 0x03).
    pub fn from_bytes(bytes: [u8; 33]) -> Result<Self, CryptoError> {
        // Validate it's a valid compressed point
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Get raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Derive the account address: trailing 20 bytes of the keccak-256
    /// digest of the uncompressed point (tag byte excluded).
    pub fn to_address(&self) -> Address {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(&self.0).expect("constructed from a valid point");
        address_of(&verifying_key)
    }
}

fn address_of(verifying_key: &VerifyingKey) -> Address {
    let point = verifying_key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    Address(address)
}

/// secp256k1 keypair used for transaction and header signing.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Get the compressed public key (33 bytes).
    ///
    /// # Panics
    ///
    /// Never panics: SEC1 compressed encoding is always exactly 33 bytes.
    pub fn public_key(&self) -> PublicKey {
        let verifying_key = self.signing_key.verifying_key();
        let sec1_bytes = verifying_key.to_sec1_bytes();
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(&sec1_bytes[..33]);
        PublicKey(bytes)
    }

    /// The account address derived from this keypair's public key.
    pub fn address(&self) -> Address {
        address_of(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest, producing the recoverable `{v, r, s}` form.
    pub fn sign_digest(&self, digest: &BlockHash) -> Result<RecoverableSignature, CryptoError> {
        let (signature, recovery_id): (Signature, RecoveryId) = self
            .signing_key
            .sign_prehash_recoverable(&digest.0)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&signature.r().to_bytes());
        s.copy_from_slice(&signature.s().to_bytes());

        Ok(RecoverableSignature {
            v: recovery_id.to_byte(),
            r,
            s,
        })
    }

    /// Get secret key bytes (for keystore serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        // Zeroize secret key material
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

/// Recover the public key that produced `signature` over `digest`.
pub fn recover_public_key(
    digest: &BlockHash,
    signature: &RecoverableSignature,
) -> Result<PublicKey, CryptoError> {
    let recovery_id = RecoveryId::try_from(signature.v)
        .map_err(|_| CryptoError::InvalidRecoveryId(signature.v))?;
    let sig = Signature::from_scalars(signature.r, signature.s)
        .map_err(|_| CryptoError::InvalidSignatureFormat)?;
    let verifying_key = VerifyingKey::recover_from_prehash(&digest.0, &sig, recovery_id)
        .map_err(|_| CryptoError::SignatureVerificationFailed)?;

    let sec1_bytes = verifying_key.to_sec1_bytes();
    let mut bytes = [0u8; 33];
    bytes.copy_from_slice(&sec1_bytes[..33]);
    Ok(PublicKey(bytes))
}

/// Recover the signer address that produced `signature` over `digest`.
pub fn recover_address(
    digest: &BlockHash,
    signature: &RecoverableSignature,
) -> Result<Address, CryptoError> {
    let recovery_id = RecoveryId::try_from(signature.v)
        .map_err(|_| CryptoError::InvalidRecoveryId(signature.v))?;
    let sig = Signature::from_scalars(signature.r, signature.s)
        .map_err(|_| CryptoError::InvalidSignatureFormat)?;
    let verifying_key = VerifyingKey::recover_from_prehash(&digest.0, &sig, recovery_id)
        .map_err(|_| CryptoError::SignatureVerificationFailed)?;
    Ok(address_of(&verifying_key))
}
