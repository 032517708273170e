//! Outbound port: the wallet/keystore service.
//!
//! Wallet files and their encryption-at-rest are external collaborators;
//! the engine only needs "give me the unlocked key for this address".

use crate::errors::MiningError;
use shared_crypto::KeyPair;
use shared_types::Address;

/// Unlocks private keys for signing.
pub trait Keystore: Send + Sync {
    /// Return the unlocked keypair stored under `address`.
    fn unlock(&self, address: &Address, password: &str) -> Result<KeyPair, MiningError>;
}
