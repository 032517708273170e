//! # Static Keystore Adapter
//!
//! Implements the Mining Engine's keystore port from keys handed over at
//! startup (configuration or environment). Wallet files and their
//! encryption-at-rest live in an external keystore service; swapping this
//! adapter for one backed by that service requires no engine changes.

use fc_05_mining::{Keystore, MiningError};
use shared_crypto::KeyPair;
use shared_types::Address;
use std::collections::HashMap;

/// In-memory keystore: address → secret key bytes, each guarded by a
/// password.
pub struct StaticKeystore {
    keys: HashMap<Address, ([u8; 32], String)>,
}

impl StaticKeystore {
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    /// Register a secret key under its derived address.
    pub fn insert(&mut self, secret: [u8; 32], password: impl Into<String>) -> Result<Address, MiningError> {
        let keypair = KeyPair::from_bytes(secret).map_err(|e| MiningError::Keystore(e.to_string()))?;
        let address = keypair.address();
        self.keys.insert(address, (secret, password.into()));
        Ok(address)
    }
}

impl Default for StaticKeystore {
    fn default() -> Self {
        Self::new()
    }
}

impl Keystore for StaticKeystore {
    fn unlock(&self, address: &Address, password: &str) -> Result<KeyPair, MiningError> {
        let (secret, expected) = self
            .keys
            .get(address)
            .ok_or_else(|| MiningError::Keystore(format!("no key stored for {address}")))?;
        if password != expected {
            return Err(MiningError::Keystore(format!(
                "wrong password for {address}"
            )));
        }
        KeyPair::from_bytes(*secret).map_err(|e| MiningError::Keystore(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_roundtrip() {
        let mut keystore = StaticKeystore::new();
        let secret = [0x42u8; 32];
        let address = keystore.insert(secret, "pw").unwrap();

        let keypair = keystore.unlock(&address, "pw").unwrap();
        assert_eq!(keypair.address(), address);
    }

    #[test]
    fn test_wrong_password_refused() {
        let mut keystore = StaticKeystore::new();
        let address = keystore.insert([0x42u8; 32], "pw").unwrap();
        assert!(keystore.unlock(&address, "nope").is_err());
    }

    #[test]
    fn test_unknown_address_refused() {
        let keystore = StaticKeystore::new();
        assert!(keystore.unlock(&Address([0x01; 20]), "pw").is_err());
    }
}
