//! # Proof-of-Authority Signing
//!
//! No nonce search: the configured authority signs the header hash. The
//! unlocked key must match the public key fixed in the genesis record or
//! signing is refused — a misconfigured node must not produce blocks the
//! network will reject anyway.

use crate::config::AuthorityConfig;
use crate::errors::MiningError;
use shared_crypto::KeyPair;
use shared_types::{BlockHash, RecoverableSignature};

/// Sign `header_hash` after proving the keypair is the genesis authority.
pub fn sign_header(
    authority: &AuthorityConfig,
    keypair: &KeyPair,
    header_hash: &BlockHash,
) -> Result<RecoverableSignature, MiningError> {
    if keypair.public_key().as_bytes() != &authority.genesis_key {
        return Err(MiningError::NotAuthority {
            address: authority.address,
        });
    }
    Ok(keypair.sign_digest(header_hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::recover_public_key;

    fn authority_for(keypair: &KeyPair) -> AuthorityConfig {
        AuthorityConfig {
            address: keypair.address(),
            password: "open-sesame".to_string(),
            genesis_key: *keypair.public_key().as_bytes(),
        }
    }

    #[test]
    fn test_authority_signature_recovers() {
        let keypair = KeyPair::generate();
        let authority = authority_for(&keypair);
        let header_hash = BlockHash([0x31; 32]);

        let signature = sign_header(&authority, &keypair, &header_hash).unwrap();
        let recovered = recover_public_key(&header_hash, &signature).unwrap();
        assert_eq!(recovered, keypair.public_key());
    }

    #[test]
    fn test_non_authority_key_refused() {
        let genesis_holder = KeyPair::generate();
        let impostor = KeyPair::generate();
        let authority = authority_for(&genesis_holder);

        let err = sign_header(&authority, &impostor, &BlockHash([0x31; 32])).unwrap_err();
        assert!(matches!(err, MiningError::NotAuthority { .. }));
    }
}
