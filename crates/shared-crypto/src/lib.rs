//! # Shared Crypto - Signing Primitives
//!
//! Cryptographic primitives for Forge-Chain:
//!
//! - Recoverable secp256k1 ECDSA for transaction and PoA header signatures
//! - Keccak-256 address derivation
//!
//! Chain digests themselves (block hashes, state roots, Merkle nodes) are
//! SHA-256 and live with the entity definitions in `shared-types`.

pub mod ecdsa;
pub mod errors;
pub mod hashing;

pub use ecdsa::{recover_address, recover_public_key, KeyPair, PublicKey};
pub use errors::CryptoError;
pub use hashing::keccak256;

use shared_types::{RecoverableSignature, SignedTransaction, Transaction};

/// Sign a transaction, producing its signed form.
pub fn sign_transaction(
    transaction: Transaction,
    keypair: &KeyPair,
) -> Result<SignedTransaction, CryptoError> {
    let signature = keypair.sign_digest(&transaction.digest())?;
    Ok(SignedTransaction::new(transaction, signature))
}

/// Recover the signer address of a signed transaction.
///
/// The caller compares the result against `transaction.from`; a mismatch
/// means the signature does not belong to the claimed sender.
pub fn transaction_signer(
    signed: &SignedTransaction,
) -> Result<shared_types::Address, CryptoError> {
    recover_address(&signed.transaction.digest(), &signed.signature())
}

/// Convenience check: does the signature recover to the claimed sender?
pub fn verify_transaction(signed: &SignedTransaction) -> Result<(), CryptoError> {
    let recovered = transaction_signer(signed)?;
    if recovered != signed.transaction.from {
        return Err(CryptoError::SignatureVerificationFailed);
    }
    Ok(())
}

/// Verify that a recoverable signature over `digest` was produced by the
/// holder of `expected` without trusting any claimed identity.
pub fn verify_digest_signature(
    digest: &shared_types::BlockHash,
    signature: &RecoverableSignature,
    expected: &PublicKey,
) -> Result<(), CryptoError> {
    let recovered = recover_public_key(digest, signature)?;
    if recovered != *expected {
        return Err(CryptoError::SignatureVerificationFailed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Address;

    fn sample_tx(from: Address) -> Transaction {
        Transaction {
            chain_id: 1,
            nonce: 1,
            from,
            to: Address([0xBB; 20]),
            value: 100,
            tip: 0,
            data: vec![],
        }
    }

    #[test]
    fn test_verify_transaction_accepts_own_signature() {
        let keypair = KeyPair::generate();
        let signed = sign_transaction(sample_tx(keypair.address()), &keypair).unwrap();
        assert!(verify_transaction(&signed).is_ok());
    }

    #[test]
    fn test_verify_transaction_rejects_wrong_sender() {
        let keypair = KeyPair::generate();
        // Claimed sender differs from the actual signer
        let signed = sign_transaction(sample_tx(Address([0xEE; 20])), &keypair).unwrap();
        assert_eq!(
            verify_transaction(&signed).unwrap_err(),
            CryptoError::SignatureVerificationFailed
        );
    }

    #[test]
    fn test_verify_transaction_rejects_mutated_s() {
        let keypair = KeyPair::generate();
        let mut signed = sign_transaction(sample_tx(keypair.address()), &keypair).unwrap();
        signed.s[31] ^= 0x01;
        assert!(verify_transaction(&signed).is_err());
    }

    #[test]
    fn test_verify_digest_signature() {
        let authority = KeyPair::generate();
        let outsider = KeyPair::generate();
        let digest = shared_types::BlockHash([0x99; 32]);
        let signature = authority.sign_digest(&digest).unwrap();

        assert!(verify_digest_signature(&digest, &signature, &authority.public_key()).is_ok());
        assert!(verify_digest_signature(&digest, &signature, &outsider.public_key()).is_err());
    }
}
