//! # Validation State Machine
//!
//! Every proposed block walks the stages
//!
//! ```text
//! Received → AuthorityChecked → StructureChecked → Applied → Persisted
//! ```
//!
//! with terminal `Rejected` on any failing check. The checks themselves are
//! pure functions over the proposed block, its parent, and this node's
//! current state root; the service drives the transitions.

use crate::errors::ValidationError;
use shared_crypto::PublicKey;
use shared_types::{BlockData, BlockHash};

/// Progress of one block through validation. Mostly a logging/diagnostic
/// vocabulary; transitions are driven by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    Received,
    AuthorityChecked,
    StructureChecked,
    Applied,
    Persisted,
    Rejected,
}

impl std::fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Received => "RECEIVED",
            Self::AuthorityChecked => "AUTHORITY_CHECKED",
            Self::StructureChecked => "STRUCTURE_CHECKED",
            Self::Applied => "APPLIED",
            Self::Persisted => "PERSISTED",
            Self::Rejected => "REJECTED",
        };
        write!(f, "{name}")
    }
}

/// PoA only: the header signature must recover to the authority key fixed
/// at genesis.
pub fn check_authority(
    block: &BlockData,
    authority: &PublicKey,
) -> Result<(), ValidationError> {
    let Some(signature) = &block.header_signature else {
        return Err(ValidationError::MissingAuthoritySignature(block.hash));
    };
    shared_crypto::verify_digest_signature(&block.header.hash(), signature, authority)
        .map_err(|_| ValidationError::AuthorityMismatch(block.hash))
}

/// Structural checks (a)–(f) against the local parent and state root.
///
/// `pow_mode` selects whether the difficulty target check applies.
pub fn check_structure(
    block: &BlockData,
    parent: &BlockData,
    local_latest: &BlockHash,
    local_state_root: &BlockHash,
    pow_mode: bool,
) -> Result<(), ValidationError> {
    // (a) continuity of block numbers
    let expected = parent.header.number + 1;
    if block.header.number != expected {
        return Err(ValidationError::NumberGap {
            expected,
            got: block.header.number,
        });
    }

    // (b) linkage to the locally known latest block
    if block.header.prev_block_hash != *local_latest {
        return Err(ValidationError::ParentMismatch {
            linked: block.header.prev_block_hash,
            local: *local_latest,
        });
    }

    // (c) difficulty never regresses
    if block.header.difficulty < parent.header.difficulty {
        return Err(ValidationError::DifficultyRegression {
            parent: parent.header.difficulty,
            got: block.header.difficulty,
        });
    }

    // The sender's cached hash must be the real header digest
    if !block.is_intact() {
        return Err(ValidationError::HashMismatch {
            declared: block.hash,
        });
    }

    // (d) the hash meets the proof-of-work target
    if pow_mode && !block.hash.has_leading_zero_nibbles(block.header.difficulty) {
        return Err(ValidationError::PowTargetMissed {
            hash: block.hash,
            difficulty: block.header.difficulty,
        });
    }

    // (e) the proposer's accounting must agree with ours
    if block.header.state_root != *local_state_root {
        return Err(ValidationError::StateRootMismatch {
            declared: block.header.state_root,
            local: *local_state_root,
        });
    }

    // (f) the declared transaction root must be reproducible
    let computed = fc_03_merkle::merkle_root(&block.transactions);
    if block.header.trans_root != computed {
        return Err(ValidationError::TransRootMismatch {
            declared: block.header.trans_root,
            computed,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::BlockHeader;

    #[test]
    fn test_stage_display() {
        assert_eq!(ValidationStage::StructureChecked.to_string(), "STRUCTURE_CHECKED");
        assert_eq!(ValidationStage::Rejected.to_string(), "REJECTED");
    }

    #[test]
    fn test_missing_signature_fails_authority_check() {
        let block = BlockData::new(BlockHeader::default(), None, vec![]);
        let authority = shared_crypto::KeyPair::generate().public_key();
        assert!(matches!(
            check_authority(&block, &authority),
            Err(ValidationError::MissingAuthoritySignature(_))
        ));
    }
}
