//! # Validation Engine Service
//!
//! Accepts blocks proposed by other nodes: drives each through the staged
//! state machine, applies its balance deltas, persists it, and advances the
//! latest-hash pointer. Any failing check discards the block with a warning
//! and leaves local state untouched — the node stays on its previous latest
//! hash until a correct block or a consensus-triggered resync resolves the
//! divergence.

use crate::errors::ValidationError;
use crate::state_machine::{check_authority, check_structure, ValidationStage};
use fc_01_accounts::AccountStore;
use fc_02_chain_store::ChainStore;
use shared_crypto::PublicKey;
use shared_types::BlockData;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info, warn};

/// Validation configuration: the presence of an authority key selects PoA
/// mode; without one the engine expects proof-of-work.
#[derive(Clone)]
pub struct ValidationConfig {
    /// The genesis authority public key, when this chain runs PoA.
    pub authority: Option<PublicKey>,
}

/// The Validation Engine.
pub struct ValidationEngine {
    config: ValidationConfig,
    accounts: Arc<AccountStore>,
    chain: Arc<ChainStore>,
    /// Shared with the Mining Engine: one full cycle at a time.
    cycle_lock: Arc<Mutex<()>>,
}

impl ValidationEngine {
    pub fn new(
        config: ValidationConfig,
        accounts: Arc<AccountStore>,
        chain: Arc<ChainStore>,
        cycle_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            config,
            accounts,
            chain,
            cycle_lock,
        }
    }

    /// Worker loop: validate announced blocks until the channel closes or
    /// shutdown fires.
    pub async fn run(
        self: Arc<Self>,
        mut inbound: mpsc::Receiver<BlockData>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("[fc-06] validation worker started");
        loop {
            tokio::select! {
                received = inbound.recv() => {
                    let Some(block) = received else {
                        info!("[fc-06] announcement channel closed");
                        break;
                    };
                    match self.validate_and_commit(&block).await {
                        Ok(()) => {
                            info!(
                                "[fc-06] accepted block {} number={}",
                                block.hash, block.header.number
                            );
                        }
                        Err(e) if e.is_rejection() => {
                            warn!("[fc-06] rejected block {}: {e}", block.hash);
                        }
                        Err(e) => {
                            error!("[fc-06] validation of {} failed: {e}", block.hash);
                        }
                    }
                }
                _ = shutdown.changed() => {
                    info!("[fc-06] shutdown signal received");
                    break;
                }
            }
        }
    }

    /// Drive one proposed block through the full state machine.
    ///
    /// Holds the shared mining/validation lock for the whole cycle so the
    /// state root read here cannot race a concurrent mining cycle.
    pub async fn validate_and_commit(&self, block: &BlockData) -> Result<(), ValidationError> {
        let _cycle = self.cycle_lock.lock().await;
        let mut stage = ValidationStage::Received;
        debug!("[fc-06] block {} stage={stage}", block.hash);

        let outcome = self.advance(block, &mut stage).await;
        if outcome.is_err() {
            stage = ValidationStage::Rejected;
            debug!("[fc-06] block {} stage={stage}", block.hash);
        }
        outcome
    }

    async fn advance(
        &self,
        block: &BlockData,
        stage: &mut ValidationStage,
    ) -> Result<(), ValidationError> {
        if let Some(authority) = &self.config.authority {
            check_authority(block, authority)?;
        }
        *stage = ValidationStage::AuthorityChecked;
        debug!("[fc-06] block {} stage={stage}", block.hash);

        let local_latest = self.chain.require_latest_hash()?;
        let parent = self.chain.require_block(&local_latest)?;
        let local_state_root = self.accounts.hash_state();
        check_structure(
            block,
            &parent,
            &local_latest,
            &local_state_root,
            self.config.authority.is_none(),
        )?;
        *stage = ValidationStage::StructureChecked;
        debug!("[fc-06] block {} stage={stage}", block.hash);

        for block_tx in &block.transactions {
            self.accounts
                .apply_transaction(&block.header, block_tx)
                .map_err(|source| ValidationError::Apply {
                    sender: block_tx.signed.transaction.from,
                    source,
                })?;
        }
        self.accounts
            .apply_mining_reward(block.header.beneficiary, block.header.mining_reward);
        *stage = ValidationStage::Applied;
        debug!("[fc-06] block {} stage={stage}", block.hash);

        self.chain.put_block(block)?;
        self.chain.set_latest_hash(&block.hash)?;
        *stage = ValidationStage::Persisted;
        debug!("[fc-06] block {} stage={stage}", block.hash);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_02_chain_store::InMemoryKVStore;
    use fc_03_merkle::merkle_root;
    use shared_crypto::{sign_transaction, KeyPair};
    use shared_types::{
        Account, Address, BlockHash, BlockHeader, BlockTransaction, Transaction,
        TRANSFER_GAS_UNITS,
    };

    struct Harness {
        engine: ValidationEngine,
        accounts: Arc<AccountStore>,
        chain: Arc<ChainStore>,
        genesis: BlockData,
        sender: KeyPair,
    }

    fn harness(authority: Option<PublicKey>) -> Harness {
        let sender = KeyPair::generate();
        let accounts = Arc::new(AccountStore::new());
        accounts.upsert(Account::new(sender.address(), 1_000_000));

        let chain = Arc::new(ChainStore::new(Box::new(InMemoryKVStore::new())));
        let genesis = BlockData::new(
            BlockHeader {
                difficulty: 1,
                mining_reward: 700,
                ..BlockHeader::default()
            },
            None,
            vec![],
        );
        chain.put_block(&genesis).unwrap();
        chain.set_latest_hash(&genesis.hash).unwrap();

        let engine = ValidationEngine::new(
            ValidationConfig { authority },
            Arc::clone(&accounts),
            Arc::clone(&chain),
            Arc::new(Mutex::new(())),
        );

        Harness {
            engine,
            accounts,
            chain,
            genesis,
            sender,
        }
    }

    fn block_txs(h: &Harness, count: u64) -> Vec<BlockTransaction> {
        (1..=count)
            .map(|nonce| BlockTransaction {
                signed: sign_transaction(
                    Transaction {
                        chain_id: 1,
                        nonce,
                        from: h.sender.address(),
                        to: Address([0xBB; 20]),
                        value: 100,
                        tip: 1,
                        data: vec![],
                    },
                    &h.sender,
                )
                .unwrap(),
                timestamp: 1_700_000_000,
                gas_price: 15,
                gas_units: TRANSFER_GAS_UNITS,
            })
            .collect()
    }

    /// A well-formed PoW successor to the current local chain head.
    fn proposed_block(h: &Harness, transactions: Vec<BlockTransaction>) -> BlockData {
        let mut header = BlockHeader {
            number: h.genesis.header.number + 1,
            prev_block_hash: h.genesis.hash,
            timestamp: 1_700_000_100,
            beneficiary: Address([0xCC; 20]),
            difficulty: 1,
            mining_reward: 700,
            state_root: h.accounts.hash_state(),
            trans_root: merkle_root(&transactions),
            nonce: 0,
        };
        while !header.hash().has_leading_zero_nibbles(header.difficulty) {
            header.nonce += 1;
        }
        BlockData::new(header, None, transactions)
    }

    #[tokio::test]
    async fn test_valid_block_accepted_and_applied() {
        let h = harness(None);
        let block = proposed_block(&h, block_txs(&h, 2));

        h.engine.validate_and_commit(&block).await.unwrap();

        assert_eq!(h.chain.require_latest_hash().unwrap(), block.hash);
        assert!(h.chain.has_block(&block.hash).unwrap());
        let fee = 15 + 1;
        assert_eq!(
            h.accounts.get_by_address(&h.sender.address()).unwrap().balance,
            1_000_000 - 2 * (100 + fee)
        );
        assert_eq!(
            h.accounts.get_by_address(&Address([0xCC; 20])).unwrap().balance,
            700 + 2 * fee
        );
    }

    #[tokio::test]
    async fn test_number_gap_rejected_without_state_change() {
        let h = harness(None);
        let mut block = proposed_block(&h, vec![]);
        block.header.number = 5;
        block.hash = block.header.hash();
        let state_before = h.accounts.hash_state();

        let err = h.engine.validate_and_commit(&block).await.unwrap_err();
        assert!(matches!(err, ValidationError::NumberGap { expected: 1, got: 5 }));
        assert_eq!(h.accounts.hash_state(), state_before);
        assert_eq!(h.chain.require_latest_hash().unwrap(), h.genesis.hash);
    }

    #[tokio::test]
    async fn test_parent_mismatch_rejected() {
        let h = harness(None);
        let mut block = proposed_block(&h, vec![]);
        block.header.prev_block_hash = BlockHash([0x99; 32]);
        block.hash = block.header.hash();

        let err = h.engine.validate_and_commit(&block).await.unwrap_err();
        assert!(matches!(err, ValidationError::ParentMismatch { .. }));
    }

    #[tokio::test]
    async fn test_difficulty_regression_rejected() {
        let h = harness(None);
        let mut block = proposed_block(&h, vec![]);
        block.header.difficulty = 0;
        block.hash = block.header.hash();

        let err = h.engine.validate_and_commit(&block).await.unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DifficultyRegression { parent: 1, got: 0 }
        ));
    }

    #[tokio::test]
    async fn test_tampered_hash_rejected() {
        let h = harness(None);
        let mut block = proposed_block(&h, vec![]);
        block.header.mining_reward = 9_999;

        let err = h.engine.validate_and_commit(&block).await.unwrap_err();
        assert!(matches!(err, ValidationError::HashMismatch { .. }));
    }

    #[tokio::test]
    async fn test_pow_target_miss_rejected() {
        let h = harness(None);
        let mut block = proposed_block(&h, vec![]);
        // Raise the declared difficulty far beyond what the found nonce meets
        block.header.difficulty = 16;
        block.hash = block.header.hash();

        let err = h.engine.validate_and_commit(&block).await.unwrap_err();
        assert!(matches!(err, ValidationError::PowTargetMissed { .. }));
    }

    #[tokio::test]
    async fn test_fraudulent_state_root_rejected() {
        let h = harness(None);
        let mut block = proposed_block(&h, block_txs(&h, 1));
        block.header.state_root = BlockHash([0x66; 32]);
        // Re-solve the nonce for the altered header
        block.header.nonce = 0;
        while !block.header.hash().has_leading_zero_nibbles(1) {
            block.header.nonce += 1;
        }
        block.hash = block.header.hash();
        let state_before = h.accounts.hash_state();

        let err = h.engine.validate_and_commit(&block).await.unwrap_err();
        assert!(matches!(err, ValidationError::StateRootMismatch { .. }));
        assert_eq!(h.accounts.hash_state(), state_before);
    }

    #[tokio::test]
    async fn test_trans_root_mismatch_rejected() {
        let h = harness(None);
        let mut block = proposed_block(&h, block_txs(&h, 2));
        // Swap in a transaction list the declared root does not cover
        block.transactions.pop();

        let err = h.engine.validate_and_commit(&block).await.unwrap_err();
        assert!(matches!(err, ValidationError::TransRootMismatch { .. }));
    }

    #[tokio::test]
    async fn test_poa_requires_authority_signature() {
        let authority = KeyPair::generate();
        let h = harness(Some(authority.public_key()));
        let block = proposed_block(&h, vec![]);

        let err = h.engine.validate_and_commit(&block).await.unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingAuthoritySignature(_)
        ));
    }

    #[tokio::test]
    async fn test_poa_accepts_authority_signed_block() {
        let authority = KeyPair::generate();
        let h = harness(Some(authority.public_key()));
        let mut block = proposed_block(&h, vec![]);
        block.header_signature = Some(authority.sign_digest(&block.header.hash()).unwrap());

        h.engine.validate_and_commit(&block).await.unwrap();
        assert_eq!(h.chain.require_latest_hash().unwrap(), block.hash);
    }

    #[tokio::test]
    async fn test_poa_rejects_impostor_signature() {
        let authority = KeyPair::generate();
        let impostor = KeyPair::generate();
        let h = harness(Some(authority.public_key()));
        let mut block = proposed_block(&h, vec![]);
        block.header_signature = Some(impostor.sign_digest(&block.header.hash()).unwrap());

        let err = h.engine.validate_and_commit(&block).await.unwrap_err();
        assert!(matches!(err, ValidationError::AuthorityMismatch(_)));
    }
}
