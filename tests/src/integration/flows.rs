//! # End-to-End Flows
//!
//! Multi-node choreography over the deterministic in-memory hub:
//! mempool → mining → broadcast → remote validation → consensus catch-up.
//! Every node is a full stack of real subsystem services; only the
//! transport is simulated.

#![cfg(test)]

use fc_01_accounts::AccountStore;
use fc_02_chain_store::{ChainStore, InMemoryKVStore};
use fc_04_mempool::{Mempool, MempoolConfig, PendingBlockQueue};
use fc_05_mining::{ConsensusMode, MiningConfig, MiningEngine};
use fc_06_validation::{ValidationConfig, ValidationEngine, ValidationError};
use fc_07_consensus::{ChainSynchronizer, ConsensusConfig, ConsensusWorker, RoundOutcome};
use fc_08_peer_net::{InMemoryHub, PeerId, PeerNetwork};
use node_runtime::adapters::SyncServer;
use node_runtime::genesis::initialize_chain;
use shared_crypto::{sign_transaction, KeyPair};
use shared_types::{Address, BlockData, Genesis, SignedTransaction, Transaction};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// One in-process node: real services, simulated transport.
struct TestNode {
    accounts: Arc<AccountStore>,
    chain: Arc<ChainStore>,
    mempool: Arc<Mempool>,
    queue: Arc<PendingBlockQueue>,
    validation: Arc<ValidationEngine>,
    miner: MiningEngine,
    consensus: ConsensusWorker,
    announcements: mpsc::Receiver<BlockData>,
}

fn funded_keypair() -> KeyPair {
    KeyPair::from_bytes([0x42u8; 32]).expect("valid secret")
}

fn test_genesis() -> Genesis {
    let mut genesis = Genesis::default();
    genesis
        .balances
        .insert(funded_keypair().address().to_hex(), 10_000_000);
    genesis
}

fn spawn_node(hub: &Arc<InMemoryHub>, name: &str, beneficiary_byte: u8) -> TestNode {
    let genesis = test_genesis();

    let accounts = Arc::new(AccountStore::new());
    let chain = Arc::new(ChainStore::new(Box::new(InMemoryKVStore::new())));
    initialize_chain(&genesis, &chain, &accounts).expect("genesis init");

    let (announce_tx, announcements) = mpsc::channel(16);
    let handler = Arc::new(SyncServer::new(Arc::clone(&chain), announce_tx));
    let network: Arc<dyn PeerNetwork> =
        Arc::new(hub.register(PeerId::new(name), handler));

    let cycle_lock = Arc::new(Mutex::new(()));

    let mempool = Arc::new(Mempool::new(MempoolConfig {
        chain_id: genesis.chain_id,
        transactions_per_block: genesis.transactions_per_block,
    }));
    let queue = Arc::new(PendingBlockQueue::new());

    let validation = Arc::new(ValidationEngine::new(
        ValidationConfig { authority: None },
        Arc::clone(&accounts),
        Arc::clone(&chain),
        Arc::clone(&cycle_lock),
    ));

    let miner = MiningEngine::new(
        MiningConfig {
            mode: ConsensusMode::ProofOfWork,
            beneficiary: Address([beneficiary_byte; 20]),
            difficulty: genesis.difficulty,
            mining_reward: genesis.mining_reward,
            gas_price: genesis.gas_price,
            poll_interval: Duration::from_millis(10),
            authority: None,
        },
        Arc::clone(&accounts),
        Arc::clone(&chain),
        Arc::clone(&queue),
        Arc::clone(&network),
        None,
        Arc::clone(&cycle_lock),
    );

    let consensus = ConsensusWorker::new(
        ConsensusConfig {
            round_interval: Duration::from_millis(50),
            round_timeout: Duration::from_secs(2),
        },
        Arc::clone(&chain),
        Arc::clone(&network),
        ChainSynchronizer::new(
            Arc::clone(&accounts),
            Arc::clone(&chain),
            Arc::clone(&network),
            genesis.premine().expect("premine"),
        ),
    );

    TestNode {
        accounts,
        chain,
        mempool,
        queue,
        validation,
        miner,
        consensus,
        announcements,
    }
}

fn transfer(nonce: u64) -> SignedTransaction {
    let keypair = funded_keypair();
    sign_transaction(
        Transaction {
            chain_id: 1,
            nonce,
            from: keypair.address(),
            to: Address([0xBB; 20]),
            value: 1_000,
            tip: 5,
            data: vec![],
        },
        &keypair,
    )
    .expect("signing")
}

#[tokio::test]
async fn test_mempool_threshold_to_mined_block() {
    let hub = InMemoryHub::new();
    let mut node = spawn_node(&hub, "solo", 0x01);

    // Two submissions stay below the threshold of three
    node.mempool.upsert(transfer(1)).unwrap();
    node.mempool.upsert(transfer(2)).unwrap();
    assert_eq!(node.mempool.promote_if_ready(&node.queue), None);
    assert!(node.queue.is_empty());

    // The third triggers exactly one promotion and empties the pool
    node.mempool.upsert(transfer(3)).unwrap();
    assert_eq!(node.mempool.promote_if_ready(&node.queue), Some(3));
    assert!(node.mempool.is_empty());

    let block = node.miner.mine_once().await.unwrap().unwrap();
    assert_eq!(block.header.number, 1);
    assert_eq!(block.transactions.len(), 3);
    assert!(node.queue.is_empty());
    assert_eq!(node.chain.require_latest_hash().unwrap(), block.hash);

    // No announcement loops back to the producing node
    assert!(node.announcements.try_recv().is_err());
}

#[tokio::test]
async fn test_mined_block_validates_on_remote_node() {
    let hub = InMemoryHub::new();
    let mut alice = spawn_node(&hub, "alice", 0x01);
    let mut bob = spawn_node(&hub, "bob", 0x02);

    for nonce in 1..=3 {
        alice.mempool.upsert(transfer(nonce)).unwrap();
    }
    alice.mempool.promote_if_ready(&alice.queue).unwrap();
    let mined = alice.miner.mine_once().await.unwrap().unwrap();

    // The broadcast reached bob's announcement channel
    let announced = bob.announcements.recv().await.unwrap();
    assert_eq!(announced.hash, mined.hash);

    bob.validation.validate_and_commit(&announced).await.unwrap();

    // Same transaction history, identical accounting on both nodes
    assert_eq!(bob.chain.require_latest_hash().unwrap(), mined.hash);
    assert_eq!(bob.accounts.hash_state(), alice.accounts.hash_state());

    // Alice saw no announcement of her own block
    assert!(alice.announcements.try_recv().is_err());
}

#[tokio::test]
async fn test_lagging_node_converges_via_consensus() {
    let hub = InMemoryHub::new();
    let mut alice = spawn_node(&hub, "alice", 0x01);
    let mut bob = spawn_node(&hub, "bob", 0x02);

    for nonce in 1..=3 {
        alice.mempool.upsert(transfer(nonce)).unwrap();
    }
    alice.mempool.promote_if_ready(&alice.queue).unwrap();
    let mined = alice.miner.mine_once().await.unwrap().unwrap();

    let announced = bob.announcements.recv().await.unwrap();
    bob.validation.validate_and_commit(&announced).await.unwrap();

    // Carol joins after the block was produced and missed the broadcast
    let carol = spawn_node(&hub, "carol", 0x03);
    assert_ne!(carol.chain.require_latest_hash().unwrap(), mined.hash);

    // One consensus round: {alice, bob} both vote the new head
    let outcome = carol.consensus.run_round().await.unwrap();
    assert_eq!(outcome, RoundOutcome::Resynced { fetched: 1 });

    assert_eq!(carol.chain.require_latest_hash().unwrap(), mined.hash);
    assert_eq!(carol.accounts.hash_state(), alice.accounts.hash_state());

    // A follow-up round finds everyone in agreement
    let outcome = carol.consensus.run_round().await.unwrap();
    assert_eq!(outcome, RoundOutcome::InAgreement);
}

#[tokio::test]
async fn test_divergent_accounting_is_rejected() {
    let hub = InMemoryHub::new();
    let mut alice = spawn_node(&hub, "alice", 0x01);
    let bob = spawn_node(&hub, "bob", 0x02);

    // Bob's ledger silently diverges from the network's
    bob.accounts
        .upsert(shared_types::Account::new(Address([0xD0; 20]), 123));

    for nonce in 1..=3 {
        alice.mempool.upsert(transfer(nonce)).unwrap();
    }
    alice.mempool.promote_if_ready(&alice.queue).unwrap();
    let mined = alice.miner.mine_once().await.unwrap().unwrap();

    let genesis_hash = {
        // Bob still sits on genesis
        let latest = bob.chain.require_latest_hash().unwrap();
        assert_ne!(latest, mined.hash);
        latest
    };

    let err = bob.validation.validate_and_commit(&mined).await.unwrap_err();
    assert!(matches!(err, ValidationError::StateRootMismatch { .. }));

    // The rejection left bob exactly where he was
    assert_eq!(bob.chain.require_latest_hash().unwrap(), genesis_hash);
}

#[tokio::test]
async fn test_consecutive_blocks_extend_the_chain() {
    let hub = InMemoryHub::new();
    let mut alice = spawn_node(&hub, "alice", 0x01);
    let mut bob = spawn_node(&hub, "bob", 0x02);

    let mut heads = Vec::new();
    for round in 0..2u64 {
        for offset in 1..=3u64 {
            alice.mempool.upsert(transfer(round * 3 + offset)).unwrap();
        }
        alice.mempool.promote_if_ready(&alice.queue).unwrap();
        let mined = alice.miner.mine_once().await.unwrap().unwrap();

        let announced = bob.announcements.recv().await.unwrap();
        bob.validation.validate_and_commit(&announced).await.unwrap();
        heads.push(mined);
    }

    assert_eq!(heads[1].header.number, 2);
    assert_eq!(heads[1].header.prev_block_hash, heads[0].hash);
    assert_eq!(bob.chain.require_latest_hash().unwrap(), heads[1].hash);
    assert_eq!(bob.accounts.hash_state(), alice.accounts.hash_state());
}
