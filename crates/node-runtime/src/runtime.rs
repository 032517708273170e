//! # Node Runtime
//!
//! Builds every subsystem from one immutable `NodeConfig` plus the genesis
//! document, wires the workers together, and coordinates shutdown.
//!
//! ## Startup Sequence
//!
//! 1. Load the genesis document
//! 2. Open the storage backend and ensure the genesis block exists
//! 3. Rebuild the Account State Store by replaying the persisted chain
//! 4. Construct the subsystem services around the shared stores
//! 5. Spawn the workers: listener, validation, consensus, batching, mining
//!
//! ## Shutdown Sequence
//!
//! 1. Broadcast the watch-channel signal observed by every worker loop
//!    (the PoW search additionally observes its atomic flag)
//! 2. Give workers a moment to abandon in-flight cycles
//! 3. Checkpoint accounts to storage

use crate::adapters::{StaticKeystore, SyncServer};
use crate::container::NodeConfig;
use crate::genesis::{initialize_chain, load_genesis};
use anyhow::{Context, Result};
use fc_01_accounts::AccountStore;
use fc_02_chain_store::{ChainStore, InMemoryKVStore, KeyValueStore};
use fc_04_mempool::{Mempool, MempoolConfig, PendingBlockQueue};
use fc_05_mining::{
    AuthorityConfig, ConsensusMode, Keystore, MiningConfig, MiningEngine,
};
use fc_06_validation::{ValidationConfig, ValidationEngine};
use fc_07_consensus::{ChainSynchronizer, ConsensusConfig, ConsensusWorker};
use fc_08_peer_net::{PeerNetwork, TcpNetwork, TcpNetworkConfig, DEFAULT_MAX_FRAME_BYTES};
use shared_crypto::PublicKey;
use shared_types::{Address, BlockData, Genesis, SignedTransaction};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{error, info};

/// Capacity of the announcement channel feeding the validation worker.
const ANNOUNCEMENT_BUFFER: usize = 64;

/// The assembled node.
pub struct NodeRuntime {
    config: NodeConfig,
    genesis: Genesis,
    accounts: Arc<AccountStore>,
    chain: Arc<ChainStore>,
    mempool: Arc<Mempool>,
    queue: Arc<PendingBlockQueue>,
    tcp: Arc<TcpNetwork>,
    validation: Arc<ValidationEngine>,
    consensus: Arc<ConsensusWorker>,
    mining: Option<Arc<MiningEngine>>,
    announce_tx: mpsc::Sender<BlockData>,
    announce_rx: std::sync::Mutex<Option<mpsc::Receiver<BlockData>>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    /// Construct every subsystem. Failures here terminate the process — the
    /// node cannot run without storage, a genesis block, or its identity.
    pub fn new(config: NodeConfig) -> Result<Self> {
        let genesis =
            load_genesis(&config.chain.genesis_path).context("loading genesis document")?;

        let backend = open_backend(&config)?;
        let chain = Arc::new(ChainStore::new(backend));
        let accounts = Arc::new(AccountStore::new());

        let latest = initialize_chain(&genesis, &chain, &accounts)
            .context("initializing the chain")?;

        let tcp = Arc::new(TcpNetwork::new(TcpNetworkConfig {
            listen_addr: config.network.listen_addr.clone(),
            peers: config.network.peers.clone(),
            request_timeout: config.network.request_timeout,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }));
        let network: Arc<dyn PeerNetwork> = Arc::clone(&tcp) as Arc<dyn PeerNetwork>;

        // Authoritative state is always the replay of the persisted chain
        let synchronizer = ChainSynchronizer::new(
            Arc::clone(&accounts),
            Arc::clone(&chain),
            Arc::clone(&network),
            genesis.premine().context("parsing premined balances")?,
        );
        synchronizer
            .replay_state(&latest)
            .context("replaying chain state at startup")?;
        info!(
            "[runtime] state rebuilt: {} accounts, root {}",
            accounts.len(),
            accounts.hash_state()
        );

        let mempool = Arc::new(Mempool::new(MempoolConfig {
            chain_id: genesis.chain_id,
            transactions_per_block: genesis.transactions_per_block,
        }));
        let queue = Arc::new(PendingBlockQueue::new());

        let cycle_lock = Arc::new(Mutex::new(()));
        let authority_key = genesis.authority_key().context("parsing authority key")?;

        let validation = Arc::new(ValidationEngine::new(
            ValidationConfig {
                authority: authority_key
                    .map(PublicKey::from_bytes)
                    .transpose()
                    .context("decoding genesis authority key")?,
            },
            Arc::clone(&accounts),
            Arc::clone(&chain),
            Arc::clone(&cycle_lock),
        ));

        let consensus = Arc::new(ConsensusWorker::new(
            ConsensusConfig {
                round_interval: config.consensus.round_interval,
                round_timeout: config.consensus.round_timeout,
            },
            Arc::clone(&chain),
            Arc::clone(&network),
            ChainSynchronizer::new(
                Arc::clone(&accounts),
                Arc::clone(&chain),
                Arc::clone(&network),
                genesis.premine()?,
            ),
        ));

        let mining = if config.mining.enabled {
            Some(Arc::new(build_mining_engine(
                &config,
                &genesis,
                authority_key,
                Arc::clone(&accounts),
                Arc::clone(&chain),
                Arc::clone(&queue),
                Arc::clone(&network),
                Arc::clone(&cycle_lock),
            )?))
        } else {
            None
        };

        let (announce_tx, announce_rx) = mpsc::channel(ANNOUNCEMENT_BUFFER);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            genesis,
            accounts,
            chain,
            mempool,
            queue,
            tcp,
            validation,
            consensus,
            mining,
            announce_tx,
            announce_rx: std::sync::Mutex::new(Some(announce_rx)),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Spawn every worker. Returns once the node is serving.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  Forge-Chain Node Runtime v0.1.0");
        info!("  Chain ID: {}", self.genesis.chain_id);
        info!("  P2P Addr: {}", self.config.network.listen_addr);
        info!("===========================================");

        // Sync server: answers peers from the local stores
        let sync_server = Arc::new(SyncServer::new(
            Arc::clone(&self.chain),
            self.announce_tx.clone(),
        ));
        self.tcp
            .spawn_listener(sync_server, self.shutdown_rx.clone())
            .await
            .context("binding the p2p listener")?;

        // Validation worker: consumes announced blocks
        let announce_rx = self
            .announce_rx
            .lock()
            .expect("announce receiver mutex poisoned")
            .take()
            .context("runtime already started")?;
        tokio::spawn(
            Arc::clone(&self.validation).run(announce_rx, self.shutdown_rx.clone()),
        );

        // Consensus worker: latest-hash reconciliation rounds
        tokio::spawn(Arc::clone(&self.consensus).run(self.shutdown_rx.clone()));

        // Mempool batching worker: threshold promotion
        self.spawn_batching_worker();

        // Mining worker, when this node produces blocks
        if let Some(mining) = &self.mining {
            tokio::spawn(Arc::clone(mining).run(self.shutdown_rx.clone()));
        }

        info!("[runtime] all workers started");
        Ok(())
    }

    fn spawn_batching_worker(&self) {
        let mempool = Arc::clone(&self.mempool);
        let queue = Arc::clone(&self.queue);
        let mut shutdown = self.shutdown_rx.clone();
        let interval = self.config.mempool.batch_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        mempool.promote_if_ready(&queue);
                    }
                    _ = shutdown.changed() => {
                        info!("[fc-04] batching worker shutting down");
                        break;
                    }
                }
            }
        });
    }

    /// Mempool intake: called by the outer request surface (out of scope
    /// here) on behalf of submitting clients.
    pub fn submit_transaction(
        &self,
        signed: SignedTransaction,
    ) -> std::result::Result<usize, fc_04_mempool::MempoolError> {
        self.mempool.upsert(signed)
    }

    /// Current latest hash (diagnostics).
    pub fn latest_hash(&self) -> Result<shared_types::BlockHash> {
        Ok(self.chain.require_latest_hash()?)
    }

    /// Signal every worker, wait briefly, checkpoint accounts.
    pub async fn shutdown(&self) {
        info!("[runtime] initiating graceful shutdown");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("[runtime] failed to send shutdown signal: {e}");
        }

        // Give workers time to abandon in-flight cycles
        tokio::time::sleep(Duration::from_secs(2)).await;

        if let Err(e) = self.chain.checkpoint_accounts(&self.accounts.list_all()) {
            error!("[runtime] account checkpoint failed: {e}");
        }
        info!("[runtime] shutdown complete");
    }
}

fn open_backend(config: &NodeConfig) -> Result<Box<dyn KeyValueStore>> {
    if config.storage.in_memory {
        info!("[runtime] using in-memory storage");
        return Ok(Box::new(InMemoryKVStore::new()));
    }

    #[cfg(feature = "rocksdb")]
    {
        let path = config.storage.data_dir.join("chain");
        std::fs::create_dir_all(&path)
            .with_context(|| format!("creating data directory {path:?}"))?;
        let store = fc_02_chain_store::RocksDbStore::open_default(&path)
            .context("opening the chain database")?;
        info!("[runtime] chain database open at {path:?}");
        Ok(Box::new(store))
    }
    #[cfg(not(feature = "rocksdb"))]
    {
        anyhow::bail!("built without the rocksdb feature; set storage.in_memory")
    }
}

#[allow(clippy::too_many_arguments)]
fn build_mining_engine(
    config: &NodeConfig,
    genesis: &Genesis,
    authority_key: Option<[u8; 33]>,
    accounts: Arc<AccountStore>,
    chain: Arc<ChainStore>,
    queue: Arc<PendingBlockQueue>,
    network: Arc<dyn PeerNetwork>,
    cycle_lock: Arc<Mutex<()>>,
) -> Result<MiningEngine> {
    let beneficiary = Address::from_hex(&config.mining.beneficiary)
        .context("parsing the beneficiary address")?;

    let (mode, keystore, authority) = match authority_key {
        Some(genesis_key) => {
            let secret_hex = config
                .mining
                .authority_secret
                .as_ref()
                .context("proof-of-authority mining requires FC_AUTHORITY_SECRET")?;
            let secret_bytes = hex::decode(secret_hex.trim_start_matches("0x"))
                .context("decoding the authority secret")?;
            let secret: [u8; 32] = secret_bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("authority secret must be 32 bytes"))?;

            let password = config
                .mining
                .authority_password
                .clone()
                .unwrap_or_default();
            let mut keystore = StaticKeystore::new();
            let address = keystore
                .insert(secret, password.clone())
                .context("loading the authority key")?;

            (
                ConsensusMode::ProofOfAuthority,
                Some(Arc::new(keystore) as Arc<dyn Keystore>),
                Some(AuthorityConfig {
                    address,
                    password,
                    genesis_key,
                }),
            )
        }
        None => (ConsensusMode::ProofOfWork, None, None),
    };

    Ok(MiningEngine::new(
        MiningConfig {
            mode,
            beneficiary,
            difficulty: genesis.difficulty,
            mining_reward: genesis.mining_reward,
            gas_price: genesis.gas_price,
            poll_interval: config.mining.poll_interval,
            authority,
        },
        accounts,
        chain,
        queue,
        network,
        keystore,
        cycle_lock,
    ))
}
