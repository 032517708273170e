//! # Node Configuration
//!
//! One immutable configuration struct for all subsystems and runtime
//! parameters, built once at startup from defaults plus environment
//! overrides and passed by value into each constructor. No process-wide
//! mutable globals.

use std::path::PathBuf;
use std::time::Duration;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Chain parameters location.
    pub chain: ChainConfig,
    /// Network configuration.
    pub network: NetworkConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Mempool configuration.
    pub mempool: MempoolConfig,
    /// Mining configuration.
    pub mining: MiningConfig,
    /// Consensus protocol configuration.
    pub consensus: ConsensusConfig,
}

/// Chain parameters location.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Path of the genesis JSON document. A missing file falls back to the
    /// built-in defaults.
    pub genesis_path: PathBuf,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            genesis_path: PathBuf::from("./genesis.json"),
        }
    }
}

/// Network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Address this node listens on; doubles as its peer identity.
    pub listen_addr: String,
    /// Statically configured peer addresses.
    pub peers: Vec<String>,
    /// Per-exchange request deadline.
    pub request_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9200".to_string(),
            peers: Vec::new(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Data directory for the chain database.
    pub data_dir: PathBuf,
    /// Run on the in-memory backend instead of RocksDB.
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            in_memory: false,
        }
    }
}

/// Mempool configuration. The batch threshold itself comes from the genesis
/// document; this section only tunes the worker.
#[derive(Debug, Clone)]
pub struct MempoolConfig {
    /// Interval of the batching worker checking for promotion.
    pub batch_interval: Duration,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            batch_interval: Duration::from_secs(1),
        }
    }
}

/// Mining configuration. Difficulty, reward, and gas price come from the
/// genesis document.
#[derive(Debug, Clone)]
pub struct MiningConfig {
    /// Enable the mining worker.
    pub enabled: bool,
    /// Beneficiary address rendering (`0x` + 40 hex chars).
    pub beneficiary: String,
    /// Poll interval of the mining worker loop.
    pub poll_interval: Duration,
    /// PoA: keystore address of the authority identity.
    pub authority_address: Option<String>,
    /// PoA: keystore unlock password.
    pub authority_password: Option<String>,
    /// PoA: authority secret key (hex, 32 bytes) loaded into the static
    /// keystore. A real deployment swaps in an encrypted wallet adapter.
    pub authority_secret: Option<String>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            beneficiary: "0x0000000000000000000000000000000000000000".to_string(),
            poll_interval: Duration::from_secs(5),
            authority_address: None,
            authority_password: None,
            authority_secret: None,
        }
    }
}

/// Consensus protocol configuration.
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    /// Interval between majority-vote rounds.
    pub round_interval: Duration,
    /// Per-peer response deadline within a round.
    pub round_timeout: Duration,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            round_interval: Duration::from_secs(5),
            round_timeout: Duration::from_secs(10),
        }
    }
}

impl NodeConfig {
    /// Defaults overridden from the environment (`FC_*` variables).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("FC_P2P_ADDR") {
            config.network.listen_addr = addr;
        }
        if let Ok(peers) = std::env::var("FC_PEERS") {
            config.network.peers = peers
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Ok(dir) = std::env::var("FC_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("FC_GENESIS") {
            config.chain.genesis_path = PathBuf::from(path);
        }
        if let Ok(flag) = std::env::var("FC_IN_MEMORY") {
            config.storage.in_memory = flag == "1" || flag.eq_ignore_ascii_case("true");
        }
        if let Ok(flag) = std::env::var("FC_MINING_ENABLED") {
            config.mining.enabled = flag == "1" || flag.eq_ignore_ascii_case("true");
        }
        if let Ok(addr) = std::env::var("FC_BENEFICIARY") {
            config.mining.beneficiary = addr;
        }
        if let Ok(addr) = std::env::var("FC_AUTHORITY_ADDRESS") {
            config.mining.authority_address = Some(addr);
        }
        if let Ok(password) = std::env::var("FC_AUTHORITY_PASSWORD") {
            config.mining.authority_password = Some(password);
        }
        if let Ok(secret) = std::env::var("FC_AUTHORITY_SECRET") {
            config.mining.authority_secret = Some(secret);
        }

        config
    }
}
