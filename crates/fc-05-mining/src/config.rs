//! Mining Engine configuration.

use shared_types::Address;
use std::time::Duration;

/// How new blocks earn acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusMode {
    /// Nonce search until the header hash meets the difficulty target.
    ProofOfWork,
    /// Header signature from the single authority fixed at genesis.
    ProofOfAuthority,
}

/// Immutable engine configuration, built once at startup and passed into the
/// constructor.
#[derive(Debug, Clone)]
pub struct MiningConfig {
    /// Consensus mode for blocks this node produces.
    pub mode: ConsensusMode,
    /// Address credited with rewards and fees for blocks mined here.
    pub beneficiary: Address,
    /// Required leading zero hex nibbles of a winning header hash.
    pub difficulty: u32,
    /// Reward per mined block.
    pub mining_reward: u64,
    /// Gas price stamped onto every transaction selected into a block.
    pub gas_price: u64,
    /// Poll interval of the mining worker loop.
    pub poll_interval: Duration,
    /// PoA only: the authority identity this node signs with.
    pub authority: Option<AuthorityConfig>,
}

/// The PoA signing identity.
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// Keystore address holding the authority private key.
    pub address: Address,
    /// Keystore unlock password.
    pub password: String,
    /// Compressed public key fixed in the genesis record. Signing is refused
    /// when the unlocked key does not match.
    pub genesis_key: [u8; 33],
}
