//! # Genesis Initialization
//!
//! Loads the genesis document and, on a virgin store, creates the genesis
//! block and seeds the premined accounts. A failure here legitimately halts
//! the node: it cannot safely run without a genesis block.

use anyhow::{Context, Result};
use fc_01_accounts::AccountStore;
use fc_02_chain_store::ChainStore;
use shared_types::{digest_of, BlockData, BlockHash, BlockHeader, Genesis};
use std::path::Path;
use tracing::info;

/// Load the genesis document from `path`, falling back to built-in defaults
/// when the file does not exist.
pub fn load_genesis(path: &Path) -> Result<Genesis> {
    if !path.exists() {
        info!("[runtime] no genesis document at {path:?}, using defaults");
        return Ok(Genesis::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading genesis document {path:?}"))?;
    let genesis: Genesis =
        serde_json::from_str(&raw).with_context(|| format!("parsing genesis document {path:?}"))?;
    Ok(genesis)
}

/// The genesis block for a chain parameter document.
///
/// Its state root commits to the premined balances; the transaction root is
/// the zero hash (the genesis block carries no transactions).
pub fn build_genesis_block(genesis: &Genesis) -> Result<BlockData> {
    let mut premine = genesis.premine().context("parsing premined balances")?;
    premine.sort_by_key(|account| account.address);

    let header = BlockHeader {
        number: 0,
        prev_block_hash: BlockHash::ZERO,
        timestamp: 0,
        beneficiary: shared_types::Address::default(),
        difficulty: genesis.difficulty,
        mining_reward: genesis.mining_reward,
        state_root: digest_of(&premine),
        trans_root: BlockHash::ZERO,
        nonce: 0,
    };
    Ok(BlockData::new(header, None, vec![]))
}

/// Ensure the chain has a genesis block; returns the current latest hash.
///
/// On a virgin store this writes the genesis block, points `lasthash` at it,
/// and seeds the premined accounts. On an initialized store it only returns
/// the existing pointer — the caller replays state separately.
pub fn initialize_chain(
    genesis: &Genesis,
    chain: &ChainStore,
    accounts: &AccountStore,
) -> Result<BlockHash> {
    if let Some(latest) = chain.latest_hash()? {
        info!("[runtime] chain already initialized, latest hash {latest}");
        return Ok(latest);
    }

    info!("[runtime] no genesis block found, creating");
    let block = build_genesis_block(genesis)?;
    chain
        .put_block(&block)
        .context("storing the genesis block")?;
    chain
        .set_latest_hash(&block.hash)
        .context("pointing lasthash at genesis")?;

    accounts.replace_all(genesis.premine()?);
    info!(
        "[runtime] genesis block {} created, {} premined accounts",
        block.hash,
        accounts.len()
    );
    Ok(block.hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_02_chain_store::InMemoryKVStore;

    fn genesis_with_premine() -> Genesis {
        let mut genesis = Genesis::default();
        genesis.balances.insert(
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string(),
            1_000_000,
        );
        genesis
    }

    #[test]
    fn test_genesis_block_shape() {
        let block = build_genesis_block(&genesis_with_premine()).unwrap();
        assert!(block.header.is_genesis());
        assert_eq!(block.header.trans_root, BlockHash::ZERO);
        assert_ne!(block.header.state_root, BlockHash::ZERO);
        assert!(block.transactions.is_empty());
    }

    #[test]
    fn test_genesis_block_deterministic() {
        let genesis = genesis_with_premine();
        let one = build_genesis_block(&genesis).unwrap();
        let other = build_genesis_block(&genesis).unwrap();
        assert_eq!(one.hash, other.hash);
    }

    #[test]
    fn test_initialize_virgin_store() {
        let genesis = genesis_with_premine();
        let chain = ChainStore::new(Box::new(InMemoryKVStore::new()));
        let accounts = AccountStore::new();

        let latest = initialize_chain(&genesis, &chain, &accounts).unwrap();
        assert!(chain.has_block(&latest).unwrap());
        assert_eq!(chain.require_latest_hash().unwrap(), latest);
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let genesis = genesis_with_premine();
        let chain = ChainStore::new(Box::new(InMemoryKVStore::new()));
        let accounts = AccountStore::new();

        let first = initialize_chain(&genesis, &chain, &accounts).unwrap();
        let second = initialize_chain(&genesis, &chain, &accounts).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_missing_document_defaults() {
        let genesis = load_genesis(Path::new("/nonexistent/genesis.json")).unwrap();
        assert_eq!(genesis, Genesis::default());
    }
}
