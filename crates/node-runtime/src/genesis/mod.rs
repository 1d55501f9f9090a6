//! Genesis file parsing and the genesis block it produces.
//!
//! Mirrors `main/initcmd.go`'s `setupGenesisBlock`/`saveBlock` split: `Genesis`
//! is the JSON the operator supplies, `setup_genesis_block` turns it into a
//! `shared_types::Block` at height 0 and persists it via a `ChainDb`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use thiserror::Error;

use account_engine::Manager;
use chain::ports::ChainDb;
use deputy_manager::DeputyManager;
use shared_types::{Block, ConsensusParams, Deputy, Header};

/// Genesis file errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("failed to open genesis file: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid genesis file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("genesis deputy nodes is empty")]
    EmptyDeputyNodes,
    #[error("genesis bootstrap failed: {0}")]
    Bootstrap(#[from] deputy_manager::DeputyError),
    #[error("genesis account setup failed: {0}")]
    Account(#[from] account_engine::AccountError),
}

/// Initial balance entry for an address at genesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub address: shared_types::Address,
    pub balance: u128,
}

/// The genesis JSON file: initial committee, balances, and block parameters.
/// Produces a deterministic genesis block when passed to `setup_genesis_block`.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genesis {
    /// Consensus-critical protocol parameters every node must agree on.
    #[serde(default)]
    pub consensus: ConsensusParams,
    /// The genesis (term-0) committee.
    pub deputy_nodes: Vec<Deputy>,
    /// Initial account balances.
    #[serde(default)]
    pub balances: Vec<GenesisBalance>,
    pub gas_limit: u64,
    pub timestamp: u64,
    #[serde_as(as = "Bytes")]
    #[serde(default)]
    pub extra: Vec<u8>,
}

impl Genesis {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GenesisError> {
        let file = File::open(path)?;
        let genesis = serde_json::from_reader(BufReader::new(file))?;
        Ok(genesis)
    }
}

/// Builds the genesis block from `genesis`, bootstraps `dm`'s term-0
/// committee, persists the block and its initial account state to `db`, and
/// returns the block's hash (the value `init` reports to the operator).
pub fn setup_genesis_block(
    genesis: &Genesis,
    dm: &DeputyManager,
    db: &dyn ChainDb,
    account_store: Arc<dyn account_engine::AccountStore>,
) -> Result<shared_types::Hash, GenesisError> {
    if genesis.deputy_nodes.is_empty() {
        return Err(GenesisError::EmptyDeputyNodes);
    }
    dm.bootstrap_genesis(genesis.deputy_nodes.clone())?;

    let parent_hash = [0u8; 32];
    let mut manager = Manager::new(account_store, parent_hash);
    for entry in &genesis.balances {
        let handle = manager.get_account(entry.address);
        manager.set_balance(handle, entry.balance)?;
    }
    manager.finalise(0)?;

    let header = Header {
        parent_hash,
        miner_address: [0u8; 20],
        version_root: manager.version_root(),
        tx_root: shared_crypto::merkle_root(&[]),
        log_root: shared_crypto::merkle_root_of(manager.logs()),
        event_root: [0u8; 32],
        bloom: [0u8; 256],
        deputy_root: shared_crypto::merkle_root_of(&genesis.deputy_nodes),
        height: 0,
        gas_limit: genesis.gas_limit,
        gas_used: 0,
        time: genesis.timestamp,
        extra: genesis.extra.clone(),
    };
    let hash = header.hash();

    let block = Block {
        header,
        txs: Vec::new(),
        change_logs: manager.logs().to_vec(),
        miner_signature: [0u8; 65],
        confirms: Vec::new(),
        deputy_nodes: genesis.deputy_nodes.clone(),
    };

    manager.save(hash)?;
    db.set_block(block);
    db.set_stable_block(hash);

    Ok(hash)
}
