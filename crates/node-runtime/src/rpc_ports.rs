//! JSON-RPC method families (`SPEC_FULL.md` §6). Each family is a trait the
//! binary would wire an HTTP/WS/IPC transport to; no transport ships here.

use shared_types::{Address, Block, Hash};

/// `account.*`
pub trait AccountRpc: Send + Sync {
    fn get_balance(&self, address: Address) -> Option<u128>;
    fn get_account(&self, address: Address) -> Option<shared_types::AccountData>;
    fn get_votes(&self, address: Address) -> Option<u128>;
    fn get_vote_for(&self, address: Address) -> Option<Address>;
    fn get_candidate_profile(&self, address: Address) -> Option<std::collections::BTreeMap<String, String>>;
}

/// `chain.*`
pub trait ChainRpc: Send + Sync {
    fn chain_id(&self) -> u16;
    fn genesis(&self) -> Block;
    fn current_block(&self) -> Block;
    fn latest_stable_block(&self) -> Block;
    fn current_height(&self) -> u32;
    fn latest_stable_height(&self) -> u32;
    fn get_block_by_height(&self, height: u32) -> Option<Block>;
    fn get_block_by_hash(&self, hash: Hash) -> Option<Block>;
    fn gas_price_advice(&self) -> u128;
    fn node_version(&self) -> &str;
}

/// `mine.*`
pub trait MineRpc: Send + Sync {
    fn is_mining(&self) -> bool;
    fn miner(&self) -> Address;
    fn mine_start(&self) -> bool;
    fn mine_stop(&self) -> bool;
}

/// `net.*`
pub trait NetRpc: Send + Sync {
    fn peers_count(&self) -> u32;
    fn info(&self) -> String;
    fn connect(&self, node_uri: &str) -> bool;
    fn disconnect(&self, node_id: &str) -> bool;
    fn connections(&self) -> Vec<String>;
}

/// `tx.*`
pub trait TxRpc: Send + Sync {
    fn send_tx(&self, tx: shared_types::Transaction) -> Result<Hash, tx_pool::TxBodyError>;
    fn pending_tx(&self, limit: usize) -> Vec<shared_types::Transaction>;
    fn estimate_gas(&self, tx: &shared_types::Transaction) -> u64;
}
