//! RocksDB-backed `ChainDb`. Stubbed: opening the database and its column
//! families works, but the `ChainDb` methods themselves are not implemented —
//! disk key/value + trie storage internals are out of scope (`SPEC_FULL.md`
//! §1). `chain::adapters::memory::MemoryChainDb` is what `node-runtime`
//! actually runs against today.

#![cfg(feature = "rocksdb")]

use rocksdb::{ColumnFamilyDescriptor, Options, DB};
use std::collections::BTreeMap;
use std::sync::Arc;

use chain::ports::ChainDb;
use shared_types::{AccountData, Address, Block, Hash, SignData};

pub const CF_BLOCKS: &str = "blocks";
pub const CF_STATE: &str = "state";
pub const CF_META: &str = "metadata";
pub const COLUMN_FAMILIES: &[&str] = &[CF_BLOCKS, CF_STATE, CF_META];

#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    pub path: String,
    pub block_cache_size: usize,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self { path: "./chaindata/db".to_string(), block_cache_size: 256 * 1024 * 1024 }
    }
}

pub struct RocksDbChainDb {
    #[allow(dead_code)]
    db: Arc<DB>,
}

impl RocksDbChainDb {
    pub fn open(config: RocksDbConfig) -> Result<Self, rocksdb::Error> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)?;
        Ok(Self { db: Arc::new(db) })
    }
}

impl ChainDb for RocksDbChainDb {
    fn set_block(&self, _block: Block) {
        unimplemented!("rocksdb-backed ChainDb is a stub; see chain::adapters::memory::MemoryChainDb")
    }
    fn get_block(&self, _hash: Hash) -> Option<Block> {
        unimplemented!()
    }
    fn get_block_by_height(&self, _height: u32) -> Option<Block> {
        unimplemented!()
    }
    fn is_exist_by_hash(&self, _hash: Hash) -> bool {
        unimplemented!()
    }
    fn set_confirms(&self, _hash: Hash, _confirms: Vec<SignData>) -> Option<Block> {
        unimplemented!()
    }
    fn append_confirm(&self, _hash: Hash, _sig: SignData) -> Option<Block> {
        unimplemented!()
    }
    fn get_confirm_package(&self, _hash: Hash) -> Vec<SignData> {
        unimplemented!()
    }
    fn set_stable_block(&self, _hash: Hash) {
        unimplemented!()
    }
    fn stable_height(&self) -> u32 {
        unimplemented!()
    }
    fn stable_hash(&self) -> Hash {
        unimplemented!()
    }
    fn get_account(&self, _block_hash: Hash, _address: Address) -> Option<AccountData> {
        unimplemented!()
    }
    fn set_accounts(&self, _block_hash: Hash, _accounts: &[AccountData]) {
        unimplemented!()
    }
    fn get_canonical_account(&self, _address: Address) -> Option<AccountData> {
        unimplemented!()
    }
    fn get_contract_code(&self, _code_hash: Hash) -> Option<Vec<u8>> {
        unimplemented!()
    }
    fn set_contract_code(&self, _code_hash: Hash, _code: Vec<u8>) {
        unimplemented!()
    }
    fn get_act_database(&self, _block_hash: Hash) -> BTreeMap<(Address, Hash), Hash> {
        unimplemented!()
    }
    fn load_latest_block(&self) -> Option<Block> {
        unimplemented!()
    }
}
