use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use shared_types::{AccountData, Address, Block, Hash, SignData};

use crate::ports::ChainDb;
use account_engine::AccountStore;
use tx_pool::BlockLookup;

/// In-memory reference adapter for `ChainDb`. Used by tests and as
/// `node-runtime`'s default config; a `rocksdb`-backed adapter is named in
/// `SPEC_FULL.md` §6 but left stubbed, matching the teacher's own unfinished
/// `node-runtime/adapters/storage/rocksdb_adapter.rs`.
#[derive(Default)]
pub struct MemoryChainDb {
    blocks_by_hash: RwLock<HashMap<Hash, Block>>,
    hash_by_height: RwLock<HashMap<u32, Hash>>,
    stable: RwLock<Hash>,
    accounts: RwLock<HashMap<(Hash, Address), AccountData>>,
    storage: RwLock<HashMap<(Hash, Address), BTreeMap<Hash, Hash>>>,
    canonical_accounts: RwLock<HashMap<Address, AccountData>>,
    code: RwLock<HashMap<Hash, Vec<u8>>>,
}

impl MemoryChainDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// An address isn't re-persisted under every descendant block's hash —
    /// only the block that actually touched it. Walk back through ancestors
    /// (`ChainDb::get_block`) until the address's most recent write is
    /// found, so reading state under any still-known block hash sees the
    /// full history behind it, not just what that one block happened to
    /// touch.
    fn resolve_account(&self, hash: Hash, address: Address) -> Option<AccountData> {
        let mut cursor = hash;
        loop {
            if let Some(acct) = self.accounts.read().get(&(cursor, address)).cloned() {
                return Some(acct);
            }
            cursor = self.get_block(cursor)?.parent_hash();
        }
    }

    /// Same ancestor walk as `resolve_account`, for a contract's storage slots.
    fn resolve_storage(&self, hash: Hash, address: Address) -> Option<BTreeMap<Hash, Hash>> {
        let mut cursor = hash;
        loop {
            if let Some(slots) = self.storage.read().get(&(cursor, address)).cloned() {
                return Some(slots);
            }
            cursor = self.get_block(cursor)?.parent_hash();
        }
    }
}

impl ChainDb for MemoryChainDb {
    fn set_block(&self, block: Block) {
        let hash = block.hash();
        let height = block.height();
        self.hash_by_height.write().insert(height, hash);
        self.blocks_by_hash.write().insert(hash, block);
    }

    fn get_block(&self, hash: Hash) -> Option<Block> {
        self.blocks_by_hash.read().get(&hash).cloned()
    }

    fn get_block_by_height(&self, height: u32) -> Option<Block> {
        let hash = *self.hash_by_height.read().get(&height)?;
        self.get_block(hash)
    }

    fn is_exist_by_hash(&self, hash: Hash) -> bool {
        self.blocks_by_hash.read().contains_key(&hash)
    }

    fn set_confirms(&self, hash: Hash, confirms: Vec<SignData>) -> Option<Block> {
        let mut guard = self.blocks_by_hash.write();
        let block = guard.get_mut(&hash)?;
        block.confirms = confirms;
        Some(block.clone())
    }

    fn append_confirm(&self, hash: Hash, sig: SignData) -> Option<Block> {
        let mut guard = self.blocks_by_hash.write();
        let block = guard.get_mut(&hash)?;
        if !block.is_confirm_exist(&sig) {
            block.confirms.push(sig);
        }
        Some(block.clone())
    }

    fn get_confirm_package(&self, hash: Hash) -> Vec<SignData> {
        self.blocks_by_hash
            .read()
            .get(&hash)
            .map(|b| b.confirms.clone())
            .unwrap_or_default()
    }

    fn set_stable_block(&self, hash: Hash) {
        *self.stable.write() = hash;
        if let Some(block) = self.get_block(hash) {
            for acct in self.accounts.read().iter().filter(|((h, _), _)| *h == hash).map(|(_, a)| a.clone()).collect::<Vec<_>>() {
                self.canonical_accounts.write().insert(acct.address, acct);
            }
            let _ = block;
        }
    }

    fn stable_height(&self) -> u32 {
        self.get_block(*self.stable.read()).map(|b| b.height()).unwrap_or(0)
    }

    fn stable_hash(&self) -> Hash {
        *self.stable.read()
    }

    fn get_account(&self, block_hash: Hash, address: Address) -> Option<AccountData> {
        self.resolve_account(block_hash, address)
    }

    fn set_accounts(&self, block_hash: Hash, accounts: &[AccountData]) {
        let mut guard = self.accounts.write();
        for acct in accounts {
            guard.insert((block_hash, acct.address), acct.clone());
        }
    }

    fn get_canonical_account(&self, address: Address) -> Option<AccountData> {
        self.canonical_accounts.read().get(&address).cloned()
    }

    fn get_contract_code(&self, code_hash: Hash) -> Option<Vec<u8>> {
        self.code.read().get(&code_hash).cloned()
    }

    fn set_contract_code(&self, code_hash: Hash, code: Vec<u8>) {
        self.code.write().insert(code_hash, code);
    }

    fn get_act_database(&self, block_hash: Hash) -> BTreeMap<(Address, Hash), Hash> {
        let mut out = BTreeMap::new();
        for ((hash, addr), slots) in self.storage.read().iter() {
            if *hash == block_hash {
                for (key, value) in slots {
                    out.insert((*addr, *key), *value);
                }
            }
        }
        out
    }

    fn load_latest_block(&self) -> Option<Block> {
        let max_height = *self.hash_by_height.read().keys().max()?;
        self.get_block_by_height(max_height)
    }
}

/// `MemoryChainDb` also serves as the `AccountStore` the account engine
/// binds to, per `SPEC_FULL.md` §6 ("account tries are keyed by block hash").
impl AccountStore for MemoryChainDb {
    fn load_account(&self, parent_hash: Hash, address: Address) -> Option<AccountData> {
        self.resolve_account(parent_hash, address)
    }

    fn load_storage(&self, parent_hash: Hash, address: Address) -> BTreeMap<Hash, Hash> {
        self.resolve_storage(parent_hash, address).unwrap_or_default()
    }

    fn load_code(&self, code_hash: Hash) -> Option<Vec<u8>> {
        self.get_contract_code(code_hash)
    }

    fn save_accounts(&self, block_hash: Hash, accounts: &[AccountData]) {
        ChainDb::set_accounts(self, block_hash, accounts)
    }

    fn save_storage(&self, block_hash: Hash, address: Address, storage: BTreeMap<Hash, Hash>) {
        self.storage.write().insert((block_hash, address), storage);
    }

    fn save_code(&self, code_hash: Hash, code: Vec<u8>) {
        ChainDb::set_contract_code(self, code_hash, code)
    }
}

/// Also serves `tx_pool::BlockLookup`, so one adapter instance backs all
/// three outbound ports the consensus core needs from block storage.
impl BlockLookup for MemoryChainDb {
    fn parent_hash(&self, block_hash: Hash) -> Option<Hash> {
        self.get_block(block_hash).map(|b| b.parent_hash())
    }

    fn tx_hashes(&self, block_hash: Hash) -> Vec<Hash> {
        self.get_block(block_hash)
            .map(|b| b.txs.iter().map(tx_pool::tx_hash).collect())
            .unwrap_or_default()
    }

    fn height(&self, block_hash: Hash) -> Option<u32> {
        self.get_block(block_hash).map(|b| b.height())
    }

    fn time(&self, block_hash: Hash) -> Option<u64> {
        self.get_block(block_hash).map(|b| b.header.time)
    }
}
