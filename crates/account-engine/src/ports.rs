//! Outbound port: how the account engine reaches the trie-backed storage
//! layer. The trie itself is out of scope (`SPEC_FULL.md` §1) — this trait
//! is the seam `chain::ChainDb` adapts to, mirroring
//! `qc-02-block-storage::ports::outbound::KeyValueStore`.

use std::collections::BTreeMap;

use shared_types::{AccountData, Address, Hash};

/// Read/write access to per-block-hash account state, keyed by the parent
/// block hash the account cache is bound to.
pub trait AccountStore: Send + Sync {
    /// Load an address's committed state as of `parent_hash` — its most
    /// recent write anywhere in `parent_hash`'s ancestry, not only a write
    /// under `parent_hash` itself — or `None` if the address has never been
    /// touched on that fork.
    fn load_account(&self, parent_hash: Hash, address: Address) -> Option<AccountData>;

    /// Load an address's committed storage-slot map as of `parent_hash`,
    /// same ancestor-search semantics as `load_account`.
    fn load_storage(&self, parent_hash: Hash, address: Address) -> BTreeMap<Hash, Hash>;

    /// Load contract bytecode by its hash.
    fn load_code(&self, code_hash: Hash) -> Option<Vec<u8>>;

    /// Persist the given accounts under `block_hash`.
    fn save_accounts(&self, block_hash: Hash, accounts: &[AccountData]);

    /// Persist a new storage-slot map for `address` under `block_hash`.
    fn save_storage(&self, block_hash: Hash, address: Address, storage: BTreeMap<Hash, Hash>);

    /// Persist contract bytecode.
    fn save_code(&self, code_hash: Hash, code: Vec<u8>);
}
