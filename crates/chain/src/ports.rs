//! `ChainDb`: the persisted-layout port contract from `SPEC_FULL.md` §6.
//! Account operations mirror `account_engine::ports::AccountStore` exactly
//! (a `ChainDb` adapter is expected to also serve as the `AccountStore` the
//! account engine binds to) plus the block/confirm bookkeeping the account
//! engine has no reason to know about.

use std::collections::BTreeMap;

use shared_types::{AccountData, Address, Block, Hash, SignData};

pub trait ChainDb: Send + Sync {
    fn set_block(&self, block: Block);
    fn get_block(&self, hash: Hash) -> Option<Block>;
    fn get_block_by_height(&self, height: u32) -> Option<Block>;
    fn is_exist_by_hash(&self, hash: Hash) -> bool;

    /// Replace a block's confirm set, returning the updated block.
    fn set_confirms(&self, hash: Hash, confirms: Vec<SignData>) -> Option<Block>;
    /// Append one confirm, returning the updated block.
    fn append_confirm(&self, hash: Hash, sig: SignData) -> Option<Block>;
    fn get_confirm_package(&self, hash: Hash) -> Vec<SignData>;

    fn set_stable_block(&self, hash: Hash);
    fn stable_height(&self) -> u32;
    fn stable_hash(&self) -> Hash;

    /// An address's state as of `block_hash` — its most recent write
    /// anywhere in `block_hash`'s ancestry, not only a write persisted
    /// directly under `block_hash`.
    fn get_account(&self, block_hash: Hash, address: Address) -> Option<AccountData>;
    fn set_accounts(&self, block_hash: Hash, accounts: &[AccountData]);
    /// The latest finalised (stable) state of `address`, independent of fork.
    fn get_canonical_account(&self, address: Address) -> Option<AccountData>;

    fn get_contract_code(&self, code_hash: Hash) -> Option<Vec<u8>>;
    fn set_contract_code(&self, code_hash: Hash, code: Vec<u8>);

    /// Per-block storage-slot view, keyed the same way `AccountStore` keys it.
    fn get_act_database(&self, block_hash: Hash) -> BTreeMap<(Address, Hash), Hash>;

    fn load_latest_block(&self) -> Option<Block>;

    /// No-op for the in-memory adapter; a durable adapter flushes here.
    fn close(&self) {}
}
