//! Outbound port: the storage surface the confirmer needs, without
//! depending on the `chain` crate directly. Mirrors `tx-pool::ports::BlockLookup`.

use shared_types::{Block, Hash};

pub trait ConfirmStore: Send + Sync {
    fn load_block(&self, hash: Hash) -> Option<Block>;
    fn load_canonical_block(&self, height: u32) -> Option<Block>;
    /// Append `sig` to the block's confirm list and persist it, returning
    /// the updated block.
    fn append_confirm(&self, hash: Hash, sig: shared_types::SignData) -> Option<Block>;
    fn stable_height(&self) -> u32;
}
