//! Outbound port: how the pool walks the ancestor chain to check for
//! double-inclusion without depending on the `chain` crate directly.

use shared_types::Hash;

/// Minimal chain-read surface the pool needs for `verify_tx_in_block`.
pub trait BlockLookup: Send + Sync {
    fn parent_hash(&self, block_hash: Hash) -> Option<Hash>;
    fn tx_hashes(&self, block_hash: Hash) -> Vec<Hash>;
    fn height(&self, block_hash: Hash) -> Option<u32>;
    /// Seconds-since-epoch the block was mined, used to bound the
    /// double-inclusion ancestor walk to the expiration window.
    fn time(&self, block_hash: Hash) -> Option<u64>;
}
