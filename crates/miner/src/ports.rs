//! Outbound ports: the chain-state surface the miner needs, without a
//! direct dependency on the `chain` crate. Mirrors `tx_pool::ports::BlockLookup`.

use std::sync::Arc;

use account_engine::AccountStore;
use shared_types::Block;

/// Read access to the tip the miner should build on, and the account store
/// backing it.
pub trait ChainTip: Send + Sync {
    /// The current best block to mine on top of.
    fn current_block(&self) -> Block;

    /// The account store bound to `current_block`'s hash, for constructing
    /// an `account_engine::Manager`.
    fn account_store(&self) -> Arc<dyn AccountStore>;
}

/// Where a freshly assembled block goes once signed. A real adapter routes
/// this through the same `insert` path used for network-received blocks
/// (`SPEC_FULL.md` §5: "Miner publishes atomically ... as if it had arrived
/// from the network").
pub trait BlockPublisher: Send + Sync {
    /// Returns whether the block was accepted.
    fn publish(&self, block: Block) -> bool;
}
