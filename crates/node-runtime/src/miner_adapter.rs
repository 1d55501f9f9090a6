//! Bridges `miner::{ChainTip, BlockPublisher}` to `chain::Chain`.
//!
//! `Chain::current_block`/`account_store` already match `ChainTip` exactly,
//! but `Chain::insert` is async while `BlockPublisher::publish` is a sync
//! trait method (the miner loop calls it from inside its own async task, not
//! from `node-runtime`'s top-level runtime) — `miner`/`chain` stay decoupled
//! per `DESIGN.md`'s grounding for both crates, so the bridge lives here
//! rather than as an `impl BlockPublisher for Chain` in either crate.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use account_engine::AccountStore;
use chain::Chain;
use miner::ports::{BlockPublisher, ChainTip};
use shared_types::Block;
use tracing::warn;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the epoch")
        .as_secs()
}

/// Wraps `Arc<Chain>` to serve both outbound ports the `miner` crate needs.
pub struct ChainAdapter {
    chain: Arc<Chain>,
}

impl ChainAdapter {
    pub fn new(chain: Arc<Chain>) -> Self {
        Self { chain }
    }
}

impl ChainTip for ChainAdapter {
    fn current_block(&self) -> Block {
        self.chain.current_block()
    }

    fn account_store(&self) -> Arc<dyn AccountStore> {
        self.chain.account_store()
    }
}

impl BlockPublisher for ChainAdapter {
    fn publish(&self, block: Block) -> bool {
        let chain = self.chain.clone();
        let now = now_secs();
        let result = tokio::task::block_in_place(move || {
            tokio::runtime::Handle::current().block_on(chain.insert(block, now))
        });
        if let Err(e) = &result {
            warn!(?e, "miner's own block was rejected by insert");
        }
        result.is_ok()
    }
}
