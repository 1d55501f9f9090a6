use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use shared_types::{Block, Hash, Transaction};

use crate::config::TxPoolConfig;
use crate::errors::TxBodyError;
use crate::ports::BlockLookup;
use crate::verify::{tx_hash, verify_tx_body};

/// A transaction held in the pool along with the wall-clock time it was
/// received, used to evict the oldest entries first when packaging a block.
#[derive(Debug, Clone)]
struct PendingTx {
    tx: Transaction,
    received_at: u64,
}

/// Tracks candidate transactions not yet confirmed by a stable block.
///
/// Mirrors the teacher's three-map mempool shape (`qc-06-mempool`):
/// `pending` holds transactions available for packaging, `recent` is a
/// short-lived dedup set of hashes seen recently (including ones already
/// discarded), and `in_block` indexes which transactions already appear in
/// which not-yet-stable blocks, so `verify_tx_in_block` can walk back along
/// a candidate block's ancestors without rescanning pending.
pub struct TxPool {
    cfg: TxPoolConfig,
    pending: Mutex<HashMap<Hash, PendingTx>>,
    recent: Mutex<HashMap<Hash, u64>>,
    in_block: Mutex<HashMap<Hash, HashSet<Hash>>>,
    lookup: Arc<dyn BlockLookup>,
}

impl TxPool {
    pub fn new(cfg: TxPoolConfig, lookup: Arc<dyn BlockLookup>) -> Self {
        Self {
            cfg,
            pending: Mutex::new(HashMap::new()),
            recent: Mutex::new(HashMap::new()),
            in_block: Mutex::new(HashMap::new()),
            lookup,
        }
    }

    /// Accept a transaction broadcast by a peer or a local client. Rejects
    /// anything already seen recently or that fails body-verify.
    pub fn recv(&self, tx: Transaction, now_secs: u64) -> Result<(), TxBodyError> {
        let hash = tx_hash(&tx);
        if self.recent.lock().contains_key(&hash) {
            return Ok(()); // already known; not an error, just a no-op
        }
        verify_tx_body(&tx, now_secs, &self.cfg)?;
        self.recent.lock().insert(hash, now_secs);
        self.pending.lock().insert(hash, PendingTx { tx, received_at: now_secs });
        Ok(())
    }

    /// Pop up to `max_count` non-expired transactions for packaging, oldest
    /// first. Does not remove them from `pending` — that happens once the
    /// block they're packaged into is confirmed (`prune_block`) or found
    /// invalid (`del_invalid`).
    pub fn pending(&self, max_count: usize, now_secs: u64) -> Vec<Transaction> {
        let guard = self.pending.lock();
        let mut candidates: Vec<&PendingTx> = guard
            .values()
            .filter(|p| p.tx.expiration_time > now_secs)
            .collect();
        candidates.sort_by_key(|p| p.received_at);
        candidates.into_iter().take(max_count).map(|p| p.tx.clone()).collect()
    }

    /// Drop a transaction that downstream execution found invalid (e.g.
    /// insufficient balance at execution time, which body-verify cannot see).
    pub fn del_invalid(&self, hash: &Hash) {
        self.pending.lock().remove(hash);
    }

    /// Record that `block` now carries a set of transactions so future
    /// `verify_tx_in_block` calls on descendant blocks can detect
    /// re-inclusion, and remove those transactions from `pending` since
    /// they're now claimed by a candidate block.
    pub fn recv_block(&self, block: &Block) {
        let block_hash = crate::verify::block_hash(&block.header);
        let hashes: HashSet<Hash> = block.txs.iter().map(tx_hash).collect();
        {
            let mut pending = self.pending.lock();
            for h in &hashes {
                pending.remove(h);
            }
        }
        self.in_block.lock().insert(block_hash, hashes);
    }

    /// A block has become stable (or been discarded from the candidate
    /// set); its in-block index entry and its now-final transactions' recent
    /// markers are no longer needed for the packaging decision, though
    /// `recent` keeps them around until they age out naturally.
    pub fn prune_block(&self, block_hash: &Hash) {
        self.in_block.lock().remove(block_hash);
    }

    /// Verify that no transaction in `block` already appears in one of its
    /// ancestors within the configured expiration window. Returns `false`
    /// (the block is invalid) on the first duplicate found.
    ///
    /// The walk stops as soon as an ancestor's own block time falls before
    /// `block.header.time - tx_expiration_max_secs` — a transaction cannot
    /// still be live past its own expiration window, so there is no point
    /// (and on a long-lived chain, no bound) walking further back than that.
    pub fn verify_tx_in_block(&self, block: &Block) -> bool {
        let tx_hashes: Vec<Hash> = block.txs.iter().map(tx_hash).collect();
        let mut seen: HashSet<Hash> = HashSet::new();
        let mut cursor = block.parent_hash();
        let in_block = self.in_block.lock();
        let cutoff = block.header.time.saturating_sub(self.cfg.consensus.tx_expiration_max_secs);

        while let Some(height) = self.lookup.height(cursor) {
            if matches!(self.lookup.time(cursor), Some(time) if time < cutoff) {
                break;
            }
            if let Some(ancestor_txs) = in_block.get(&cursor) {
                seen.extend(ancestor_txs.iter().copied());
            } else {
                seen.extend(self.lookup.tx_hashes(cursor));
            }
            if height == 0 {
                break;
            }
            match self.lookup.parent_hash(cursor) {
                Some(parent) => cursor = parent,
                None => break,
            }
        }

        !tx_hashes.iter().any(|h| seen.contains(h))
    }

    /// Whether there is at least one non-expired transaction ready to
    /// package, used by the miner to decide whether to produce an empty
    /// block or wait.
    pub fn exist_can_package_tx(&self, now_secs: u64) -> bool {
        self.pending.lock().values().any(|p| p.tx.expiration_time > now_secs)
    }
}
