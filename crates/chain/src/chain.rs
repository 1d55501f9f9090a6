//! The fork DAG, single-writer insertion pipeline, and stable-height
//! promotion. See `SPEC_FULL.md` §4.8 and §5.

use std::sync::Arc;

use parking_lot::RwLock;
use shared_crypto::merkle_root_of;
use shared_types::{Block, Hash, Header, SignData, Transaction, TransactionKind};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use account_engine::{AccountStore, Manager};
use block_validator::{
    judge_deputy, verify_after_tx_process, verify_before_tx_process, verify_new_confirms,
};
use confirmer::{ConfirmStore, Confirmer};
use deputy_manager::DeputyManager;
use tx_pool::{TxPool, TxPoolConfig};

use crate::errors::{ChainError, ValidatorErrorWrapper};
use crate::forkmanager::{common_ancestor, path_from_ancestor, should_switch_to};
use crate::ports::ChainDb;

/// Applies one transaction's effect to `manager`. Only `Ordinary` transfers
/// are understood; contract execution is out of scope (`SPEC_FULL.md`
/// Non-goals), matching `miner::executor::DefaultTxExecutor`.
fn apply_tx(manager: &mut Manager, tx: &Transaction) -> bool {
    match tx.kind {
        TransactionKind::Ordinary => {
            let Some(to) = tx.to else { return false };
            manager.transfer(tx.from, to, tx.amount).is_ok()
        }
        _ => true,
    }
}

/// Owns the in-memory DAG of blocks above `stable` plus the `current` and
/// `stable` tip pointers. Insertion is serialized by `inner`'s async mutex
/// per `SPEC_FULL.md` §5 ("at most one `insert` may execute at a time").
pub struct Chain {
    db: Arc<dyn ChainDb>,
    /// Shares its backing store with `db` (both point at the same adapter
    /// instance, e.g. `MemoryChainDb`); kept as a separate trait object
    /// because `ChainDb` and `AccountStore` are distinct ports owned by
    /// different crates (`SPEC_FULL.md` §6).
    account_store: Arc<dyn AccountStore>,
    dm: Arc<DeputyManager>,
    pool: Arc<TxPool>,
    pool_cfg: TxPoolConfig,
    confirmer: Arc<Confirmer>,
    timeout_ms: u64,
    /// Single-writer guard: at most one `insert` runs at a time
    /// (`SPEC_FULL.md` §5). Holds the current tip's hash.
    inner: AsyncMutex<Hash>,
    /// Read without taking `inner`'s lock, for cheap tip queries from the
    /// miner's hot loop (`miner::ports::ChainTip`).
    current_hash_cache: RwLock<Hash>,
}

impl Chain {
    /// Seed a fresh chain from `genesis`, which is immediately both
    /// `current` and `stable`. `db` and `account_store` must be backed by
    /// the same underlying adapter instance.
    pub fn new(
        db: Arc<dyn ChainDb>,
        account_store: Arc<dyn AccountStore>,
        dm: Arc<DeputyManager>,
        pool: Arc<TxPool>,
        pool_cfg: TxPoolConfig,
        confirmer: Arc<Confirmer>,
        timeout_ms: u64,
        genesis: Block,
    ) -> Self {
        let hash = genesis.hash();
        db.set_block(genesis);
        db.set_stable_block(hash);
        Self {
            db,
            account_store,
            dm,
            pool,
            pool_cfg,
            confirmer,
            timeout_ms,
            inner: AsyncMutex::new(hash),
            current_hash_cache: RwLock::new(hash),
        }
    }

    pub fn current_block(&self) -> Block {
        let hash = *self.current_hash_cache.read();
        self.db.get_block(hash).expect("current tip is always persisted")
    }

    pub fn stable_block(&self) -> Block {
        self.db
            .get_block(self.db.stable_hash())
            .expect("stable tip is always persisted")
    }

    pub fn account_store(&self) -> Arc<dyn AccountStore> {
        self.account_store.clone()
    }

    /// The block at `height` on the currently-selected fork, found by
    /// walking parent pointers down from `current`. Used by the confirmer
    /// to catch up signatures on blocks it hasn't seen yet.
    fn canonical_at(&self, current_hash: Hash, height: u32) -> Option<Block> {
        let mut cursor = self.db.get_block(current_hash)?;
        while cursor.height() > height {
            cursor = self.db.get_block(cursor.parent_hash())?;
        }
        if cursor.height() == height {
            Some(cursor)
        } else {
            None
        }
    }

    /// Run the six-step insertion pipeline against `block`, serialized
    /// against any other in-flight `insert` by `inner`'s lock.
    pub async fn insert(&self, block: Block, now_secs: u64) -> Result<(), ChainError> {
        let mut guard = self.inner.lock().await;

        if self.db.is_exist_by_hash(block.hash()) {
            return Err(ChainError::AlreadyExists);
        }
        let parent = self
            .db
            .get_block(block.parent_hash())
            .ok_or(ChainError::UnknownParent)?;

        // Step 1: pre-execution validation.
        verify_before_tx_process(
            &self.dm,
            &parent.header,
            &block,
            &self.pool,
            &self.pool_cfg,
            now_secs,
            self.timeout_ms,
        )
        .map_err(ValidatorErrorWrapper::from)?;

        // Step 2: execute against a manager reset to the block's parent.
        let (computed, mut manager) = self.recompute(&block)?;
        verify_after_tx_process(&self.dm, &computed, &block)
            .map_err(|e| ChainError::PostExecution(ValidatorErrorWrapper::from(e)))?;

        // Step 3: persist block + accounts under block.hash(); add to DAG.
        manager.save(block.hash())?;
        self.pool.recv_block(&block);
        self.db.set_block(block.clone());
        info!(height = block.height(), "block inserted");

        // Step 4: possibly switch current.
        let current_hash = *guard;
        let current_block = self
            .db
            .get_block(current_hash)
            .expect("current tip is always persisted");
        let new_hash = block.hash();

        if should_switch_to(&block, &current_block) {
            let ancestor = common_ancestor(&*self.db, new_hash, current_hash);
            let switched_fork = ancestor != Some(current_hash);

            *guard = new_hash;
            *self.current_hash_cache.write() = new_hash;

            if switched_fork {
                // Step 5: ancestry changed. Each block here was saved under
                // its own hash by a manager freshly bound to its immediate
                // parent (see `recompute`), so per-block state is already
                // self-contained; no Undo/Redo replay is needed to make the
                // new tip's state correct (`DESIGN.md` notes this).
                if let Some(ancestor_hash) = ancestor {
                    let old_path = path_from_ancestor(&*self.db, ancestor_hash, current_hash);
                    let new_path = path_from_ancestor(&*self.db, ancestor_hash, new_hash);
                    warn!(
                        dropped = old_path.len(),
                        adopted = new_path.len(),
                        "fork switch"
                    );
                }
            }
        } else {
            let unconfirmed = self.unconfirmed_at(block.height(), current_hash);
            let refs: Vec<&Block> = unconfirmed.iter().collect();
            if judge_deputy(&refs, &block) {
                warn!(height = block.height(), "equivocating deputy detected");
            }
        }

        // Step 6: pass to the confirmer.
        let confirmed_current = self
            .db
            .get_block(*guard)
            .expect("current tip is always persisted");
        if let Some(sig) = self
            .confirmer
            .try_confirm(&self.dm, &confirmed_current, self.db.stable_height())
        {
            if let Some(updated) = self.db.append_confirm(confirmed_current.hash(), sig) {
                self.try_promote_stable(&updated);
            }
        }

        Ok(())
    }

    /// Admit a batch of confirm signatures for a block already in the DAG.
    pub fn receive_confirms(&self, hash: Hash, sigs: &[SignData]) -> Result<usize, ChainError> {
        let block = self.db.get_block(hash).ok_or(ChainError::UnknownParent)?;
        let (accepted, _err) = verify_new_confirms(&self.dm, &block, sigs);
        let mut latest = block;
        for sig in &accepted {
            if let Some(updated) = self.db.append_confirm(hash, *sig) {
                latest = updated;
            }
        }
        self.try_promote_stable(&latest);
        Ok(accepted.len())
    }

    /// If `block`'s confirm count now clears the threshold, walk its
    /// ancestors down to the current stable tip and mark them all stable,
    /// appending any snapshot terms encountered along the way
    /// (`DeputyManager::save_snapshot` is only ever called here, reconciling
    /// speculative forks' deputy sets at the moment one side stabilizes).
    fn try_promote_stable(&self, block: &Block) {
        let Ok(n) = self.dm.deputy_count(block.height()) else { return };
        if !self.confirmer.is_stable(block, n) {
            return;
        }

        let stable_hash = self.db.stable_hash();
        let mut to_promote = Vec::new();
        let mut cursor = block.clone();
        while cursor.hash() != stable_hash {
            to_promote.push(cursor.clone());
            let Some(parent) = self.db.get_block(cursor.parent_hash()) else { break };
            cursor = parent;
        }
        to_promote.reverse();

        for promoted in &to_promote {
            if self.dm.is_snapshot_block(promoted.height()) {
                let _ = self
                    .dm
                    .save_snapshot(promoted.height(), promoted.deputy_nodes.clone());
            }
            self.db.set_stable_block(promoted.hash());
            self.pool.prune_block(&promoted.hash());
        }
        if let Some(last) = to_promote.last() {
            info!(height = last.height(), "stable height advanced");
        }
    }

    /// Candidate blocks at `height` other than the current fork's own block
    /// there, for equivocation detection (`block_validator::judge_deputy`).
    fn unconfirmed_at(&self, height: u32, current_hash: Hash) -> Vec<Block> {
        let mut out = Vec::new();
        if let Some(existing) = self.canonical_at(current_hash, height) {
            out.push(existing);
        }
        out
    }

    /// Re-execute `block`'s transactions against a manager bound to its
    /// parent, producing the change-logs and header fields a correct
    /// executor would have computed, for comparison against what the block
    /// actually claims (`block_validator::verify_after_tx_process`).
    fn recompute(&self, block: &Block) -> Result<(Block, Manager), ChainError> {
        let mut manager = Manager::new(self.account_store(), block.parent_hash());
        for tx in &block.txs {
            if !apply_tx(&mut manager, tx) {
                return Err(ChainError::PostExecution(ValidatorErrorWrapper::from(
                    block_validator::ValidatorError::InvalidTxInBlock,
                )));
            }
        }
        manager.finalise(block.height())?;

        let is_snapshot = self.dm.is_snapshot_block(block.height());
        let deputy_nodes = if is_snapshot {
            block.deputy_nodes.clone()
        } else {
            Vec::new()
        };
        let deputy_root = if is_snapshot {
            merkle_root_of(&deputy_nodes)
        } else {
            [0u8; 32]
        };

        let header = Header {
            parent_hash: block.parent_hash(),
            miner_address: block.miner_address(),
            version_root: manager.version_root(),
            tx_root: block.header.tx_root,
            log_root: merkle_root_of(manager.logs()),
            event_root: block.header.event_root,
            bloom: block.header.bloom,
            deputy_root,
            height: block.height(),
            gas_limit: block.header.gas_limit,
            gas_used: block.header.gas_used,
            time: block.header.time,
            extra: block.header.extra.clone(),
        };
        let computed = Block {
            header,
            txs: block.txs.clone(),
            change_logs: manager.logs().to_vec(),
            miner_signature: block.miner_signature,
            confirms: block.confirms.clone(),
            deputy_nodes,
        };
        Ok((computed, manager))
    }
}

/// Lets a `Confirmer` catch up signatures on canonical blocks without the
/// `confirmer` crate depending on `chain` directly (`SPEC_FULL.md` §4.6).
impl ConfirmStore for Chain {
    fn load_block(&self, hash: Hash) -> Option<Block> {
        self.db.get_block(hash)
    }

    fn load_canonical_block(&self, height: u32) -> Option<Block> {
        let current_hash = *self.current_hash_cache.read();
        self.canonical_at(current_hash, height)
    }

    fn append_confirm(&self, hash: Hash, sig: SignData) -> Option<Block> {
        self.db.append_confirm(hash, sig)
    }

    fn stable_height(&self) -> u32 {
        self.db.stable_height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deputy_manager::DeputyManager;
    use scheduler::correct_miner;
    use shared_crypto::{merkle_root_of, Secp256k1KeyPair};
    use shared_types::{ConsensusParams, Deputy};

    use crate::adapters::MemoryChainDb;

    fn node_id_to_address(node_id: &[u8; 64]) -> shared_types::Address {
        let digest = shared_crypto::keccak256(node_id);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&digest[12..]);
        addr
    }

    fn genesis_block() -> Block {
        let header = Header {
            parent_hash: [0; 32],
            miner_address: [0; 20],
            version_root: merkle_root_of::<shared_types::ChangeLog>(&[]),
            tx_root: merkle_root_of::<Transaction>(&[]),
            log_root: merkle_root_of::<shared_types::ChangeLog>(&[]),
            event_root: [0; 32],
            bloom: [0; 256],
            deputy_root: [0; 32],
            height: 0,
            gas_limit: 1_000_000,
            gas_used: 0,
            time: 1_000,
            extra: vec![],
        };
        Block {
            header,
            txs: vec![],
            change_logs: vec![],
            miner_signature: [0; 65],
            confirms: vec![],
            deputy_nodes: vec![],
        }
    }

    /// One deputy, `total_count: 1`, so this node is always the correct
    /// miner and confirms itself into stability immediately.
    fn setup() -> (Chain, Secp256k1KeyPair, Arc<MemoryChainDb>) {
        let keypair = Secp256k1KeyPair::generate();
        let address = node_id_to_address(&keypair.node_id());

        let dm = Arc::new(DeputyManager::new(ConsensusParams {
            term_duration: 1_000_000,
            interim_duration: 100_000,
            total_count: 1,
            ..ConsensusParams::default()
        }));
        dm.bootstrap_genesis(vec![Deputy {
            miner_address: address,
            node_id: keypair.node_id(),
            rank: 0,
            votes: 0,
        }])
        .unwrap();

        let db = Arc::new(MemoryChainDb::new());
        let pool = Arc::new(TxPool::new(TxPoolConfig::for_testing(), db.clone()));
        let confirmer = Arc::new(Confirmer::new(Secp256k1KeyPair::from_bytes(keypair.to_bytes()).unwrap()));

        let chain = Chain::new(
            db.clone(),
            db.clone(),
            dm,
            pool,
            TxPoolConfig::for_testing(),
            confirmer,
            1_000,
            genesis_block(),
        );
        (chain, keypair, db)
    }

    fn next_block(chain: &Chain, keypair: &Secp256k1KeyPair, parent: &Block) -> Block {
        let mine_time_ms = parent.header.time * 1000 + 1_000;
        let miner_address = correct_miner(&chain.dm, &parent.header, mine_time_ms, 1_000).unwrap();
        let mut header = Header {
            parent_hash: parent.hash(),
            miner_address,
            version_root: merkle_root_of::<shared_types::ChangeLog>(&[]),
            tx_root: merkle_root_of::<Transaction>(&[]),
            log_root: merkle_root_of::<shared_types::ChangeLog>(&[]),
            event_root: [0; 32],
            bloom: [0; 256],
            deputy_root: [0; 32],
            height: parent.height() + 1,
            gas_limit: 1_000_000,
            gas_used: 0,
            time: mine_time_ms / 1000,
            extra: vec![],
        };
        let sig = keypair.sign_hash(&header.hash());
        header.extra = vec![]; // header already final; keep hash stable
        Block {
            header,
            txs: vec![],
            change_logs: vec![],
            miner_signature: sig,
            confirms: vec![],
            deputy_nodes: vec![],
        }
    }

    #[tokio::test]
    async fn insert_extends_current_tip() {
        let (chain, keypair, _db) = setup();
        let genesis = chain.current_block();
        let block1 = next_block(&chain, &keypair, &genesis);

        chain.insert(block1.clone(), block1.header.time).await.unwrap();

        assert_eq!(chain.current_block().height(), 1);
        assert_eq!(chain.current_block().hash(), block1.hash());
    }

    #[tokio::test]
    async fn insert_rejects_unknown_parent() {
        let (chain, keypair, _db) = setup();
        let mut orphan = next_block(&chain, &keypair, &chain.current_block());
        orphan.header.parent_hash = [0xaa; 32];
        let sig = keypair.sign_hash(&orphan.header.hash());
        orphan.miner_signature = sig;

        let err = chain.insert(orphan.clone(), orphan.header.time).await.unwrap_err();
        assert_eq!(err, ChainError::UnknownParent);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_block() {
        let (chain, keypair, _db) = setup();
        let genesis = chain.current_block();
        let block1 = next_block(&chain, &keypair, &genesis);
        chain.insert(block1.clone(), block1.header.time).await.unwrap();

        let err = chain.insert(block1.clone(), block1.header.time).await.unwrap_err();
        assert_eq!(err, ChainError::AlreadyExists);
    }

    #[tokio::test]
    async fn single_deputy_self_confirms_to_stable() {
        let (chain, keypair, _db) = setup();
        let genesis = chain.current_block();
        let block1 = next_block(&chain, &keypair, &genesis);
        chain.insert(block1.clone(), block1.header.time).await.unwrap();

        // One deputy needs exactly one confirm (`required_confirms(1) == 1`),
        // signed automatically during `insert`'s step 6.
        assert_eq!(chain.stable_block().height(), 1);
    }

    #[tokio::test]
    async fn ordinary_transfer_is_reflected_in_saved_state() {
        let (chain, keypair, db) = setup();
        let genesis = chain.current_block();
        let sender_keypair = Secp256k1KeyPair::generate();
        let sender = node_id_to_address(&sender_keypair.node_id());
        let receiver = [9u8; 20];
        db.set_accounts(
            genesis.hash(),
            &[shared_types::AccountData {
                balance: 500,
                ..shared_types::AccountData::empty(sender)
            }],
        );

        let mut block1 = next_block(&chain, &keypair, &genesis);
        let mut tx = shared_types::Transaction {
            from: sender,
            to: Some(receiver),
            amount: 200,
            gas_price: 1,
            gas_limit: 21_000,
            expiration_time: block1.header.time + 1_000,
            kind: shared_types::TransactionKind::Ordinary,
            data: vec![],
            to_name: String::new(),
            message: String::new(),
            chain_id: 1,
            sub_transactions: vec![],
            signature: [0; 65],
        };
        tx.signature = sender_keypair.sign_hash(&tx_pool::tx_signing_hash(&tx));
        block1.txs = vec![tx];
        block1.header.tx_root = merkle_root_of(&block1.txs);

        let mut manager = Manager::new(db.clone(), block1.parent_hash());
        apply_tx(&mut manager, &block1.txs[0]);
        manager.finalise(block1.height()).unwrap();
        block1.header.log_root = merkle_root_of(manager.logs());
        block1.header.version_root = manager.version_root();
        block1.change_logs = manager.logs().to_vec();

        let sig = keypair.sign_hash(&block1.header.hash());
        block1.miner_signature = sig;

        chain.insert(block1.clone(), block1.header.time).await.unwrap();

        let receiver_state = db.get_account(block1.hash(), receiver).unwrap();
        assert_eq!(receiver_state.balance, 200);
        let sender_state = db.get_account(block1.hash(), sender).unwrap();
        assert_eq!(sender_state.balance, 300);
    }
}
