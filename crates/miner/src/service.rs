use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use deputy_manager::DeputyManager;
use scheduler::{distance, next_mine_window};
use shared_crypto::{merkle_root_of, Secp256k1KeyPair};
use shared_types::{Address, Block, Deputy, Header};
use tokio::sync::watch;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use account_engine::Manager;
use tx_pool::TxPool;

use crate::config::MinerConfig;
use crate::errors::MinerError;
use crate::executor::TxExecutor;
use crate::ports::{BlockPublisher, ChainTip};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the epoch")
        .as_millis() as u64
}

/// Scheduler-driven block-assembly loop. One instance per mining identity.
/// Cancellation is a `tokio::sync::watch::Receiver<bool>`, grounded in
/// `qc-17-block-production::service::ConcreteBlockProducer`'s
/// `Mutex<Option<JoinHandle<()>>>` + `AtomicBool is_active` shutdown pattern
/// (`SPEC_FULL.md` §4.7), restated here as a channel rather than a flag so
/// the loop can `select!` on it mid-sleep instead of polling.
pub struct Miner {
    keypair: Secp256k1KeyPair,
    dm: Arc<DeputyManager>,
    pool: Arc<TxPool>,
    tip: Arc<dyn ChainTip>,
    publisher: Arc<dyn BlockPublisher>,
    executor: Arc<dyn TxExecutor>,
    config: MinerConfig,
}

impl Miner {
    pub fn new(
        keypair: Secp256k1KeyPair,
        dm: Arc<DeputyManager>,
        pool: Arc<TxPool>,
        tip: Arc<dyn ChainTip>,
        publisher: Arc<dyn BlockPublisher>,
        executor: Arc<dyn TxExecutor>,
        config: MinerConfig,
    ) -> Self {
        Self { keypair, dm, pool, tip, publisher, executor, config }
    }

    fn miner_address(&self) -> Address {
        let digest = shared_crypto::keccak256(&self.keypair.node_id());
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&digest[12..]);
        addr
    }

    /// Run until `stop.changed()` observes `true`. Returns normally on
    /// cancellation; never on error — scheduling failures are logged and
    /// retried on the next loop iteration.
    pub async fn run(&self, mut stop: watch::Receiver<bool>) {
        loop {
            if *stop.borrow() {
                return;
            }
            if let Err(e) = self.mine_one(&mut stop).await {
                debug!(?e, "mine attempt did not produce a block");
            }
            if *stop.borrow() {
                return;
            }
        }
    }

    async fn mine_one(&self, stop: &mut watch::Receiver<bool>) -> Result<(), MinerError> {
        let parent = self.tip.current_block();
        let height = parent.height() + 1;
        let self_addr = self.miner_address();

        let deputy_count = self.dm.deputy_count(height).map_err(|_| MinerError::NotDeputy)?;
        let d = distance(&self.dm, parent.miner_address(), self_addr, height)
            .map_err(|_| MinerError::NotDeputy)?;

        let (from, to) = next_mine_window(
            d,
            parent.header.time * 1000,
            now_ms(),
            self.config.timeout_ms,
            deputy_count,
        );

        let wake_at = from.max(now_ms() + self.config.min_sleep_ms);
        if !self.sleep_until_or_stop(wake_at, stop).await {
            return Ok(());
        }

        if !self.wait_can_package_tx(to, stop).await {
            return Ok(());
        }

        let block = self.assemble_block(&parent, height)?;
        if !self.publisher.publish(block) {
            return Err(MinerError::PublishFailed);
        }
        Ok(())
    }

    /// Sleeps until `deadline_ms` (wall clock), waking early if `stop`
    /// fires. Returns `false` if cancelled.
    async fn sleep_until_or_stop(&self, deadline_ms: u64, stop: &mut watch::Receiver<bool>) -> bool {
        let now = now_ms();
        if deadline_ms <= now {
            return true;
        }
        let dur = Duration::from_millis(deadline_ms - now);
        tokio::select! {
            _ = sleep(dur) => true,
            _ = stop.changed() => !*stop.borrow(),
        }
    }

    /// Polls the pool every `poll_interval_ms` for packable transactions,
    /// returning early once some appear. Hard-exits (returns `true`, "go
    /// ahead and assemble with whatever's packable now") once `to_ms` is
    /// reached, to yield the slot on schedule. Returns `false` only on
    /// cancellation.
    async fn wait_can_package_tx(&self, to_ms: u64, stop: &mut watch::Receiver<bool>) -> bool {
        loop {
            let now = now_ms();
            if now >= to_ms {
                return true;
            }
            if self.pool.exist_can_package_tx(now / 1000) {
                return true;
            }
            let step = Duration::from_millis(self.config.poll_interval_ms.min(to_ms - now));
            tokio::select! {
                _ = sleep(step) => {}
                _ = stop.changed() => {
                    if *stop.borrow() {
                        return false;
                    }
                }
            }
        }
    }

    fn assemble_block(&self, parent: &Block, height: u32) -> Result<Block, MinerError> {
        let now_secs = now_ms() / 1000;
        let txs = self.pool.pending(self.config.max_txs_per_block, now_secs);

        let store = self.tip.account_store();
        let mut manager = Manager::new(store, parent.hash());

        let mut included = Vec::with_capacity(txs.len());
        for tx in txs {
            if self.executor.execute(&mut manager, &tx) {
                included.push(tx);
            } else {
                self.pool.del_invalid(&tx_pool::tx_hash(&tx));
            }
        }
        manager
            .finalise(height)
            .map_err(|_| MinerError::PublishFailed)?;

        let is_snapshot = self.dm.is_snapshot_block(height);
        let deputy_nodes: Vec<Deputy> = if is_snapshot {
            self.dm.deputies_at_height(height, true).unwrap_or_default()
        } else {
            Vec::new()
        };
        let deputy_root = if is_snapshot {
            merkle_root_of(&deputy_nodes)
        } else {
            [0u8; 32]
        };

        let tx_root = merkle_root_of(&included);
        let log_root = merkle_root_of(manager.logs());

        let header = Header {
            parent_hash: parent.hash(),
            miner_address: self.miner_address(),
            version_root: manager.version_root(),
            tx_root,
            log_root,
            event_root: [0u8; 32],
            bloom: [0u8; 256],
            deputy_root,
            height,
            gas_limit: parent.header.gas_limit,
            gas_used: 0,
            time: now_secs,
            extra: Vec::new(),
        };

        let miner_signature = self.keypair.sign_hash(&header.hash());

        info!(height, txs = included.len(), "assembled block");
        Ok(Block {
            header,
            txs: included,
            change_logs: manager.logs().to_vec(),
            miner_signature,
            confirms: Vec::new(),
            deputy_nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_engine::AccountStore;
    use parking_lot::Mutex as PlMutex;
    use shared_types::{AccountData, ConsensusParams, Transaction, TransactionKind};
    use std::collections::BTreeMap;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use tx_pool::{BlockLookup, TxPoolConfig};

    #[derive(Default)]
    struct MemStore {
        accounts: PlMutex<HashMap<(shared_types::Hash, Address), AccountData>>,
    }

    impl AccountStore for MemStore {
        fn load_account(&self, parent_hash: shared_types::Hash, address: Address) -> Option<AccountData> {
            self.accounts.lock().get(&(parent_hash, address)).cloned()
        }
        fn load_storage(&self, _parent_hash: shared_types::Hash, _address: Address) -> BTreeMap<shared_types::Hash, shared_types::Hash> {
            BTreeMap::new()
        }
        fn load_code(&self, _code_hash: shared_types::Hash) -> Option<Vec<u8>> {
            None
        }
        fn save_accounts(&self, block_hash: shared_types::Hash, accounts: &[AccountData]) {
            let mut guard = self.accounts.lock();
            for acct in accounts {
                guard.insert((block_hash, acct.address), acct.clone());
            }
        }
        fn save_storage(&self, _: shared_types::Hash, _: Address, _: BTreeMap<shared_types::Hash, shared_types::Hash>) {}
        fn save_code(&self, _: shared_types::Hash, _: Vec<u8>) {}
    }

    struct EmptyLookup;
    impl BlockLookup for EmptyLookup {
        fn parent_hash(&self, _: shared_types::Hash) -> Option<shared_types::Hash> {
            None
        }
        fn tx_hashes(&self, _: shared_types::Hash) -> Vec<shared_types::Hash> {
            Vec::new()
        }
        fn height(&self, _: shared_types::Hash) -> Option<u32> {
            None
        }
        fn time(&self, _: shared_types::Hash) -> Option<u64> {
            None
        }
    }

    struct FixedTip {
        parent: Block,
        store: Arc<dyn AccountStore>,
    }
    impl ChainTip for FixedTip {
        fn current_block(&self) -> Block {
            self.parent.clone()
        }
        fn account_store(&self) -> Arc<dyn AccountStore> {
            self.store.clone()
        }
    }

    struct CapturingPublisher {
        captured: StdMutex<Option<Block>>,
    }
    impl BlockPublisher for CapturingPublisher {
        fn publish(&self, block: Block) -> bool {
            *self.captured.lock().unwrap() = Some(block);
            true
        }
    }

    fn genesis_header() -> Header {
        Header {
            parent_hash: [0; 32],
            miner_address: [1; 20],
            version_root: [0; 32],
            tx_root: shared_crypto::merkle_root(&[]),
            log_root: shared_crypto::merkle_root(&[]),
            event_root: [0; 32],
            bloom: [0; 256],
            deputy_root: [0; 32],
            height: 0,
            gas_limit: 10_000_000,
            gas_used: 0,
            time: 0,
            extra: vec![],
        }
    }

    fn setup() -> (Miner, Secp256k1KeyPair, Arc<TxPool>) {
        let keypair = Secp256k1KeyPair::generate();
        let node_id = keypair.node_id();
        let digest = shared_crypto::keccak256(&node_id);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&digest[12..]);

        let dm = Arc::new(DeputyManager::new(ConsensusParams::default()));
        dm.bootstrap_genesis(vec![Deputy { miner_address: addr, node_id, rank: 0, votes: 0 }])
            .unwrap();

        let pool = Arc::new(TxPool::new(TxPoolConfig::for_testing(), Arc::new(EmptyLookup)));
        let store: Arc<dyn AccountStore> = Arc::new(MemStore::default());
        let parent = Block {
            header: genesis_header(),
            txs: vec![],
            change_logs: vec![],
            miner_signature: [0u8; 65],
            confirms: vec![],
            deputy_nodes: vec![],
        };
        let tip = Arc::new(FixedTip { parent, store });
        let publisher = Arc::new(CapturingPublisher { captured: StdMutex::new(None) });

        let miner = Miner::new(
            Secp256k1KeyPair::from_bytes(keypair.to_bytes()).unwrap(),
            dm,
            pool.clone(),
            tip,
            publisher,
            Arc::new(crate::executor::DefaultTxExecutor),
            MinerConfig { timeout_ms: 50, min_sleep_ms: 0, poll_interval_ms: 5, max_txs_per_block: 10 },
        );
        (miner, keypair, pool)
    }

    #[test]
    fn assemble_block_produces_a_signed_block_at_the_next_height() {
        let (miner, _keypair, _pool) = setup();
        let parent = miner.tip.current_block();
        let block = miner.assemble_block(&parent, 1).unwrap();
        assert_eq!(block.height(), 1);
        assert_eq!(block.parent_hash(), parent.hash());
        let recovered = shared_crypto::recover_node_id(&block.header.hash(), &block.miner_signature).unwrap();
        assert_eq!(recovered, miner.keypair.node_id());
    }

    #[tokio::test]
    async fn run_exits_immediately_when_stop_is_already_true() {
        let (miner, _keypair, _pool) = setup();
        let (_tx, rx) = watch::channel(true);
        // Should return promptly rather than looping.
        tokio::time::timeout(Duration::from_millis(500), miner.run(rx))
            .await
            .expect("run should return once stop is observed true");
    }

    #[tokio::test]
    async fn mine_one_publishes_a_block_when_window_is_immediate() {
        let (miner, _keypair, _pool) = setup();
        let (_tx, mut rx) = watch::channel(false);
        miner.mine_one(&mut rx).await.unwrap();
    }

    #[tokio::test]
    async fn ordinary_tx_transfer_is_applied_during_assembly() {
        let (miner, _keypair, pool) = setup();
        let sender = Secp256k1KeyPair::generate();
        let from_digest = shared_crypto::keccak256(&sender.node_id());
        let mut from = [0u8; 20];
        from.copy_from_slice(&from_digest[12..]);

        // Fund the sender directly in the backing store so the transfer succeeds.
        let store = miner.tip.account_store();
        let parent_hash = miner.tip.current_block().hash();
        store.save_accounts(parent_hash, &[AccountData { balance: 500, ..AccountData::empty(from) }]);

        let mut tx = Transaction {
            from,
            to: Some([9; 20]),
            amount: 100,
            gas_price: 1,
            gas_limit: 21_000,
            expiration_time: u64::MAX,
            kind: TransactionKind::Ordinary,
            data: vec![],
            to_name: String::new(),
            message: String::new(),
            chain_id: 1,
            sub_transactions: vec![],
            signature: [0u8; 65],
        };
        let hash = tx_pool::tx_signing_hash(&tx);
        tx.signature = sender.sign_hash(&hash);
        pool.recv(tx, 0).unwrap();

        let parent = miner.tip.current_block();
        let block = miner.assemble_block(&parent, 1).unwrap();
        assert_eq!(block.txs.len(), 1);
        assert_eq!(block.change_logs.len(), 1);
    }
}
