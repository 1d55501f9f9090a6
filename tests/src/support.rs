//! Shared fixtures for the cross-crate scenarios: a synthetic committee of
//! `N` deputies, each with its own keypair and `Confirmer`, wired to one
//! shared `Chain`/`MemoryChainDb`. Mirrors the single-deputy `setup()` helper
//! in `chain::chain`'s own tests, generalized to `N` deputies and exposing
//! the non-chain-owned confirmers so a test can simulate the rest of the
//! committee gossiping their signatures in.

use std::sync::Arc;

use account_engine::Manager;
use deputy_manager::DeputyManager;
use scheduler::correct_miner;
use shared_crypto::{keccak256, merkle_root, merkle_root_of, Secp256k1KeyPair};
use shared_types::{
    Address, AccountData, Block, ChangeLog, ConsensusParams, Deputy, Hash, Header, Transaction, TransactionKind,
};

use chain::adapters::memory::MemoryChainDb;
use chain::ports::ChainDb;
use chain::Chain;
use confirmer::Confirmer;
use tx_pool::{tx_signing_hash, TxPool, TxPoolConfig};

pub fn node_id_to_address(node_id: &[u8; 64]) -> Address {
    let digest = keccak256(node_id);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&digest[12..]);
    addr
}

/// One synthetic deputy: its committee entry plus the raw secret backing it
/// (kept separately since `Secp256k1KeyPair` isn't `Clone`).
pub struct Member {
    pub address: Address,
    pub secret: [u8; 32],
}

impl Member {
    pub fn keypair(&self) -> Secp256k1KeyPair {
        Secp256k1KeyPair::from_bytes(self.secret).expect("round-tripping our own secret never fails")
    }
}

pub struct Committee {
    pub members: Vec<Member>,
    pub deputies: Vec<Deputy>,
    pub dm: Arc<DeputyManager>,
}

pub fn build_committee(n: u32, consensus: ConsensusParams) -> Committee {
    let members: Vec<Member> = (0..n)
        .map(|_| {
            let keypair = Secp256k1KeyPair::generate();
            Member { address: node_id_to_address(&keypair.node_id()), secret: keypair.to_bytes() }
        })
        .collect();
    let deputies: Vec<Deputy> = members
        .iter()
        .enumerate()
        .map(|(i, m)| Deputy { miner_address: m.address, node_id: m.keypair().node_id(), rank: i as u32, votes: 0 })
        .collect();

    let dm = Arc::new(DeputyManager::new(consensus));
    dm.bootstrap_genesis(deputies.clone()).expect("genesis committee is non-empty");

    Committee { members, deputies, dm }
}

impl Committee {
    pub fn member_for(&self, address: Address) -> &Member {
        self.members.iter().find(|m| m.address == address).expect("address is a committee member")
    }
}

pub fn genesis_block() -> Block {
    let header = Header {
        parent_hash: [0; 32],
        miner_address: [0; 20],
        version_root: merkle_root_of::<ChangeLog>(&[]),
        tx_root: merkle_root_of::<Transaction>(&[]),
        log_root: merkle_root_of::<ChangeLog>(&[]),
        event_root: [0; 32],
        bloom: [0; 256],
        deputy_root: [0; 32],
        height: 0,
        gas_limit: 1_000_000,
        gas_used: 0,
        time: 1_000,
        extra: vec![],
    };
    Block { header, txs: vec![], change_logs: vec![], miner_signature: [0; 65], confirms: vec![], deputy_nodes: vec![] }
}

/// Builds the next block after `parent`, mined `distance_loops` mine-windows
/// after it, signed by whichever committee member that slot resolves to.
pub fn next_block(committee: &Committee, timeout_ms: u64, parent: &Block, distance_loops: u64) -> Block {
    let mine_time_ms = parent.header.time * 1000 + distance_loops * timeout_ms;
    let miner_address = correct_miner(&committee.dm, &parent.header, mine_time_ms, timeout_ms)
        .expect("a committee of this size always has a correct miner for any slot");
    let keypair = committee.member_for(miner_address).keypair();

    let header = Header {
        parent_hash: parent.hash(),
        miner_address,
        version_root: merkle_root_of::<ChangeLog>(&[]),
        tx_root: merkle_root(&[]),
        log_root: merkle_root_of::<ChangeLog>(&[]),
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
    Block { header, txs: vec![], change_logs: vec![], miner_signature: sig, confirms: vec![], deputy_nodes: vec![] }
}

/// One persistent `Confirmer` per committee member. Kept alive for the whole
/// test (not rebuilt per round) since `Confirmer::need_confirm`'s "same fork"
/// fast path depends on remembering the last block this identity signed.
pub fn build_confirmers(committee: &Committee) -> Vec<Arc<Confirmer>> {
    committee.members.iter().map(|m| Arc::new(Confirmer::new(m.keypair()))).collect()
}

/// Builds a `Chain` whose own auto-confirming identity is `confirmers[0]`
/// (the same `Arc`, so signatures it produces during `insert` update the
/// same `last_sig` state a test can also observe/drive directly).
pub fn build_chain(committee: &Committee, confirmers: &[Arc<Confirmer>], timeout_ms: u64) -> (Arc<Chain>, Arc<MemoryChainDb>) {
    let db = Arc::new(MemoryChainDb::new());
    let pool = Arc::new(TxPool::new(TxPoolConfig::for_testing(), db.clone()));

    let chain = Arc::new(Chain::new(
        db.clone(),
        db.clone(),
        committee.dm.clone(),
        pool,
        TxPoolConfig::for_testing(),
        confirmers[0].clone(),
        timeout_ms,
        genesis_block(),
    ));
    (chain, db)
}

/// Has every committee member other than index 0 (the chain's own identity,
/// already auto-confirmed during `insert`) sign the block at `hash` if
/// eligible, and feeds the resulting signatures back into `chain`. `hash`
/// need not be the current tip — any block already admitted to `db`.
pub fn drive_remaining_confirms(
    committee: &Committee,
    confirmers: &[Arc<Confirmer>],
    chain: &Chain,
    db: &MemoryChainDb,
    hash: Hash,
) -> usize {
    let Some(block) = db.get_block(hash) else { return 0 };
    let stable_height = db.stable_height();
    let mut sigs = Vec::new();
    for confirmer in confirmers.iter().skip(1) {
        if let Some(sig) = confirmer.try_confirm(&committee.dm, &block, stable_height) {
            sigs.push(sig);
        }
    }
    chain.receive_confirms(hash, &sigs).unwrap_or(0)
}

/// Like `next_block`, but carries a single signed `Ordinary` transfer and has
/// its `version_root`/`log_root`/`change_logs` filled in by running the
/// transfer through `account_engine::Manager`, the way `chain::chain`'s own
/// `ordinary_transfer_is_reflected_in_saved_state` test builds a block.
pub fn next_block_with_transfer(
    committee: &Committee,
    timeout_ms: u64,
    parent: &Block,
    distance_loops: u64,
    db: &Arc<MemoryChainDb>,
    sender_keypair: &Secp256k1KeyPair,
    sender: Address,
    receiver: Address,
    amount: u128,
) -> Block {
    let mut block = next_block(committee, timeout_ms, parent, distance_loops);

    let mut tx = Transaction {
        from: sender,
        to: Some(receiver),
        amount,
        gas_price: 1,
        gas_limit: 21_000,
        expiration_time: block.header.time + 1_000,
        kind: TransactionKind::Ordinary,
        data: vec![],
        to_name: String::new(),
        message: String::new(),
        chain_id: 1,
        sub_transactions: vec![],
        signature: [0; 65],
    };
    tx.signature = sender_keypair.sign_hash(&tx_signing_hash(&tx));
    block.txs = vec![tx.clone()];
    block.header.tx_root = merkle_root_of(&block.txs);

    let mut manager = Manager::new(db.clone(), block.parent_hash());
    manager.transfer(tx.from, receiver, tx.amount).expect("sender has sufficient balance");
    manager.finalise(block.height()).expect("finalise never fails for a single transfer");
    block.header.log_root = merkle_root_of(manager.logs());
    block.header.version_root = manager.version_root();
    block.change_logs = manager.logs().to_vec();

    let keypair = committee.member_for(block.header.miner_address).keypair();
    block.miner_signature = keypair.sign_hash(&block.header.hash());
    block
}

/// Funds `address` with `balance` as of `block_hash`, the way a test seeds a
/// sender's starting balance before replaying a transfer against it.
pub fn fund_account(db: &MemoryChainDb, block_hash: Hash, address: Address, balance: u128) {
    db.set_accounts(block_hash, &[AccountData { balance, ..AccountData::empty(address) }]);
}
