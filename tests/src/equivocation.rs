//! Scenario 3 (`SPEC_FULL.md` §8): the same deputy signs two distinct block
//! bodies for the same height and mine-window slot. Both are independently
//! well-formed from `block_validator::verify_before_tx_process`'s point of
//! view (same scheduled miner, same parent, correctly signed) — the only way
//! to tell them apart is `judge_deputy` noticing one signer produced two
//! different hashes at the same height.

use std::sync::Arc;

use block_validator::{judge_deputy, verify_before_tx_process};
use chain::adapters::memory::MemoryChainDb;
use shared_types::ConsensusParams;
use tx_pool::{TxPool, TxPoolConfig};

use crate::support::{build_committee, genesis_block, next_block};

#[test]
fn same_deputy_signing_two_bodies_at_one_height_is_flagged() {
    let committee = build_committee(3, ConsensusParams { total_count: 3, ..ConsensusParams::default() });
    let timeout_ms = 1_000;
    let genesis = genesis_block();

    let x = next_block(&committee, timeout_ms, &genesis, 1);

    // Y: same parent, same mine-window slot (so the same deputy is scheduled
    // to mine it), different body.
    let mut y = x.clone();
    y.header.extra = vec![0xEE];
    let miner = committee.member_for(x.header.miner_address).keypair();
    y.miner_signature = miner.sign_hash(&y.header.hash());

    assert_ne!(x.hash(), y.hash());
    assert_eq!(x.header.miner_address, y.header.miner_address);

    let db = Arc::new(MemoryChainDb::new());
    let pool = TxPool::new(TxPoolConfig::for_testing(), db);
    assert!(verify_before_tx_process(&committee.dm, &genesis.header, &x, &pool, &TxPoolConfig::for_testing(), x.header.time, timeout_ms).is_ok());
    assert!(verify_before_tx_process(&committee.dm, &genesis.header, &y, &pool, &TxPoolConfig::for_testing(), y.header.time, timeout_ms).is_ok());

    assert!(judge_deputy(&[&x], &y));
    assert!(judge_deputy(&[&y], &x));
}

#[test]
fn judge_deputy_ignores_a_different_signer() {
    let committee = build_committee(3, ConsensusParams { total_count: 3, ..ConsensusParams::default() });
    let timeout_ms = 1_000;
    let genesis = genesis_block();

    let x = next_block(&committee, timeout_ms, &genesis, 1);
    let y = next_block(&committee, timeout_ms, &genesis, 2); // a different slot, different miner

    assert_ne!(x.header.miner_address, y.header.miner_address);
    assert!(!judge_deputy(&[&x], &y));
}
