//! Scenario 2 (`SPEC_FULL.md` §8): two deputies mine competing children of the
//! same block. The fork that falls behind is abandoned outright once the
//! other pulls ahead in height (`forkmanager::should_switch_to` — height wins
//! before confirms or hash are ever consulted), and each fork's account
//! effects stay keyed to its own block hashes (`MemoryChainDb` never shares
//! state across forks) while still being reachable from every *descendant*
//! of the block that wrote them — `sender`'s balance is checked at x6, x7,
//! and x8 (not just where the transfer landed) to pin down ordinary
//! single-chain continuity, not only the fork switch itself.
//!
//! Note: a transaction included only on the losing fork does not
//! automatically reappear in the pool once that fork is abandoned —
//! `tx_pool::TxPool` has no republish-on-revert path, so this test does not
//! assert that behavior.

use chain::ports::ChainDb;
use shared_crypto::Secp256k1KeyPair;
use shared_types::ConsensusParams;

use crate::support::{build_chain, build_committee, fund_account, next_block, next_block_with_transfer, node_id_to_address};

#[tokio::test]
async fn longer_fork_wins_and_keeps_its_own_account_effects() {
    let timeout_ms = 1_000;
    let committee = build_committee(3, ConsensusParams { total_count: 3, ..ConsensusParams::default() });
    let confirmers = crate::support::build_confirmers(&committee);
    let (chain, db) = build_chain(&committee, &confirmers, timeout_ms);

    let sender_keypair = Secp256k1KeyPair::generate();
    let sender = node_id_to_address(&sender_keypair.node_id());
    let receiver = [9u8; 20];

    let genesis = chain.current_block();
    fund_account(&db, genesis.hash(), sender, 500);

    // Grow a shared trunk up to height 5.
    let mut trunk = genesis;
    for _ in 1..=5u32 {
        let block = next_block(&committee, timeout_ms, &trunk, 1);
        chain.insert(block.clone(), block.header.time).await.unwrap();
        trunk = block;
    }
    let base = trunk;
    assert_eq!(base.height(), 5);

    // X-fork: base -> x6 (carries the transfer) -> x7 -> x8.
    let x6 = next_block_with_transfer(&committee, timeout_ms, &base, 1, &db, &sender_keypair, sender, receiver, 200);
    chain.insert(x6.clone(), x6.header.time).await.unwrap();
    let x7 = next_block(&committee, timeout_ms, &x6, 1);
    chain.insert(x7.clone(), x7.header.time).await.unwrap();
    let x8 = next_block(&committee, timeout_ms, &x7, 1);
    chain.insert(x8.clone(), x8.header.time).await.unwrap();

    assert_eq!(chain.current_block().height(), 8);
    assert_eq!(chain.current_block().hash(), x8.hash());

    // The transfer landed at x6; every descendant on the same fork must
    // still see its effect, not just x6 itself.
    for hash in [x6.hash(), x7.hash(), x8.hash()] {
        let receiver_state = db.get_account(hash, receiver).expect("transfer is visible from every x-fork descendant");
        assert_eq!(receiver_state.balance, 200);
        let sender_state = db.get_account(hash, sender).expect("sender's account survives blocks that don't touch it");
        assert_eq!(sender_state.balance, 300, "sender's post-transfer balance must persist, not reset at untouched blocks");
    }

    // Y-fork: base -> y6 (different mine-window slot, no transfer) -> y7 -> y8 -> y9.
    let y6 = next_block(&committee, timeout_ms, &base, 2);
    assert_ne!(y6.header.miner_address, x6.header.miner_address, "a genuine fork, not a replay of x6's slot");
    chain.insert(y6.clone(), y6.header.time).await.unwrap();
    let y7 = next_block(&committee, timeout_ms, &y6, 1);
    chain.insert(y7.clone(), y7.header.time).await.unwrap();
    let y8 = next_block(&committee, timeout_ms, &y7, 1);
    chain.insert(y8.clone(), y8.header.time).await.unwrap();

    // y8 ties x8 on height; whichever the tie-break favors, the fork only
    // becomes unambiguously longer once y9 lands.
    let y9 = next_block(&committee, timeout_ms, &y8, 1);
    chain.insert(y9.clone(), y9.header.time).await.unwrap();

    assert_eq!(chain.current_block().height(), 9);
    assert_eq!(chain.current_block().hash(), y9.hash(), "the taller fork wins outright");

    // The y-fork is a genuinely separate history — `receiver` was never
    // touched on it, distinct from the continuity bug this test otherwise
    // guards against.
    assert!(db.get_account(y9.hash(), receiver).is_none());
    assert!(db.get_account(y6.hash(), receiver).is_none());

    // The x-fork's own bookkeeping is untouched by the switch, at its tip
    // (the block actually abandoned) as well as where the transfer landed.
    for hash in [x6.hash(), x7.hash(), x8.hash()] {
        let receiver_state = db.get_account(hash, receiver).expect("x-fork state survives being abandoned");
        assert_eq!(receiver_state.balance, 200);
    }
}
