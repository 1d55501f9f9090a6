//! Scenario 1 (`SPEC_FULL.md` §8): committee of 3, blocks mined in rotation
//! through height 10. Confirms from the two non-mining identities are
//! gossiped in one round behind block production, the way a real network's
//! confirm messages trail the block that triggered them — so every block
//! settles to stable exactly one block after it collects its third confirm,
//! and `current == stable + 1` holds at every steady-state point in between.

use shared_types::ConsensusParams;

use crate::support::{build_chain, build_committee, build_confirmers, drive_remaining_confirms, next_block};

#[tokio::test]
async fn committee_of_three_settles_one_block_behind_current() {
    let timeout_ms = 1_000;
    let committee = build_committee(3, ConsensusParams { total_count: 3, ..ConsensusParams::default() });
    let confirmers = build_confirmers(&committee);
    let (chain, db) = build_chain(&committee, &confirmers, timeout_ms);

    let mut blocks = vec![chain.current_block()];
    let mut prev_hash = None;

    for _ in 1..=10u32 {
        let block = next_block(&committee, timeout_ms, blocks.last().unwrap(), 1);
        chain.insert(block.clone(), block.header.time).await.unwrap();
        let hash = block.hash();
        blocks.push(block);

        if let Some(h) = prev_hash {
            drive_remaining_confirms(&committee, &confirmers, &chain, &db, h);
        }
        prev_hash = Some(hash);
    }

    assert_eq!(chain.current_block().height(), 10);
    assert_eq!(chain.stable_block().height(), 9, "the 10th block's confirms haven't been gossiped yet");

    drive_remaining_confirms(&committee, &confirmers, &chain, &db, prev_hash.unwrap());
    assert_eq!(chain.stable_block().height(), 10);
    assert_eq!(chain.stable_block().hash(), prev_hash.unwrap());
}
