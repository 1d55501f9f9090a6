//! Current-tip tie-breaking and common-ancestor computation for fork
//! switches. See `SPEC_FULL.md` §4.8 and Open Question resolution #1.

use shared_types::{Block, Hash};

use crate::ports::ChainDb;

/// Whether `candidate` should replace `current` as the chain's best tip:
/// higher height wins outright; on a height tie, more confirms wins; on a
/// confirms tie, the numerically smaller hash wins (`SPEC_FULL.md` §9,
/// "hash-min is suggested" — made the deterministic rule here).
pub fn should_switch_to(candidate: &Block, current: &Block) -> bool {
    if candidate.height() != current.height() {
        return candidate.height() > current.height();
    }
    if candidate.confirms.len() != current.confirms.len() {
        return candidate.confirms.len() > current.confirms.len();
    }
    candidate.hash() < current.hash()
}

/// The lowest common ancestor of `a` and `b` by walking parent pointers,
/// assuming both chains are fully present in `db` back past their
/// divergence point (true above `stable`, where the DAG is retained).
pub fn common_ancestor(db: &dyn ChainDb, mut a: Hash, mut b: Hash) -> Option<Hash> {
    let mut height_a = db.get_block(a)?.height();
    let mut height_b = db.get_block(b)?.height();

    while height_a > height_b {
        a = db.get_block(a)?.parent_hash();
        height_a -= 1;
    }
    while height_b > height_a {
        b = db.get_block(b)?.parent_hash();
        height_b -= 1;
    }
    while a != b {
        a = db.get_block(a)?.parent_hash();
        b = db.get_block(b)?.parent_hash();
    }
    Some(a)
}

/// The chain of block hashes from just above `ancestor` up to and including
/// `tip`, in ascending (ancestor-to-tip) order — the path `Redo` replays.
pub fn path_from_ancestor(db: &dyn ChainDb, ancestor: Hash, tip: Hash) -> Vec<Hash> {
    let mut path = Vec::new();
    let mut cursor = tip;
    while cursor != ancestor {
        path.push(cursor);
        let Some(block) = db.get_block(cursor) else { break };
        cursor = block.parent_hash();
    }
    path.reverse();
    path
}
