//! Deterministic Merkle-root helpers shared by every crate that needs to
//! commit a list to a single hash (transaction root, change-log root,
//! deputy root). Not a full Merkle tree with membership proofs — the spec's
//! trie/proof machinery is out of scope (`SPEC_FULL.md` §1) — just the root,
//! computed the same way everywhere so header fields are reproducible.

use crate::hashing::keccak256;

/// Root of a list of already-encoded leaves: `Keccak256` of each leaf,
/// folded pairwise bottom-up. An empty list's root is `Keccak256("")`.
pub fn merkle_root(leaves: &[Vec<u8>]) -> [u8; 32] {
    if leaves.is_empty() {
        return keccak256(b"");
    }
    let mut level: Vec<[u8; 32]> = leaves.iter().map(|l| keccak256(l)).collect();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let combined = if pair.len() == 2 {
                [pair[0], pair[1]].concat()
            } else {
                [pair[0], pair[0]].concat()
            };
            next.push(keccak256(&combined));
        }
        level = next;
    }
    level[0]
}

/// Merkle root over items that are bincode-encodable, in the order given
/// (callers are responsible for any required pre-sort).
pub fn merkle_root_of<T: serde::Serialize>(items: &[T]) -> [u8; 32] {
    let leaves: Vec<Vec<u8>> = items
        .iter()
        .map(|item| bincode::serialize(item).expect("encoding a well-formed domain type"))
        .collect();
    merkle_root(&leaves)
}
