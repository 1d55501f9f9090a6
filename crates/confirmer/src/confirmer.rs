use parking_lot::Mutex;
use shared_crypto::{recover_node_id, Secp256k1KeyPair};
use shared_types::{Block, ConsensusParams, Hash, SignData};

use deputy_manager::DeputyManager;

use crate::ports::ConfirmStore;
use crate::threshold::{required_confirms, two_third_deputy_count};

/// The highest block this node has signed on its current fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LastSig {
    height: u32,
    hash: Hash,
}

/// Per-deputy block signing and stable-height promotion. See `SPEC_FULL.md`
/// §4.6. One `Confirmer` per node identity; forks do not share state because
/// `last_sig` tracks "the highest block signed on my current fork", which is
/// fork-relative by construction.
pub struct Confirmer {
    keypair: Secp256k1KeyPair,
    last_sig: Mutex<LastSig>,
}

impl Confirmer {
    pub fn new(keypair: Secp256k1KeyPair) -> Self {
        Self {
            keypair,
            last_sig: Mutex::new(LastSig { height: 0, hash: [0; 32] }),
        }
    }

    /// Whether this node should sign `block`, given the deputy set at its
    /// height and the chain's current stable height.
    pub fn need_confirm(&self, dm: &DeputyManager, block: &Block, stable_height: u32) -> bool {
        let node_id = self.keypair.node_id();
        if dm.deputy_by_node_id(block.height(), &node_id).is_err() {
            return false;
        }

        let n = match dm.deputy_count(block.height()) {
            Ok(n) => n,
            Err(_) => return false,
        };
        if block.confirms.len() as u32 >= required_confirms(n) {
            return false;
        }

        let last = *self.last_sig.lock();
        let same_fork = block.parent_hash() == last.hash;
        // Strict `>` (not `>=`) avoids committing to a new block exactly at
        // the switch boundary, per `SPEC_FULL.md` §4.6.
        let far_enough_past =
            block.height() > std::cmp::max(last.height, stable_height) + two_third_deputy_count(n);

        same_fork || far_enough_past
    }

    /// If `need_confirm`, sign `block.hash()` and record this as the new
    /// `last_sig`. Returns `None` if this node shouldn't sign, or already
    /// has (the signature would duplicate an existing confirm).
    pub fn try_confirm(&self, dm: &DeputyManager, block: &Block, stable_height: u32) -> Option<SignData> {
        if !self.need_confirm(dm, block, stable_height) {
            return None;
        }
        let hash = block.hash();
        let sig = self.keypair.sign_hash(&hash);
        if block.is_confirm_exist(&sig) {
            return None;
        }
        *self.last_sig.lock() = LastSig { height: block.height(), hash };
        Some(sig)
    }

    /// Walk `[from, to]`; for each canonical block not yet signed by this
    /// node with insufficient confirms, sign and persist immediately.
    pub fn batch_confirm_stable(
        &self,
        dm: &DeputyManager,
        store: &dyn ConfirmStore,
        from: u32,
        to: u32,
    ) {
        for height in from..=to {
            let Some(block) = store.load_canonical_block(height) else {
                continue;
            };
            let stable_height = store.stable_height();
            if let Some(sig) = self.try_confirm(dm, &block, stable_height) {
                store.append_confirm(block.hash(), sig);
            }
        }
    }

    /// Whether a block has accumulated enough confirms to be stable.
    pub fn is_stable(&self, block: &Block, deputy_count: u32) -> bool {
        block.confirms.len() as u32 >= required_confirms(deputy_count)
    }

    /// The NodeID a verifier can use to identify confirms from this node.
    pub fn node_id(&self) -> shared_types::NodeId {
        self.keypair.node_id()
    }
}

/// Recover the deputy NodeID that produced `sig` over `block.hash()`.
pub fn confirm_signer(block: &Block, sig: &SignData) -> Option<shared_types::NodeId> {
    recover_node_id(&block.hash(), sig).ok()
}
