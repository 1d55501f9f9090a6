use std::collections::HashSet;

use deputy_manager::DeputyManager;
use scheduler::correct_miner;
use shared_crypto::{merkle_root_of, recover_node_id};
use shared_types::{Block, Header, SignData};
use tx_pool::{verify_tx_body, TxPool, TxPoolConfig};

use crate::errors::{ConfirmError, ValidatorError};

const CLOCK_SKEW_TOLERANCE_SECS: u64 = 1;

/// Checks performable before transaction execution: header shape, signer
/// identity, tx-pool admissibility. See `SPEC_FULL.md` §4.5.
pub fn verify_before_tx_process(
    dm: &DeputyManager,
    parent: &Header,
    block: &Block,
    pool: &TxPool,
    pool_cfg: &TxPoolConfig,
    now_secs: u64,
    timeout_ms: u64,
) -> Result<(), ValidatorError> {
    if block.header.parent_hash != parent.hash() {
        return Err(ValidatorError::BlockNotExist);
    }

    let node_id =
        recover_node_id(&block.header.hash(), &block.miner_signature)
            .map_err(|_| ValidatorError::VerifyHeaderFailed)?;
    let signer = dm
        .deputy_by_node_id(block.height(), &node_id)
        .map_err(|_| ValidatorError::VerifyHeaderFailed)?;
    if signer.miner_address != block.header.miner_address {
        return Err(ValidatorError::VerifyHeaderFailed);
    }

    let computed_tx_root = merkle_root_of(&block.txs);
    if computed_tx_root != block.header.tx_root {
        return Err(ValidatorError::VerifyHeaderFailed);
    }

    if !pool.verify_tx_in_block(block) {
        return Err(ValidatorError::InvalidTxInBlock);
    }
    for tx in &block.txs {
        if verify_tx_body(tx, now_secs, pool_cfg).is_err() {
            return Err(ValidatorError::InvalidTxInBlock);
        }
    }

    if block.header.height != parent.height + 1 {
        return Err(ValidatorError::VerifyHeaderFailed);
    }

    if block.header.time > now_secs + CLOCK_SKEW_TOLERANCE_SECS {
        return Err(ValidatorError::VerifyHeaderFailed);
    }

    if block.header.extra.len() > dm.params().max_extra_data_len {
        return Err(ValidatorError::VerifyHeaderFailed);
    }

    let expected_miner = correct_miner(dm, parent, block.header.time * 1000, timeout_ms)
        .map_err(|_| ValidatorError::VerifyHeaderFailed)?;
    if expected_miner != block.header.miner_address {
        return Err(ValidatorError::VerifyHeaderFailed);
    }

    Ok(())
}

/// Checks performable only once the executor has recomputed the block's
/// body: deputy root (snapshot heights only), log root, and the overall
/// hash. `computed` is freshly assembled from local execution; `received`
/// is what arrived over the wire (or what the miner intends to publish).
pub fn verify_after_tx_process(
    dm: &DeputyManager,
    computed: &Block,
    received: &Block,
) -> Result<(), ValidatorError> {
    if dm.is_snapshot_block(received.height()) {
        let computed_deputy_root = merkle_root_of(&computed.deputy_nodes);
        if computed_deputy_root != received.header.deputy_root {
            return Err(ValidatorError::VerifyBlockFailed);
        }
        if computed.deputy_nodes != received.deputy_nodes {
            return Err(ValidatorError::VerifyBlockFailed);
        }
    }

    let computed_log_root = merkle_root_of(&computed.change_logs);
    if computed_log_root != received.header.log_root {
        return Err(ValidatorError::VerifyBlockFailed);
    }
    if computed.change_logs != received.change_logs {
        return Err(ValidatorError::VerifyBlockFailed);
    }

    if computed.header.hash() != received.header.hash() {
        return Err(ValidatorError::VerifyBlockFailed);
    }

    Ok(())
}

/// Validate a batch of new confirm signatures against a block. Returns the
/// subset that are valid (new deputy signatures not already present) plus
/// the last error encountered, if any, so the caller can score the peer
/// that sent the packet without discarding the whole batch.
pub fn verify_new_confirms(
    dm: &DeputyManager,
    block: &Block,
    new_sigs: &[SignData],
) -> (Vec<SignData>, Option<ConfirmError>) {
    let block_hash = block.header.hash();
    let mut accepted = Vec::new();
    let mut seen: HashSet<SignData> = block.confirms.iter().copied().collect();
    let mut last_error = None;

    for sig in new_sigs {
        if seen.contains(sig) {
            last_error = Some(ConfirmError::ExistedConfirm);
            continue;
        }
        let node_id = match recover_node_id(&block_hash, sig) {
            Ok(id) => id,
            Err(_) => {
                last_error = Some(ConfirmError::InvalidSignedConfirmInfo);
                continue;
            }
        };
        if dm.deputy_by_node_id(block.height(), &node_id).is_err() {
            last_error = Some(ConfirmError::InvalidConfirmSigner);
            continue;
        }
        seen.insert(*sig);
        accepted.push(*sig);
    }

    (accepted, last_error)
}

/// Whether `new_block` is an equivocation: some other block already seen at
/// the same height, signed by the same deputy. `unconfirmed` is the set of
/// candidate blocks currently tracked in the DAG above `stable`.
pub fn judge_deputy(unconfirmed: &[&Block], new_block: &Block) -> bool {
    let new_hash = new_block.header.hash();
    let new_signer = match recover_node_id(&new_hash, &new_block.miner_signature) {
        Ok(id) => id,
        Err(_) => return false,
    };

    for other in unconfirmed {
        if other.height() != new_block.height() {
            continue;
        }
        let other_hash = other.header.hash();
        if other_hash == new_hash {
            continue;
        }
        if let Ok(other_signer) = recover_node_id(&other_hash, &other.miner_signature) {
            if other_signer == new_signer {
                tracing::warn!(height = new_block.height(), "equivocation detected");
                return true;
            }
        }
    }
    false
}
