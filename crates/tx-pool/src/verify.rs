use shared_crypto::{keccak256, recover_node_id};
use shared_types::{Address, Hash, Header, Transaction, TransactionKind};

use crate::config::TxPoolConfig;
use crate::errors::TxBodyError;

/// Hash of a transaction's signable body (everything but the signature
/// itself), used both to recover the signer and to key the pool's maps.
pub fn tx_signing_hash(tx: &Transaction) -> [u8; 32] {
    let mut unsigned = tx.clone();
    unsigned.signature = [0u8; 65];
    keccak256(&bincode::serialize(&unsigned).expect("transaction is always encodable"))
}

/// The pool's hash identity for a transaction, over its full encoded form
/// (including signature), so that a resigned-but-otherwise-identical
/// transaction is tracked separately.
pub fn tx_hash(tx: &Transaction) -> [u8; 32] {
    keccak256(&bincode::serialize(tx).expect("transaction is always encodable"))
}

/// Block identity used to key the in-block index. Delegates to
/// `Header::hash`, the canonical block hash every crate agrees on.
pub fn block_hash(header: &Header) -> Hash {
    header.hash()
}

fn sender_address(node_id: &[u8; 64]) -> Address {
    let digest = keccak256(node_id);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&digest[12..]);
    addr
}

/// Stateless verification of a transaction's body. Does not touch pool
/// state or account balances — purely a function of the transaction and
/// the current wall-clock time, so it may run in parallel (`rayon`,
/// `SPEC_FULL.md` §5).
pub fn verify_tx_body(tx: &Transaction, now_secs: u64, cfg: &TxPoolConfig) -> Result<(), TxBodyError> {
    if tx.chain_id != cfg.chain_id {
        return Err(TxBodyError::TxChainID);
    }

    let signing_hash = tx_signing_hash(tx);
    let recovered = recover_node_id(&signing_hash, &tx.signature).map_err(|_| TxBodyError::InvalidSig)?;
    if sender_address(&recovered) != tx.from {
        return Err(TxBodyError::InvalidSig);
    }

    if tx.expiration_time <= now_secs {
        return Err(TxBodyError::TxExpired);
    }
    if tx.expiration_time - now_secs > cfg.consensus.tx_expiration_max_secs {
        return Err(TxBodyError::TxExpiration);
    }

    if tx.gas_price < cfg.min_gas_price {
        return Err(TxBodyError::GasPrice);
    }

    if tx.to_name.len() > cfg.max_to_name_len {
        return Err(TxBodyError::ToNameLength);
    }
    if !tx.to_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(TxBodyError::ToNameCharacter);
    }
    if tx.message.len() > cfg.max_message_len {
        return Err(TxBodyError::TxMessage);
    }

    match tx.kind {
        TransactionKind::CreateContract => {
            if tx.to.is_some() || tx.data.is_empty() {
                return Err(TxBodyError::CreateContract);
            }
        }
        TransactionKind::RegisterCandidate | TransactionKind::Vote | TransactionKind::Asset => {
            if tx.data.is_empty() {
                return Err(TxBodyError::SpecialTx);
            }
        }
        TransactionKind::Box => {
            if tx.sub_transactions.is_empty() {
                return Err(TxBodyError::BoxTx);
            }
            for sub in &tx.sub_transactions {
                if sub.is_box_tx() {
                    return Err(TxBodyError::BoxTx); // a box cannot nest another box
                }
                if sub.expiration_time > tx.expiration_time {
                    return Err(TxBodyError::BoxTx);
                }
                verify_tx_body(sub, now_secs, cfg).map_err(|_| TxBodyError::VerifyBoxTx)?;
            }
        }
        TransactionKind::Ordinary => {}
    }

    Ok(())
}

/// Verify a batch of transactions in parallel (`rayon`), returning the
/// indices and errors of those that fail.
pub fn verify_tx_batch(txs: &[Transaction], now_secs: u64, cfg: &TxPoolConfig) -> Vec<(usize, TxBodyError)> {
    use rayon::prelude::*;
    txs.par_iter()
        .enumerate()
        .filter_map(|(i, tx)| verify_tx_body(tx, now_secs, cfg).err().map(|e| (i, e)))
        .collect()
}
