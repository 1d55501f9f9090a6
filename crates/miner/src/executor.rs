//! Transaction execution against the account engine. Full EVM/contract
//! execution is out of scope (`SPEC_FULL.md` §1 Non-goals); this port lets
//! the miner assemble blocks against whatever execution semantics a given
//! deployment plugs in, while still shipping a working default for the
//! built-in transaction kinds this core understands.

use account_engine::Manager;
use shared_types::{Transaction, TransactionKind};

/// Applies one transaction's effects to `manager`, producing change-logs as
/// a side effect. Returns whether the transaction succeeded; a failed
/// transaction is dropped from the block but does not abort assembly
/// (`SPEC_FULL.md` §7: "per-tx failures during execution ... tx is marked
/// invalid but the block continues").
pub trait TxExecutor: Send + Sync {
    fn execute(&self, manager: &mut Manager, tx: &Transaction) -> bool;
}

/// Executes `Ordinary` value transfers directly; every other transaction
/// kind (contract creation, candidate registration, voting, assets, boxes)
/// is accepted into the pool's body-verify stage but has no state-changing
/// effect here, since their semantics depend on contract execution this
/// core does not implement.
pub struct DefaultTxExecutor;

impl TxExecutor for DefaultTxExecutor {
    fn execute(&self, manager: &mut Manager, tx: &Transaction) -> bool {
        match tx.kind {
            TransactionKind::Ordinary => {
                let Some(to) = tx.to else { return false };
                manager.transfer(tx.from, to, tx.amount).is_ok()
            }
            _ => true,
        }
    }
}
