use serde::{Deserialize, Serialize};
use shared_types::ConsensusParams;

/// Tunables for transaction body-verify, layered on top of the
/// consensus-critical `ConsensusParams`. Grounded in the teacher's
/// `qc-06-mempool::MempoolConfig` shape (a `Default` plus a `for_testing`
/// constructor).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxPoolConfig {
    pub consensus: ConsensusParams,
    pub chain_id: u16,
    pub min_gas_price: u128,
    pub max_to_name_len: usize,
    pub max_message_len: usize,
}

impl Default for TxPoolConfig {
    fn default() -> Self {
        Self {
            consensus: ConsensusParams::default(),
            chain_id: 1,
            min_gas_price: 1,
            max_to_name_len: 20,
            max_message_len: 1024,
        }
    }
}

impl TxPoolConfig {
    /// A permissive config for unit tests: no gas-price floor, same chain id
    /// convention as `Default`.
    pub fn for_testing() -> Self {
        Self {
            min_gas_price: 0,
            ..Self::default()
        }
    }
}
