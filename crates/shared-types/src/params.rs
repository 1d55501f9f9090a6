//! Protocol constants, grouped into a config struct the way
//! `qc-17-block-production::config::BlockProductionConfig` groups its tunables.
//!
//! These are consensus-critical: every node must agree on them, so unlike
//! `BlockProductionConfig` (a local node preference) `ConsensusParams` is part
//! of genesis configuration rather than a CLI flag set. See `SPEC_FULL.md` §6.

use serde::{Deserialize, Serialize};

/// Consensus-critical protocol parameters. Loaded from the genesis file and
/// shared by every crate that needs to reason about term/snapshot boundaries,
/// gas accounting, or transaction expiration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusParams {
    /// Block-height span of one term. Snapshot heights are multiples of
    /// `interim_duration`; term boundaries are computed from the snapshot
    /// at `height - interim_duration`.
    pub term_duration: u32,
    /// Spacing, in blocks, between snapshot blocks.
    pub interim_duration: u32,
    /// Maximum length, in bytes, of `Header::extra`.
    pub max_extra_data_len: usize,
    /// Target committee size. `deputiesAtHeight` truncates to this many
    /// deputies even if a snapshot records more.
    pub total_count: u32,
    /// Base gas cost of an ordinary transaction.
    pub tx_gas: u64,
    /// Additional gas cost per non-zero byte of transaction data.
    pub tx_data_non_zero_gas: u64,
    /// Maximum allowed `expiration_time - current_time`, in seconds.
    pub tx_expiration_max_secs: u64,
    /// How long a `tx-pool` "recent" entry is kept to prevent double-inclusion
    /// across reorgs, in seconds.
    pub transaction_time_out_secs: u64,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            term_duration: 3_600_000,
            interim_duration: 1_000,
            max_extra_data_len: 256,
            total_count: 5,
            tx_gas: 21_000,
            tx_data_non_zero_gas: 68,
            tx_expiration_max_secs: 1_800,
            transaction_time_out_secs: 10,
        }
    }
}
