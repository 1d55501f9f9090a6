/// Tunables for the miner loop. See `SPEC_FULL.md` §4.7.
#[derive(Debug, Clone, Copy)]
pub struct MinerConfig {
    /// Width of one deputy's mine-window slot, milliseconds.
    pub timeout_ms: u64,
    /// Minimum spacing enforced between this node's own consecutive
    /// blocks, milliseconds.
    pub min_sleep_ms: u64,
    /// How often `wait_can_package_tx` polls the pool, milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum transactions pulled into one block.
    pub max_txs_per_block: usize,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            min_sleep_ms: 1_000,
            poll_interval_ms: 100,
            max_txs_per_block: 1_000,
        }
    }
}
