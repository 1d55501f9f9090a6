//! Pure miner-rotation and mine-window arithmetic. See `SPEC_FULL.md` §4.2.

pub mod errors;
pub mod schedule;

pub use errors::SchedulerError;
pub use schedule::{correct_miner, deputy_by_distance, distance, next_mine_window, sleep_time};
