//! Pure functions over the deputy manager: miner-distance arithmetic and
//! mine-window time bookkeeping. See `SPEC_FULL.md` §4.2.

use deputy_manager::DeputyManager;
use shared_types::{Address, Header};

use crate::errors::SchedulerError;

/// `distance(parent_miner, target_miner, H) -> 1..N`.
///
/// On reward blocks and the first block of the chain, rotation resets to
/// `target.rank + 1`. Otherwise the unified modulo form is used uniformly,
/// including when `target_miner == parent_miner` (which lands on `N`, the
/// full-loop case), per the Design Note in `SPEC_FULL.md` §9.
pub fn distance(
    dm: &DeputyManager,
    parent_miner: Address,
    target_miner: Address,
    height: u32,
) -> Result<u32, SchedulerError> {
    if height == 0 {
        return Err(SchedulerError::MineGenesis);
    }
    let deputies = dm.deputies_at_height(height, false)?;
    let n = deputies.len() as i64;

    let target_rank = deputies
        .iter()
        .find(|d| d.miner_address == target_miner)
        .map(|d| d.rank as i64)
        .ok_or(SchedulerError::NotDeputy)?;

    if height == 1 || dm.is_reward_block(height) {
        return Ok((target_rank + 1) as u32);
    }

    let parent_rank = deputies
        .iter()
        .find(|d| d.miner_address == parent_miner)
        .map(|d| d.rank as i64)
        .ok_or(SchedulerError::NotDeputy)?;

    let diff = (target_rank - parent_rank).rem_euclid(n);
    Ok(if diff == 0 { n as u32 } else { diff as u32 })
}

/// Inverse of `distance`: the deputy `d` slots away from `parent_miner` at
/// `height`.
pub fn deputy_by_distance(
    dm: &DeputyManager,
    parent_miner: Address,
    d: u32,
    height: u32,
) -> Result<shared_types::Deputy, SchedulerError> {
    if height == 0 {
        return Err(SchedulerError::MineGenesis);
    }
    let deputies = dm.deputies_at_height(height, false)?;
    let n = deputies.len() as u32;

    let rank = if height == 1 || dm.is_reward_block(height) {
        d.saturating_sub(1)
    } else {
        let parent_rank = deputies
            .iter()
            .find(|dep| dep.miner_address == parent_miner)
            .map(|dep| dep.rank)
            .ok_or(SchedulerError::NotDeputy)?;
        (parent_rank + d) % n
    };

    deputies
        .into_iter()
        .find(|dep| dep.rank == rank)
        .ok_or(SchedulerError::NotDeputy)
}

/// `[from, to)` mine window, all times in milliseconds.
///
/// `to - from == timeout_ms` always; if the naturally-computed window has
/// already elapsed relative to `now_ms`, it is shifted forward by whole
/// loops until it lies in the future.
pub fn next_mine_window(
    d: u32,
    parent_time_ms: u64,
    now_ms: u64,
    timeout_ms: u64,
    deputy_count: u32,
) -> (u64, u64) {
    let one_loop = deputy_count as u64 * timeout_ms;
    let pass = now_ms.saturating_sub(parent_time_ms);
    let loops = pass / one_loop;

    let mut from = parent_time_ms + loops * one_loop + (d as u64 - 1) * timeout_ms;
    let mut to = from + timeout_ms;

    if to <= now_ms {
        from += one_loop;
        to += one_loop;
    }
    (from, to)
}

/// The deputy that should have produced a block at `mine_time_ms`, given its
/// parent header.
pub fn correct_miner(
    dm: &DeputyManager,
    parent: &Header,
    mine_time_ms: u64,
    timeout_ms: u64,
) -> Result<Address, SchedulerError> {
    let parent_time_ms = parent.time * 1000;
    if mine_time_ms < parent_time_ms {
        return Err(SchedulerError::SmallerMineTime);
    }
    let pass_time = mine_time_ms - parent_time_ms;
    let height = parent.height + 1;

    let n = dm.deputy_count(height)? as u64;
    let one_loop = n * timeout_ms;
    let miner_distance = (pass_time % one_loop) / timeout_ms + 1;

    let deputy = deputy_by_distance(dm, parent.miner_address, miner_distance as u32, height)?;
    Ok(deputy.miner_address)
}

/// Miner-side scheduling helper: how long to sleep before attempting to
/// mine, and the hard deadline for publishing. Thin wrapper around
/// `next_mine_window` plus a `block_interval_ms` floor so consecutive blocks
/// within one's own slot are spaced out. Grounded in
/// `chain/miner/miner_test.go::TestMiner_GetSleepTime`.
pub fn sleep_time(
    d: u32,
    parent_time_ms: u64,
    now_ms: u64,
    block_interval_ms: u64,
    timeout_ms: u64,
    deputy_count: u32,
) -> (u64, u64) {
    let (from, to) = next_mine_window(d, parent_time_ms, now_ms, timeout_ms, deputy_count);

    let wait_ms = if now_ms < from {
        from - now_ms
    } else {
        // Slot already started: wait at least block_interval_ms, but never
        // past the window's own deadline.
        block_interval_ms.min(to.saturating_sub(now_ms))
    };
    (wait_ms, to)
}
