use thiserror::Error;

/// Errors raised by the scheduler's pure arithmetic. These are reached only
/// through misuse of the public surface (height 0, an address that is not a
/// deputy, or a mine time older than its parent) — never through malformed
/// network input, which is rejected earlier by `block-validator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("height 0 has no mining schedule")]
    MineGenesis,
    #[error("address is not a deputy at the queried height")]
    NotDeputy,
    #[error("mine time precedes parent block time")]
    SmallerMineTime,
}

impl From<deputy_manager::DeputyError> for SchedulerError {
    fn from(e: deputy_manager::DeputyError) -> Self {
        match e {
            deputy_manager::DeputyError::NoDeputies => SchedulerError::NotDeputy,
            deputy_manager::DeputyError::NotDeputy => SchedulerError::NotDeputy,
            deputy_manager::DeputyError::MineGenesis => SchedulerError::MineGenesis,
            _ => SchedulerError::NotDeputy,
        }
    }
}
