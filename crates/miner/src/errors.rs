use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MinerError {
    #[error("this node is not a deputy at the mining height")]
    NotDeputy,
    #[error("scheduling arithmetic failed")]
    ScheduleFailed,
    #[error("assembled block failed to publish")]
    PublishFailed,
}
