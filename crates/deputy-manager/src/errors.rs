use thiserror::Error;

/// Errors raised by the deputy manager's queries and snapshot ingestion.
///
/// `ExistSnapshotHeight` is part of the closed taxonomy for completeness but
/// is never returned by `DeputyManager::save_snapshot` itself: a duplicate
/// snapshot at an already-used start height is logged and treated as a no-op
/// (see `SPEC_FULL.md` §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeputyError {
    #[error("snapshot has no deputy nodes")]
    EmptyDeputies,
    #[error("deputy node rank does not match its position in the snapshot")]
    InvalidDeputyRank,
    #[error("snapshot height is not a multiple of InterimDuration")]
    InvalidSnapshotHeight,
    #[error("a term already starts at this height")]
    ExistSnapshotHeight,
    #[error("no snapshot has ever been saved")]
    NoDeputies,
    #[error("address is not a deputy at the queried height")]
    NotDeputy,
    #[error("height 0 has no mining schedule")]
    MineGenesis,
}
