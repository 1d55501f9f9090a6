use thiserror::Error;

/// Errors raised by the account/change-log engine. See `SPEC_FULL.md` §7.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("storage trie is inconsistent with the account's storage root")]
    TrieFail,
    #[error("storage root changed out from under a pending save")]
    TrieChanged,
    #[error("change-log version does not match the account's current version")]
    WrongChangeLogVersion,
    #[error("change-log has already been applied")]
    AlreadyRedo,
    #[error("change-log carries an unrecognised type tag")]
    UnknownChangeLogType,
    #[error("change-log payload does not match the account's current state")]
    WrongChangeLogData,
    #[error("a read-only manager cannot finalise or save")]
    SaveReadOnly,
    #[error("sender account does not exist")]
    InvalidSender,
    #[error("sender balance is insufficient for this transfer")]
    InsufficientFunds,
    #[error("transaction would exceed the block gas limit")]
    GasLimitReached,
}
