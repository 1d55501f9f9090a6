use thiserror::Error;

use account_engine::AccountError;
use block_validator::{ConfirmError, ValidatorError};

/// Failures from the insertion pipeline. See `SPEC_FULL.md` §4.8/§7.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("block references an unknown parent")]
    UnknownParent,
    #[error("pre-execution validation failed: {0}")]
    PreExecution(#[from] ValidatorErrorWrapper),
    #[error("post-execution validation failed: {0}")]
    PostExecution(ValidatorErrorWrapper),
    #[error("account engine error while replaying the block: {0}")]
    Account(#[from] AccountError),
    #[error("block already present")]
    AlreadyExists,
}

/// `ValidatorError` isn't `#[from]`-compatible twice in one enum (pre- and
/// post-execution both raise it), so each call site wraps explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidatorErrorWrapper(pub ValidatorError);

impl From<ValidatorError> for ValidatorErrorWrapper {
    fn from(e: ValidatorError) -> Self {
        Self(e)
    }
}

/// Errors from admitting a confirm packet. Re-exported at the crate root so
/// callers don't need to depend on `block-validator` directly.
pub type ConfirmPacketError = ConfirmError;
