use thiserror::Error;

/// Block-fatal verification failures. The block is dropped and the peer
/// that sent it is penalised. See `SPEC_FULL.md` §4.5/§7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidatorError {
    #[error("block failed pre- or post-execution verification")]
    VerifyBlockFailed,
    #[error("block header failed verification")]
    VerifyHeaderFailed,
    #[error("a transaction in the block failed verification")]
    InvalidTxInBlock,
    #[error("referenced block does not exist")]
    BlockNotExist,
}

/// Confirm-packet failures. Individual signatures are skipped rather than
/// rejecting the whole packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfirmError {
    #[error("signed confirm info is malformed")]
    InvalidSignedConfirmInfo,
    #[error("confirm signer is not a deputy at this height")]
    InvalidConfirmSigner,
    #[error("confirm already present on this block")]
    ExistedConfirm,
}
