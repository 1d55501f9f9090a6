use thiserror::Error;

/// Reuses `block-validator`'s confirm-packet error taxonomy (`SPEC_FULL.md`
/// §7 groups these under one heading), duplicated here rather than taking a
/// dependency on `block-validator` so the two crates stay decoupled — the
/// confirmer only ever produces `ExistedConfirm`, never the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfirmError {
    #[error("signed confirm info is malformed")]
    InvalidSignedConfirmInfo,
    #[error("confirm signer is not a deputy at this height")]
    InvalidConfirmSigner,
    #[error("confirm already present on this block")]
    ExistedConfirm,
}
