use thiserror::Error;

/// Transaction body-verify failures. See `SPEC_FULL.md` §4.4/§7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TxBodyError {
    #[error("signature does not recover to the claimed sender")]
    InvalidSig,
    #[error("unsupported transaction version")]
    InvalidVersion,
    #[error("recipient name exceeds the maximum length")]
    ToNameLength,
    #[error("recipient name contains a disallowed character")]
    ToNameCharacter,
    #[error("message exceeds the maximum length")]
    TxMessage,
    #[error("contract creation requires non-empty code")]
    CreateContract,
    #[error("this transaction kind requires a non-empty payload")]
    SpecialTx,
    #[error("unrecognised transaction kind")]
    TxType,
    #[error("gas price is below the configured floor")]
    GasPrice,
    #[error("transaction has already expired")]
    TxExpired,
    #[error("expiration time is too far in the future")]
    TxExpiration,
    #[error("amount must be non-negative")]
    NegativeValue,
    #[error("transaction targets a different chain")]
    TxChainID,
    #[error("box transaction payload is invalid")]
    BoxTx,
    #[error("a sub-transaction of a box failed verification")]
    VerifyBoxTx,
    #[error("referenced recipient name does not exist")]
    ToExist,
}
