//! Per-address account state driven by reversible change-logs, with a
//! dirty/cached storage split and per-block finalisation. See
//! `SPEC_FULL.md` §4.3.

pub mod errors;
pub mod manager;
pub mod ports;
pub mod raw_account;

pub use errors::AccountError;
pub use manager::{AccountHandle, Manager};
pub use ports::AccountStore;
pub use raw_account::RawAccount;
