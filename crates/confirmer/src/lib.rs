//! Finality: per-deputy block signing and stable-height promotion. See
//! `SPEC_FULL.md` §4.6.

pub mod confirmer;
pub mod errors;
pub mod ports;
pub mod threshold;

pub use confirmer::{confirm_signer, Confirmer};
pub use errors::ConfirmError;
pub use ports::ConfirmStore;
pub use threshold::{required_confirms, two_third_deputy_count};
