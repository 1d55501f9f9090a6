//! Two-phase block verification, confirm-packet checks, and equivocation
//! detection. See `SPEC_FULL.md` §4.5.

pub mod errors;
pub mod verify;

pub use errors::{ConfirmError, ValidatorError};
pub use verify::{judge_deputy, verify_after_tx_process, verify_before_tx_process, verify_new_confirms};
