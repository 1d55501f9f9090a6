//! Errors shared by more than one crate.
//!
//! Per-subsystem error taxonomies (`ValidatorError`, `ConfirmError`,
//! `SchedulerError`, `DeputyError`, `AccountError`, `TxBodyError`,
//! `NetworkError`, per `SPEC_FULL.md` §7) live in their own crates next to the
//! operations that raise them. Only the handful of conversions every crate
//! needs — turning an arbitrary byte slice into a fixed-size `Address`/`Hash`
//! — live here.

use thiserror::Error;

/// A fixed-size field (`Address`, `Hash`, `SignData`, `NodeId`) was built from
/// a slice of the wrong length, e.g. while decoding a malformed wire message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} bytes, got {actual}")]
pub struct FixedBytesLengthError {
    pub expected: usize,
    pub actual: usize,
}

/// Build a fixed-size array from a slice, or report the mismatched length.
pub fn fixed_bytes<const N: usize>(slice: &[u8]) -> Result<[u8; N], FixedBytesLengthError> {
    <[u8; N]>::try_from(slice).map_err(|_| FixedBytesLengthError {
        expected: N,
        actual: slice.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_bytes_rejects_wrong_length() {
        let err = fixed_bytes::<20>(&[0u8; 19]).unwrap_err();
        assert_eq!(err.expected, 20);
        assert_eq!(err.actual, 19);
    }

    #[test]
    fn fixed_bytes_accepts_exact_length() {
        let addr = fixed_bytes::<20>(&[7u8; 20]).unwrap();
        assert_eq!(addr, [7u8; 20]);
    }
}
