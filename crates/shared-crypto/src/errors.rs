//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Signature bytes are not a well-formed `r||s||recovery_id` triple.
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Public key bytes do not decode to a valid curve point.
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Private key bytes are not a valid scalar for the curve.
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signature is otherwise malformed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Key generation failed.
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),
}
