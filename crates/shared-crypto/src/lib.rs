//! # Shared Crypto
//!
//! Hashing and signature primitives used throughout the consensus core.
//!
//! | Module | Algorithm | Use case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Block hashes, change-log roots, account roots |
//! | `ecdsa` | secp256k1 (recoverable) | Transaction signatures, deputy confirms |
//!
//! ## Security properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, recoverable signatures so
//!   a signer's `NodeId` never needs to travel alongside the signature.
//! - **Keccak-256**: the same hash used by the upstream chain this core is
//!   compatible with.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod merkle;

pub use ecdsa::{recover_node_id, verify, verify_with_public_key, NodeId, Secp256k1KeyPair, SignData};
pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_many, KeccakHasher};
pub use merkle::{merkle_root, merkle_root_of};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
