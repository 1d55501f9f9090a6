//! # Recoverable ECDSA Signatures (secp256k1)
//!
//! Every signature in the consensus core — transaction signatures, deputy
//! confirms — is a 65-byte recoverable secp256k1 signature, so a signer's
//! identity can be recovered from `(message_hash, signature)` alone without
//! shipping the public key separately.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization (EIP-2)

use crate::CryptoError;
use k256::ecdsa::{
    signature::hazmat::PrehashVerifier, RecoveryId, Signature, SigningKey, VerifyingKey,
};
use zeroize::Zeroize;

/// 65-byte recoverable signature: `r (32) || s (32) || recovery_id (1)`.
pub type SignData = [u8; 65];

/// 64-byte uncompressed-public-key suffix (x || y, SEC1 prefix byte dropped),
/// used as a deputy's `NodeId`.
pub type NodeId = [u8; 64];

/// secp256k1 keypair used to sign transactions and confirms.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate a random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Restore a keypair from its 32-byte secret scalar.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// 64-byte uncompressed public key suffix (x || y), the node's `NodeId`.
    pub fn node_id(&self) -> NodeId {
        let verifying_key = self.signing_key.verifying_key();
        let uncompressed = verifying_key.to_encoded_point(false);
        let mut out = [0u8; 64];
        out.copy_from_slice(&uncompressed.as_bytes()[1..]);
        out
    }

    /// Sign a 32-byte message hash, producing a recoverable signature.
    ///
    /// `message_hash` is expected to already be a digest (e.g. a block hash
    /// or `keccak256` of a transaction body) per RFC 6979 prehash signing.
    pub fn sign_hash(&self, message_hash: &[u8; 32]) -> SignData {
        let (signature, recovery_id): (Signature, RecoveryId) = self
            .signing_key
            .sign_prehash_recoverable(message_hash)
            .expect("signing a 32-byte prehash cannot fail");
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        out
    }

    /// Secret scalar bytes, for serialization into a keystore.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

/// Recover the signer's `NodeId` from a message hash and its signature,
/// without needing the public key ahead of time.
pub fn recover_node_id(message_hash: &[u8; 32], sig_data: &SignData) -> Result<NodeId, CryptoError> {
    let signature =
        Signature::from_slice(&sig_data[..64]).map_err(|_| CryptoError::InvalidSignatureFormat)?;
    let recovery_id =
        RecoveryId::from_byte(sig_data[64]).ok_or(CryptoError::InvalidSignatureFormat)?;
    let verifying_key =
        VerifyingKey::recover_from_prehash(message_hash, &signature, recovery_id)
            .map_err(|_| CryptoError::SignatureVerificationFailed)?;

    let uncompressed = verifying_key.to_encoded_point(false);
    let mut out = [0u8; 64];
    out.copy_from_slice(&uncompressed.as_bytes()[1..]);
    Ok(out)
}

/// Verify a signature was produced by the holder of `node_id` over
/// `message_hash`, without performing a separate recovery-then-compare: this
/// recovers first (cheaper than re-deriving a verifying key from `node_id`
/// and checking both recovery candidates) and compares the recovered key.
pub fn verify(message_hash: &[u8; 32], sig_data: &SignData, node_id: &NodeId) -> bool {
    match recover_node_id(message_hash, sig_data) {
        Ok(recovered) => &recovered == node_id,
        Err(_) => false,
    }
}

/// Verify a signature against a full SEC1 public key, for callers that
/// already hold a `VerifyingKey` rather than a bare `NodeId`.
pub fn verify_with_public_key(
    message_hash: &[u8; 32],
    sig_data: &SignData,
    public_key: &VerifyingKey,
) -> Result<(), CryptoError> {
    let signature =
        Signature::from_slice(&sig_data[..64]).map_err(|_| CryptoError::InvalidSignatureFormat)?;
    public_key
        .verify_prehash(message_hash, &signature)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::keccak256;

    #[test]
    fn sign_and_recover_round_trips() {
        let keypair = Secp256k1KeyPair::generate();
        let hash = keccak256(b"a transaction body");

        let sig = keypair.sign_hash(&hash);
        let recovered = recover_node_id(&hash, &sig).unwrap();

        assert_eq!(recovered, keypair.node_id());
        assert!(verify(&hash, &sig, &keypair.node_id()));
    }

    #[test]
    fn verify_fails_for_wrong_node_id() {
        let keypair = Secp256k1KeyPair::generate();
        let other = Secp256k1KeyPair::generate();
        let hash = keccak256(b"a block header");

        let sig = keypair.sign_hash(&hash);
        assert!(!verify(&hash, &sig, &other.node_id()));
    }

    #[test]
    fn verify_fails_for_tampered_hash() {
        let keypair = Secp256k1KeyPair::generate();
        let hash = keccak256(b"message one");
        let other_hash = keccak256(b"message two");

        let sig = keypair.sign_hash(&hash);
        assert!(!verify(&other_hash, &sig, &keypair.node_id()));
    }

    #[test]
    fn deterministic_signatures() {
        let keypair = Secp256k1KeyPair::from_bytes([0xABu8; 32]).unwrap();
        let hash = keccak256(b"deterministic test");

        let sig1 = keypair.sign_hash(&hash);
        let sig2 = keypair.sign_hash(&hash);

        assert_eq!(sig1, sig2);
    }

    #[test]
    fn roundtrip_secret_bytes() {
        let original = Secp256k1KeyPair::generate();
        let bytes = original.to_bytes();
        let restored = Secp256k1KeyPair::from_bytes(bytes).unwrap();

        assert_eq!(original.node_id(), restored.node_id());
    }
}
