//! # Recoverable Signatures
//!
//! The two operations the validator composes, plus signing for the builder:
//!
//! - [`recover_public_key`] — derive the signer's key from a message hash
//!   and a 65-byte signature. Fails on malformed signatures.
//! - [`verify_signature`] — check a signature against a given key and hash.
//!   libsecp256k1 only accepts low-S signatures here, so a malleated
//!   (high-S) signature recovers a key and still fails verification.
//!
//! The validator reaches these through the [`SignatureVerifier`] trait
//! rather than calling them directly. [`Secp256k1Verifier`] is the only
//! production implementation.

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, ThirtyTwoByteHash};
use thiserror::Error;

use super::hash::Hash256;
use super::keys::{Keypair, PublicKey, Signature};
use super::secp;

/// Errors during signature operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The bytes do not form a recoverable signature, or no key recovers
    /// from them for this message.
    #[error("invalid signature: public key recovery failed")]
    InvalidSignature,

    /// The signature does not authenticate the message under the key.
    #[error("signature does not match public key and message")]
    SignatureMismatch,
}

impl ThirtyTwoByteHash for Hash256 {
    fn into_32(self) -> [u8; 32] {
        self.to_bytes()
    }
}

/// Sign a 256-bit hash with a keypair. See [`Keypair::sign_hash`].
pub fn sign_hash(keypair: &Keypair, hash: &Hash256) -> Signature {
    keypair.sign_hash(hash)
}

fn to_recoverable(signature: &Signature) -> Result<RecoverableSignature, SignatureError> {
    let recovery_id = RecoveryId::from_i32(i32::from(signature.recovery_byte()))
        .map_err(|_| SignatureError::InvalidSignature)?;
    RecoverableSignature::from_compact(signature.compact(), recovery_id)
        .map_err(|_| SignatureError::InvalidSignature)
}

/// Recover the public key that produced `signature` over `hash`.
pub fn recover_public_key(hash: &Hash256, signature: &Signature) -> Result<PublicKey, SignatureError> {
    let recoverable = to_recoverable(signature)?;
    secp()
        .recover_ecdsa(&Message::from(*hash), &recoverable)
        .map(PublicKey)
        .map_err(|_| SignatureError::InvalidSignature)
}

/// Verify `signature` over `hash` against `public_key`.
pub fn verify_signature(
    public_key: &PublicKey,
    signature: &Signature,
    hash: &Hash256,
) -> Result<(), SignatureError> {
    let standard = to_recoverable(signature)
        .map_err(|_| SignatureError::SignatureMismatch)?
        .to_standard();
    secp()
        .verify_ecdsa(&Message::from(*hash), &standard, &public_key.0)
        .map_err(|_| SignatureError::SignatureMismatch)
}

/// The narrow signature capability the transaction validator depends on.
///
/// Implementations must be pure: same inputs, same answer, no side effects.
/// The validator shares one verifier across worker threads, hence `Sync`.
pub trait SignatureVerifier: Sync {
    fn recover_public_key(
        &self,
        hash: &Hash256,
        signature: &Signature,
    ) -> Result<PublicKey, SignatureError>;

    fn verify(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        hash: &Hash256,
    ) -> Result<(), SignatureError>;
}

/// libsecp256k1-backed verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Verifier;

impl SignatureVerifier for Secp256k1Verifier {
    fn recover_public_key(
        &self,
        hash: &Hash256,
        signature: &Signature,
    ) -> Result<PublicKey, SignatureError> {
        recover_public_key(hash, signature)
    }

    fn verify(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        hash: &Hash256,
    ) -> Result<(), SignatureError> {
        verify_signature(public_key, signature, hash)
    }
}
