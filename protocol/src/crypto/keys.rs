//! # Key Management
//!
//! secp256k1 keypairs, compressed public keys, recoverable signatures and
//! the 20-byte addresses outputs are sent to.
//!
//! ## Security considerations
//!
//! - Key generation pulls from `OsRng`.
//! - [`Keypair`] does not implement `Serialize`, and its `Debug` output
//!   shows only the public half. Exporting secret bytes is always an
//!   explicit call.
//! - Key bytes are never logged.

use std::fmt;

use rand::rngs::OsRng;
use ripemd::{Digest, Ripemd160};
use secp256k1::ecdsa::RecoverableSignature;
use secp256k1::{Message, SecretKey};
use thiserror::Error;

use super::hash::{sha256, Hash256};
use super::secp;
use crate::config::{
    ADDRESS_LENGTH, COMPACT_SIGNATURE_LENGTH, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH,
    SIGNATURE_LENGTH,
};

/// Errors that can occur during key operations.
///
/// Deliberately vague about why key material was rejected.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid compressed secp256k1 point")]
    InvalidPublicKey,
}

// ---------------------------------------------------------------------------
// Keypair
// ---------------------------------------------------------------------------

/// A secp256k1 signing keypair.
///
/// # Examples
///
/// ```
/// use coinhour_protocol::crypto::{recover_public_key, sha256, Keypair};
///
/// let kp = Keypair::generate();
/// let hash = sha256(b"spend it");
/// let sig = kp.sign_hash(&hash);
/// assert_eq!(recover_public_key(&hash, &sig).unwrap(), kp.public_key());
/// ```
#[derive(Clone)]
pub struct Keypair {
    secret: SecretKey,
    public: PublicKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS cryptographic RNG.
    pub fn generate() -> Self {
        let (secret, public) = secp().generate_keypair(&mut OsRng);
        Self {
            secret,
            public: PublicKey(public),
        }
    }

    /// Reconstruct a keypair from 32 bytes of secret key material.
    ///
    /// Fails if the bytes are zero or not below the curve order.
    pub fn from_secret_bytes(bytes: &[u8; SECRET_KEY_LENGTH]) -> Result<Self, KeyError> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        let public = secp256k1::PublicKey::from_secret_key(secp(), &secret);
        Ok(Self {
            secret,
            public: PublicKey(public),
        })
    }

    /// Reconstruct a keypair from a hex-encoded secret key.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let mut bytes = [0u8; SECRET_KEY_LENGTH];
        hex::decode_to_slice(hex_str, &mut bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_secret_bytes(&bytes)
    }

    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// The address outputs paying this keypair are sent to.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public)
    }

    /// Produce a recoverable signature over a 256-bit hash.
    ///
    /// The hash is signed as-is (no further hashing). RFC 6979 nonces make
    /// the result deterministic for a given key and hash.
    pub fn sign_hash(&self, hash: &Hash256) -> Signature {
        let recoverable = secp().sign_ecdsa_recoverable(&Message::from(*hash), &self.secret);
        Signature::from_recoverable(&recoverable)
    }

    /// Export the raw secret key bytes. Handle with care.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.secret.secret_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A compressed secp256k1 public key (33 bytes on the wire).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub(crate) secp256k1::PublicKey);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PUBLIC_KEY_LENGTH {
            return Err(KeyError::InvalidPublicKey);
        }
        secp256k1::PublicKey::from_slice(bytes)
            .map(PublicKey)
            .map_err(|_| KeyError::InvalidPublicKey)
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.serialize()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

super::hex_serde!(PublicKey);

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 65-byte recoverable ECDSA signature: compact `r || s` followed by the
/// recovery id.
///
/// Signatures sit positionally in a transaction header. The all-zero value
/// ([`Signature::default`]) is the placeholder for a slot that has not been
/// signed yet; it never recovers to a key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// `true` for the unsigned placeholder.
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; SIGNATURE_LENGTH]
    }

    pub(crate) fn compact(&self) -> &[u8] {
        &self.0[..COMPACT_SIGNATURE_LENGTH]
    }

    pub(crate) fn recovery_byte(&self) -> u8 {
        self.0[COMPACT_SIGNATURE_LENGTH]
    }

    pub(crate) fn from_recoverable(sig: &RecoverableSignature) -> Self {
        let (recovery_id, compact) = sig.serialize_compact();
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..COMPACT_SIGNATURE_LENGTH].copy_from_slice(&compact);
        // Recovery ids are 0..=3.
        bytes[COMPACT_SIGNATURE_LENGTH] = recovery_id.to_i32() as u8;
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; SIGNATURE_LENGTH])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

super::hex_serde!(Signature);

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte destination identity: `RIPEMD-160(SHA-256(compressed pubkey))`.
///
/// The transaction core treats addresses as opaque fixed-width values and
/// only compares them. Human-readable encodings belong to wallets.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let digest = sha256(&public_key.to_bytes());
        let mut hasher = Ripemd160::new();
        hasher.update(digest.as_bytes());
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

super::hex_serde!(Address);
