//! # Hashing Utilities
//!
//! One hash function, two ways of applying it:
//!
//! - **SHA-256** — the single-round digest. Used for the inner hash (the
//!   message every input signature covers) and for output identifiers.
//! - **Double SHA-256** — `SHA-256(SHA-256(data))`. Used only for the
//!   transaction identity hash, the network-visible reference to a whole
//!   transaction. The outer round closes off length-extension games on the
//!   identity.
//!
//! Both operate on canonical encodings produced by [`crate::encoding`]. Hash
//! whatever bytes you like, but if they didn't come out of the canonical
//! encoder they won't match what other nodes compute.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::config::HASH_LENGTH;

/// A 256-bit digest.
///
/// Plain value type: copied, compared and ordered byte-wise. Ordering is
/// lexicographic over the raw bytes, which is what canonical transaction
/// ordering relies on.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash256([u8; HASH_LENGTH]);

impl Hash256 {
    /// The all-zero hash. Doubles as the "not yet finalized" inner hash.
    pub const ZERO: Hash256 = Hash256([0u8; HASH_LENGTH]);

    pub const fn from_bytes(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; HASH_LENGTH] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_LENGTH]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; HASH_LENGTH];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LENGTH]> for Hash256 {
    fn from(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

super::hex_serde!(Hash256);

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use coinhour_protocol::crypto::sha256;
///
/// let hash = sha256(b"coinhour");
/// assert_eq!(hash.as_bytes().len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Hash256(hasher.finalize().into())
}

/// Compute the double-SHA-256 hash: `SHA-256(SHA-256(data))`.
///
/// Reserved for transaction identity hashes. Everything else uses the
/// single round.
pub fn double_sha256(data: &[u8]) -> Hash256 {
    sha256(sha256(data).as_bytes())
}

/// Hash multiple byte slices as if they were concatenated.
///
/// Feeds each part into the same hasher, so `sha256_multi(&[a, b])` equals
/// `sha256(a ++ b)` without the temporary buffer. The inner hash uses this
/// to hash the encoded inputs and outputs back to back.
pub fn sha256_multi(parts: &[&[u8]]) -> Hash256 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    Hash256(hasher.finalize().into())
}
