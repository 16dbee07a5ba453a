//! # Cryptographic Primitives
//!
//! Hashes, keys and recoverable signatures. Everything the transaction core
//! needs from cryptography passes through this module, and nothing here is
//! hand-rolled: SHA-256 comes from `sha2`, RIPEMD-160 from `ripemd`, and the
//! elliptic-curve work from `secp256k1` (libsecp256k1 bindings).
//!
//! - **SHA-256 / double SHA-256** for inner hashes, output ids and
//!   transaction identity.
//! - **secp256k1 recoverable ECDSA** for input authorization. A signature
//!   plus the message hash yields the signer's public key, so transactions
//!   carry 65-byte signatures and no public keys.
//! - **RIPEMD-160(SHA-256(pubkey))** for 20-byte addresses.

use std::sync::OnceLock;

use secp256k1::{All, Secp256k1};

/// Shared secp256k1 context.
///
/// Building a context precomputes multiplication tables, which is far more
/// expensive than a signature check. One context, created on first use and
/// only ever read afterwards, serves every thread.
pub(crate) fn secp() -> &'static Secp256k1<All> {
    static CONTEXT: OnceLock<Secp256k1<All>> = OnceLock::new();
    CONTEXT.get_or_init(Secp256k1::new)
}

/// Serde support for fixed-size byte types: serialized as lowercase hex
/// strings. The type must provide `to_hex()` and
/// `from_hex(&str) -> Result<Self, impl Display>`.
macro_rules! hex_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                <$ty>::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use hex_serde;

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{double_sha256, sha256, sha256_multi, Hash256};
pub use keys::{Address, KeyError, Keypair, PublicKey, Signature};
pub use signatures::{
    recover_public_key, sign_hash, verify_signature, Secp256k1Verifier, SignatureError,
    SignatureVerifier,
};
