//! # Protocol Configuration & Constants
//!
//! Every size and limit the transaction core depends on lives here. The
//! canonical encoding is consensus-critical: two nodes that disagree on any
//! of these values will compute different hashes for the same transaction
//! and fork on the spot. Treat changes here as hard forks.
//!
//! There is no runtime configuration. Nothing in the core is tunable by an
//! operator, and that is on purpose: validation must give the same verdict
//! on every machine.

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Signature scheme used to authorize inputs. Recoverable, so the signer's
/// public key never has to travel with the transaction.
pub const SIGNING_ALGORITHM: &str = "secp256k1-ecdsa-recoverable";

/// Secret key length in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Compressed secp256k1 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// Compact `r || s` signature length, excluding the recovery id.
pub const COMPACT_SIGNATURE_LENGTH: usize = 64;

/// Full recoverable signature: 64 compact bytes followed by one recovery-id byte.
pub const SIGNATURE_LENGTH: usize = COMPACT_SIGNATURE_LENGTH + 1;

/// SHA-256 output length. Every hash in the protocol is this wide.
pub const HASH_LENGTH: usize = 32;

/// Address length: `RIPEMD-160(SHA-256(compressed public key))`.
pub const ADDRESS_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Canonical Encoding
// ---------------------------------------------------------------------------

/// Width of the little-endian `u32` element count written before every
/// variable-length sequence.
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Encoded width of a `TransactionInput`: `sig_index` (u16 LE) + output id.
pub const ENCODED_INPUT_LENGTH: usize = 2 + HASH_LENGTH;

/// Encoded width of a `TransactionOutput`: address + coins (u64 LE) + hours (u64 LE).
pub const ENCODED_OUTPUT_LENGTH: usize = ADDRESS_LENGTH + 8 + 8;

/// Encoded width of the body an output identifier is hashed from:
/// producing transaction hash + address + coins + hours.
pub const ENCODED_UX_BODY_LENGTH: usize = HASH_LENGTH + ADDRESS_LENGTH + 8 + 8;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Hard ceiling on inputs per transaction. `sig_index` is a `u16`, so the
/// builder refuses to hand out an index it could not represent.
pub const MAX_TRANSACTION_INPUTS: usize = u16::MAX as usize;

/// Signature lists at or above this length are rejected by the validator.
pub const MAX_SIGNATURES: usize = u16::MAX as usize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_widths_are_consistent() {
        assert_eq!(ENCODED_INPUT_LENGTH, 34);
        assert_eq!(ENCODED_OUTPUT_LENGTH, 36);
        assert_eq!(ENCODED_UX_BODY_LENGTH, 68);
        assert_eq!(SIGNATURE_LENGTH, 65);
    }

    #[test]
    fn signing_algorithm_matches_signature_layout() {
        assert!(SIGNING_ALGORITHM.starts_with("secp256k1"));
        assert_eq!(SIGNATURE_LENGTH, COMPACT_SIGNATURE_LENGTH + 1);
    }

    #[test]
    fn limits_fit_sig_index_width() {
        assert!(MAX_TRANSACTION_INPUTS <= u16::MAX as usize);
        assert_eq!(MAX_SIGNATURES, 65_535);
    }
}
