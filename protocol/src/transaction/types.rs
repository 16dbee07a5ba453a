//! Transaction data model and its canonical encoding.
//!
//! A [`Transaction`] consumes unspent outputs (referenced by id) and creates
//! new ones. The header carries two things that are *not* part of the
//! content hash: the cached inner hash and the per-input signatures.
//!
//! # Canonical Byte Format
//!
//! ```text
//! Transaction  = inner_hash(32) | signatures | inputs | outputs
//! signatures   = count(u32 LE) | signature(65)*
//! inputs       = count(u32 LE) | (sig_index(u16 LE) | output_id(32))*
//! outputs      = count(u32 LE) | (destination(20) | coins(u64 LE) | hours(u64 LE))*
//! ```
//!
//! The inner hash covers `inputs | outputs` only. The identity hash covers
//! the whole encoding, signatures included.

use serde::{Deserialize, Serialize};

use super::uxout::output_id;
use crate::config::{ENCODED_INPUT_LENGTH, ENCODED_OUTPUT_LENGTH, HASH_LENGTH, LENGTH_PREFIX_BYTES};
use crate::crypto::{double_sha256, sha256_multi, Address, Hash256, Signature};
use crate::encoding::{Decode, DecodeError, Encode, Reader};

// ---------------------------------------------------------------------------
// TransactionHeader
// ---------------------------------------------------------------------------

/// Metadata excluded from the inner hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHeader {
    /// `sha256(encode(inputs) ++ encode(outputs))`, cached at finalization.
    pub inner_hash: Hash256,

    /// One signature per input slot. Input `i` is authorized by
    /// `signatures[inputs[i].sig_index]`.
    pub signatures: Vec<Signature>,
}

// ---------------------------------------------------------------------------
// TransactionInput
// ---------------------------------------------------------------------------

/// A reference to the unspent output being consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Index into `header.signatures`.
    pub sig_index: u16,

    /// Identifier of the unspent output this input spends.
    pub output_id: Hash256,
}

// ---------------------------------------------------------------------------
// TransactionOutput
// ---------------------------------------------------------------------------

/// A new unspent output created by the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionOutput {
    /// Recipient address.
    pub destination: Address,

    /// Amount in the smallest coin unit.
    pub coins: u64,

    /// Coin hours transferred alongside the coins.
    pub hours: u64,
}

impl TransactionOutput {
    /// This output's identifier once created by transaction `src_transaction`.
    pub fn id(&self, src_transaction: &Hash256) -> Hash256 {
        output_id(src_transaction, &self.destination, self.coins, self.hours)
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A ledger transaction.
///
/// This is the wire value: what gets serialized, gossiped, and handed to
/// [`super::verify_transaction`]. Fields are public because the validator
/// must cope with anything an untrusted peer can produce. To *build* one,
/// use [`super::TransactionBuilder`], which keeps the cached inner hash and
/// the signatures consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub header: TransactionHeader,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
}

impl Transaction {
    /// Hash of the inputs and outputs only: the message every input
    /// signature covers.
    pub fn compute_inner_hash(&self) -> Hash256 {
        sha256_multi(&[&self.inputs.encode(), &self.outputs.encode()])
    }

    /// The transaction's identity: double SHA-256 of the full canonical
    /// encoding, header included.
    pub fn hash(&self) -> Hash256 {
        double_sha256(&self.serialize())
    }

    /// Identifiers of the outputs this transaction creates, in output order.
    pub fn output_ids(&self) -> Vec<Hash256> {
        let src = self.hash();
        self.outputs.iter().map(|out| out.id(&src)).collect()
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.encode()
    }

    /// Decode a transaction from untrusted bytes.
    ///
    /// The input must be exactly one canonical transaction; truncated,
    /// oversized or padded input is an error, never a panic.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode(bytes)
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        self.encoded_len()
    }
}

// ---------------------------------------------------------------------------
// Canonical encoding
// ---------------------------------------------------------------------------

impl Encode for TransactionInput {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.sig_index.encode_to(buf);
        self.output_id.encode_to(buf);
    }

    fn encoded_len(&self) -> usize {
        ENCODED_INPUT_LENGTH
    }
}

impl Decode for TransactionInput {
    const MIN_ENCODED_LEN: usize = ENCODED_INPUT_LENGTH;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            sig_index: u16::decode_from(reader)?,
            output_id: Hash256::decode_from(reader)?,
        })
    }
}

impl Encode for TransactionOutput {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.destination.encode_to(buf);
        self.coins.encode_to(buf);
        self.hours.encode_to(buf);
    }

    fn encoded_len(&self) -> usize {
        ENCODED_OUTPUT_LENGTH
    }
}

impl Decode for TransactionOutput {
    const MIN_ENCODED_LEN: usize = ENCODED_OUTPUT_LENGTH;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            destination: Address::decode_from(reader)?,
            coins: u64::decode_from(reader)?,
            hours: u64::decode_from(reader)?,
        })
    }
}

impl Encode for TransactionHeader {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.inner_hash.encode_to(buf);
        self.signatures.encode_to(buf);
    }

    fn encoded_len(&self) -> usize {
        self.inner_hash.encoded_len() + self.signatures.encoded_len()
    }
}

impl Decode for TransactionHeader {
    const MIN_ENCODED_LEN: usize = HASH_LENGTH + LENGTH_PREFIX_BYTES;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            inner_hash: Hash256::decode_from(reader)?,
            signatures: Vec::decode_from(reader)?,
        })
    }
}

impl Encode for Transaction {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.header.encode_to(buf);
        self.inputs.encode_to(buf);
        self.outputs.encode_to(buf);
    }

    fn encoded_len(&self) -> usize {
        self.header.encoded_len() + self.inputs.encoded_len() + self.outputs.encoded_len()
    }
}

impl Decode for Transaction {
    const MIN_ENCODED_LEN: usize = TransactionHeader::MIN_ENCODED_LEN + 2 * LENGTH_PREFIX_BYTES;

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            header: TransactionHeader::decode_from(reader)?,
            inputs: Vec::decode_from(reader)?,
            outputs: Vec::decode_from(reader)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256;

    fn sample_tx() -> Transaction {
        let mut tx = Transaction {
            header: TransactionHeader::default(),
            inputs: vec![
                TransactionInput {
                    sig_index: 0,
                    output_id: sha256(b"utxo-1"),
                },
                TransactionInput {
                    sig_index: 1,
                    output_id: sha256(b"utxo-2"),
                },
            ],
            outputs: vec![TransactionOutput {
                destination: Address::from_bytes([0xAA; 20]),
                coins: 100,
                hours: 10,
            }],
        };
        tx.header.inner_hash = tx.compute_inner_hash();
        tx.header.signatures = vec![Signature::from_bytes([1u8; 65]); 2];
        tx
    }

    #[test]
    fn serialized_layout_matches_field_order() {
        let tx = sample_tx();
        let bytes = tx.serialize();

        assert_eq!(&bytes[..32], tx.header.inner_hash.as_bytes());
        // Two signatures.
        assert_eq!(&bytes[32..36], &[2, 0, 0, 0]);
        let inputs_at = 36 + 2 * 65;
        assert_eq!(&bytes[inputs_at..inputs_at + 4], &[2, 0, 0, 0]);
        // First input's sig_index, little-endian.
        assert_eq!(&bytes[inputs_at + 4..inputs_at + 6], &[0, 0]);
        let outputs_at = inputs_at + 4 + 2 * 34;
        assert_eq!(&bytes[outputs_at..outputs_at + 4], &[1, 0, 0, 0]);
        // coins = 100 after the 20-byte address.
        let coins_at = outputs_at + 4 + 20;
        assert_eq!(&bytes[coins_at..coins_at + 8], &100u64.to_le_bytes());
        assert_eq!(bytes.len(), outputs_at + 4 + 36);
        assert_eq!(tx.size(), bytes.len());
    }

    #[test]
    fn serialize_deserialize_roundtrip() {
        let tx = sample_tx();
        let decoded = Transaction::deserialize(&tx.serialize()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn inner_hash_ignores_header() {
        let mut tx = sample_tx();
        let before = tx.compute_inner_hash();
        tx.header.signatures.clear();
        tx.header.inner_hash = Hash256::ZERO;
        assert_eq!(tx.compute_inner_hash(), before);
    }

    #[test]
    fn inner_hash_is_inputs_then_outputs() {
        let tx = sample_tx();
        let mut body = tx.inputs.encode();
        body.extend_from_slice(&tx.outputs.encode());
        assert_eq!(tx.compute_inner_hash(), sha256(&body));
    }

    #[test]
    fn identity_hash_covers_signatures() {
        let mut tx = sample_tx();
        let before = tx.hash();
        tx.header.signatures[0] = Signature::from_bytes([2u8; 65]);
        assert_ne!(tx.hash(), before);
        assert_eq!(tx.hash(), double_sha256(&tx.serialize()));
    }

    #[test]
    fn output_ids_use_identity_hash() {
        let tx = sample_tx();
        let ids = tx.output_ids();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0], tx.outputs[0].id(&tx.hash()));
        assert_ne!(ids[0], tx.outputs[0].id(&tx.header.inner_hash));
    }

    #[test]
    fn deserialize_rejects_truncation_everywhere() {
        let bytes = sample_tx().serialize();
        for cut in 0..bytes.len() {
            assert!(
                Transaction::deserialize(&bytes[..cut]).is_err(),
                "prefix of length {} must not decode",
                cut
            );
        }
    }

    #[test]
    fn deserialize_rejects_trailing_bytes() {
        let mut bytes = sample_tx().serialize();
        bytes.push(0);
        assert_eq!(
            Transaction::deserialize(&bytes),
            Err(DecodeError::TrailingBytes(1))
        );
    }

    #[test]
    fn empty_transaction_roundtrip() {
        let tx = Transaction::default();
        assert_eq!(tx.size(), 32 + 4 + 4 + 4);
        assert_eq!(Transaction::deserialize(&tx.serialize()).unwrap(), tx);
    }

    #[test]
    fn transaction_json_roundtrip() {
        let tx = sample_tx();
        let json = serde_json::to_string(&tx).unwrap();
        let recovered: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, recovered);
    }
}
