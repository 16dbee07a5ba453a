//! Transaction verification: structural checks and cryptographic validation.
//!
//! [`verify_transaction`] decides whether a transaction is internally
//! well-formed and authorized. It runs the checks in a fixed order and
//! stops at the first failure, cheapest first: hashing and scans before any
//! elliptic-curve work.
//!
//! What it does *not* decide, because each needs ledger state this module
//! never sees:
//!
//! - whether the referenced outputs exist or are still unspent;
//! - whether inputs cover outputs (coin and hour conservation);
//! - whether the key that signed an input owns the output it spends.
//!
//! Those belong to whatever tracks the UTXO set.
//!
//! ## Signed message
//!
//! Every input signature covers the transaction's inner hash. The builder
//! signs it and the validator recovers and verifies against it. Signing the
//! inner hash commits each signer to every input and output, so a signature
//! cannot be lifted onto a transaction that pays someone else.

use std::collections::HashSet;
use std::thread;

use thiserror::Error;
use tracing::debug;

use super::types::Transaction;
use crate::config::MAX_SIGNATURES;
use crate::crypto::{Hash256, Secp256k1Verifier, SignatureVerifier};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a transaction was rejected.
///
/// Every variant is a property of the transaction itself: re-checking the
/// same bytes will always give the same answer, so nothing here is worth
/// retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// The cached inner hash does not match the inputs and outputs.
    #[error("header hash mismatch: expected {expected}, got {actual}")]
    HeaderHashMismatch { expected: Hash256, actual: Hash256 },

    /// Nothing is spent, so nothing is authorized.
    #[error("transaction has no inputs")]
    NoInputs,

    /// Nothing is created.
    #[error("transaction has no outputs")]
    NoOutputs,

    /// The signature list does not fit the `u16` index space.
    #[error("too many signatures: {count} (must be below {})", MAX_SIGNATURES)]
    TooManySignatures { count: usize },

    /// Two inputs spend the same output.
    #[error("duplicate spend of output {output_id}")]
    DuplicateSpend { output_id: Hash256 },

    /// Two outputs would be created with the same identifier.
    #[error("duplicate output {output_id}")]
    DuplicateOutput { output_id: Hash256 },

    /// An input points at a signature slot that does not exist.
    #[error("input {input} references signature {sig_index}, but only {signatures} present")]
    SignatureIndexOutOfRange {
        input: usize,
        sig_index: u16,
        signatures: usize,
    },

    /// No public key could be recovered from the input's signature.
    #[error("public key recovery failed for input {input}")]
    PubkeyRecoveryFailed { input: usize },

    /// The signature did not verify against the recovered key.
    #[error("signature verification failed for input {input}")]
    SignatureVerificationFailed { input: usize },
}

impl TransactionError {
    /// `true` for failures of the signature checks, as opposed to
    /// structural defects. Lets callers tell malformed transactions from
    /// unauthorized ones.
    pub fn is_cryptographic(&self) -> bool {
        matches!(
            self,
            TransactionError::PubkeyRecoveryFailed { .. }
                | TransactionError::SignatureVerificationFailed { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verifies a transaction with the libsecp256k1 verifier.
///
/// See [`verify_transaction_with`] for the checks performed.
pub fn verify_transaction(tx: &Transaction) -> Result<(), TransactionError> {
    verify_transaction_with(tx, &Secp256k1Verifier)
}

/// Verifies a transaction for structural correctness and cryptographic
/// validity.
///
/// The checks, in order:
///
/// 1. **Inner hash** — `header.inner_hash` must equal the hash of the
///    encoded inputs and outputs.
/// 2. **Inputs** — at least one.
/// 3. **Outputs** — at least one.
/// 4. **Signature count** — fewer than 65 535.
/// 5. **Duplicate spend** — no two inputs share an output id.
/// 6. **Duplicate output** — no two outputs share an id, computed with the
///    transaction's identity hash as producing hash.
/// 7. **Signatures** — for each input, `signatures[sig_index]` must exist,
///    recover a public key over the inner hash, and verify under that key.
///
/// # Errors
///
/// Returns the first failing check. Never panics, whatever the input.
pub fn verify_transaction_with<V: SignatureVerifier + ?Sized>(
    tx: &Transaction,
    verifier: &V,
) -> Result<(), TransactionError> {
    let result = run_checks(tx, verifier);
    if let Err(ref err) = result {
        debug!(
            inner_hash = %tx.header.inner_hash,
            cryptographic = err.is_cryptographic(),
            error = %err,
            "transaction rejected"
        );
    }
    result
}

fn run_checks<V: SignatureVerifier + ?Sized>(
    tx: &Transaction,
    verifier: &V,
) -> Result<(), TransactionError> {
    // 1. Inner hash integrity.
    let expected = tx.compute_inner_hash();
    if tx.header.inner_hash != expected {
        return Err(TransactionError::HeaderHashMismatch {
            expected,
            actual: tx.header.inner_hash,
        });
    }

    // 2-3. Non-empty.
    if tx.inputs.is_empty() {
        return Err(TransactionError::NoInputs);
    }
    if tx.outputs.is_empty() {
        return Err(TransactionError::NoOutputs);
    }

    // 4. Signature count must leave room in the u16 index space.
    let signatures = &tx.header.signatures;
    if signatures.len() >= MAX_SIGNATURES {
        return Err(TransactionError::TooManySignatures {
            count: signatures.len(),
        });
    }

    // 5. No output spent twice.
    if let Some(output_id) = first_duplicate(tx.inputs.iter().map(|input| input.output_id)) {
        return Err(TransactionError::DuplicateSpend { output_id });
    }

    // 6. No two outputs with the same identifier.
    if let Some(output_id) = first_duplicate(tx.output_ids()) {
        return Err(TransactionError::DuplicateOutput { output_id });
    }

    // 7. Every input authorized by its signature over the inner hash.
    let message = tx.header.inner_hash;
    for (input, txin) in tx.inputs.iter().enumerate() {
        let signature = signatures.get(txin.sig_index as usize).ok_or(
            TransactionError::SignatureIndexOutOfRange {
                input,
                sig_index: txin.sig_index,
                signatures: signatures.len(),
            },
        )?;

        let public_key = verifier
            .recover_public_key(&message, signature)
            .map_err(|_| TransactionError::PubkeyRecoveryFailed { input })?;

        verifier
            .verify(&public_key, signature, &message)
            .map_err(|_| TransactionError::SignatureVerificationFailed { input })?;
    }

    Ok(())
}

/// First value seen a second time, in scan order.
fn first_duplicate<I>(values: I) -> Option<Hash256>
where
    I: IntoIterator<Item = Hash256>,
{
    let mut seen = HashSet::new();
    values.into_iter().find(|value| !seen.insert(*value))
}

/// Verifies independent transactions in parallel.
///
/// Validation touches no shared mutable state, so the batch is split across
/// scoped worker threads with no coordination. Results line up with `txs`.
/// Cross-transaction conflicts (one output spent by two transactions in the
/// batch) are not detected here.
pub fn verify_batch(txs: &[Transaction]) -> Vec<Result<(), TransactionError>> {
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    if workers <= 1 || txs.len() <= 1 {
        return txs.iter().map(verify_transaction).collect();
    }

    let chunk_size = txs.len().div_ceil(workers);
    thread::scope(|scope| {
        let handles: Vec<_> = txs
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || chunk.iter().map(verify_transaction).collect::<Vec<_>>())
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(results) => results,
                // Verification never panics; if a worker somehow did, let
                // the panic surface in the caller.
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signatures::tests::malleate;
    use crate::crypto::{sha256, Address, Keypair, PublicKey, Signature, SignatureError};
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::types::{TransactionInput, TransactionOutput};

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    /// Helper: build and sign a valid one-input, one-output transaction.
    fn valid_signed_tx() -> (Transaction, Keypair) {
        let kp = Keypair::generate();
        let mut builder = TransactionBuilder::new();
        builder.push_input(sha256(b"H1"));
        builder.push_output(addr(0xA1), 100, 10);
        let mut tx = builder.finalize();
        tx.sign_input(0, &kp);
        (tx.into_transaction(), kp)
    }

    fn signed(builder: TransactionBuilder, kp: &Keypair) -> Transaction {
        let mut tx = builder.finalize();
        for i in 0..tx.transaction().inputs.len() {
            tx.sign_input(i as u16, kp);
        }
        tx.into_transaction()
    }

    /// Re-seal after a direct field edit, keeping the existing signatures.
    fn reseal(tx: &mut Transaction) {
        tx.header.inner_hash = tx.compute_inner_hash();
    }

    #[test]
    fn valid_transaction_passes() {
        let (tx, _) = valid_signed_tx();
        assert_eq!(verify_transaction(&tx), Ok(()));
    }

    #[test]
    fn rejects_header_hash_mismatch() {
        let (mut tx, _) = valid_signed_tx();
        tx.outputs[0].coins = 101;
        match verify_transaction(&tx) {
            Err(TransactionError::HeaderHashMismatch { expected, actual }) => {
                assert_eq!(expected, tx.compute_inner_hash());
                assert_eq!(actual, tx.header.inner_hash);
            }
            other => panic!("expected HeaderHashMismatch, got {:?}", other),
        }
    }

    #[test]
    fn rejects_no_inputs() {
        let mut builder = TransactionBuilder::new();
        builder.push_output(addr(1), 1, 1);
        let tx = builder.finalize().into_transaction();
        assert_eq!(verify_transaction(&tx), Err(TransactionError::NoInputs));
    }

    #[test]
    fn rejects_no_outputs() {
        let kp = Keypair::generate();
        let mut builder = TransactionBuilder::new();
        builder.push_input(sha256(b"in"));
        let tx = signed(builder, &kp);
        assert_eq!(verify_transaction(&tx), Err(TransactionError::NoOutputs));
    }

    #[test]
    fn header_check_runs_before_emptiness_checks() {
        let mut tx = Transaction::default();
        tx.header.inner_hash = sha256(b"bogus");
        assert!(matches!(
            verify_transaction(&tx),
            Err(TransactionError::HeaderHashMismatch { .. })
        ));
    }

    #[test]
    fn rejects_too_many_signatures() {
        let (mut tx, _) = valid_signed_tx();
        tx.header.signatures.resize(MAX_SIGNATURES, Signature::default());
        assert_eq!(
            verify_transaction(&tx),
            Err(TransactionError::TooManySignatures {
                count: MAX_SIGNATURES
            })
        );
    }

    #[test]
    fn signature_count_just_below_limit_passes_that_check() {
        let (mut tx, _) = valid_signed_tx();
        tx.header.signatures.resize(MAX_SIGNATURES - 1, Signature::default());
        // Only slot 0 is used and it is validly signed; padding is ignored.
        assert_eq!(verify_transaction(&tx), Ok(()));
    }

    #[test]
    fn rejects_duplicate_spend() {
        let kp = Keypair::generate();
        let mut builder = TransactionBuilder::new();
        builder.push_input(sha256(b"same"));
        builder.push_input(sha256(b"other"));
        builder.push_input(sha256(b"same"));
        builder.push_output(addr(1), 5, 5);
        let tx = signed(builder, &kp);
        assert_eq!(
            verify_transaction(&tx),
            Err(TransactionError::DuplicateSpend {
                output_id: sha256(b"same")
            })
        );
    }

    #[test]
    fn duplicate_spend_detected_even_without_signatures() {
        let mut builder = TransactionBuilder::new();
        builder.push_input(sha256(b"same"));
        builder.push_input(sha256(b"same"));
        builder.push_output(addr(1), 5, 5);
        let tx = builder.finalize().into_transaction();
        assert!(matches!(
            verify_transaction(&tx),
            Err(TransactionError::DuplicateSpend { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_output() {
        let kp = Keypair::generate();
        let mut builder = TransactionBuilder::new();
        builder.push_input(sha256(b"in"));
        builder.push_output(addr(1), 50, 5);
        builder.push_output(addr(1), 50, 5);
        let tx = signed(builder, &kp);
        match verify_transaction(&tx) {
            Err(TransactionError::DuplicateOutput { output_id }) => {
                assert_eq!(output_id, tx.outputs[0].id(&tx.hash()));
            }
            other => panic!("expected DuplicateOutput, got {:?}", other),
        }
    }

    #[test]
    fn distinct_outputs_pass_duplicate_check() {
        let kp = Keypair::generate();
        let variants = [(addr(2), 50, 5), (addr(1), 51, 5), (addr(1), 50, 6)];
        for (destination, coins, hours) in variants {
            let mut builder = TransactionBuilder::new();
            builder.push_input(sha256(b"in"));
            builder.push_output(addr(1), 50, 5);
            builder.push_output(destination, coins, hours);
            let tx = signed(builder, &kp);
            assert_eq!(verify_transaction(&tx), Ok(()));
        }
    }

    #[test]
    fn rejects_signature_index_out_of_range() {
        let (mut tx, _) = valid_signed_tx();
        tx.inputs[0].sig_index = 3;
        reseal(&mut tx);
        assert_eq!(
            verify_transaction(&tx),
            Err(TransactionError::SignatureIndexOutOfRange {
                input: 0,
                sig_index: 3,
                signatures: 1,
            })
        );
    }

    #[test]
    fn unsigned_input_fails_index_check() {
        let mut builder = TransactionBuilder::new();
        builder.push_input(sha256(b"in"));
        builder.push_output(addr(1), 1, 1);
        let tx = builder.finalize().into_transaction();
        assert!(matches!(
            verify_transaction(&tx),
            Err(TransactionError::SignatureIndexOutOfRange { input: 0, .. })
        ));
    }

    #[test]
    fn placeholder_signature_fails_recovery() {
        let kp = Keypair::generate();
        let mut builder = TransactionBuilder::new();
        builder.push_input(sha256(b"a"));
        builder.push_input(sha256(b"b"));
        builder.push_output(addr(1), 1, 1);
        let mut tx = builder.finalize();
        // Only slot 1 signed; slot 0 stays an empty placeholder.
        tx.sign_input(1, &kp);
        let err = verify_transaction(tx.transaction()).unwrap_err();
        assert_eq!(err, TransactionError::PubkeyRecoveryFailed { input: 0 });
        assert!(err.is_cryptographic());
    }

    #[test]
    fn malleated_signature_fails_verification() {
        let (mut tx, _) = valid_signed_tx();
        tx.header.signatures[0] = malleate(&tx.header.signatures[0]);
        let err = verify_transaction(&tx).unwrap_err();
        assert_eq!(err, TransactionError::SignatureVerificationFailed { input: 0 });
        assert!(err.is_cryptographic());
    }

    #[test]
    fn signature_over_other_message_is_not_rejected_here() {
        // A signature from any key over the inner hash passes: deciding
        // whether that key may spend the output needs the UTXO set.
        let (mut tx, _) = valid_signed_tx();
        let stranger = Keypair::generate();
        tx.header.signatures[0] = stranger.sign_hash(&tx.header.inner_hash);
        assert_eq!(verify_transaction(&tx), Ok(()));
    }

    #[test]
    fn signature_over_output_id_recovers_a_different_key() {
        let (mut tx, kp) = valid_signed_tx();
        tx.header.signatures[0] = kp.sign_hash(&tx.inputs[0].output_id);
        // Recovery over the inner hash yields some key, never the signer's.
        if let Ok(pk) =
            crate::crypto::recover_public_key(&tx.header.inner_hash, &tx.header.signatures[0])
        {
            assert_ne!(pk, kp.public_key());
        }
    }

    #[test]
    fn shared_signature_slot_is_allowed() {
        let kp = Keypair::generate();
        let mut builder = TransactionBuilder::new();
        builder.push_input(sha256(b"a"));
        builder.push_input(sha256(b"b"));
        builder.push_output(addr(1), 1, 1);
        let mut tx = builder.finalize().into_transaction();
        tx.inputs[1].sig_index = 0;
        reseal(&mut tx);
        tx.header.signatures = vec![kp.sign_hash(&tx.header.inner_hash)];
        assert_eq!(verify_transaction(&tx), Ok(()));
    }

    #[test]
    fn check_order_duplicate_spend_before_signatures() {
        let mut tx = Transaction {
            header: Default::default(),
            inputs: vec![
                TransactionInput { sig_index: 9, output_id: sha256(b"x") },
                TransactionInput { sig_index: 9, output_id: sha256(b"x") },
            ],
            outputs: vec![TransactionOutput { destination: addr(1), coins: 1, hours: 1 }],
        };
        reseal(&mut tx);
        assert!(matches!(
            verify_transaction(&tx),
            Err(TransactionError::DuplicateSpend { .. })
        ));
    }

    struct RejectingVerifier {
        fail_recovery: bool,
    }

    impl SignatureVerifier for RejectingVerifier {
        fn recover_public_key(
            &self,
            hash: &Hash256,
            signature: &Signature,
        ) -> Result<PublicKey, SignatureError> {
            if self.fail_recovery {
                Err(SignatureError::InvalidSignature)
            } else {
                crate::crypto::recover_public_key(hash, signature)
            }
        }

        fn verify(
            &self,
            _public_key: &PublicKey,
            _signature: &Signature,
            _hash: &Hash256,
        ) -> Result<(), SignatureError> {
            Err(SignatureError::SignatureMismatch)
        }
    }

    #[test]
    fn injected_verifier_failures_map_to_errors() {
        let (tx, _) = valid_signed_tx();
        assert_eq!(
            verify_transaction_with(&tx, &RejectingVerifier { fail_recovery: true }),
            Err(TransactionError::PubkeyRecoveryFailed { input: 0 })
        );
        assert_eq!(
            verify_transaction_with(&tx, &RejectingVerifier { fail_recovery: false }),
            Err(TransactionError::SignatureVerificationFailed { input: 0 })
        );
    }

    #[test]
    fn structural_errors_are_not_cryptographic() {
        assert!(!TransactionError::NoInputs.is_cryptographic());
        assert!(!TransactionError::DuplicateSpend { output_id: Hash256::ZERO }.is_cryptographic());
        assert!(!TransactionError::SignatureIndexOutOfRange {
            input: 0,
            sig_index: 0,
            signatures: 0
        }
        .is_cryptographic());
    }

    #[test]
    fn verify_batch_preserves_order() {
        let (good, _) = valid_signed_tx();
        let mut bad = good.clone();
        bad.outputs[0].hours += 1;

        let batch = vec![good.clone(), bad, good.clone(), Transaction::default()];
        let results = verify_batch(&batch);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0], Ok(()));
        assert!(matches!(results[1], Err(TransactionError::HeaderHashMismatch { .. })));
        assert_eq!(results[2], Ok(()));
        assert!(results[3].is_err());
    }

    #[test]
    fn verify_batch_empty() {
        assert!(verify_batch(&[]).is_empty());
    }

    #[test]
    fn first_duplicate_scans_in_order() {
        let a = sha256(b"a");
        let b = sha256(b"b");
        assert_eq!(first_duplicate(vec![a, b, b, a]), Some(b));
        assert_eq!(first_duplicate(vec![a, b, a, b]), Some(a));
        assert_eq!(first_duplicate(vec![a, b]), None);
        assert_eq!(first_duplicate(Vec::new()), None);
    }
}
