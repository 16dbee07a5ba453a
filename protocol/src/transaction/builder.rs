//! Transaction construction and signing.
//!
//! Building goes through two phases, each its own type:
//!
//! 1. [`TransactionBuilder`] — inputs and outputs are appended. Nothing is
//!    hashed yet, nothing can be signed.
//! 2. [`FinalizedTransaction`] — produced by [`TransactionBuilder::finalize`].
//!    The inner hash is computed and frozen; inputs and outputs can no longer
//!    be touched, only signed. Going back to editing means
//!    [`FinalizedTransaction::reopen`], which throws away the hash and every
//!    signature.
//!
//! A stale inner hash therefore cannot be signed by construction. Misuse
//! that remains possible (too many inputs, signing a slot that doesn't
//! exist, a missing key) is a bug in the calling code and panics; it is not
//! something an untrusted peer can trigger.

use std::collections::HashMap;

use tracing::trace;

use super::types::{Transaction, TransactionHeader, TransactionInput, TransactionOutput};
use crate::config::MAX_TRANSACTION_INPUTS;
use crate::crypto::{Address, Hash256, Keypair, Signature};

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Accumulates inputs and outputs for a new transaction.
///
/// # Usage
///
/// ```
/// use coinhour_protocol::crypto::{sha256, Keypair};
/// use coinhour_protocol::transaction::{verify_transaction, TransactionBuilder};
///
/// let owner = Keypair::generate();
/// let recipient = Keypair::generate().address();
///
/// let mut builder = TransactionBuilder::new();
/// let sig_index = builder.push_input(sha256(b"some unspent output"));
/// builder.push_output(recipient, 100, 10);
///
/// let mut tx = builder.finalize();
/// tx.sign_input(sig_index, &owner);
/// assert!(verify_transaction(tx.transaction()).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an input spending `output_id` and returns its signature index.
    ///
    /// Indices are handed out sequentially from 0 and cannot be chosen by
    /// the caller.
    ///
    /// # Panics
    ///
    /// If the transaction already holds the maximum of 65 535 inputs.
    pub fn push_input(&mut self, output_id: Hash256) -> u16 {
        assert!(
            self.inputs.len() < MAX_TRANSACTION_INPUTS,
            "max transaction inputs reached ({})",
            MAX_TRANSACTION_INPUTS
        );
        let sig_index = self.inputs.len() as u16;
        self.inputs.push(TransactionInput {
            sig_index,
            output_id,
        });
        sig_index
    }

    /// Appends an output sending `coins` and `hours` to `destination`.
    ///
    /// Duplicates are accepted here and rejected by the validator.
    pub fn push_output(&mut self, destination: Address, coins: u64, hours: u64) {
        self.outputs.push(TransactionOutput {
            destination,
            coins,
            hours,
        });
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    /// Computes the inner hash and freezes inputs and outputs.
    pub fn finalize(self) -> FinalizedTransaction {
        let mut tx = Transaction {
            header: TransactionHeader::default(),
            inputs: self.inputs,
            outputs: self.outputs,
        };
        tx.header.inner_hash = tx.compute_inner_hash();
        trace!(
            inner_hash = %tx.header.inner_hash,
            inputs = tx.inputs.len(),
            outputs = tx.outputs.len(),
            "transaction finalized"
        );
        FinalizedTransaction { tx }
    }
}

// ---------------------------------------------------------------------------
// FinalizedTransaction
// ---------------------------------------------------------------------------

/// A transaction whose inner hash is computed and whose body is frozen.
///
/// Only the signature list can change from here on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedTransaction {
    tx: Transaction,
}

impl FinalizedTransaction {
    /// The message every input signature covers.
    pub fn inner_hash(&self) -> Hash256 {
        self.tx.header.inner_hash
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn into_transaction(self) -> Transaction {
        self.tx
    }

    /// Identity hash of the transaction in its current signing state.
    pub fn hash(&self) -> Hash256 {
        self.tx.hash()
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.tx.serialize()
    }

    /// Signs the inner hash with `keypair` and stores the signature in slot
    /// `index`, padding the signature list with empty placeholders as
    /// needed. Re-signing a slot overwrites it.
    ///
    /// # Panics
    ///
    /// If `index` is not below the number of inputs.
    pub fn sign_input(&mut self, index: u16, keypair: &Keypair) {
        let input_count = self.tx.inputs.len();
        assert!(
            input_count <= MAX_TRANSACTION_INPUTS,
            "transaction has {} inputs, more than the {} a signature index can address",
            input_count,
            MAX_TRANSACTION_INPUTS
        );
        assert!(
            (index as usize) < input_count,
            "signature index {} out of range for {} inputs",
            index,
            input_count
        );

        let signature = keypair.sign_hash(&self.tx.header.inner_hash);
        let signatures = &mut self.tx.header.signatures;
        if signatures.len() <= index as usize {
            signatures.resize(index as usize + 1, Signature::default());
        }
        signatures[index as usize] = signature;
        trace!(index, inner_hash = %self.tx.header.inner_hash, "input signed");
    }

    /// Signs every input with the key registered for its signature index.
    ///
    /// # Panics
    ///
    /// If `keys` has no entry for some input's `sig_index`.
    pub fn sign_inputs(&mut self, keys: &HashMap<u16, Keypair>) {
        let sig_indices: Vec<u16> = self.tx.inputs.iter().map(|input| input.sig_index).collect();
        for sig_index in sig_indices {
            let keypair = keys
                .get(&sig_index)
                .unwrap_or_else(|| panic!("no signing key for signature index {}", sig_index));
            self.sign_input(sig_index, keypair);
        }
    }

    /// Returns to the building phase. The inner hash and all signatures are
    /// discarded, so the transaction must be finalized and signed again.
    pub fn reopen(self) -> TransactionBuilder {
        TransactionBuilder {
            inputs: self.tx.inputs,
            outputs: self.tx.outputs,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
