//! # Transaction Module
//!
//! Construction, signing, verification and ordering of UTXO transactions.
//! A [`Transaction`] spends previously created outputs (referenced by id)
//! and creates new ones.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — Transaction, header, inputs, outputs; canonical encoding
//! uxout.rs        — Output identity (UxBody, output_id)
//! builder.rs      — TransactionBuilder / FinalizedTransaction, signing
//! verification.rs — Structural and cryptographic verification
//! ordering.rs     — Canonical ordering by identity hash
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: push inputs and outputs on a [`TransactionBuilder`].
//! 2. **Finalize**: [`TransactionBuilder::finalize`] caches the inner hash.
//! 3. **Sign**: [`FinalizedTransaction::sign_input`] per input, or
//!    [`FinalizedTransaction::sign_inputs`] with a key map.
//! 4. **Verify**: receivers run [`verify_transaction`] on the decoded value.
//!
//! ## Two Hashes
//!
//! - The **inner hash** covers inputs and outputs. It is what signatures
//!   sign and is cached in the header.
//! - The **identity hash** is the double SHA-256 of the full encoding,
//!   signatures included. It names the transaction, derives the ids of the
//!   outputs it creates, and defines canonical order.

pub mod builder;
pub mod ordering;
pub mod types;
pub mod uxout;
pub mod verification;

pub use builder::{FinalizedTransaction, TransactionBuilder};
pub use ordering::{compare_by_hash, Transactions};
pub use types::{Transaction, TransactionHeader, TransactionInput, TransactionOutput};
pub use uxout::{output_id, UxBody};
pub use verification::{verify_batch, verify_transaction, verify_transaction_with, TransactionError};
