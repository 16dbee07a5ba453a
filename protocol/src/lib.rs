// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Coinhour Protocol — Core Library
//!
//! The transaction core of a UTXO ledger whose outputs carry two
//! quantities: coins and coin hours. This crate builds, signs, encodes,
//! verifies and orders transactions. It does not track the UTXO set, so
//! questions that need ledger state (does this output exist, may this key
//! spend it, do inputs cover outputs) are answered elsewhere.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants: sizes, limits, prefix width.
//! - **crypto** — SHA-256 hashing and recoverable secp256k1 signatures.
//! - **encoding** — The canonical binary codec every hash is computed over.
//! - **transaction** — Model, builder, validator and canonical ordering.
//!
//! ## Logging
//!
//! The library emits `tracing` events and never installs a subscriber;
//! that is the host's call.

pub mod config;
pub mod crypto;
pub mod encoding;
pub mod transaction;
