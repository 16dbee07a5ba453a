//! Walkthrough of the coinhour transaction lifecycle.
//!
//! Builds and signs a transaction, ships it as bytes, verifies it on the
//! "receiving" side, spends one of its outputs, then shows what the
//! validator says about a tampered copy and a double spend.
//!
//! Run with:
//!   cargo run --example demo
//!
//! Set `RUST_LOG=coinhour_protocol=trace` to see library events, and
//! `COINHOUR_LOG_FORMAT=json` for JSON lines.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use coinhour_protocol::config::SIGNING_ALGORITHM;
use coinhour_protocol::crypto::{recover_public_key, sha256, Keypair};
use coinhour_protocol::transaction::{
    verify_batch, verify_transaction, Transaction, TransactionBuilder, TransactionError,
    Transactions,
};

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Accepts "json" or "pretty" (case-insensitive); anything else is `Pretty`.
    fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Installs the global subscriber on stderr. `RUST_LOG` overrides
/// `default_level` when set.
fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

fn step(n: usize, title: &str) {
    println!();
    println!("{BOLD}{CYAN}[{n}] {title}{RESET}");
}

fn detail(label: &str, value: impl std::fmt::Display) {
    println!("    {DIM}{label:<14}{RESET} {value}");
}

fn verdict(result: &Result<(), TransactionError>) {
    match result {
        Ok(()) => println!("    {GREEN}accepted{RESET}"),
        Err(err) => println!("    {RED}rejected{RESET}: {err}"),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let format = std::env::var("COINHOUR_LOG_FORMAT")
        .map(|s| LogFormat::from_str_lossy(&s))
        .unwrap_or(LogFormat::Pretty);
    init_logging("coinhour_protocol=debug", format);

    let alice = Keypair::generate();
    let bob = Keypair::generate();

    step(1, "Alice builds and signs a payment to Bob");
    let mut builder = TransactionBuilder::new();
    let sig_index = builder.push_input(sha256(b"alice's unspent output"));
    builder.push_output(bob.address(), 100, 10);
    builder.push_output(alice.address(), 900, 40);
    let mut finalized = builder.finalize();
    finalized.sign_input(sig_index, &alice);
    detail("scheme", SIGNING_ALGORITHM);
    detail("inner hash", finalized.inner_hash());
    detail("identity", finalized.hash());

    step(2, "Bytes on the wire");
    let bytes = finalized.serialize();
    detail("size", format!("{} bytes", bytes.len()));
    detail("prefix", hex::encode(&bytes[..16]));

    step(3, "Bob's node decodes and verifies");
    let started = Instant::now();
    let received = Transaction::deserialize(&bytes).context("decoding payment")?;
    let result = verify_transaction(&received);
    detail("elapsed", format!("{:?}", started.elapsed()));
    verdict(&result);
    result.context("payment should verify")?;

    let signer = recover_public_key(&received.header.inner_hash, &received.header.signatures[0])
        .context("recovering signer")?;
    detail("signer", signer);
    if signer != alice.public_key() {
        bail!("recovered key does not match Alice");
    }

    step(4, "Bob spends the output he received");
    let created = received.output_ids();
    detail("output id", created[0]);
    let mut builder = TransactionBuilder::new();
    builder.push_input(created[0]);
    builder.push_output(alice.address(), 100, 10);
    let mut spend = builder.finalize();
    spend.sign_input(0, &bob);
    verdict(&verify_transaction(spend.transaction()));

    step(5, "A relay bumps the coin amount");
    let mut tampered = received.clone();
    tampered.outputs[0].coins = 101;
    verdict(&verify_transaction(&tampered));

    step(6, "Alice tries to spend the same output twice");
    let mut builder = TransactionBuilder::new();
    builder.push_input(sha256(b"alice's unspent output"));
    builder.push_input(sha256(b"alice's unspent output"));
    builder.push_output(alice.address(), 1, 1);
    let mut double = builder.finalize();
    double.sign_input(0, &alice);
    double.sign_input(1, &alice);
    verdict(&verify_transaction(double.transaction()));

    step(7, "Canonical order of the batch");
    let batch = vec![
        received,
        spend.into_transaction(),
        tampered,
        double.into_transaction(),
    ];
    let results = verify_batch(&batch);
    let mut ordered: Transactions = batch.into_iter().collect();
    ordered.sort();
    for hash in ordered.hashes() {
        detail("tx", hash);
    }
    detail(
        "valid",
        format!("{} of {}", results.iter().filter(|r| r.is_ok()).count(), results.len()),
    );

    println!();
    Ok(())
}
