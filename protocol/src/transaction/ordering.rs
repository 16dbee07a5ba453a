//! Canonical ordering of transactions.
//!
//! Transactions sort by identity hash, compared byte-wise. Every node that
//! sorts the same set gets the same sequence, independent of arrival order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::types::Transaction;
use crate::crypto::Hash256;

/// Compares two transactions by identity hash.
pub fn compare_by_hash(a: &Transaction, b: &Transaction) -> Ordering {
    a.hash().cmp(&b.hash())
}

/// An ordered collection of transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transactions(Vec<Transaction>);

impl Transactions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tx: Transaction) {
        self.0.push(tx);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sorts into canonical order, ascending by identity hash.
    ///
    /// Each transaction is hashed once rather than on every comparison.
    pub fn sort(&mut self) {
        self.0.sort_by_cached_key(Transaction::hash);
    }

    /// Identity hashes in current order.
    pub fn hashes(&self) -> Vec<Hash256> {
        self.0.iter().map(Transaction::hash).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<Transaction> {
        self.0
    }
}

impl From<Vec<Transaction>> for Transactions {
    fn from(txs: Vec<Transaction>) -> Self {
        Self(txs)
    }
}

impl FromIterator<Transaction> for Transactions {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Transactions {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
