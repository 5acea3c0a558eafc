//! Manual exclusion of transactions from totals.
//!
//! A transaction is identified by `(posted date, description, type)` only.
//! Two rows sharing all three are the same transaction as far as exclusion
//! is concerned and are excluded or included together.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::transaction::{Transaction, TransactionType};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(
    from = "(String, String, TransactionType)",
    into = "(String, String, TransactionType)"
)]
pub struct ExclusionKey {
    pub posted_date: String,
    pub description: String,
    pub transaction_type: TransactionType,
}

impl ExclusionKey {
    pub fn new(
        posted_date: impl Into<String>,
        description: impl Into<String>,
        transaction_type: TransactionType,
    ) -> Self {
        ExclusionKey {
            posted_date: posted_date.into(),
            description: description.into(),
            transaction_type,
        }
    }
}

impl From<(String, String, TransactionType)> for ExclusionKey {
    fn from(
        (posted_date, description, transaction_type): (String, String, TransactionType),
    ) -> Self {
        ExclusionKey {
            posted_date,
            description,
            transaction_type,
        }
    }
}

impl From<ExclusionKey> for (String, String, TransactionType) {
    fn from(key: ExclusionKey) -> Self {
        (key.posted_date, key.description, key.transaction_type)
    }
}

/// The identity every exclusion lookup goes through.
pub fn identity_of(tx: &Transaction) -> ExclusionKey {
    ExclusionKey {
        posted_date: tx.posted_date.clone(),
        description: tx.description.clone(),
        transaction_type: tx.transaction_type(),
    }
}

/// Excluded transactions of one dataset. Iterates in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet {
    keys: BTreeSet<ExclusionKey>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &ExclusionKey) -> bool {
        self.keys.contains(key)
    }

    pub fn is_excluded(&self, tx: &Transaction) -> bool {
        self.keys.contains(&identity_of(tx))
    }

    /// Returns `true` if the transaction was not already excluded.
    pub fn exclude(&mut self, tx: &Transaction) -> bool {
        self.keys.insert(identity_of(tx))
    }

    /// Returns `true` if the transaction had been excluded.
    pub fn include(&mut self, tx: &Transaction) -> bool {
        self.keys.remove(&identity_of(tx))
    }

    /// Flips the transaction's state. Returns `true` if it is now excluded.
    pub fn toggle(&mut self, tx: &Transaction) -> bool {
        if self.include(tx) {
            false
        } else {
            self.exclude(tx)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExclusionKey> {
        self.keys.iter()
    }
}

impl FromIterator<ExclusionKey> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = ExclusionKey>>(iter: I) -> Self {
        ExclusionSet {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Transactions not in `exclusions`, in input order.
pub fn filter<'a, I>(transactions: I, exclusions: &ExclusionSet) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|tx| exclusions.is_empty() || !exclusions.is_excluded(tx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::fixtures::{credit, debit};

    fn sample() -> Vec<Transaction> {
        vec![
            debit("01/03/2024", "TESCO", "Groceries", -1000),
            debit("02/03/2024", "SHELL", "Fuel", -5000),
            credit("03/03/2024", "SALARY", "Income", 250_000),
        ]
    }

    #[test]
    fn filter_with_empty_set_is_identity() {
        let txs = sample();
        let kept = filter(&txs, &ExclusionSet::new());
        assert_eq!(kept.len(), txs.len());
        assert!(kept.iter().zip(&txs).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn filter_drops_excluded_and_keeps_order() {
        let txs = sample();
        let mut set = ExclusionSet::new();
        set.exclude(&txs[1]);

        let kept = filter(&txs, &set);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].description, "TESCO");
        assert_eq!(kept[1].description, "SALARY");
        assert!(kept.iter().all(|tx| !set.is_excluded(tx)));
    }

    #[test]
    fn key_type_distinguishes_debit_from_credit() {
        let out = debit("01/03/2024", "REFUND", "Other", -500);
        let back = credit("01/03/2024", "REFUND", "Other", 500);
        let mut set = ExclusionSet::new();
        set.exclude(&out);
        assert!(set.is_excluded(&out));
        assert!(!set.is_excluded(&back));
    }

    #[test]
    fn toggle_twice_restores_original_set() {
        let txs = sample();
        let mut set = ExclusionSet::new();
        set.exclude(&txs[0]);
        let original = set.clone();

        assert!(set.toggle(&txs[2]));
        assert!(set.is_excluded(&txs[2]));
        assert!(!set.toggle(&txs[2]));
        assert_eq!(set, original);

        assert!(!set.toggle(&txs[0]));
        assert!(set.toggle(&txs[0]));
        assert_eq!(set, original);
    }

    #[test]
    fn same_date_description_and_type_collide() {
        let first = debit("05/03/2024", "COFFEE", "Other", -300);
        let second = debit("05/03/2024", "COFFEE", "Other", -450);
        let mut set = ExclusionSet::new();
        set.exclude(&first);
        assert!(set.is_excluded(&second));
        assert!(filter([&first, &second], &set).is_empty());
    }

    #[test]
    fn serializes_keys_as_triples() {
        let mut set = ExclusionSet::new();
        set.exclude(&debit("01/03/2024", "TESCO", "Groceries", -1000));
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[["01/03/2024","TESCO","Debit"]]"#);

        let back: ExclusionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
