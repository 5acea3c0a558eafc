use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::{categorize, CategoryMap};
use super::money::Money;

/// Which half of a statement a transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Debit,
    Credit,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Debit => write!(f, "Debit"),
            TransactionType::Credit => write!(f, "Credit"),
        }
    }
}

/// One canonical statement row.
///
/// `debit` and `credit` hold the amount exactly as the source reported it
/// (a signed-amount export yields negative debits, split-column exports
/// usually positive ones). Zero amounts are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub posted_date: String,
    pub description: String,
    pub debit: Option<Money>,
    pub credit: Option<Money>,
    pub balance: Money,
    pub category: String,
}

impl Transaction {
    pub fn new(
        posted_date: impl Into<String>,
        description: impl Into<String>,
        debit: Option<Money>,
        credit: Option<Money>,
        balance: Money,
        categories: &CategoryMap,
    ) -> Self {
        let description = description.into();
        let category = categorize(&description, categories);
        Transaction {
            posted_date: posted_date.into(),
            description,
            debit: debit.filter(|m| !m.is_zero()),
            credit: credit.filter(|m| !m.is_zero()),
            balance,
            category,
        }
    }

    /// Subset membership: `Some` only when exactly one of debit/credit is set.
    pub fn side(&self) -> Option<TransactionType> {
        match (self.debit, self.credit) {
            (Some(_), None) => Some(TransactionType::Debit),
            (None, Some(_)) => Some(TransactionType::Credit),
            _ => None,
        }
    }

    /// The type used for exclusion identity. Anything that is not a clean
    /// debit counts as a credit.
    pub fn transaction_type(&self) -> TransactionType {
        match (self.debit, self.credit) {
            (Some(_), None) => TransactionType::Debit,
            _ => TransactionType::Credit,
        }
    }

    pub fn amount(&self, side: TransactionType) -> Option<Money> {
        match side {
            TransactionType::Debit => self.debit,
            TransactionType::Credit => self.credit,
        }
    }

    /// Re-derives the category after the category map has changed.
    pub fn recategorize(&mut self, categories: &CategoryMap) {
        self.category = categorize(&self.description, categories);
    }
}

/// A normalized statement, rows in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTable {
    rows: Vec<Transaction>,
}

impl TransactionTable {
    pub fn new(rows: Vec<Transaction>) -> Self {
        TransactionTable { rows }
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn debits(&self) -> impl Iterator<Item = &Transaction> {
        self.subset(TransactionType::Debit)
    }

    pub fn credits(&self) -> impl Iterator<Item = &Transaction> {
        self.subset(TransactionType::Credit)
    }

    pub fn subset(&self, side: TransactionType) -> impl Iterator<Item = &Transaction> {
        self.rows.iter().filter(move |t| t.side() == Some(side))
    }

    pub fn recategorize(&mut self, categories: &CategoryMap) {
        for row in &mut self.rows {
            row.recategorize(categories);
        }
    }
}

impl FromIterator<Transaction> for TransactionTable {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        TransactionTable::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn debit(date: &str, desc: &str, category: &str, cents: i64) -> Transaction {
        Transaction {
            posted_date: date.to_string(),
            description: desc.to_string(),
            debit: Some(Money::from_cents(cents)),
            credit: None,
            balance: Money::zero(),
            category: category.to_string(),
        }
    }

    pub fn credit(date: &str, desc: &str, category: &str, cents: i64) -> Transaction {
        Transaction {
            posted_date: date.to_string(),
            description: desc.to_string(),
            debit: None,
            credit: Some(Money::from_cents(cents)),
            balance: Money::zero(),
            category: category.to_string(),
        }
    }
}
