use serde::{Deserialize, Serialize};

use super::category::CategoryMap;
use super::exclusion::{filter, ExclusionSet};
use super::summary::{compute_summary, running_totals, RunningTotals, Summary};
use super::transaction::{Transaction, TransactionTable};

/// A loaded statement together with the user's exclusions for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    table: TransactionTable,
    exclusions: ExclusionSet,
}

impl Dataset {
    pub fn new(name: impl Into<String>, table: TransactionTable) -> Self {
        Self::with_exclusions(name, table, ExclusionSet::new())
    }

    pub fn with_exclusions(
        name: impl Into<String>,
        table: TransactionTable,
        exclusions: ExclusionSet,
    ) -> Self {
        Dataset {
            name: name.into(),
            table,
            exclusions,
        }
    }

    pub fn table(&self) -> &TransactionTable {
        &self.table
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    pub fn debits(&self) -> impl Iterator<Item = &Transaction> {
        self.table.debits()
    }

    pub fn credits(&self) -> impl Iterator<Item = &Transaction> {
        self.table.credits()
    }

    /// Debits left after exclusions.
    pub fn included_debits(&self) -> Vec<&Transaction> {
        filter(self.table.debits(), &self.exclusions)
    }

    /// Credits left after exclusions.
    pub fn included_credits(&self) -> Vec<&Transaction> {
        filter(self.table.credits(), &self.exclusions)
    }

    pub fn is_excluded(&self, tx: &Transaction) -> bool {
        self.exclusions.is_excluded(tx)
    }

    /// Flips a transaction between included and excluded. Returns `true` if
    /// it is now excluded.
    pub fn toggle(&mut self, tx: &Transaction) -> bool {
        self.exclusions.toggle(tx)
    }

    pub fn summary(&self) -> Summary {
        compute_summary(self.table.debits(), self.table.credits(), &self.exclusions)
    }

    pub fn totals(&self) -> RunningTotals {
        running_totals(&self.table, &self.exclusions)
    }

    /// Re-derives every row's category. Exclusions are unaffected since the
    /// category is not part of a transaction's identity.
    pub fn recategorize(&mut self, categories: &CategoryMap) {
        self.table.recategorize(categories);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::transaction::fixtures::{credit, debit};

    fn statement() -> Dataset {
        Dataset::new(
            "march",
            TransactionTable::new(vec![
                debit("01/03", "TESCO", "Other", -1000),
                debit("02/03", "SHELL", "Other", -4000),
                credit("03/03", "SALARY", "Other", 100_000),
            ]),
        )
    }

    #[test]
    fn toggle_changes_summary_and_back() {
        let mut ds = statement();
        let shell = ds.table().rows()[1].clone();

        assert_eq!(ds.summary().total_spent(), Money::from_cents(5000));
        assert!(ds.toggle(&shell));
        assert!(ds.is_excluded(&shell));
        assert_eq!(ds.summary().total_spent(), Money::from_cents(1000));
        assert_eq!(ds.included_debits().len(), 1);

        assert!(!ds.toggle(&shell));
        assert_eq!(ds.summary().total_spent(), Money::from_cents(5000));
        assert!(ds.exclusions().is_empty());
    }

    #[test]
    fn recategorize_keeps_exclusions() {
        let mut ds = statement();
        let tesco = ds.table().rows()[0].clone();
        ds.toggle(&tesco);

        let mut categories = CategoryMap::new();
        categories.add_keyword("fuel", "shell").unwrap();
        ds.recategorize(&categories);

        assert_eq!(ds.table().rows()[1].category, "Fuel");
        assert!(ds.is_excluded(&ds.table().rows()[0]));
        let summary = ds.summary();
        assert_eq!(summary.debits.categories.len(), 1);
        assert_eq!(summary.most_expensive().unwrap().category, "Fuel");
    }

    #[test]
    fn subsets_and_totals() {
        let ds = statement();
        assert_eq!(ds.debits().count(), 2);
        assert_eq!(ds.credits().count(), 1);
        assert_eq!(ds.included_credits().len(), 1);
        assert_eq!(ds.totals().total_credits, Money::from_cents(100_000));
    }
}
