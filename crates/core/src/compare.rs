//! Side-by-side comparison of two datasets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dataset::Dataset;
use super::money::Money;
use super::summary::{category_totals, summarize_side, SideSummary};
use super::transaction::{Transaction, TransactionType};

#[derive(Debug, Clone, Error)]
pub enum CompareError {
    #[error("At least two datasets are needed for a comparison, got {0}")]
    NotEnoughDatasets(usize),
}

/// One of the two datasets in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Which {
    First,
    Second,
}

/// One category's total in each dataset. A category missing from a dataset
/// contributes zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryComparison {
    pub category: String,
    pub total1: Money,
    pub total2: Money,
}

impl CategoryComparison {
    /// `total2 - total1`.
    pub fn difference(&self) -> Money {
        self.total2 - self.total1
    }

    /// Dataset with the larger absolute total. Equal totals go to the second.
    pub fn higher(&self) -> Which {
        if self.total1.abs() > self.total2.abs() {
            Which::First
        } else {
            Which::Second
        }
    }

    pub fn biggest(&self) -> Money {
        self.total1.abs().max(self.total2.abs())
    }

    pub fn smallest(&self) -> Money {
        self.total1.abs().min(self.total2.abs())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideComparison {
    pub categories: Vec<CategoryComparison>,
    pub first: SideSummary,
    pub second: SideSummary,
}

impl SideComparison {
    pub fn category(&self, name: &str) -> Option<&CategoryComparison> {
        self.categories.iter().find(|c| c.category == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub first_name: String,
    pub second_name: String,
    pub debits: SideComparison,
    pub credits: SideComparison,
}

impl Comparison {
    pub fn name_of(&self, which: Which) -> &str {
        match which {
            Which::First => &self.first_name,
            Which::Second => &self.second_name,
        }
    }
}

/// Compares `a` against `b`, each filtered by its own exclusions.
pub fn compare(a: &Dataset, b: &Dataset) -> Comparison {
    Comparison {
        first_name: a.name.clone(),
        second_name: b.name.clone(),
        debits: compare_side(a, b, TransactionType::Debit),
        credits: compare_side(a, b, TransactionType::Credit),
    }
}

/// Compares each consecutive pair: `[a, b, c]` yields `a↔b` and `b↔c`.
pub fn compare_all(datasets: &[Dataset]) -> Result<Vec<Comparison>, CompareError> {
    if datasets.len() < 2 {
        return Err(CompareError::NotEnoughDatasets(datasets.len()));
    }
    Ok(datasets
        .windows(2)
        .map(|pair| compare(&pair[0], &pair[1]))
        .collect())
}

fn compare_side(a: &Dataset, b: &Dataset, side: TransactionType) -> SideComparison {
    let rows_a = included(a, side);
    let rows_b = included(b, side);

    let totals_a = category_totals(rows_a.iter().copied(), side);
    let totals_b = category_totals(rows_b.iter().copied(), side);

    let mut names: Vec<&str> = totals_a.iter().map(|(c, _)| c.as_str()).collect();
    for (c, _) in &totals_b {
        if !names.contains(&c.as_str()) {
            names.push(c);
        }
    }

    let categories = names
        .into_iter()
        .map(|name| CategoryComparison {
            category: name.to_string(),
            total1: total_of(&totals_a, name),
            total2: total_of(&totals_b, name),
        })
        .collect();

    SideComparison {
        categories,
        first: summarize_side(rows_a.iter().copied(), side),
        second: summarize_side(rows_b.iter().copied(), side),
    }
}

fn total_of(totals: &[(String, Money)], name: &str) -> Money {
    totals
        .iter()
        .find(|(c, _)| c == name)
        .map_or_else(Money::zero, |(_, total)| *total)
}

fn included(ds: &Dataset, side: TransactionType) -> Vec<&Transaction> {
    match side {
        TransactionType::Debit => ds.included_debits(),
        TransactionType::Credit => ds.included_credits(),
    }
}
