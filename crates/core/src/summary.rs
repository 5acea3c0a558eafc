use serde::{Deserialize, Serialize};

use super::exclusion::{filter, ExclusionSet};
use super::money::Money;
use super::transaction::{Transaction, TransactionTable, TransactionType};

/// Per-category figures. `min`, `max` and `avg` are over absolute amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub total: Money,
    pub min: Money,
    pub max: Money,
    pub avg: Money,
}

/// Statistics for one side (debits or credits) of a dataset.
///
/// Categories are listed in order of first appearance; `highest` and
/// `lowest` take the earliest category on ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSummary {
    pub categories: Vec<CategoryStats>,
    pub overall_min: Option<Money>,
    pub overall_max: Option<Money>,
    pub total: Money,
    pub highest: Option<CategoryStats>,
    pub lowest: Option<CategoryStats>,
}

impl SideSummary {
    pub fn category(&self, name: &str) -> Option<&CategoryStats> {
        self.categories.iter().find(|c| c.category == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub debits: SideSummary,
    pub credits: SideSummary,
}

impl Summary {
    pub fn total_spent(&self) -> Money {
        self.debits.total
    }

    pub fn total_income(&self) -> Money {
        self.credits.total
    }

    pub fn most_expensive(&self) -> Option<&CategoryStats> {
        self.debits.highest.as_ref()
    }

    pub fn least_expensive(&self) -> Option<&CategoryStats> {
        self.debits.lowest.as_ref()
    }

    pub fn most_profitable(&self) -> Option<&CategoryStats> {
        self.credits.highest.as_ref()
    }

    pub fn least_profitable(&self) -> Option<&CategoryStats> {
        self.credits.lowest.as_ref()
    }
}

/// Filters both subsets against `exclusions`, then summarizes each side.
pub fn compute_summary<'a, D, C>(debits: D, credits: C, exclusions: &ExclusionSet) -> Summary
where
    D: IntoIterator<Item = &'a Transaction>,
    C: IntoIterator<Item = &'a Transaction>,
{
    Summary {
        debits: summarize_side(filter(debits, exclusions), TransactionType::Debit),
        credits: summarize_side(filter(credits, exclusions), TransactionType::Credit),
    }
}

/// Summarizes already-filtered transactions. Rows without an amount on
/// `side` are ignored.
pub fn summarize_side<'a, I>(transactions: I, side: TransactionType) -> SideSummary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let groups = group_amounts(transactions, side);
    if groups.is_empty() {
        return SideSummary::default();
    }

    let categories: Vec<CategoryStats> = groups
        .iter()
        .map(|(category, amounts)| category_stats(category, amounts, side))
        .collect();

    let all = groups.iter().flat_map(|(_, amounts)| amounts.iter().copied());
    let overall_min = all.clone().map(Money::abs).min();
    let overall_max = all.clone().map(Money::abs).max();
    let total = all.map(|m| side_value(m, side)).sum();

    let highest = pick(&categories, |candidate, best| candidate.total > best.total);
    let lowest = pick(&categories, |candidate, best| candidate.total < best.total);

    SideSummary {
        categories,
        overall_min,
        overall_max,
        total,
        highest,
        lowest,
    }
}

/// Per-category totals for one side, in first-appearance order. Debits are
/// summed as absolute values, credits signed, both rounded to cents.
pub fn category_totals<'a, I>(transactions: I, side: TransactionType) -> Vec<(String, Money)>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    group_amounts(transactions, side)
        .into_iter()
        .map(|(category, amounts)| {
            let total: Money = amounts.into_iter().map(|m| side_value(m, side)).sum();
            (category.to_string(), total.round())
        })
        .collect()
}

/// Totals over every non-excluded row of a table, as a statement footer
/// would show them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningTotals {
    /// Sum of debit values as reported by the source (sign preserved).
    pub total_debits: Money,
    pub total_credits: Money,
    /// Balance of the last included row, zero when nothing is included.
    pub ending_balance: Money,
}

pub fn running_totals(table: &TransactionTable, exclusions: &ExclusionSet) -> RunningTotals {
    let included = filter(table.rows(), exclusions);
    RunningTotals {
        total_debits: included.iter().filter_map(|tx| tx.debit).sum(),
        total_credits: included.iter().filter_map(|tx| tx.credit).sum(),
        ending_balance: included.last().map_or_else(Money::zero, |tx| tx.balance),
    }
}

fn side_value(amount: Money, side: TransactionType) -> Money {
    match side {
        TransactionType::Debit => amount.abs(),
        TransactionType::Credit => amount,
    }
}

fn group_amounts<'a, I>(transactions: I, side: TransactionType) -> Vec<(&'a str, Vec<Money>)>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut groups: Vec<(&'a str, Vec<Money>)> = Vec::new();
    for tx in transactions {
        let Some(amount) = tx.amount(side) else {
            continue;
        };
        match groups.iter_mut().find(|(c, _)| *c == tx.category) {
            Some((_, amounts)) => amounts.push(amount),
            None => groups.push((tx.category.as_str(), vec![amount])),
        }
    }
    groups
}

fn category_stats(category: &str, amounts: &[Money], side: TransactionType) -> CategoryStats {
    let abs = || amounts.iter().map(|m| m.abs());
    CategoryStats {
        category: category.to_string(),
        total: amounts
            .iter()
            .map(|m| side_value(*m, side))
            .sum::<Money>()
            .round(),
        min: abs().min().unwrap_or_default().round(),
        max: abs().max().unwrap_or_default().round(),
        avg: Money::mean(abs()).unwrap_or_default().round(),
    }
}

/// First element that no later element beats.
fn pick<F>(rows: &[CategoryStats], beats: F) -> Option<CategoryStats>
where
    F: Fn(&CategoryStats, &CategoryStats) -> bool,
{
    rows.iter()
        .reduce(|best, candidate| if beats(candidate, best) { candidate } else { best })
        .cloned()
}
