//! Maps bank exports onto the canonical transaction table.
//!
//! Three column layouts are recognised, tried in order:
//!
//! | layout              | trigger                          | date                       | description    |
//! |---------------------|----------------------------------|----------------------------|----------------|
//! | signed amount       | `Amount`                         | `Started Date`             | `Description`  |
//! | debit/credit amount | `Debit Amount` + `Credit Amount` | `Posted Transactions Date` | `Description1` |
//! | debit/credit        | `Debit` + `Credit`               | `Date`                     | `Details`      |
//!
//! All three read `Balance`. Missing text columns read as empty, missing
//! amount columns as absent.
//!
//! Amount cells that are blank, unparseable or exactly zero are absent. A row
//! with no amount, or with both a debit and a credit, stays in the table but
//! belongs to neither subset.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use tally_core::{CategoryMap, Money, Transaction, TransactionTable};
use thiserror::Error;

use crate::csv::RawTable;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Unsupported statement layout, columns found: [{}]", .0.join(", "))]
    UnsupportedSchema(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    SignedAmount,
    DebitCreditAmount,
    DebitCredit,
}

enum Amounts {
    Signed(&'static str),
    Split {
        debit: &'static str,
        credit: &'static str,
    },
}

struct Layout {
    date: &'static str,
    description: &'static str,
    balance: &'static str,
    amounts: Amounts,
}

impl Schema {
    pub fn detect(table: &RawTable) -> Option<Schema> {
        if table.has_column("Amount") {
            Some(Schema::SignedAmount)
        } else if table.has_column("Debit Amount") && table.has_column("Credit Amount") {
            Some(Schema::DebitCreditAmount)
        } else if table.has_column("Debit") && table.has_column("Credit") {
            Some(Schema::DebitCredit)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Schema::SignedAmount => "signed amount",
            Schema::DebitCreditAmount => "debit/credit amount",
            Schema::DebitCredit => "debit/credit",
        }
    }

    fn layout(self) -> Layout {
        match self {
            Schema::SignedAmount => Layout {
                date: "Started Date",
                description: "Description",
                balance: "Balance",
                amounts: Amounts::Signed("Amount"),
            },
            Schema::DebitCreditAmount => Layout {
                date: "Posted Transactions Date",
                description: "Description1",
                balance: "Balance",
                amounts: Amounts::Split {
                    debit: "Debit Amount",
                    credit: "Credit Amount",
                },
            },
            Schema::DebitCredit => Layout {
                date: "Date",
                description: "Details",
                balance: "Balance",
                amounts: Amounts::Split {
                    debit: "Debit",
                    credit: "Credit",
                },
            },
        }
    }
}

/// Normalizes and categorizes every row of `table`. Fails as a whole when
/// the layout is not recognised.
pub fn normalize(
    table: &RawTable,
    categories: &CategoryMap,
) -> Result<TransactionTable, NormalizeError> {
    let Some(schema) = Schema::detect(table) else {
        tracing::warn!(columns = ?table.headers(), "unsupported statement layout");
        return Err(NormalizeError::UnsupportedSchema(table.headers().to_vec()));
    };
    tracing::debug!(schema = schema.name(), rows = table.len(), "normalizing statement");

    let layout = schema.layout();
    let reader = RowReader {
        table,
        date: table.column(layout.date),
        description: table.column(layout.description),
        balance: table.column(layout.balance),
    };

    let mut rows = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let (debit, credit) = match layout.amounts {
            Amounts::Signed(col) => {
                let amount = reader.amount(row, table.column(col), col);
                (
                    amount.filter(|m| m.is_negative()),
                    amount.filter(|m| m.is_positive()),
                )
            }
            Amounts::Split { debit, credit } => (
                reader.amount(row, table.column(debit), debit),
                reader.amount(row, table.column(credit), credit),
            ),
        };

        let tx = Transaction::new(
            reader.text(row, reader.date),
            reader.text(row, reader.description),
            debit,
            credit,
            reader
                .amount(row, reader.balance, layout.balance)
                .unwrap_or_default(),
            categories,
        );
        if tx.debit.is_some() && tx.credit.is_some() {
            tracing::warn!(
                row = row + 1,
                "row has both a debit and a credit, left out of both subsets"
            );
        }
        rows.push(tx);
    }

    let normalized = TransactionTable::new(rows);
    tracing::debug!(
        debits = normalized.debits().count(),
        credits = normalized.credits().count(),
        "statement normalized"
    );
    Ok(normalized)
}

struct RowReader<'a> {
    table: &'a RawTable,
    date: Option<usize>,
    description: Option<usize>,
    balance: Option<usize>,
}

impl RowReader<'_> {
    fn text(&self, row: usize, col: Option<usize>) -> String {
        col.and_then(|c| self.table.cell(row, c))
            .unwrap_or_default()
            .to_string()
    }

    fn amount(&self, row: usize, col: Option<usize>, column: &str) -> Option<Money> {
        let raw = col.and_then(|c| self.table.cell(row, c))?;
        match parse_amount(raw) {
            Ok(amount) => amount.filter(|m| !m.is_zero()),
            Err(cleaned) => {
                tracing::warn!(
                    row = row + 1,
                    column,
                    value = %cleaned,
                    "unparseable amount treated as absent"
                );
                None
            }
        }
    }
}

/// Parses a bank amount cell into whole cents. Blank cells are `Ok(None)`;
/// the error carries the cleaned text that failed to parse or whose cents do
/// not fit an `i64`.
pub fn parse_amount(s: &str) -> Result<Option<Money>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let (negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };
    let s = s.replace([',', '$', '£', '€', ' '], "");
    let mut dec = Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .map_err(|_| s.clone())?;
    if negative {
        dec = -dec;
    }
    let cents = dec
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|c| c.round().to_i64())
        .ok_or_else(|| s.clone())?;
    Ok(Some(Money::from_cents(cents)))
}
