//! Pure transforms. None of them mutate their input or touch I/O, and each
//! returns the same output for the same input.

use std::collections::BTreeMap;

use super::transaction::{Amount, Transaction, TransactionKind};

/// Category → amount, iterated in category order.
pub type CategorySummary = BTreeMap<String, Amount>;

/// Transactions of `kind`, in their original order.
pub fn filter_by_kind(transactions: &[Transaction], kind: TransactionKind) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.kind == kind)
        .cloned()
        .collect()
}

pub fn sum(transactions: &[Transaction]) -> Amount {
    transactions.iter().map(|tx| tx.amount).sum()
}

pub fn group_by_category(transactions: &[Transaction]) -> CategorySummary {
    transactions
        .iter()
        .fold(CategorySummary::new(), |mut summary, tx| {
            *summary.entry(tx.category.clone()).or_default() += tx.amount;
            summary
        })
}

/// Scale every category by `factor` (1.10 projects a 10% increase).
pub fn project(summary: &CategorySummary, factor: f64) -> CategorySummary {
    summary
        .iter()
        .map(|(category, amount)| (category.clone(), amount.scale(factor)))
        .collect()
}

/// One `"<category>: $<amount>"` line per category.
pub fn format_summary(summary: &CategorySummary) -> Vec<String> {
    summary
        .iter()
        .map(|(category, amount)| format!("{category}: ${amount}"))
        .collect()
}
