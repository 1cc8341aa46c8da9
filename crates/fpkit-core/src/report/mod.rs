//! Monthly expense report built from pure transforms.
//!
//! ```text
//! transactions ─► filter_by_kind ─► group_by_category ─► project ─► format_summary
//!                        └────────► sum
//! ```

pub mod pipeline;
pub mod transaction;

pub use pipeline::{
    filter_by_kind, format_summary, group_by_category, project, sum, CategorySummary,
};
pub use transaction::{sample_transactions, Amount, Transaction, TransactionKind};

use serde::Serialize;

use crate::error::{FpkitError, Result};

pub const DEFAULT_PROJECTION_FACTOR: f64 = 1.10;

/// Accept only finite, strictly positive projection factors.
pub fn check_factor(factor: f64) -> Result<f64> {
    if factor.is_finite() && factor > 0.0 {
        Ok(factor)
    } else {
        Err(FpkitError::InvalidArgument(format!(
            "projection factor must be a positive number, got {factor}"
        )))
    }
}

/// Everything the report command prints, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseReport {
    pub expenses: CategorySummary,
    pub total_expenses: Amount,
    pub total_income: Amount,
    pub projection_factor: f64,
    pub projected: CategorySummary,
}

impl ExpenseReport {
    pub fn build(transactions: &[Transaction], factor: f64) -> Result<Self> {
        let factor = check_factor(factor)?;
        let expenses = filter_by_kind(transactions, TransactionKind::Expense);
        let income = filter_by_kind(transactions, TransactionKind::Income);
        let by_category = group_by_category(&expenses);
        let projected = project(&by_category, factor);

        Ok(Self {
            total_expenses: sum(&expenses),
            total_income: sum(&income),
            expenses: by_category,
            projection_factor: factor,
            projected,
        })
    }

    pub fn net(&self) -> Amount {
        self.total_income.saturating_sub(self.total_expenses)
    }
}
