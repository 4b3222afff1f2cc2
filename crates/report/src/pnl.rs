use std::collections::BTreeMap;

use schedc_core::{CategorizedTransaction, Money};
use tracing::info;

/// Per-category income, expense and net totals.
///
/// `total_expense` is stored as a non-negative magnitude, so
/// `net_amount == total_income - total_expense` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PnlRow {
    pub category: String,
    pub total_income: Money,
    pub total_expense: Money,
    pub net_amount: Money,
}

impl PnlRow {
    fn empty(category: &str) -> Self {
        PnlRow {
            category: category.to_string(),
            total_income: Money::zero(),
            total_expense: Money::zero(),
            net_amount: Money::zero(),
        }
    }

    fn add(&mut self, amount: Money) {
        if amount.is_positive() {
            self.total_income += amount;
        } else if amount.is_negative() {
            self.total_expense += amount.abs();
        }
        self.net_amount += amount;
    }
}

/// Group transactions by category. Rows come back in byte order of the
/// category label.
pub fn profit_and_loss(transactions: &[CategorizedTransaction]) -> Vec<PnlRow> {
    let mut by_category: BTreeMap<&str, PnlRow> = BTreeMap::new();
    for tx in transactions {
        by_category
            .entry(tx.category.as_str())
            .or_insert_with(|| PnlRow::empty(&tx.category))
            .add(tx.amount);
    }

    let rows: Vec<PnlRow> = by_category.into_values().collect();
    info!(
        "P&L: {} categories from {} transactions",
        rows.len(),
        transactions.len()
    );
    rows
}
