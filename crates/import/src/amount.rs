use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use schedc_core::{Direction, Money, Transaction};
use tracing::{debug, info};

use crate::columns::{AmountColumns, ColumnLayout, DirectionSource, MERCHANT_COLUMN};
use crate::error::ImportError;
use crate::table::Table;

fn re_cr_dr() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)cr|dr").expect("invalid regex"))
}

/// Strip thousands separators and `CR`/`DR` markers (any case), then trim.
pub fn clean_numeric(raw: &str) -> String {
    let no_commas = raw.replace(',', "");
    re_cr_dr().replace_all(&no_commas, "").trim().to_string()
}

/// Lenient numeric coercion used for every amount-like cell.
///
/// The cell is cleaned with [`clean_numeric`] and parsed as a decimal
/// (plain or scientific notation). Anything that does not parse, including
/// empty cells and `nan`, is treated as zero rather than an error: bank
/// exports routinely carry blanks and stray text in amount columns.
pub fn coerce_amount(raw: &str) -> Decimal {
    let cleaned = clean_numeric(raw);
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or(Decimal::ZERO)
}

fn resolve_row_amount(table: &Table, row: usize, columns: AmountColumns) -> Decimal {
    match columns {
        AmountColumns::CreditAndDebit { credit, debit } => {
            coerce_amount(table.cell(row, credit))
                .saturating_sub(coerce_amount(table.cell(row, debit)))
        }
        AmountColumns::CreditOnly { credit } => coerce_amount(table.cell(row, credit)),
        AmountColumns::DebitOnly { debit } => -coerce_amount(table.cell(row, debit)),
        AmountColumns::Unresolved => Decimal::ZERO,
    }
}

fn resolve_row_direction(
    table: &Table,
    row: usize,
    source: DirectionSource,
    amount: Money,
) -> Direction {
    match source {
        DirectionSource::Existing(col) => table
            .cell(row, col)
            .parse()
            .unwrap_or_else(|_| Direction::from_amount(amount)),
        DirectionSource::Deposits(col) => {
            if coerce_amount(table.cell(row, col)) > Decimal::ZERO {
                Direction::In
            } else {
                Direction::Out
            }
        }
        DirectionSource::Withdrawals(col) => {
            if coerce_amount(table.cell(row, col)) > Decimal::ZERO {
                Direction::Out
            } else {
                Direction::In
            }
        }
        DirectionSource::AmountSign => Direction::from_amount(amount),
    }
}

/// Derive one signed amount and a direction per row of a normalized table.
///
/// Fails with [`ImportError::MissingAmountColumns`] when no credit-like or
/// debit-like column exists.
pub fn resolve_amounts(table: &Table) -> Result<Vec<Transaction>, ImportError> {
    let layout = ColumnLayout::detect(table.headers());
    if !layout.amount.is_resolved() {
        return Err(ImportError::MissingAmountColumns {
            columns: table.headers().to_vec(),
        });
    }

    let merchant_col = table
        .column_index(MERCHANT_COLUMN)
        .unwrap_or_else(|| layout.merchant.index());

    let transactions: Vec<Transaction> = (0..table.len())
        .map(|row| {
            let amount = Money::new(resolve_row_amount(table, row, layout.amount));
            Transaction {
                merchant_name: table.cell(row, merchant_col).to_string(),
                amount,
                direction: resolve_row_direction(table, row, layout.direction, amount),
            }
        })
        .collect();

    let inflows = transactions
        .iter()
        .filter(|tx| tx.direction == Direction::In)
        .count();
    debug!(amount = ?layout.amount, direction = ?layout.direction, "Resolved amount columns");
    info!(
        "Resolved {} transactions ({} in, {} out)",
        transactions.len(),
        inflows,
        transactions.len() - inflows
    );
    Ok(transactions)
}
