use comfy_table::{Cell, CellAlignment, Table};
use schedc_core::{CategorizedTransaction, Money};
use schedc_import::CategoryRuleEngine;
use schedc_report::{PnlRow, TaxReportRow};

fn amount_cell(m: Money) -> Cell {
    Cell::new(m).set_alignment(CellAlignment::Right)
}

pub fn format_preview(transactions: &[CategorizedTransaction], limit: usize) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Merchant", "Amount", "Direction", "Category"]);
    for tx in transactions.iter().take(limit) {
        table.add_row(vec![
            Cell::new(&tx.merchant_name),
            amount_cell(tx.amount),
            Cell::new(tx.direction),
            Cell::new(&tx.category),
        ]);
    }
    let shown = limit.min(transactions.len());
    format!(
        "Categorized Transactions ({shown} of {})\n{table}",
        transactions.len()
    )
}

pub fn format_pnl(rows: &[PnlRow]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Income", "Expense", "Net"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.category),
            amount_cell(row.total_income),
            amount_cell(row.total_expense),
            amount_cell(row.net_amount),
        ]);
    }
    let income: Money = rows.iter().map(|r| r.total_income).sum();
    let expense: Money = rows.iter().map(|r| r.total_expense).sum();
    table.add_row(vec![
        Cell::new("Total"),
        amount_cell(income),
        amount_cell(expense),
        amount_cell(income - expense),
    ]);
    format!("Profit & Loss\n{table}")
}

pub fn format_schedule_c(rows: &[TaxReportRow]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Line", "Name", "Deductible %", "Total Deductible"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.tax_line_code),
            Cell::new(&row.tax_line_name),
            Cell::new(format!("{}%", row.deductibility_pct.normalize()))
                .set_alignment(CellAlignment::Right),
            amount_cell(row.total_deductible),
        ]);
    }
    format!("Schedule C\n{table}")
}

pub fn format_rules(engine: &CategoryRuleEngine) -> String {
    let mut table = Table::new();
    table.set_header(vec!["#", "Pattern", "Category"]);
    for (idx, rule) in engine.rules().iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(&rule.pattern),
            Cell::new(&rule.category),
        ]);
    }
    format!("Categorization Rules (first match wins)\n{table}")
}
