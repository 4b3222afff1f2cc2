use std::io::Write;

use serde::Serialize;

use crate::error::ReportError;
use crate::pnl::PnlRow;
use crate::tax::TaxReportRow;

pub const PNL_REPORT_FILE: &str = "pnl_report.csv";
pub const SCHEDULE_C_REPORT_FILE: &str = "schedule_c_report.csv";

#[derive(Serialize)]
struct PnlRecord<'a> {
    category: &'a str,
    #[serde(rename = "Total_Income")]
    total_income: String,
    #[serde(rename = "Total_Expense")]
    total_expense: String,
    #[serde(rename = "Net_Amount")]
    net_amount: String,
}

#[derive(Serialize)]
struct TaxRecord<'a> {
    tax_line_code: &'a str,
    tax_line_name: &'a str,
    deductibility_pct: String,
    #[serde(rename = "Total Deductible ($)")]
    total_deductible: String,
}

fn write_csv<I, R, W>(records: I, writer: W) -> Result<(), ReportError>
where
    I: IntoIterator<Item = R>,
    R: Serialize,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_header_only<W: Write>(header: &[&str], writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header)?;
    wtr.flush()?;
    Ok(())
}

const PNL_HEADER: &[&str] = &["category", "Total_Income", "Total_Expense", "Net_Amount"];
const TAX_HEADER: &[&str] = &[
    "tax_line_code",
    "tax_line_name",
    "deductibility_pct",
    "Total Deductible ($)",
];

/// Amounts are written rounded to cents, without currency symbols.
pub fn write_pnl_csv<W: Write>(rows: &[PnlRow], writer: W) -> Result<(), ReportError> {
    if rows.is_empty() {
        return write_header_only(PNL_HEADER, writer);
    }
    write_csv(
        rows.iter().map(|r| PnlRecord {
            category: &r.category,
            total_income: r.total_income.to_plain_string(),
            total_expense: r.total_expense.to_plain_string(),
            net_amount: r.net_amount.to_plain_string(),
        }),
        writer,
    )
}

pub fn write_schedule_c_csv<W: Write>(rows: &[TaxReportRow], writer: W) -> Result<(), ReportError> {
    if rows.is_empty() {
        return write_header_only(TAX_HEADER, writer);
    }
    write_csv(
        rows.iter().map(|r| TaxRecord {
            tax_line_code: &r.tax_line_code,
            tax_line_name: &r.tax_line_name,
            deductibility_pct: r.deductibility_pct.normalize().to_string(),
            total_deductible: r.total_deductible.to_plain_string(),
        }),
        writer,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use schedc_core::Money;

    fn render_pnl(rows: &[PnlRow]) -> String {
        let mut buf = Vec::new();
        write_pnl_csv(rows, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn render_tax(rows: &[TaxReportRow]) -> String {
        let mut buf = Vec::new();
        write_schedule_c_csv(rows, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn pnl_csv_layout() {
        let out = render_pnl(&[PnlRow {
            category: "Meals".into(),
            total_income: Money::new(dec!(5)),
            total_expense: Money::new(dec!(20.125)),
            net_amount: Money::new(dec!(-15.125)),
        }]);
        assert_eq!(
            out,
            "category,Total_Income,Total_Expense,Net_Amount\nMeals,5.00,20.13,-15.13\n"
        );
    }

    #[test]
    fn tax_csv_layout_and_quoting() {
        let out = render_tax(&[TaxReportRow {
            tax_line_code: "L24b".into(),
            tax_line_name: "Meals, deductible".into(),
            deductibility_pct: dec!(50.00),
            total_deductible: Money::new(dec!(-100)),
        }]);
        assert_eq!(
            out,
            "tax_line_code,tax_line_name,deductibility_pct,Total Deductible ($)\n\
             L24b,\"Meals, deductible\",50,-100.00\n"
        );
    }

    #[test]
    fn empty_reports_still_have_headers() {
        assert_eq!(render_pnl(&[]), "category,Total_Income,Total_Expense,Net_Amount\n");
        assert_eq!(
            render_tax(&[]),
            "tax_line_code,tax_line_name,deductibility_pct,Total Deductible ($)\n"
        );
    }
}
