use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use schedc_core::Money;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ReportError;
use crate::pnl::PnlRow;

pub const DEFAULT_MAPPING_FILE: &str = "tax_mapping_schedule_c.csv";

pub const UNMAPPED_CODE: &str = "UNMAPPED";
pub const UNMAPPED_NAME: &str = "Unmapped category";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxMappingEntry {
    pub category: String,
    pub tax_line_code: String,
    pub tax_line_name: String,
    /// 0–100.
    pub deductibility_pct: Decimal,
}

/// Category → tax line lookup, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct TaxMapping {
    entries: Vec<TaxMappingEntry>,
    by_category: HashMap<String, usize>,
}

struct MappingColumns {
    category: usize,
    code: Option<usize>,
    name: Option<usize>,
    pct: Option<usize>,
}

impl MappingColumns {
    fn locate(headers: &StringRecord) -> Result<Self, String> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let category = find("category").ok_or("missing 'category' column")?;
        Ok(MappingColumns {
            category,
            code: find("tax_line_code"),
            name: find("tax_line_name"),
            pct: find("deductibility_pct"),
        })
    }
}

fn field<'r>(record: &'r StringRecord, col: Option<usize>) -> &'r str {
    col.and_then(|c| record.get(c)).unwrap_or("")
}

fn parse_pct(raw: &str) -> Result<Decimal, String> {
    if raw.is_empty() {
        return Ok(Decimal::ONE_HUNDRED);
    }
    let pct = Decimal::from_str(raw).map_err(|_| format!("invalid deductibility_pct '{raw}'"))?;
    if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
        return Err(format!("deductibility_pct {raw} is outside 0-100"));
    }
    Ok(pct.normalize())
}

impl TaxMapping {
    pub fn new(entries: Vec<TaxMappingEntry>) -> Self {
        let mut mapping = TaxMapping::default();
        for entry in entries {
            mapping.insert(entry);
        }
        mapping
    }

    fn insert(&mut self, entry: TaxMappingEntry) {
        if self.by_category.contains_key(&entry.category) {
            warn!(
                "Duplicate tax mapping for category '{}'; keeping the first entry",
                entry.category
            );
            return;
        }
        self.by_category
            .insert(entry.category.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// Load the mapping file. Any failure is reported as
    /// [`ReportError::MissingTaxMapping`].
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let missing = |reason: String| ReportError::MissingTaxMapping {
            path: path.to_path_buf(),
            reason,
        };
        let file = std::fs::File::open(path).map_err(|e| missing(e.to_string()))?;
        let mapping = Self::from_reader(file).map_err(missing)?;
        debug!(
            "Loaded {} tax mapping entries from {}",
            mapping.len(),
            path.display()
        );
        Ok(mapping)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, String> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().map_err(|e| e.to_string())?.clone();
        let cols = MappingColumns::locate(&headers)?;

        let mut mapping = TaxMapping::default();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| e.to_string())?;
            let category = field(&record, Some(cols.category));
            if category.is_empty() {
                continue;
            }
            let deductibility_pct = parse_pct(field(&record, cols.pct))
                .map_err(|e| format!("row {}: {e}", line + 2))?;
            mapping.insert(TaxMappingEntry {
                category: category.to_string(),
                tax_line_code: field(&record, cols.code).to_string(),
                tax_line_name: field(&record, cols.name).to_string(),
                deductibility_pct,
            });
        }
        Ok(mapping)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `category`. Entries with a blank code or name count as
    /// absent.
    pub fn lookup(&self, category: &str) -> Option<&TaxMappingEntry> {
        self.by_category
            .get(category)
            .map(|&idx| &self.entries[idx])
            .filter(|e| !e.tax_line_code.is_empty() && !e.tax_line_name.is_empty())
    }
}

/// What to do with P&L categories that have no tax mapping entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedPolicy {
    /// Collect them under an explicit `UNMAPPED` tax line.
    #[default]
    Surface,
    /// Leave them out of the tax report.
    Drop,
}

impl fmt::Display for UnmappedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmappedPolicy::Surface => write!(f, "surface"),
            UnmappedPolicy::Drop => write!(f, "drop"),
        }
    }
}

impl FromStr for UnmappedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "surface" => Ok(UnmappedPolicy::Surface),
            "drop" => Ok(UnmappedPolicy::Drop),
            other => Err(format!("Unknown unmapped policy: '{other}' (expected surface or drop)")),
        }
    }
}

/// Expense (negative net) is scaled by `pct / 100`; income passes through.
pub fn deductible_amount(net: Money, pct: Decimal) -> Money {
    if net.is_negative() {
        net.percent(pct)
    } else {
        net
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxReportRow {
    pub tax_line_code: String,
    pub tax_line_name: String,
    pub deductibility_pct: Decimal,
    pub total_deductible: Money,
}

impl TaxReportRow {
    pub fn is_unmapped(&self) -> bool {
        self.tax_line_code == UNMAPPED_CODE
    }
}

/// Join P&L rows onto the mapping and total deductible amounts per
/// `(tax_line_code, tax_line_name, deductibility_pct)`.
///
/// Mapped lines are ordered by that triple. With
/// [`UnmappedPolicy::Surface`] a single `UNMAPPED` line follows them.
pub fn schedule_c(
    pnl: &[PnlRow],
    mapping: &TaxMapping,
    policy: UnmappedPolicy,
) -> Vec<TaxReportRow> {
    let mut lines: BTreeMap<(&str, &str, Decimal), Money> = BTreeMap::new();
    let mut unmapped: Vec<&str> = Vec::new();
    let mut unmapped_total = Money::zero();

    for row in pnl {
        match mapping.lookup(&row.category) {
            Some(entry) => {
                let key = (
                    entry.tax_line_code.as_str(),
                    entry.tax_line_name.as_str(),
                    entry.deductibility_pct,
                );
                *lines.entry(key).or_default() +=
                    deductible_amount(row.net_amount, entry.deductibility_pct);
            }
            None => {
                unmapped.push(&row.category);
                unmapped_total += deductible_amount(row.net_amount, Decimal::ONE_HUNDRED);
            }
        }
    }

    let mut report: Vec<TaxReportRow> = lines
        .into_iter()
        .map(|((code, name, pct), total)| TaxReportRow {
            tax_line_code: code.to_string(),
            tax_line_name: name.to_string(),
            deductibility_pct: pct,
            total_deductible: total,
        })
        .collect();

    if !unmapped.is_empty() {
        warn!(
            "{} categories have no tax mapping: {}",
            unmapped.len(),
            unmapped.join(", ")
        );
        match policy {
            UnmappedPolicy::Surface => report.push(TaxReportRow {
                tax_line_code: UNMAPPED_CODE.to_string(),
                tax_line_name: UNMAPPED_NAME.to_string(),
                deductibility_pct: Decimal::ONE_HUNDRED,
                total_deductible: unmapped_total,
            }),
            UnmappedPolicy::Drop => debug!("Dropping unmapped categories from tax report"),
        }
    }

    info!("Schedule C: {} tax lines", report.len());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pnl(category: &str, net: Decimal) -> PnlRow {
        let net = Money::new(net);
        PnlRow {
            category: category.to_string(),
            total_income: if net.is_positive() { net } else { Money::zero() },
            total_expense: if net.is_negative() { net.abs() } else { Money::zero() },
            net_amount: net,
        }
    }

    fn entry(category: &str, code: &str, name: &str, pct: Decimal) -> TaxMappingEntry {
        TaxMappingEntry {
            category: category.to_string(),
            tax_line_code: code.to_string(),
            tax_line_name: name.to_string(),
            deductibility_pct: pct,
        }
    }

    // ── deductible_amount ─────────────────────────────────────────────────────

    #[test]
    fn expense_is_scaled_by_pct() {
        assert_eq!(
            deductible_amount(Money::new(dec!(-200)), dec!(50)),
            Money::new(dec!(-100))
        );
    }

    #[test]
    fn income_passes_through_unscaled() {
        assert_eq!(
            deductible_amount(Money::new(dec!(300)), dec!(50)),
            Money::new(dec!(300))
        );
        assert_eq!(
            deductible_amount(Money::new(dec!(300)), dec!(0)),
            Money::new(dec!(300))
        );
    }

    // ── mapping file ──────────────────────────────────────────────────────────

    #[test]
    fn from_reader_trims_headers_and_defaults_pct() {
        let csv = " category , tax_line_code ,tax_line_name, deductibility_pct \n\
                   Meals, L24b, Meals, 50\n\
                   Advertising,L8,Advertising,\n";
        let mapping = TaxMapping::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(mapping.len(), 2);
        let meals = mapping.lookup("Meals").unwrap();
        assert_eq!(meals.tax_line_code, "L24b");
        assert_eq!(meals.deductibility_pct, dec!(50));
        assert_eq!(
            mapping.lookup("Advertising").unwrap().deductibility_pct,
            dec!(100)
        );
    }

    #[test]
    fn from_reader_first_duplicate_wins() {
        let csv = "category,tax_line_code,tax_line_name,deductibility_pct\n\
                   Fuel,L9,Car and truck expenses,100\n\
                   Fuel,L27a,Other expenses,50\n";
        let mapping = TaxMapping::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.lookup("Fuel").unwrap().tax_line_code, "L9");
    }

    #[test]
    fn from_reader_requires_category_column() {
        let err = TaxMapping::from_reader("code,pct\nL8,100\n".as_bytes()).unwrap_err();
        assert!(err.contains("category"));
    }

    #[test]
    fn from_reader_rejects_bad_pct() {
        let csv = "category,tax_line_code,tax_line_name,deductibility_pct\nMeals,L24b,Meals,half\n";
        assert!(TaxMapping::from_reader(csv.as_bytes()).is_err());
        let csv = "category,tax_line_code,tax_line_name,deductibility_pct\nMeals,L24b,Meals,150\n";
        assert!(TaxMapping::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn blank_tax_line_counts_as_unmapped() {
        let mapping = TaxMapping::new(vec![entry("Meals", "", "Meals", dec!(50))]);
        assert!(mapping.lookup("Meals").is_none());
    }

    #[test]
    fn load_missing_file_is_missing_tax_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let err = TaxMapping::load(&path).unwrap_err();
        match err {
            ReportError::MissingTaxMapping { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    // ── schedule_c ────────────────────────────────────────────────────────────

    fn mapping() -> TaxMapping {
        TaxMapping::new(vec![
            entry("Meals", "L24b", "Deductible meals", dec!(50)),
            entry("Advertising", "L8", "Advertising", dec!(100)),
            entry("Design Tool", "L18", "Office expense", dec!(100)),
            entry("Office Supplies", "L18", "Office expense", dec!(100)),
            entry("Client Payment", "L1", "Gross receipts", dec!(100)),
        ])
    }

    #[test]
    fn aggregates_by_tax_line() {
        let rows = schedule_c(
            &[
                pnl("Client Payment", dec!(5000)),
                pnl("Design Tool", dec!(-12.99)),
                pnl("Meals", dec!(-200)),
                pnl("Office Supplies", dec!(-87.01)),
            ],
            &mapping(),
            UnmappedPolicy::Surface,
        );
        let view: Vec<_> = rows
            .iter()
            .map(|r| (r.tax_line_code.as_str(), r.total_deductible.amount()))
            .collect();
        assert_eq!(
            view,
            vec![("L1", dec!(5000)), ("L18", dec!(-100.00)), ("L24b", dec!(-100))]
        );
    }

    #[test]
    fn unmapped_surface_adds_trailing_line() {
        let rows = schedule_c(
            &[
                pnl("Advertising", dec!(-50)),
                pnl("Uncategorized", dec!(-30)),
                pnl("Zakat", dec!(10)),
            ],
            &mapping(),
            UnmappedPolicy::Surface,
        );
        assert_eq!(rows.len(), 2);
        let last = rows.last().unwrap();
        assert!(last.is_unmapped());
        assert_eq!(last.tax_line_name, UNMAPPED_NAME);
        assert_eq!(last.deductibility_pct, dec!(100));
        assert_eq!(last.total_deductible, Money::new(dec!(-20)));
    }

    #[test]
    fn unmapped_drop_excludes_categories() {
        let rows = schedule_c(
            &[pnl("Advertising", dec!(-50)), pnl("Uncategorized", dec!(-30))],
            &mapping(),
            UnmappedPolicy::Drop,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tax_line_code, "L8");
    }

    #[test]
    fn no_unmapped_line_when_everything_maps() {
        let rows = schedule_c(&[pnl("Meals", dec!(-10))], &mapping(), UnmappedPolicy::Surface);
        assert!(rows.iter().all(|r| !r.is_unmapped()));
    }

    #[test]
    fn empty_mapping_surfaces_everything() {
        let rows = schedule_c(
            &[pnl("Meals", dec!(-10)), pnl("Fuel", dec!(-5))],
            &TaxMapping::default(),
            UnmappedPolicy::Surface,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_deductible, Money::new(dec!(-15)));
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Drop".parse::<UnmappedPolicy>().unwrap(), UnmappedPolicy::Drop);
        assert_eq!(" surface ".parse::<UnmappedPolicy>().unwrap(), UnmappedPolicy::Surface);
        assert!("ignore".parse::<UnmappedPolicy>().is_err());
    }
}
