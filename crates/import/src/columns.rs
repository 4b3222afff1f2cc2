//! Column classification for heterogeneous bank exports.
//!
//! Every header heuristic lives here so the rest of the pipeline works
//! from a typed [`ColumnLayout`] instead of scanning names itself.

use tracing::debug;

use crate::table::Table;

pub const MERCHANT_COLUMN: &str = "merchant_name";
pub const DIRECTION_COLUMN: &str = "direction";

/// Headers tried, in header order, when there is no `merchant_name` column.
pub const MERCHANT_CANDIDATES: &[&str] = &["Description", "Particulars", "Details", "Narration"];

/// Credit-like keywords, most preferred first.
pub const CREDIT_KEYWORDS: &[&str] = &["credit", "deposit", "amount", "balance"];
pub const DEBIT_KEYWORDS: &[&str] = &["debit", "withdrawal", "spent"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MerchantSource {
    /// A column literally named `merchant_name`.
    Existing(usize),
    /// First header found in [`MERCHANT_CANDIDATES`].
    Candidate(usize),
    /// Nothing matched; the first column is used as text.
    FirstColumn,
}

impl MerchantSource {
    pub fn index(self) -> usize {
        match self {
            MerchantSource::Existing(idx) | MerchantSource::Candidate(idx) => idx,
            MerchantSource::FirstColumn => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumns {
    CreditAndDebit { credit: usize, debit: usize },
    CreditOnly { credit: usize },
    DebitOnly { debit: usize },
    Unresolved,
}

impl AmountColumns {
    pub fn is_resolved(self) -> bool {
        !matches!(self, AmountColumns::Unresolved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionSource {
    /// The export already carries a `direction` column.
    Existing(usize),
    /// `Deposits` / `Deposit`: in when the value is positive.
    Deposits(usize),
    /// `Withdrawals`: out when the value is positive.
    Withdrawals(usize),
    /// Derived from the sign of the resolved amount.
    AmountSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub merchant: MerchantSource,
    pub amount: AmountColumns,
    pub direction: DirectionSource,
}

impl ColumnLayout {
    pub fn detect(headers: &[String]) -> Self {
        let layout = ColumnLayout {
            merchant: detect_merchant_column(headers),
            amount: classify_amount_columns(headers),
            direction: detect_direction_source(headers),
        };
        debug!(?layout, "Classified columns");
        layout
    }
}

pub fn detect_merchant_column(headers: &[String]) -> MerchantSource {
    if let Some(idx) = headers.iter().position(|h| h == MERCHANT_COLUMN) {
        return MerchantSource::Existing(idx);
    }
    headers
        .iter()
        .position(|h| MERCHANT_CANDIDATES.contains(&h.as_str()))
        .map(MerchantSource::Candidate)
        .unwrap_or(MerchantSource::FirstColumn)
}

fn keyword_rank(header: &str, keywords: &[&str]) -> Option<usize> {
    let lower = header.to_lowercase();
    keywords.iter().position(|k| lower.contains(k))
}

pub fn classify_amount_columns(headers: &[String]) -> AmountColumns {
    let debit = headers
        .iter()
        .position(|h| keyword_rank(h, DEBIT_KEYWORDS).is_some());

    // Precedence: the first debit-like header is the debit column; a header
    // that looks debit-like ("Debit Amount") is never a credit candidate;
    // among credit candidates the lower keyword rank wins, then header order.
    let credit = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| keyword_rank(h, DEBIT_KEYWORDS).is_none())
        .filter_map(|(idx, h)| keyword_rank(h, CREDIT_KEYWORDS).map(|rank| (rank, idx)))
        .min()
        .map(|(_, idx)| idx);

    match (credit, debit) {
        (Some(credit), Some(debit)) => AmountColumns::CreditAndDebit { credit, debit },
        (Some(credit), None) => AmountColumns::CreditOnly { credit },
        (None, Some(debit)) => AmountColumns::DebitOnly { debit },
        (None, None) => AmountColumns::Unresolved,
    }
}

pub fn detect_direction_source(headers: &[String]) -> DirectionSource {
    let find = |name: &str| headers.iter().position(|h| h == name);
    if let Some(idx) = find(DIRECTION_COLUMN) {
        DirectionSource::Existing(idx)
    } else if let Some(idx) = find("Deposits").or_else(|| find("Deposit")) {
        DirectionSource::Deposits(idx)
    } else if let Some(idx) = find("Withdrawals") {
        DirectionSource::Withdrawals(idx)
    } else {
        DirectionSource::AmountSign
    }
}

/// Trim headers and materialise the `merchant_name` column.
pub fn normalize_columns(table: Table) -> Table {
    let table = table.with_trimmed_headers();
    let source = detect_merchant_column(table.headers());
    debug!(?source, "Merchant column");
    if let MerchantSource::Existing(_) = source {
        return table;
    }
    let values = table.column(source.index()).map(str::to_string).collect();
    table.with_column(MERCHANT_COLUMN, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // ── merchant ──────────────────────────────────────────────────────────────

    #[test]
    fn merchant_prefers_existing_column() {
        let h = headers(&["Description", "merchant_name", "Amount"]);
        assert_eq!(detect_merchant_column(&h), MerchantSource::Existing(1));
    }

    #[test]
    fn merchant_uses_first_candidate_in_header_order() {
        let h = headers(&["Date", "Narration", "Description", "Amount"]);
        assert_eq!(detect_merchant_column(&h), MerchantSource::Candidate(1));
    }

    #[test]
    fn merchant_candidates_are_case_sensitive() {
        let h = headers(&["Date", "description", "Amount"]);
        assert_eq!(detect_merchant_column(&h), MerchantSource::FirstColumn);
    }

    #[test]
    fn normalize_trims_and_copies_candidate() {
        let table = Table::new(
            headers(&[" Date ", " Particulars", "Amount "]),
            vec![headers(&["2024-01-01", "UBER TRIP", "-12.00"])],
        );
        let t = normalize_columns(table);
        assert_eq!(t.headers(), &["Date", "Particulars", "Amount", "merchant_name"]);
        assert_eq!(t.cell(0, 3), "UBER TRIP");
    }

    #[test]
    fn normalize_falls_back_to_first_column() {
        let table = Table::new(
            headers(&["Payee", "Amount"]),
            vec![headers(&["Shell Station", "-40"])],
        );
        let t = normalize_columns(table);
        assert_eq!(t.cell(0, t.column_index(MERCHANT_COLUMN).unwrap()), "Shell Station");
    }

    #[test]
    fn normalize_keeps_existing_merchant_column() {
        let table = Table::new(
            headers(&["merchant_name", "Description", "Amount"]),
            vec![headers(&["Netflix", "NFLX*1234", "-15"])],
        );
        let t = normalize_columns(table);
        assert_eq!(t.headers().len(), 3);
        assert_eq!(t.cell(0, 0), "Netflix");
    }

    // ── amount columns ────────────────────────────────────────────────────────

    #[test]
    fn single_amount_column_is_credit_only() {
        let h = headers(&["Date", "Description", "Amount"]);
        assert_eq!(classify_amount_columns(&h), AmountColumns::CreditOnly { credit: 2 });
    }

    #[test]
    fn deposits_and_withdrawals() {
        let h = headers(&["Date", "Description", "Withdrawals", "Deposits", "Balance"]);
        assert_eq!(
            classify_amount_columns(&h),
            AmountColumns::CreditAndDebit { credit: 3, debit: 2 }
        );
    }

    #[test]
    fn balance_only_used_without_better_candidate() {
        let h = headers(&["Details", "Balance"]);
        assert_eq!(classify_amount_columns(&h), AmountColumns::CreditOnly { credit: 1 });
        let h = headers(&["Details", "Balance", "Amount"]);
        assert_eq!(classify_amount_columns(&h), AmountColumns::CreditOnly { credit: 2 });
    }

    #[test]
    fn debit_like_header_is_not_a_credit_candidate() {
        let h = headers(&["Narration", "Debit Amount", "Credit Amount"]);
        assert_eq!(
            classify_amount_columns(&h),
            AmountColumns::CreditAndDebit { credit: 2, debit: 1 }
        );
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let h = headers(&["DESCRIPTION", "MONEY SPENT"]);
        assert_eq!(classify_amount_columns(&h), AmountColumns::DebitOnly { debit: 1 });
    }

    #[test]
    fn no_amount_columns_is_unresolved() {
        let h = headers(&["Notes"]);
        assert_eq!(classify_amount_columns(&h), AmountColumns::Unresolved);
        assert!(!classify_amount_columns(&h).is_resolved());
    }

    // ── direction ─────────────────────────────────────────────────────────────

    #[test]
    fn direction_source_precedence() {
        let h = headers(&["Withdrawals", "Deposit", "Deposits", "direction"]);
        assert_eq!(detect_direction_source(&h), DirectionSource::Existing(3));
        let h = headers(&["Withdrawals", "Deposit", "Deposits"]);
        assert_eq!(detect_direction_source(&h), DirectionSource::Deposits(2));
        let h = headers(&["Withdrawals", "Deposit"]);
        assert_eq!(detect_direction_source(&h), DirectionSource::Deposits(1));
        let h = headers(&["Withdrawals", "Amount"]);
        assert_eq!(detect_direction_source(&h), DirectionSource::Withdrawals(0));
        let h = headers(&["Amount"]);
        assert_eq!(detect_direction_source(&h), DirectionSource::AmountSign);
    }
}
