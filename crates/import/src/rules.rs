use std::path::Path;

use schedc_core::{CategorizedTransaction, Transaction, UNCATEGORIZED};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ImportError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub pattern: String,
    pub category: String,
}

impl CategoryRule {
    pub fn new(pattern: impl Into<String>, category: impl Into<String>) -> Self {
        CategoryRule {
            pattern: pattern.into(),
            category: category.into(),
        }
    }
}

const DEFAULT_RULES: &[(&str, &str)] = &[
    // Meals
    ("Starbucks", "Meals"),
    ("McDonald", "Meals"),
    ("KFC", "Meals"),
    ("Pizza", "Meals"),
    // Office & online
    ("Amazon", "Office Supplies"),
    ("Daraz", "Office Supplies"),
    ("Upwork", "Client Payment"),
    ("PayPal", "Software Subscription"),
    ("Shopify", "E-commerce Fees"),
    ("Google", "Advertising"),
    ("Canva", "Design Tool"),
    ("Zoom", "Communication"),
    // Travel
    ("Uber", "Travel"),
    ("Careem", "Travel"),
    ("Shell", "Fuel"),
    ("PSO", "Fuel"),
    ("Total", "Fuel"),
    ("FedEx", "Shipping"),
    // Utilities
    ("K-Electric", "Electricity Bill"),
    ("LESCO", "Electricity Bill"),
    ("MEPCO", "Electricity Bill"),
    ("SNGPL", "Gas Bill"),
    ("PTCL", "Internet & Landline"),
    ("Jazz", "Mobile Bill"),
    ("Zong", "Mobile Bill"),
    ("Ufone", "Mobile Bill"),
    ("Telenor", "Mobile Bill"),
    // Subscriptions
    ("Netflix", "Entertainment"),
    ("Spotify", "Entertainment"),
    ("YouTube", "Entertainment"),
    // Banking
    ("Bank", "Bank Charges"),
    ("ATM", "Bank Charges"),
    ("Fee", "Service Fee"),
    ("Charge", "Service Fee"),
    // Groceries
    ("Walmart", "Groceries"),
    ("Carrefour", "Groceries"),
    ("Imtiaz", "Groceries"),
    ("Metro", "Groceries"),
    ("Al Fatah", "Groceries"),
    // Income
    ("Salary", "Salary Income"),
    ("Bonus", "Salary Income"),
    ("Interest", "Interest Income"),
    ("Profit", "Business Income"),
    // Other
    ("Donation", "Charity"),
    ("Hospital", "Medical Expense"),
    ("Pharmacy", "Medical Expense"),
];

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<CategoryRule>,
}

/// Counts reported after a categorization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorizeSummary {
    pub categorized: usize,
    pub uncategorized: usize,
}

impl CategorizeSummary {
    pub fn total(&self) -> usize {
        self.categorized + self.uncategorized
    }
}

/// Ordered, first-match-wins substring rules.
///
/// Rules are evaluated in the order given and never reordered, so an
/// earlier, broader pattern shadows a later, more specific one.
#[derive(Debug, Clone)]
pub struct CategoryRuleEngine {
    rules: Vec<CategoryRule>,
    // Lowercased patterns, index-aligned with `rules`.
    needles: Vec<String>,
}

impl Default for CategoryRuleEngine {
    fn default() -> Self {
        Self::default_rules()
    }
}

impl CategoryRuleEngine {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let needles = rules.iter().map(|r| r.pattern.to_lowercase()).collect();
        Self { rules, needles }
    }

    /// The built-in rule list.
    pub fn default_rules() -> Self {
        Self::new(
            DEFAULT_RULES
                .iter()
                .map(|(pattern, category)| CategoryRule::new(*pattern, *category))
                .collect(),
        )
    }

    /// Parse a `[[rules]]` table list. Empty patterns are rejected.
    pub fn from_toml(toml_content: &str) -> Result<Self, ImportError> {
        let file: RulesFile = toml::from_str(toml_content)
            .map_err(|e| ImportError::InvalidRules(format!("Failed to parse TOML: {e}")))?;

        if let Some(pos) = file.rules.iter().position(|r| r.pattern.trim().is_empty()) {
            return Err(ImportError::InvalidRules(format!(
                "rule {} has an empty pattern",
                pos + 1
            )));
        }
        Ok(Self::new(file.rules))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ImportError> {
        let content = std::fs::read_to_string(path)?;
        let engine = Self::from_toml(&content)?;
        debug!("Loaded {} rules from {}", engine.len(), path.display());
        Ok(engine)
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn find_matching_rule(&self, merchant_name: &str) -> Option<&CategoryRule> {
        let text = merchant_name.to_lowercase();
        self.needles
            .iter()
            .position(|needle| text.contains(needle.as_str()))
            .map(|idx| &self.rules[idx])
    }

    pub fn categorize(&self, merchant_name: &str) -> &str {
        self.find_matching_rule(merchant_name)
            .map(|r| r.category.as_str())
            .unwrap_or(UNCATEGORIZED)
    }

    /// Assign a category to every transaction, preserving row order.
    pub fn apply(
        &self,
        transactions: Vec<Transaction>,
    ) -> (Vec<CategorizedTransaction>, CategorizeSummary) {
        let mut summary = CategorizeSummary::default();
        let categorized: Vec<CategorizedTransaction> = transactions
            .into_iter()
            .map(|tx| {
                let category = self.categorize(&tx.merchant_name).to_string();
                let tx = CategorizedTransaction::new(tx, category);
                if tx.is_uncategorized() {
                    summary.uncategorized += 1;
                } else {
                    summary.categorized += 1;
                }
                tx
            })
            .collect();

        info!(
            "Categorized {} of {} transactions ({} uncategorized)",
            summary.categorized,
            summary.total(),
            summary.uncategorized
        );
        (categorized, summary)
    }
}
