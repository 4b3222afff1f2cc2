pub mod amount;
pub mod columns;
pub mod error;
pub mod rules;
pub mod table;

pub use amount::{clean_numeric, coerce_amount, resolve_amounts};
pub use columns::{normalize_columns, AmountColumns, ColumnLayout, DirectionSource, MerchantSource};
pub use error::ImportError;
pub use rules::{CategorizeSummary, CategoryRule, CategoryRuleEngine};
pub use table::{decode_input, read_table, Table};

