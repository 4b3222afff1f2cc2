pub mod error;
pub mod pnl;
pub mod tax;
pub mod writer;

pub use error::ReportError;
pub use pnl::{profit_and_loss, PnlRow};
pub use tax::{
    deductible_amount, schedule_c, TaxMapping, TaxMappingEntry, TaxReportRow, UnmappedPolicy,
    DEFAULT_MAPPING_FILE,
};
pub use writer::{write_pnl_csv, write_schedule_c_csv, PNL_REPORT_FILE, SCHEDULE_C_REPORT_FILE};
