use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use schedc_core::CategorizedTransaction;
use schedc_import::{
    normalize_columns, read_table, resolve_amounts, CategorizeSummary, CategoryRuleEngine,
    ImportError,
};
use schedc_report::{
    profit_and_loss, schedule_c, write_pnl_csv, write_schedule_c_csv, PnlRow, ReportError,
    TaxMapping, TaxReportRow, UnmappedPolicy, DEFAULT_MAPPING_FILE, PNL_REPORT_FILE,
    SCHEDULE_C_REPORT_FILE,
};
use tracing::{info, warn};

/// Everything a run needs, passed in by the caller.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub rules: CategoryRuleEngine,
    pub tax_mapping_path: PathBuf,
    pub unmapped: UnmappedPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            rules: CategoryRuleEngine::default_rules(),
            tax_mapping_path: PathBuf::from(DEFAULT_MAPPING_FILE),
            unmapped: UnmappedPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub transactions: Vec<CategorizedTransaction>,
    pub summary: CategorizeSummary,
    pub pnl: Vec<PnlRow>,
    /// The tax stage fails on its own; the P&L above stays usable.
    pub schedule_c: Result<Vec<TaxReportRow>, ReportError>,
}

/// Run the whole transform over one bank export.
///
/// Import failures abort before any report exists. A missing or broken
/// tax mapping only affects `schedule_c`.
pub fn run(input: &[u8], config: &PipelineConfig) -> Result<PipelineOutput, ImportError> {
    let table = normalize_columns(read_table(input)?);
    let transactions = resolve_amounts(&table)?;
    let (transactions, summary) = config.rules.apply(transactions);
    let pnl = profit_and_loss(&transactions);

    let tax_report = TaxMapping::load(&config.tax_mapping_path)
        .map(|mapping| schedule_c(&pnl, &mapping, config.unmapped));
    if let Err(e) = &tax_report {
        warn!("Tax report skipped: {e}");
    }

    Ok(PipelineOutput {
        transactions,
        summary,
        pnl,
        schedule_c: tax_report,
    })
}

/// Paths of the files produced by [`PipelineOutput::write_reports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReports {
    pub pnl: PathBuf,
    pub schedule_c: Option<PathBuf>,
}

fn write_file<F>(path: &Path, write: F) -> Result<(), ReportError>
where
    F: FnOnce(BufWriter<File>) -> Result<(), ReportError>,
{
    let file = File::create(path)?;
    write(BufWriter::new(file))?;
    info!("Wrote {}", path.display());
    Ok(())
}

impl PipelineOutput {
    /// Write `pnl_report.csv`, plus `schedule_c_report.csv` when the tax
    /// stage succeeded.
    pub fn write_reports(&self, dir: &Path) -> Result<WrittenReports, ReportError> {
        std::fs::create_dir_all(dir)?;

        let pnl_path = dir.join(PNL_REPORT_FILE);
        write_file(&pnl_path, |w| write_pnl_csv(&self.pnl, w))?;

        let schedule_c = match &self.schedule_c {
            Ok(rows) => {
                let path = dir.join(SCHEDULE_C_REPORT_FILE);
                write_file(&path, |w| write_schedule_c_csv(rows, w))?;
                Some(path)
            }
            Err(_) => None,
        };

        Ok(WrittenReports {
            pnl: pnl_path,
            schedule_c,
        })
    }
}
