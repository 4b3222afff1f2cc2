//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use schedc_report::UnmappedPolicy;

/// schedc - Bank statement to P&L and Schedule C
#[derive(Parser)]
#[command(name = "schedc")]
#[command(about = "Categorize a bank CSV export into P&L and Schedule C reports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./schedc.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build pnl_report.csv and schedule_c_report.csv from a bank export
    Report {
        /// Bank CSV export
        input: PathBuf,

        /// Category to tax line mapping CSV
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// TOML rule list (built-in rules when omitted)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Directory the reports are written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// How categories missing from the mapping are reported
        #[arg(long)]
        unmapped: Option<UnmappedPolicy>,

        /// Number of categorized transactions to preview
        #[arg(long, default_value_t = 10)]
        preview: usize,

        /// Only write files; print no tables
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the active categorization rules in precedence order
    Rules {
        /// TOML rule list (built-in rules when omitted)
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
}
