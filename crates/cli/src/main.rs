//! schedc - bank CSV to P&L and Schedule C
//!
//! Usage:
//!   schedc report statement.csv            Write pnl_report.csv and schedule_c_report.csv
//!   schedc report statement.csv -m map.csv Use a specific tax mapping
//!   schedc rules                           Show the categorization rules

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Report {
            input,
            mapping,
            rules,
            output_dir,
            unmapped,
            preview,
            quiet,
        } => commands::cmd_report(
            config,
            commands::ReportArgs {
                input,
                mapping,
                rules,
                output_dir,
                unmapped,
                preview,
                quiet,
            },
        ),
        Commands::Rules { rules } => commands::cmd_rules(config, rules),
    }
}
