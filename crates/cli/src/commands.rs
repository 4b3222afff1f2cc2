use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use schedc_import::CategoryRuleEngine;
use schedc_report::UnmappedPolicy;
use tracing::info;

use schedc::config::{AppConfig, Overrides, Settings};
use schedc::display;
use schedc::pipeline::{self, PipelineConfig};

fn load_rules(path: Option<&Path>) -> Result<CategoryRuleEngine> {
    match path {
        Some(path) => CategoryRuleEngine::from_toml_file(path)
            .with_context(|| format!("Failed to load rules from {}", path.display())),
        None => Ok(CategoryRuleEngine::default_rules()),
    }
}

pub struct ReportArgs {
    pub input: PathBuf,
    pub mapping: Option<PathBuf>,
    pub rules: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub unmapped: Option<UnmappedPolicy>,
    pub preview: usize,
    pub quiet: bool,
}

pub fn cmd_report(config_path: Option<&Path>, args: ReportArgs) -> Result<()> {
    let settings = Settings::resolve(
        AppConfig::discover(config_path)?,
        Overrides {
            tax_mapping: args.mapping,
            rules_file: args.rules,
            output_dir: args.output_dir,
            unmapped: args.unmapped,
        },
    );

    let config = PipelineConfig {
        rules: load_rules(settings.rules_file.as_deref())?,
        tax_mapping_path: settings.tax_mapping.clone(),
        unmapped: settings.unmapped,
    };

    let input = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    info!("Processing {}", args.input.display());

    let output = pipeline::run(&input, &config)
        .with_context(|| format!("Failed to process {}", args.input.display()))?;
    let written = output
        .write_reports(&settings.output_dir)
        .with_context(|| format!("Failed to write reports to {}", settings.output_dir.display()))?;

    if !args.quiet {
        println!("{}\n", display::format_preview(&output.transactions, args.preview));
        println!("{}\n", display::format_pnl(&output.pnl));
        if let Ok(rows) = &output.schedule_c {
            println!("{}\n", display::format_schedule_c(rows));
        }
        println!("P&L report: {}", written.pnl.display());
        if let Some(path) = &written.schedule_c {
            println!("Schedule C report: {}", path.display());
        }
    }

    if let Err(e) = output.schedule_c {
        bail!("P&L written to {}, but Schedule C failed: {e}", written.pnl.display());
    }
    Ok(())
}

pub fn cmd_rules(config_path: Option<&Path>, rules: Option<PathBuf>) -> Result<()> {
    let settings = Settings::resolve(
        AppConfig::discover(config_path)?,
        Overrides {
            rules_file: rules,
            ..Overrides::default()
        },
    );
    let engine = load_rules(settings.rules_file.as_deref())?;
    println!("{}", display::format_rules(&engine));
    Ok(())
}
