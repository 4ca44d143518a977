mod cli;
mod io;
mod literal;
mod pipeline;
mod quality;

use anyhow::{Result, Context};
use clap::Parser;
use log::info;
use std::fs::File;
use std::path::Path;

use crate::cli::Cli;
use crate::pipeline::RunReport;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info);
    builder.parse_default_env();
    if let Some(log_file) = &cli.log_file {
        let file = File::create(log_file)
            .with_context(|| format!("Failed to create log file: {}", log_file.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let config = cli.pipeline_config();
    info!("Scanning {} for CheckM results", config.input_dir.display());
    let report = pipeline::run(&config)?;

    if let Some(summary_path) = &cli.summary {
        write_summary(summary_path, &report)?;
        info!("Run summary saved to: {}", summary_path.display());
    }

    println!("High-quality MAGs saved to: {}", report.high_quality_output.display());
    println!("Medium-quality MAGs saved to: {}", report.medium_quality_output.display());

    Ok(())
}

fn write_summary(path: &Path, report: &RunReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)
        .with_context(|| format!("Failed to write summary file: {}", path.display()))?;
    Ok(())
}
