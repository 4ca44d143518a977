use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::PipelineConfig;
use crate::quality::Thresholds;

const DEFAULT_INPUT_DIR: &str =
    "/bigdata/stajichlab/shared/projects/Herptile/Metagenome/Fecal/results_bins_checkm";
const DEFAULT_OUTPUT_DIR: &str = "/bigdata/stajichlab/lshad003/HerptileMAGs";

#[derive(Parser, Debug)]
#[command(author, version, about = "Sort CheckM-assessed MAGs into high- and medium-quality tiers")]
pub struct Cli {
    /// Directory holding one CheckM result directory per sample
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    /// Directory the tier tables are written to (created if missing)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Completeness (%) a MAG must exceed to be high quality
    #[arg(long, default_value = "90", value_parser = parse_percentage)]
    pub high_completeness: f64,

    /// Completeness (%) a MAG must exceed to be medium quality
    #[arg(long, default_value = "50", value_parser = parse_percentage)]
    pub medium_completeness: f64,

    /// Contamination (%) a high-quality MAG must stay below
    #[arg(long, default_value = "5", value_parser = parse_percentage)]
    pub high_contamination: f64,

    /// Contamination (%) a medium-quality MAG must stay below
    #[arg(long, default_value = "5", value_parser = parse_percentage)]
    pub medium_contamination: f64,

    /// Write a JSON run summary to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to log file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            high_completeness: self.high_completeness,
            medium_completeness: self.medium_completeness,
            high_contamination: self.high_contamination,
            medium_contamination: self.medium_contamination,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            thresholds: self.thresholds(),
        }
    }
}

fn parse_percentage(s: &str) -> Result<f64, String> {
    let val: f64 = s.parse().map_err(|_| format!("Invalid number: {}", s))?;
    if !(0.0..=100.0).contains(&val) {
        Err(format!("Percentage must be between 0 and 100, got {}", val))
    } else {
        Ok(val)
    }
}
