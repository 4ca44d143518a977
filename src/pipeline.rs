use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use log::{debug, info};
use serde::Serialize;

use crate::io::{locate_stats_file, write_mag_tables, OutputPaths, Sample, SampleWalker, StatsFileReader};
use crate::quality::{ClassifiedMags, QualityClassifier, Thresholds};

/// Everything a run needs to know
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub thresholds: Thresholds,
}

/// Tallies for a whole run
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    pub samples_scanned: usize,
    pub samples_without_stats: usize,
    pub lines_read: usize,
    pub malformed_lines: usize,
    pub undecodable_records: usize,
    pub high_quality: usize,
    pub medium_quality: usize,
    pub discarded: usize,
}

/// Result of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input_dir: PathBuf,
    pub thresholds: Thresholds,
    pub high_quality_output: PathBuf,
    pub medium_quality_output: PathBuf,
    pub summary: RunSummary,
}

/// Scan every sample under the input root, sort its MAGs into tiers and
/// write both tier tables. Nothing is written until all samples are read.
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", config.output_dir.display())
    })?;

    let classifier = QualityClassifier::new(config.thresholds);
    let mut samples = SampleWalker::new(&config.input_dir)?.collect::<Result<Vec<_>>>()?;
    // stable row order regardless of how the filesystem lists entries
    samples.sort();
    info!("Found {} sample directories in {}", samples.len(), config.input_dir.display());

    let mut mags = ClassifiedMags::new();
    let mut summary = RunSummary::default();

    for sample in &samples {
        summary.samples_scanned += 1;
        process_sample(&config.input_dir, sample, &classifier, &mut mags, &mut summary)?;
    }

    summary.high_quality = mags.high.len();
    summary.medium_quality = mags.medium.len();
    summary.discarded = mags.discarded;

    let OutputPaths { high_quality, medium_quality } = write_mag_tables(&config.output_dir, &mags)?;

    info!(
        "Kept {} high-quality and {} medium-quality MAGs, discarded {}",
        summary.high_quality, summary.medium_quality, summary.discarded
    );

    Ok(RunReport {
        input_dir: config.input_dir.clone(),
        thresholds: config.thresholds,
        high_quality_output: high_quality,
        medium_quality_output: medium_quality,
        summary,
    })
}

fn process_sample(
    input_dir: &Path,
    sample: &Sample,
    classifier: &QualityClassifier,
    mags: &mut ClassifiedMags,
    summary: &mut RunSummary,
) -> Result<()> {
    let Some(stats_file) = locate_stats_file(input_dir, &sample.dir_name) else {
        debug!("Skipping sample {}: no stats file", sample.id);
        summary.samples_without_stats += 1;
        return Ok(());
    };

    debug!("Processing sample {}", sample.id);
    let counts = StatsFileReader::new(&stats_file).process_records(&sample.id, |record| {
        mags.add(classifier, record);
        Ok(())
    })?;

    summary.lines_read += counts.lines;
    summary.malformed_lines += counts.malformed;
    summary.undecodable_records += counts.undecodable;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::walker::{STATS_FILE_NAME, STORAGE_DIR};
    use crate::io::writer::{HIGH_QUALITY_FILE, MEDIUM_QUALITY_FILE};
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    const HEADER: &str = "Sample\tMAG\tCompleteness\tContamination\n";

    fn write_sample(root: &Path, sample: &str, lines: &[&str]) -> Result<()> {
        let storage = root.join(sample).join(STORAGE_DIR);
        fs::create_dir_all(&storage)?;
        let mut contents = lines.join("\n");
        contents.push('\n');
        fs::write(storage.join(STATS_FILE_NAME), contents)?;
        Ok(())
    }

    fn config(input: &TempDir, output: &Path) -> PipelineConfig {
        PipelineConfig {
            input_dir: input.path().to_owned(),
            output_dir: output.to_owned(),
            thresholds: Thresholds::default(),
        }
    }

    #[test]
    fn test_end_to_end() -> Result<()> {
        let input = tempdir()?;
        let output = tempdir()?;
        write_sample(input.path(), "sampleA", &[
            "mag1\t{'Completeness': 95.2, 'Contamination': 1.1}",
            "mag2\t{'Completeness': 60.0, 'Contamination': 3.0}",
            "mag3\t{'Completeness': 95.2, 'Contamination': 10.0}",
        ])?;
        write_sample(input.path(), "sampleB", &[
            "binX\t{'marker lineage': 'k__Bacteria (UID203)', 'Completeness': 98.5, 'Contamination': 0.3}",
            "binY\t{'Contamination': 0.1}",
            "binZ\t{'Completeness': 70.0, 'Contamination': oops}",
            "not a record",
        ])?;
        fs::create_dir_all(input.path().join("sampleC").join(STORAGE_DIR))?;
        fs::create_dir_all(input.path().join("sampleD"))?;
        fs::write(input.path().join("README"), "not a sample")?;

        let report = run(&config(&input, output.path()))?;

        assert_eq!(
            fs::read_to_string(output.path().join(HIGH_QUALITY_FILE))?,
            format!("{HEADER}sampleA\tmag1\t95.2\t1.1\nsampleB\tbinX\t98.5\t0.3\n")
        );
        assert_eq!(
            fs::read_to_string(output.path().join(MEDIUM_QUALITY_FILE))?,
            format!("{HEADER}sampleA\tmag2\t60.0\t3.0\n")
        );
        assert_eq!(
            report.summary,
            RunSummary {
                samples_scanned: 4,
                samples_without_stats: 2,
                lines_read: 7,
                malformed_lines: 1,
                undecodable_records: 1,
                high_quality: 2,
                medium_quality: 1,
                discarded: 2,
            }
        );
        assert_eq!(report.high_quality_output, output.path().join(HIGH_QUALITY_FILE));
        Ok(())
    }

    #[test]
    fn test_creates_output_dir() -> Result<()> {
        let input = tempdir()?;
        let output = tempdir()?;
        let nested = output.path().join("a").join("b");

        run(&config(&input, &nested))?;

        assert_eq!(fs::read_to_string(nested.join(HIGH_QUALITY_FILE))?, HEADER);
        assert_eq!(fs::read_to_string(nested.join(MEDIUM_QUALITY_FILE))?, HEADER);
        Ok(())
    }

    #[test]
    fn test_rerun_is_byte_identical() -> Result<()> {
        let input = tempdir()?;
        let output = tempdir()?;
        for (sample, completeness) in [("s3", 91.0), ("s1", 55.5), ("s2", 99.9)] {
            let line = format!("bin\t{{'Completeness': {}, 'Contamination': 2}}", completeness);
            write_sample(input.path(), sample, &[&line])?;
        }

        run(&config(&input, output.path()))?;
        let first = (
            fs::read(output.path().join(HIGH_QUALITY_FILE))?,
            fs::read(output.path().join(MEDIUM_QUALITY_FILE))?,
        );
        run(&config(&input, output.path()))?;
        let second = (
            fs::read(output.path().join(HIGH_QUALITY_FILE))?,
            fs::read(output.path().join(MEDIUM_QUALITY_FILE))?,
        );

        assert_eq!(first, second);
        assert_eq!(
            String::from_utf8(first.0)?,
            format!("{HEADER}s2\tbin\t99.9\t2.0\ns3\tbin\t91.0\t2.0\n")
        );
        Ok(())
    }

    #[test]
    fn test_custom_thresholds() -> Result<()> {
        let input = tempdir()?;
        let output = tempdir()?;
        write_sample(input.path(), "s1", &[
            "strict\t{'Completeness': 92.0, 'Contamination': 3.0}",
        ])?;

        let mut cfg = config(&input, output.path());
        cfg.thresholds.high_contamination = 2.0;
        let report = run(&cfg)?;

        assert_eq!(report.summary.high_quality, 0);
        assert_eq!(report.summary.medium_quality, 1);
        Ok(())
    }

    #[test]
    fn test_missing_input_dir_fails() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let cfg = PipelineConfig {
            input_dir: input.path().join("absent"),
            output_dir: output.path().to_owned(),
            thresholds: Thresholds::default(),
        };
        assert!(run(&cfg).is_err());
    }
}
