use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use log::{info, warn};

use crate::literal::parse_literal;
use crate::quality::{MagRecord, RecordError};

/// Line tallies for one stats file
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsFileCounts {
    pub lines: usize,
    pub malformed: usize,
    pub undecodable: usize,
    pub records: usize,
}

/// Reads MAG records from a CheckM `bin_stats_ext.tsv` file
pub struct StatsFileReader {
    path: PathBuf,
}

impl StatsFileReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        StatsFileReader {
            path: path.as_ref().to_owned(),
        }
    }

    /// Hand every decodable record in the file to `callback`.
    ///
    /// Lines without exactly one tab are skipped silently. Lines whose stats
    /// value cannot be decoded are reported and skipped. I/O failures abort.
    pub fn process_records<F>(&self, sample_id: &str, mut callback: F) -> Result<StatsFileCounts>
    where
        F: FnMut(MagRecord) -> Result<()>
    {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open stats file: {}", self.path.display()))?;
        let reader = BufReader::new(file);
        let mut counts = StatsFileCounts::default();

        for line in reader.lines() {
            let line = line
                .with_context(|| format!("Failed to read stats file: {}", self.path.display()))?;
            counts.lines += 1;

            let Some((mag_name, stats)) = split_stats_line(&line) else {
                counts.malformed += 1;
                continue;
            };

            match decode_record(sample_id, mag_name, stats) {
                Ok(record) => {
                    callback(record)?;
                    counts.records += 1;
                }
                Err(e) => {
                    warn!("Error parsing stats for MAG {} in {}: {}", mag_name, self.path.display(), e);
                    counts.undecodable += 1;
                }
            }
        }

        info!("Read {} MAG records from {}", counts.records, self.path.display());
        Ok(counts)
    }
}

/// Split a stats line into MAG name and stats literal
pub fn split_stats_line(line: &str) -> Option<(&str, &str)> {
    let mut fields = line.trim().split('\t');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(mag_name), Some(stats), None) => Some((mag_name, stats)),
        _ => None,
    }
}

fn decode_record(sample_id: &str, mag_name: &str, stats: &str) -> Result<MagRecord, RecordError> {
    let value = parse_literal(stats)?;
    MagRecord::from_stats(sample_id, mag_name, &value)
}
