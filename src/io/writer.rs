use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};

use crate::quality::{ClassifiedMags, MagRecord};

pub const HIGH_QUALITY_FILE: &str = "high_quality_mags.tsv";
pub const MEDIUM_QUALITY_FILE: &str = "medium_quality_mags.tsv";

const HEADER: [&str; 4] = ["Sample", "MAG", "Completeness", "Contamination"];

/// Where the two tier tables ended up
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub high_quality: PathBuf,
    pub medium_quality: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(output_dir: &Path) -> Self {
        OutputPaths {
            high_quality: output_dir.join(HIGH_QUALITY_FILE),
            medium_quality: output_dir.join(MEDIUM_QUALITY_FILE),
        }
    }
}

/// Write both tier tables into `output_dir`, replacing earlier runs
pub fn write_mag_tables(output_dir: &Path, mags: &ClassifiedMags) -> Result<OutputPaths> {
    let paths = OutputPaths::in_dir(output_dir);
    write_mag_file(&paths.high_quality, &mags.high)?;
    write_mag_file(&paths.medium_quality, &mags.medium)?;
    Ok(paths)
}

fn write_mag_file(path: &Path, records: &[MagRecord]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_mag_table(&mut writer, records)
        .and_then(|_| writer.flush().map_err(Into::into))
        .with_context(|| format!("Failed to write output file: {}", path.display()))
}

/// Tab-separated table with a header row and one row per MAG
pub fn write_mag_table<W: Write>(mut writer: W, records: &[MagRecord]) -> Result<()> {
    writeln!(writer, "{}", HEADER.join("\t"))?;
    for record in records {
        writeln!(writer, "{}\t{}\t{}\t{}",
            quote_field(&record.sample_id),
            quote_field(&record.mag_name),
            format_float(record.completeness),
            format_float(record.contamination),
        )?;
    }
    Ok(())
}

/// Shortest round-trip form, keeping `.0` on integral values and switching
/// to exponent form for very large or very small magnitudes (`1e-05`).
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => formatted,
        };
    }

    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Quote a field if it would otherwise break the table layout
fn quote_field(field: &str) -> Cow<'_, str> {
    if field.contains(['\t', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
