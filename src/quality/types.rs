use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::literal::{LiteralError, Value};

/// Key holding the completeness estimate in a CheckM stats mapping
pub const COMPLETENESS_KEY: &str = "Completeness";
/// Key holding the contamination estimate in a CheckM stats mapping
pub const CONTAMINATION_KEY: &str = "Contamination";

/// Value assumed when a record carries no completeness estimate
pub const DEFAULT_COMPLETENESS: f64 = 0.0;
/// Value assumed when a record carries no contamination estimate
pub const DEFAULT_CONTAMINATION: f64 = 100.0;

/// Quality tier a MAG is sorted into
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QualityTier {
    High,
    Medium,
    Discarded,
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityTier::High => write!(f, "High"),
            QualityTier::Medium => write!(f, "Medium"),
            QualityTier::Discarded => write!(f, "Discarded"),
        }
    }
}

/// Cut-offs used to sort MAGs into tiers. All comparisons are strict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    /// Completeness must exceed this for the high tier
    pub high_completeness: f64,
    /// Completeness must exceed this for the medium tier
    pub medium_completeness: f64,
    /// Contamination must stay below this for the high tier
    pub high_contamination: f64,
    /// Contamination must stay below this for the medium tier
    pub medium_contamination: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_completeness: 90.0,
            medium_completeness: 50.0,
            high_contamination: 5.0,
            medium_contamination: 5.0,
        }
    }
}

/// One MAG row from a sample's stats file
#[derive(Debug, Clone, PartialEq)]
pub struct MagRecord {
    /// Sample directory the MAG came from
    pub sample_id: String,
    /// Bin identifier from the first column of the stats line
    pub mag_name: String,
    pub completeness: f64,
    pub contamination: f64,
}

/// Reasons a stats entry cannot become a [`MagRecord`]
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("invalid stats literal: {0}")]
    Decode(#[from] LiteralError),

    #[error("stats value is a {0}, expected a mapping")]
    NotAMapping(&'static str),

    #[error("{field} is a {found}, expected a number")]
    NonNumeric { field: &'static str, found: &'static str },
}

impl MagRecord {
    /// Build a record from a decoded stats mapping, applying the
    /// worst-case defaults for missing estimates.
    pub fn from_stats(sample_id: &str, mag_name: &str, stats: &Value) -> Result<Self, RecordError> {
        if !stats.is_dict() {
            return Err(RecordError::NotAMapping(stats.type_name()));
        }

        Ok(MagRecord {
            sample_id: sample_id.to_string(),
            mag_name: mag_name.to_string(),
            completeness: numeric_field(stats, COMPLETENESS_KEY, DEFAULT_COMPLETENESS)?,
            contamination: numeric_field(stats, CONTAMINATION_KEY, DEFAULT_CONTAMINATION)?,
        })
    }
}

fn numeric_field(stats: &Value, field: &'static str, default: f64) -> Result<f64, RecordError> {
    match stats.get(field) {
        None => Ok(default),
        Some(value) => value.as_f64().ok_or(RecordError::NonNumeric {
            field,
            found: value.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::parse_literal;

    #[test]
    fn test_record_from_stats() {
        let stats = parse_literal("{'Completeness': 95.2, 'Contamination': 1.1, 'GC': 0.4}").unwrap();
        let record = MagRecord::from_stats("S1", "bin.1", &stats).unwrap();
        assert_eq!(record.sample_id, "S1");
        assert_eq!(record.mag_name, "bin.1");
        assert_eq!(record.completeness, 95.2);
        assert_eq!(record.contamination, 1.1);
    }

    #[test]
    fn test_missing_fields_use_worst_case() {
        let stats = parse_literal("{'GC': 0.4}").unwrap();
        let record = MagRecord::from_stats("S1", "bin.2", &stats).unwrap();
        assert_eq!(record.completeness, DEFAULT_COMPLETENESS);
        assert_eq!(record.contamination, DEFAULT_CONTAMINATION);
    }

    #[test]
    fn test_integer_fields() {
        let stats = parse_literal("{'Completeness': 100, 'Contamination': 0}").unwrap();
        let record = MagRecord::from_stats("S1", "bin.3", &stats).unwrap();
        assert_eq!(record.completeness, 100.0);
        assert_eq!(record.contamination, 0.0);
    }

    #[test]
    fn test_rejects_non_mapping() {
        let stats = parse_literal("[95.2, 1.1]").unwrap();
        assert_eq!(
            MagRecord::from_stats("S1", "bin.4", &stats),
            Err(RecordError::NotAMapping("list"))
        );
    }

    #[test]
    fn test_rejects_non_numeric_field() {
        let stats = parse_literal("{'Completeness': 'high', 'Contamination': 1.0}").unwrap();
        assert_eq!(
            MagRecord::from_stats("S1", "bin.5", &stats),
            Err(RecordError::NonNumeric { field: "Completeness", found: "str" })
        );
    }

    #[test]
    fn test_default_thresholds() {
        let t = Thresholds::default();
        assert_eq!(t.high_completeness, 90.0);
        assert_eq!(t.medium_completeness, 50.0);
        assert_eq!(t.high_contamination, 5.0);
        assert_eq!(t.medium_contamination, 5.0);
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(QualityTier::High.to_string(), "High");
        assert_eq!(QualityTier::Medium.to_string(), "Medium");
        assert_eq!(QualityTier::Discarded.to_string(), "Discarded");
    }
}
