use log::debug;

use super::types::{MagRecord, QualityTier, Thresholds};

pub struct QualityClassifier {
    thresholds: Thresholds,
}

impl QualityClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        QualityClassifier { thresholds }
    }

    /// Assign a tier. High is checked first, so a MAG never lands in both.
    /// Values sitting exactly on a cut-off fall through to the next tier.
    pub fn classify(&self, completeness: f64, contamination: f64) -> QualityTier {
        let t = &self.thresholds;
        if completeness > t.high_completeness && contamination < t.high_contamination {
            QualityTier::High
        } else if completeness > t.medium_completeness && contamination < t.medium_contamination {
            QualityTier::Medium
        } else {
            QualityTier::Discarded
        }
    }
}

/// High- and medium-quality MAGs in the order they were classified
#[derive(Debug, Default)]
pub struct ClassifiedMags {
    pub high: Vec<MagRecord>,
    pub medium: Vec<MagRecord>,
    pub discarded: usize,
}

impl ClassifiedMags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a record and keep it if it makes a tier
    pub fn add(&mut self, classifier: &QualityClassifier, record: MagRecord) -> QualityTier {
        let tier = classifier.classify(record.completeness, record.contamination);
        debug!(
            "{}/{}: completeness={} contamination={} -> {}",
            record.sample_id, record.mag_name, record.completeness, record.contamination, tier
        );
        match tier {
            QualityTier::High => self.high.push(record),
            QualityTier::Medium => self.medium.push(record),
            QualityTier::Discarded => self.discarded += 1,
        }
        tier
    }
}
