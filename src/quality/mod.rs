pub(crate) mod types;
pub(crate) mod classifier;

pub use types::{MagRecord, RecordError, Thresholds};
pub use classifier::{ClassifiedMags, QualityClassifier};
