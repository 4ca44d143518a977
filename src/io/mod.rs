pub(crate) mod walker;
pub(crate) mod reader;
pub(crate) mod writer;

pub use walker::{locate_stats_file, Sample, SampleWalker};
pub use reader::StatsFileReader;
pub use writer::{write_mag_tables, OutputPaths};
