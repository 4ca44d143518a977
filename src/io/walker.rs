use std::ffi::OsString;
use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};

/// Directory inside each sample that holds CheckM's working files
pub const STORAGE_DIR: &str = "storage";
/// Extended per-bin statistics written by CheckM
pub const STATS_FILE_NAME: &str = "bin_stats_ext.tsv";

/// A sample directory directly under the input root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sample {
    /// Directory name as found on disk
    pub dir_name: OsString,
    /// Printable sample identifier used in output rows
    pub id: String,
}

/// Lazily lists the immediate subdirectories of an input root.
/// Plain files and other non-directory entries are skipped.
pub struct SampleWalker {
    root: PathBuf,
    entries: ReadDir,
}

impl SampleWalker {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_owned();
        let entries = fs::read_dir(&root)
            .with_context(|| format!("Failed to read input directory: {}", root.display()))?;
        Ok(SampleWalker { root, entries })
    }
}

impl Iterator for SampleWalker {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        for entry in self.entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(Err(e).with_context(|| {
                        format!("Failed to list input directory: {}", self.root.display())
                    }))
                }
            };

            // follows symlinks, like a plain existence check on the path would
            if !entry.path().is_dir() {
                continue;
            }

            let dir_name = entry.file_name();
            let id = dir_name.to_string_lossy().into_owned();
            return Some(Ok(Sample { dir_name, id }));
        }
        None
    }
}

/// Resolve `<root>/<sample>/storage/bin_stats_ext.tsv`, or `None` when either
/// the storage directory or the stats file is missing.
pub fn locate_stats_file<P: AsRef<Path>>(root: &Path, sample: P) -> Option<PathBuf> {
    let storage = root.join(sample).join(STORAGE_DIR);
    if !storage.exists() {
        return None;
    }

    let stats_file = storage.join(STATS_FILE_NAME);
    stats_file.is_file().then_some(stats_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_walks_only_directories() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("sample_b"))?;
        fs::create_dir(dir.path().join("sample_a"))?;
        File::create(dir.path().join("notes.txt"))?;

        let mut ids: Vec<String> = SampleWalker::new(dir.path())?
            .map(|s| s.map(|s| s.id))
            .collect::<Result<_>>()?;
        ids.sort();

        assert_eq!(ids, vec!["sample_a", "sample_b"]);
        Ok(())
    }

    #[test]
    fn test_walk_is_not_recursive() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("sample_a").join("nested"))?;

        let samples: Vec<Sample> = SampleWalker::new(dir.path())?.collect::<Result<_>>()?;
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].id, "sample_a");
        assert_eq!(samples[0].dir_name, OsString::from("sample_a"));
        Ok(())
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(SampleWalker::new(dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_locate_stats_file() -> Result<()> {
        let dir = tempdir()?;
        let storage = dir.path().join("with_stats").join(STORAGE_DIR);
        fs::create_dir_all(&storage)?;
        File::create(storage.join(STATS_FILE_NAME))?;

        fs::create_dir_all(dir.path().join("no_stats").join(STORAGE_DIR))?;
        fs::create_dir_all(dir.path().join("no_storage"))?;

        assert_eq!(
            locate_stats_file(dir.path(), "with_stats"),
            Some(storage.join(STATS_FILE_NAME))
        );
        assert_eq!(locate_stats_file(dir.path(), "no_stats"), None);
        assert_eq!(locate_stats_file(dir.path(), "no_storage"), None);
        assert_eq!(locate_stats_file(dir.path(), "absent"), None);
        Ok(())
    }

    #[test]
    fn test_stats_path_that_is_a_directory() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("odd").join(STORAGE_DIR).join(STATS_FILE_NAME))?;
        assert_eq!(locate_stats_file(dir.path(), "odd"), None);
        Ok(())
    }
}
