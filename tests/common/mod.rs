#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use farm_loss::dataset::Dataset;
use farm_loss::error::Result;
use farm_loss::store::{DatasetSink, OutputHint, OutputStage};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch run root laid out the way the binary expects.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Copies a fixture to `relative` under the workspace, creating parents.
    pub fn install_fixture(&self, fixture: &str, relative: &str) -> PathBuf {
        let target = self.path().join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).expect("create fixture parent");
        }
        fs::copy(fixture_path(fixture), &target).expect("copy fixture");
        target
    }

    /// Regular files in `relative`, sorted by name.
    pub fn files_in(&self, relative: &str) -> Vec<PathBuf> {
        let mut files = fs::read_dir(self.path().join(relative))
            .map(|entries| {
                entries
                    .map(|e| e.expect("dir entry").path())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        files.sort();
        files
    }
}

/// Keeps every written dataset in memory.
#[derive(Default)]
pub struct MemorySink {
    pub writes: Vec<(OutputStage, String, Dataset)>,
}

impl MemorySink {
    pub fn stage(&self, stage: OutputStage) -> Vec<&Dataset> {
        self.writes
            .iter()
            .filter(|(s, _, _)| *s == stage)
            .map(|(_, _, d)| d)
            .collect()
    }
}

impl DatasetSink for MemorySink {
    fn write(&mut self, dataset: &Dataset, hint: OutputHint<'_>) -> Result<PathBuf> {
        self.writes
            .push((hint.stage, hint.source_name.to_string(), dataset.clone()));
        Ok(PathBuf::from(format!(
            "memory/{:?}/{}",
            hint.stage, hint.source_name
        )))
    }
}
