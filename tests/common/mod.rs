#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use crew_recon::RosterTable;
use tempfile::{TempDir, tempdir};

pub const PLANNED_FIXTURE: &str = "planned_march.csv";
pub const ACTUAL_FIXTURE: &str = "actual_march.csv";

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Builds an in-memory roster from string slices.
pub fn roster(headers: &[&str], rows: &[&[&str]]) -> RosterTable {
    RosterTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
    )
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Scratch directory helper that cleans up files automatically on drop.
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

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }

    /// Reads a CSV file written by the binary into rows, header included.
    pub fn read_csv(&self, path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .expect("open csv");
        reader
            .records()
            .map(|record| {
                record
                    .expect("csv record")
                    .iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }
}
