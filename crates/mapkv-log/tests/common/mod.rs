// Common test utilities for record log integration tests

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture that provides a temporary path for a log file
pub struct LogTestFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub log_path: PathBuf,
}

impl LogTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let log_path = temp_dir.path().join("records.map");

        Self { temp_dir, log_path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }

    #[allow(dead_code)]
    pub fn file_len(&self) -> u64 {
        fs::metadata(&self.log_path)
            .expect("Failed to stat log file")
            .len()
    }
}

impl Default for LogTestFixture {
    fn default() -> Self {
        Self::new()
    }
}
