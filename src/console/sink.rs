//! Append-only log file shared by every thread that writes console output.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct SinkWriter {
    path: PathBuf,
    file: Mutex<File>,
}

impl SinkWriter {
    /// Create (or truncate) `path` and open it for appending.
    pub fn create(path: &Path) -> Result<Self> {
        File::create(path)
            .with_context(|| format!("Failed to create console log file: {}", path.display()))?;
        Self::open(path)
    }

    /// Open `path` for appending, creating it if missing.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open console log file: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `data` and flush. Concurrent appends never interleave.
    pub fn append(&self, data: &str) -> io::Result<()> {
        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        file.write_all(data.as_bytes())?;
        file.flush()
    }
}
