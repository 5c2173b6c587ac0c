//! Exit sentinel: an empty file asking the console helper to terminate.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitSentinel {
    path: PathBuf,
}

impl ExitSentinel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the sentinel. Signalling again is harmless.
    pub fn signal(&self) -> Result<()> {
        std::fs::write(&self.path, "")
            .with_context(|| format!("Failed to create exit sentinel: {}", self.path.display()))
    }

    /// Remove a sentinel left over from a previous session.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove exit sentinel: {}", self.path.display())
            }),
        }
    }

    pub fn is_signalled(&self) -> bool {
        self.path.exists()
    }
}
