//! Per-run shared directory holding every IPC artifact.
//!
//! The directory name embeds the wall-clock millisecond at which the host
//! allocated it, so concurrently running hosts never share one unless they
//! start within the same millisecond.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::config::NamespaceConfig;

/// Console log stream, appended by the host and tailed by the console helper.
pub const CONSOLE_LOG_FILE: &str = "console.ansi";
/// Helper-written heartbeat timestamp.
pub const HEARTBEAT_FILE: &str = "console.heartbeat";
/// Host-written exit sentinel.
pub const EXIT_SENTINEL_FILE: &str = "console.exit";
/// Helper-written picker answer.
pub const ANSWER_FILE: &str = "selectedFile.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    root: PathBuf,
}

impl Namespace {
    /// Allocate the namespace for this run from the current time.
    pub fn allocate(config: &NamespaceConfig) -> Self {
        Self::at(
            &config.base_dir,
            &config.prefix,
            Utc::now().timestamp_millis(),
        )
    }

    /// Namespace for an explicit allocation time.
    pub fn at(base_dir: &Path, prefix: &str, millis: i64) -> Self {
        Self {
            root: base_dir.join(format!("{prefix}-{millis}")),
        }
    }

    pub fn unique_path(&self) -> &Path {
        &self.root
    }

    pub fn join(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Create the directory if needed. Safe to call any number of times.
    pub fn ensure(&self) -> Result<&Path> {
        std::fs::create_dir_all(&self.root).with_context(|| {
            format!(
                "Failed to create namespace directory: {}",
                self.root.display()
            )
        })?;
        Ok(&self.root)
    }
}
