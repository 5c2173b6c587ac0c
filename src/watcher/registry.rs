//! One watcher per directory, created on first request.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::DirectoryWatcher;

pub struct DirectoryWatchers {
    interval: Duration,
    watchers: Mutex<HashMap<PathBuf, Arc<DirectoryWatcher>>>,
}

impl DirectoryWatchers {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            watchers: Mutex::new(HashMap::new()),
        }
    }

    /// Watcher for `directory`, starting its poll thread on first use. Later
    /// calls with the same path return the same instance.
    pub fn for_directory(&self, directory: &Path) -> Result<Arc<DirectoryWatcher>> {
        let mut watchers = match self.watchers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(existing) = watchers.get(directory) {
            return Ok(Arc::clone(existing));
        }

        let watcher = Arc::new(DirectoryWatcher::start(directory, self.interval)?);
        watchers.insert(directory.to_path_buf(), Arc::clone(&watcher));
        Ok(watcher)
    }

    pub fn len(&self) -> usize {
        self.watchers.lock().map(|w| w.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop every poll thread.
    pub fn shutdown(&self) {
        if let Ok(watchers) = self.watchers.lock() {
            for watcher in watchers.values() {
                watcher.stop();
            }
        }
    }
}

impl Drop for DirectoryWatchers {
    fn drop(&mut self) {
        self.shutdown();
    }
}
