//! Polling directory watcher.
//!
//! A [`DirectoryWatcher`] owns one background thread that stats every
//! registered filename in its directory on a fixed interval and invokes the
//! matching callback once per detected change. Callbacks run on the poll
//! thread, one at a time, so deliveries for a single file never overlap.
//!
//! [`DirectoryWatchers`] is the registry handing out one watcher per
//! directory.

mod registry;
mod stamp;


pub use registry::DirectoryWatchers;
pub use stamp::{probe, FileStamp};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, Thread};
use std::time::Duration;

pub type WatchCallback = Arc<dyn Fn() + Send + Sync + 'static>;

struct Registration {
    callback: WatchCallback,
    stamp: FileStamp,
}

pub(crate) struct Change {
    name: String,
    previous: FileStamp,
    current: FileStamp,
}

struct Shared {
    directory: PathBuf,
    registrations: Mutex<HashMap<String, Registration>>,
    shutdown: AtomicBool,
}

impl Shared {
    fn registrations(&self) -> MutexGuard<'_, HashMap<String, Registration>> {
        match self.registrations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn snapshot(&self) -> Vec<(String, FileStamp)> {
        self.registrations()
            .iter()
            .map(|(name, registration)| (name.clone(), registration.stamp))
            .collect()
    }

    fn scan_changes(&self, snapshot: Vec<(String, FileStamp)>) -> Vec<Change> {
        let mut changed = Vec::new();
        for (name, previous) in snapshot {
            match probe(&self.directory.join(&name)) {
                Ok(current) if current != previous => changed.push(Change {
                    name,
                    previous,
                    current,
                }),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(
                        directory = %self.directory.display(),
                        file = %name,
                        error = %e,
                        "Watch probe failed, retrying next tick"
                    );
                }
            }
        }
        changed
    }

    /// Record new stamps and collect the callbacks to fire. Entries removed
    /// or re-baselined since the snapshot are skipped.
    fn commit(&self, changed: Vec<Change>) -> Vec<(String, WatchCallback)> {
        let mut registrations = self.registrations();
        changed
            .into_iter()
            .filter_map(|change| {
                let registration = registrations.get_mut(&change.name)?;
                if registration.stamp != change.previous {
                    return None;
                }
                registration.stamp = change.current;
                Some((change.name, Arc::clone(&registration.callback)))
            })
            .collect()
    }

    /// One poll iteration. Returns the number of callbacks fired.
    ///
    /// Files are stamped with the registry unlocked so `watch`/`unwatch` from
    /// other threads never wait on file I/O.
    fn poll_once(&self) -> usize {
        let changed = self.scan_changes(self.snapshot());
        let due = self.commit(changed);

        let fired = due.len();
        for (name, callback) in due {
            if panic::catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
                tracing::error!(
                    directory = %self.directory.display(),
                    file = %name,
                    "Watch callback panicked"
                );
            }
        }
        fired
    }
}

/// Watches registered filenames inside one directory.
pub struct DirectoryWatcher {
    shared: Arc<Shared>,
    poller: Option<Thread>,
}

impl DirectoryWatcher {
    /// Create a watcher and start its poll thread.
    pub fn start(directory: &Path, interval: Duration) -> Result<Self> {
        let shared = Self::shared(directory);
        let thread_shared = Arc::clone(&shared);

        let handle = thread::Builder::new()
            .name(format!("watch:{}", directory.display()))
            .spawn(move || {
                while !thread_shared.shutdown.load(Ordering::Acquire) {
                    thread_shared.poll_once();
                    thread::park_timeout(interval);
                }
            })
            .with_context(|| {
                format!("Failed to spawn watcher thread for {}", directory.display())
            })?;

        tracing::debug!(
            directory = %directory.display(),
            interval_ms = interval.as_millis() as u64,
            "Directory watcher started"
        );

        Ok(Self {
            shared,
            poller: Some(handle.thread().clone()),
        })
    }

    /// Watcher without a poll thread; iterations run through `poll_now`.
    #[cfg(test)]
    pub(crate) fn manual(directory: &Path) -> Self {
        Self {
            shared: Self::shared(directory),
            poller: None,
        }
    }

    fn shared(directory: &Path) -> Arc<Shared> {
        Arc::new(Shared {
            directory: directory.to_path_buf(),
            registrations: Mutex::new(HashMap::new()),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.shared.directory
    }

    /// Register `callback` for changes to `filename`. A later registration for
    /// the same filename replaces the callback.
    pub fn watch<F>(&self, filename: &str, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: WatchCallback = Arc::new(callback);
        let mut registrations = self.shared.registrations();

        if let Some(existing) = registrations.get_mut(filename) {
            existing.callback = callback;
            return;
        }

        let stamp = probe(&self.shared.directory.join(filename)).unwrap_or(FileStamp::Missing);
        registrations.insert(filename.to_string(), Registration { callback, stamp });
    }

    /// Stop watching `filename`. Returns whether it was registered.
    pub fn unwatch(&self, filename: &str) -> bool {
        self.shared.registrations().remove(filename).is_some()
    }

    pub fn is_watching(&self, filename: &str) -> bool {
        self.shared.registrations().contains_key(filename)
    }

    /// Run one poll iteration on the calling thread.
    #[cfg(test)]
    pub(crate) fn poll_now(&self) -> usize {
        self.shared.poll_once()
    }

    /// Scan without committing; lets tests interleave registry changes.
    #[cfg(test)]
    pub(crate) fn scan_pending(&self) -> Vec<Change> {
        self.shared.scan_changes(self.shared.snapshot())
    }

    /// Commit scanned changes and fire their callbacks.
    #[cfg(test)]
    pub(crate) fn commit_pending(&self, changed: Vec<Change>) -> usize {
        let due = self.shared.commit(changed);
        let fired = due.len();
        for (_, callback) in due {
            callback();
        }
        fired
    }

    /// Stop the poll thread. Registrations are kept but no longer fire.
    pub fn stop(&self) {
        self.shared.shutdown.store(true, Ordering::Release);
        if let Some(poller) = &self.poller {
            poller.unpark();
        }
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
