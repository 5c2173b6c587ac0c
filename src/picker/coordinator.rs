//! Single-flight pick coordination.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use anyhow::{Context, Result};

use super::answer::{split_paths, Answer};
use super::error::PickError;
use super::request::{encode_filters, Continuation, FileFilter, PendingPick, PickMode, PickRequest};
use super::task::{channel, PickOutcome, PickTask};
use crate::helper::{install_script, Invocation, Launcher, PICKER_SCRIPT, PICKER_SCRIPT_NAME};
use crate::main_queue::MainQueue;
use crate::namespace::{Namespace, ANSWER_FILE};
use crate::paths::to_posix_path;
use crate::watcher::DirectoryWatchers;

/// Delegates file picks to the picker helper, at most one at a time.
pub struct PickerCoordinator {
    namespace: Namespace,
    script: PathBuf,
    default_start: PathBuf,
    launcher: Arc<dyn Launcher>,
    main: MainQueue,
    pending: Mutex<Option<PendingPick>>,
}

impl PickerCoordinator {
    /// Install the picker helper script into the namespace and start watching
    /// for answers.
    pub fn install(
        namespace: &Namespace,
        watchers: &DirectoryWatchers,
        launcher: Arc<dyn Launcher>,
        main: MainQueue,
        default_start: PathBuf,
    ) -> Result<Arc<Self>> {
        let dir = namespace.ensure()?;
        let script = install_script(dir, PICKER_SCRIPT_NAME, PICKER_SCRIPT)
            .context("Failed to install picker helper")?;
        let watcher = watchers.for_directory(dir)?;

        let coordinator = Arc::new(Self {
            namespace: namespace.clone(),
            script,
            default_start,
            launcher,
            main,
            pending: Mutex::new(None),
        });

        let weak: Weak<Self> = Arc::downgrade(&coordinator);
        watcher.watch(ANSWER_FILE, move || {
            if let Some(coordinator) = weak.upgrade() {
                coordinator.on_answer_changed();
            }
        });

        tracing::debug!(namespace = %namespace.unique_path().display(), "Picker installed");
        Ok(coordinator)
    }

    fn pending(&self) -> MutexGuard<'_, Option<PendingPick>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.pending().is_some()
    }

    /// Pick a single path. Resolves with the chosen path or `Cancelled`.
    /// Browsing is not a pick; use [`PickerCoordinator::open_folder`].
    pub fn pick_one(
        &self,
        start: Option<PathBuf>,
        mode: PickMode,
        filters: Vec<FileFilter>,
    ) -> Result<PickTask<PathBuf>, PickError> {
        let (tx, task) = channel();
        let cancel_tx = tx.clone();
        self.request(PickRequest {
            start,
            mode,
            filters,
            on_picked: Continuation::Single(Box::new(move |path| {
                let _ = tx.send(PickOutcome::Picked(path));
            })),
            on_cancel: Some(Box::new(move || {
                let _ = cancel_tx.send(PickOutcome::Cancelled);
            })),
        })?;
        Ok(task)
    }

    /// Pick several files. Resolves with the chosen paths in helper order.
    pub fn pick_many(
        &self,
        start: Option<PathBuf>,
        filters: Vec<FileFilter>,
    ) -> Result<PickTask<Vec<PathBuf>>, PickError> {
        let (tx, task) = channel();
        let cancel_tx = tx.clone();
        self.request(PickRequest {
            start,
            mode: PickMode::OpenMultipleFiles,
            filters,
            on_picked: Continuation::Multi(Box::new(move |paths| {
                let _ = tx.send(PickOutcome::Picked(paths));
            })),
            on_cancel: Some(Box::new(move || {
                let _ = cancel_tx.send(PickOutcome::Cancelled);
            })),
        })?;
        Ok(task)
    }

    /// Submit a pick with explicit continuations. Fails with
    /// [`PickError::Busy`] without launching anything while another pick is
    /// in flight. [`PickMode::BrowseFiles`] is rejected: the helper never
    /// answers it, so it would hold the slot forever.
    pub fn request(&self, request: PickRequest) -> Result<(), PickError> {
        let PickRequest {
            start,
            mode,
            filters,
            on_picked,
            on_cancel,
        } = request;

        if mode == PickMode::BrowseFiles {
            return Err(PickError::BrowseNotPickable);
        }

        let mut pending = self.pending();
        if pending.is_some() {
            tracing::warn!(mode = mode.keyword(), "Pick rejected: picker already open");
            return Err(PickError::Busy);
        }
        *pending = Some(PendingPick {
            on_picked,
            on_cancel,
        });

        let start = start.unwrap_or_else(|| self.default_start.clone());
        let invocation = self.invocation(&start, mode, &filters);

        if let Err(e) = self.launcher.launch(&invocation) {
            *pending = None;
            tracing::error!(error = %e, "Failed to launch picker helper");
            return Err(PickError::Launch(format!("{e:#}")));
        }

        tracing::info!(mode = mode.keyword(), start = %start.display(), "Picker opened");
        Ok(())
    }

    /// Show `path` in the desktop file browser. Returns false, launching
    /// nothing, when `path` is not a directory. Does not take the
    /// single-flight slot since no answer is expected.
    pub fn open_folder(&self, path: &Path) -> bool {
        if !path.is_dir() {
            return false;
        }
        let invocation = self.invocation(path, PickMode::BrowseFiles, &[]);
        if let Err(e) = self.launcher.launch(&invocation) {
            tracing::error!(error = %e, path = %path.display(), "Failed to open folder");
        }
        true
    }

    /// Drop the in-flight pick and resolve its cancellation path. Returns
    /// whether a pick was active.
    pub fn cancel(&self) -> bool {
        let Some(pick) = self.pending().take() else {
            return false;
        };
        if let Some(on_cancel) = pick.on_cancel {
            self.main.post(on_cancel);
        }
        tracing::info!("Pick cancelled by host");
        true
    }

    /// Helper command line: namespace, start path, title, mode keyword, then
    /// the encoded filters.
    pub fn invocation(&self, start: &Path, mode: PickMode, filters: &[FileFilter]) -> Invocation {
        let mut args = vec![
            self.namespace.unique_path().display().to_string(),
            to_posix_path(start),
            mode.title().to_string(),
            mode.keyword().to_string(),
        ];
        args.extend(encode_filters(filters));
        Invocation::new(self.script.clone(), args)
    }

    /// Watcher callback for the answer file. Runs on the poll thread; every
    /// continuation is marshalled onto the main queue.
    pub(crate) fn on_answer_changed(&self) {
        let path = self.namespace.join(ANSWER_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(error = %e, "Answer file not readable yet");
                return;
            }
        };

        let answer = Answer::parse(&content);
        if answer == Answer::Pending {
            return;
        }

        let Some(pick) = self.pending().take() else {
            tracing::debug!("Answer written with no pick in flight");
            return;
        };

        match answer {
            Answer::Pending => {}
            Answer::Cancelled => {
                tracing::info!("Pick cancelled by user");
                if let Some(on_cancel) = pick.on_cancel {
                    self.main.post(on_cancel);
                }
            }
            Answer::Selection(selection) => match pick.on_picked {
                Continuation::Single(on_picked) => {
                    tracing::info!(path = %selection, "Picked");
                    self.main.post(move || on_picked(PathBuf::from(selection)));
                }
                Continuation::Multi(on_picked) => {
                    let paths = split_paths(&selection);
                    tracing::info!(count = paths.len(), "Picked");
                    self.main.post(move || on_picked(paths));
                }
            },
        }
    }
}
