//! Host-side owner of every service.
//!
//! The host drives [`HostContext::tick`] from its main loop. Everything that
//! background threads want done on the main context arrives through the
//! [`MainQueue`] and runs inside `tick`.

use std::path::PathBuf;
use std::sync::{Arc, Once};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::console::{Console, ConsoleSinkSlot, ExitSentinel};
use crate::helper::Launcher;
use crate::main_queue::{ExitRequest, MainQueue};
use crate::namespace::{Namespace, EXIT_SENTINEL_FILE};
use crate::picker::{InputGate, PickError, PickerCoordinator};
use crate::watcher::DirectoryWatchers;

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Result of one host tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Continue { ran: usize },
    Exit(ExitRequest),
}

pub struct HostContext {
    config: Config,
    namespace: Namespace,
    watchers: DirectoryWatchers,
    main: MainQueue,
    launcher: Arc<dyn Launcher>,
    console_slot: ConsoleSinkSlot,
    console: Option<Console>,
    picker: Option<Arc<PickerCoordinator>>,
}

impl HostContext {
    /// Allocate this run's namespace and the shared services. Nothing is
    /// created on disk until a service is enabled.
    pub fn new(config: Config, launcher: Arc<dyn Launcher>) -> Self {
        let namespace = Namespace::allocate(&config.namespace);
        let watchers = DirectoryWatchers::new(config.watcher.poll_interval());
        Self {
            config,
            namespace,
            watchers,
            main: MainQueue::new(),
            launcher,
            console_slot: ConsoleSinkSlot::new(),
            console: None,
            picker: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn main_queue(&self) -> &MainQueue {
        &self.main
    }

    /// Slot the global console log layer reads its sink from.
    pub fn console_slot(&self) -> ConsoleSinkSlot {
        self.console_slot.clone()
    }

    pub fn console(&self) -> Option<&Console> {
        self.console.as_ref()
    }

    /// Start the console. A failure is logged and leaves the console off.
    pub fn enable_console(&mut self) -> Option<&Console> {
        if self.console.is_none() {
            if !self.config.console.enabled {
                tracing::info!("Console disabled in configuration");
                return None;
            }
            match Console::setup(
                &self.config.console,
                &self.namespace,
                &self.watchers,
                self.launcher.as_ref(),
                self.main.clone(),
                &self.console_slot,
            ) {
                Ok(console) => self.console = Some(console),
                Err(e) => {
                    tracing::error!("Console unavailable: {e:#}");
                    return None;
                }
            }
        }
        self.console.as_ref()
    }

    /// Install the picker. A failure is logged and leaves picks unavailable.
    pub fn enable_picker(&mut self) -> Option<Arc<PickerCoordinator>> {
        if self.picker.is_none() {
            let default_start = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
            match PickerCoordinator::install(
                &self.namespace,
                &self.watchers,
                Arc::clone(&self.launcher),
                self.main.clone(),
                default_start,
            ) {
                Ok(picker) => self.picker = Some(picker),
                Err(e) => {
                    tracing::error!("File picker unavailable: {e:#}");
                    return None;
                }
            }
        }
        self.picker.clone()
    }

    pub fn picker(&self) -> Result<&Arc<PickerCoordinator>, PickError> {
        self.picker.as_ref().ok_or(PickError::Unavailable)
    }

    pub fn input_gate(&self) -> Option<InputGate> {
        self.picker.as_ref().map(|p| InputGate::new(Arc::clone(p)))
    }

    fn exit_sentinel(&self) -> ExitSentinel {
        ExitSentinel::new(self.namespace.join(EXIT_SENTINEL_FILE))
    }

    /// Run everything queued for the main context. An exit request also asks
    /// the console helper to close.
    pub fn tick(&self) -> Tick {
        let drained = self.main.drain();
        match drained.exit {
            Some(request) => {
                tracing::info!(save = request.save, reason = %request.reason, "Exit requested");
                self.signal_helpers();
                Tick::Exit(request)
            }
            None => Tick::Continue { ran: drained.ran },
        }
    }

    fn signal_helpers(&self) {
        if !self.namespace.unique_path().is_dir() {
            return;
        }
        if let Err(e) = self.exit_sentinel().signal() {
            tracing::warn!("{e:#}");
        }
    }

    /// Route Ctrl+C into an exit request and make sure the console helper is
    /// told to close on a panic.
    pub fn install_exit_hooks(&self) -> Result<()> {
        let sentinel = self.exit_sentinel();
        let main = self.main.clone();
        ctrlc::set_handler(move || {
            let _ = sentinel.signal();
            main.request_exit(ExitRequest {
                save: true,
                reason: "interrupted".to_string(),
            });
        })
        .context("Failed to set Ctrl+C handler")?;

        let sentinel = self.exit_sentinel();
        PANIC_HOOK_INSTALLED.call_once(|| {
            let default_hook = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |panic_info| {
                let _ = sentinel.signal();
                default_hook(panic_info);
            }));
        });
        Ok(())
    }

    /// Close the console, drop any open pick and stop all watchers.
    pub fn shutdown(&mut self) {
        if let Some(console) = self.console.take() {
            if let Err(e) = console.shutdown() {
                tracing::warn!("{e:#}");
            }
        }
        if let Some(picker) = self.picker.take() {
            picker.cancel();
        }
        self.watchers.shutdown();
    }
}

impl Drop for HostContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}
