//! External log console.
//!
//! The console is a detached terminal that tails `console.ansi` from the
//! namespace. The host never talks to it directly:
//!
//! - log lines are appended to `console.ansi` by [`ConsoleLayer`]
//! - the helper proves it is alive by rewriting `console.heartbeat`
//! - the host asks it to close by creating `console.exit`
//!
//! When the heartbeat goes stale (the user closed the window) the
//! [`HeartbeatMonitor`] asks the host to exit.

mod exit;
mod heartbeat;
mod layer;
mod sink;

pub use exit::ExitSentinel;
pub use heartbeat::{now_millis, HeartbeatCheck, HeartbeatMonitor, HeartbeatState};
pub use layer::{format_line, level_label, ConsoleLayer, ConsoleSinkSlot};
pub use sink::SinkWriter;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{ConsoleColors, ConsoleConfig};
use crate::helper::{install_script, Invocation, Launcher, CONSOLE_SCRIPT, CONSOLE_SCRIPT_NAME};
use crate::main_queue::MainQueue;
use crate::namespace::{Namespace, CONSOLE_LOG_FILE, EXIT_SENTINEL_FILE, HEARTBEAT_FILE};
use crate::watcher::{DirectoryWatcher, DirectoryWatchers};

/// Terminal the console helper runs in.
pub const CONSOLE_TERMINAL: &str = "xterm";

/// A running console session.
pub struct Console {
    sink: Arc<SinkWriter>,
    monitor: Arc<HeartbeatMonitor>,
    exit: ExitSentinel,
    watcher: Arc<DirectoryWatcher>,
    script: PathBuf,
}

impl Console {
    /// Prepare the namespace, start watching for the helper's heartbeat and
    /// launch the console helper.
    ///
    /// Once the helper is launched the sink is attached to `slot` so the
    /// global log layer starts mirroring events. On error the slot stays
    /// unbound and nothing keeps watching the namespace.
    pub fn setup(
        config: &ConsoleConfig,
        namespace: &Namespace,
        watchers: &DirectoryWatchers,
        launcher: &dyn Launcher,
        main: MainQueue,
        slot: &ConsoleSinkSlot,
    ) -> Result<Self> {
        let dir = namespace.ensure()?;
        let exit = ExitSentinel::new(namespace.join(EXIT_SENTINEL_FILE));
        exit.clear()?;

        let monitor = Arc::new(HeartbeatMonitor::new(
            namespace.join(HEARTBEAT_FILE),
            config.heartbeat_threshold(),
            config.heartbeat_interval(),
            main,
        ));
        let watcher = watchers.for_directory(dir)?;
        let armed = Arc::clone(&monitor);
        watcher.watch(HEARTBEAT_FILE, move || {
            armed.arm();
        });

        match Self::start_helper(config, namespace, dir, launcher, &monitor, slot) {
            Ok((sink, script)) => Ok(Self {
                sink,
                monitor,
                exit,
                watcher,
                script,
            }),
            Err(e) => {
                watcher.unwatch(HEARTBEAT_FILE);
                Err(e)
            }
        }
    }

    fn start_helper(
        config: &ConsoleConfig,
        namespace: &Namespace,
        dir: &Path,
        launcher: &dyn Launcher,
        monitor: &HeartbeatMonitor,
        slot: &ConsoleSinkSlot,
    ) -> Result<(Arc<SinkWriter>, PathBuf)> {
        let sink = Arc::new(SinkWriter::create(&namespace.join(CONSOLE_LOG_FILE))?);

        let script = install_script(dir, CONSOLE_SCRIPT_NAME, CONSOLE_SCRIPT)
            .context("Failed to install console helper")?;

        if which::which(CONSOLE_TERMINAL).is_err() {
            tracing::warn!(
                terminal = CONSOLE_TERMINAL,
                "Console terminal not found in PATH, the console window may not open"
            );
        }

        let invocation = Invocation::new(
            &script,
            vec![
                namespace.unique_path().display().to_string(),
                config.font_size.to_string(),
                config.colors.background.hex(),
                config.colors.foreground.hex(),
            ],
        );
        launcher
            .launch(&invocation)
            .context("Failed to launch console helper")?;

        // Only a launched console gets log lines and the palette.
        let colors = config.colors.clone();
        let synced = Arc::clone(&sink);
        monitor.on_first_arm(move || {
            if let Err(e) = sync_colors(&synced, &colors) {
                tracing::warn!(error = %e, "Failed to send console colors");
            }
        });
        if !slot.attach(Arc::clone(&sink)) {
            tracing::warn!("Console log layer already bound to another sink");
        }

        tracing::info!(log = %sink.path().display(), "Console helper launched");
        Ok((sink, script))
    }

    pub fn sink(&self) -> &Arc<SinkWriter> {
        &self.sink
    }

    pub fn monitor(&self) -> &Arc<HeartbeatMonitor> {
        &self.monitor
    }

    pub fn exit_sentinel(&self) -> &ExitSentinel {
        &self.exit
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Stop monitoring and ask the helper to close.
    pub fn shutdown(&self) -> Result<()> {
        self.monitor.stop();
        self.watcher.unwatch(HEARTBEAT_FILE);
        self.exit.signal()
    }
}

/// OSC 10/11 sequences setting the terminal foreground and background.
pub fn color_sequences(colors: &ConsoleColors) -> String {
    format!(
        "\x1b]10;{}\x07\x1b]11;{}\x07",
        colors.foreground.hex(),
        colors.background.hex()
    )
}

/// Push the configured palette to the console terminal through the sink.
pub fn sync_colors(sink: &SinkWriter, colors: &ConsoleColors) -> std::io::Result<()> {
    sink.append(&color_sequences(colors))
}
