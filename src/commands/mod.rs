//! Subcommands of the `ferry` binary.

pub mod console;
pub mod namespace;
pub mod pick;

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::Config;
use crate::console::{ConsoleLayer, ConsoleSinkSlot};
use crate::helper::{DetachedLauncher, Launcher, RecordingLauncher};
use crate::host::{HostContext, Tick};
use crate::main_queue::ExitRequest;

/// Delay between two host ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Load the configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => match Config::default_path() {
            Some(path) => Config::load(&path),
            None => Ok(Config::default()),
        },
    }
}

/// Install the global subscriber, mirroring into the console once `slot`
/// is bound.
pub fn init_logging(config: &Config, slot: Option<ConsoleSinkSlot>) -> Result<()> {
    let console = slot.map(|slot| ConsoleLayer::new(&config.console, slot));
    let level = std::cmp::max(tracing::Level::INFO, config.console.level());
    crate::logging::init(level, console)
}

pub fn launcher(dry_run: bool) -> Arc<dyn Launcher> {
    if dry_run {
        Arc::new(RecordingLauncher::new())
    } else {
        Arc::new(DetachedLauncher)
    }
}

/// How a host loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEnd {
    Exit(ExitRequest),
    Done,
    TimedOut,
}

/// Tick `host` until it exits, `done` returns true or `deadline` passes.
pub fn run_host_loop(
    host: &HostContext,
    deadline: Option<Instant>,
    mut done: impl FnMut() -> bool,
) -> LoopEnd {
    loop {
        if let Tick::Exit(request) = host.tick() {
            return LoopEnd::Exit(request);
        }
        if done() {
            return LoopEnd::Done;
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return LoopEnd::TimedOut;
        }
        thread::sleep(TICK_INTERVAL);
    }
}
