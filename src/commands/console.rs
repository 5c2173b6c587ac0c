use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use colored::Colorize;

use super::{init_logging, launcher, run_host_loop, LoopEnd};
use crate::config::Config;
use crate::host::HostContext;

/// Open the console and keep the host alive until the console closes, the
/// optional duration elapses or Ctrl+C is pressed.
pub fn execute(mut config: Config, duration: Option<u64>, dry_run: bool) -> Result<()> {
    config.console.enabled = true;
    let mut host = HostContext::new(config.clone(), launcher(dry_run));
    init_logging(&config, Some(host.console_slot()))?;
    host.install_exit_hooks()?;

    if host.enable_console().is_none() {
        bail!("Console could not be started");
    }
    println!(
        "{} {}",
        "Console namespace:".green(),
        host.namespace().unique_path().display()
    );
    tracing::info!("Console attached, waiting for the helper heartbeat");

    let deadline = duration.map(|secs| Instant::now() + Duration::from_secs(secs));
    match run_host_loop(&host, deadline, || false) {
        LoopEnd::Exit(request) => {
            println!("{} {}", "Exiting:".yellow(), request.reason);
        }
        LoopEnd::TimedOut => {
            tracing::info!("Console duration elapsed");
        }
        LoopEnd::Done => {}
    }

    host.shutdown();
    Ok(())
}
