//! Helper process installation and launching.
//!
//! Helpers are shell scripts written into the namespace and started detached
//! from the host: they get their own session and no inherited stdio, and are
//! only reachable afterwards through files in the namespace.

mod scripts;

pub use scripts::{CONSOLE_SCRIPT, CONSOLE_SCRIPT_NAME, PICKER_SCRIPT, PICKER_SCRIPT_NAME};

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fmt;
use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

/// A fully resolved helper command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let program = self.program.to_string_lossy();
        write!(f, "{}", shell_escape::escape(program))?;
        for arg in &self.args {
            write!(f, " {}", shell_escape::escape(Cow::Borrowed(arg.as_str())))?;
        }
        Ok(())
    }
}

/// Starts helper processes. Implementations must not block on the helper.
pub trait Launcher: Send + Sync {
    fn launch(&self, invocation: &Invocation) -> Result<()>;
}

/// Spawns the helper in a new session with stdio detached and reaps it from a
/// background thread once it exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

impl Launcher for DetachedLauncher {
    fn launch(&self, invocation: &Invocation) -> Result<()> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()
                    .map(|_| ())
                    .map_err(std::io::Error::from)
            });
        }

        let mut child = command.spawn().with_context(|| {
            format!(
                "Failed to spawn helper '{}'",
                invocation.program.display()
            )
        })?;

        tracing::debug!(pid = child.id(), command = %invocation, "Helper spawned");

        let name = invocation
            .program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "helper".to_string());
        let reaper = thread::Builder::new()
            .name(format!("reap:{name}"))
            .spawn(move || match child.wait() {
                Ok(status) => tracing::debug!(%status, "Helper exited"),
                Err(e) => tracing::debug!(error = %e, "Failed to wait for helper"),
            });
        if let Err(e) = reaper {
            tracing::warn!(error = %e, "Failed to spawn helper reaper thread");
        }

        Ok(())
    }
}

/// Records invocations instead of spawning anything. Backs `--dry-run` and
/// tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingLauncher {
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, invocation: &Invocation) -> Result<()> {
        tracing::info!(command = %invocation, "Dry run: helper not spawned");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(invocation.clone());
        }
        Ok(())
    }
}

/// Write a helper script into `dir` and mark it executable.
pub fn install_script(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write helper script: {}", path.display()))?;
    fs::set_permissions(&path, Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to mark helper script executable: {}", path.display()))?;
    Ok(path)
}
