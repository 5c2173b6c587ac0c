//! Shared helpers: host construction and fake helper processes

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tempfile::TempDir;

use ferry::config::Config;
use ferry::helper::{Invocation, Launcher};
use ferry::host::{HostContext, Tick};
use ferry::main_queue::ExitRequest;
use ferry::namespace::ANSWER_FILE;

/// Config rooted in `tmp` with fast polling and a short heartbeat threshold.
pub fn test_config(tmp: &TempDir) -> Config {
    let mut config = Config::default();
    config.namespace.base_dir = tmp.path().to_path_buf();
    config.namespace.prefix = "it".to_string();
    config.watcher.poll_interval_ms = 5;
    config.console.heartbeat_threshold_ms = 250;
    config.console.heartbeat_interval_ms = 10;
    config
}

pub fn test_host(tmp: &TempDir, launcher: Arc<dyn Launcher>) -> HostContext {
    HostContext::new(test_config(tmp), launcher)
}

/// Tick `host` until `condition` holds or an exit is requested.
pub fn tick_until(
    host: &HostContext,
    timeout: Duration,
    mut condition: impl FnMut() -> bool,
) -> Option<ExitRequest> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Tick::Exit(request) = host.tick() {
            return Some(request);
        }
        if condition() {
            return None;
        }
        thread::sleep(Duration::from_millis(5));
    }
    None
}

/// Picker stand-in: answers every launch from a background thread, the way
/// the real helper writes `selectedFile.txt` after the dialog closes.
#[derive(Clone)]
pub struct AnsweringLauncher {
    answers: Arc<Mutex<Vec<String>>>,
    delay: Duration,
    pub launched: Arc<Mutex<Vec<Invocation>>>,
}

impl AnsweringLauncher {
    /// Answers are handed out in order, one per launch.
    pub fn new(answers: &[&str], delay: Duration) -> Self {
        let mut answers: Vec<String> = answers.iter().map(|a| a.to_string()).collect();
        answers.reverse();
        Self {
            answers: Arc::new(Mutex::new(answers)),
            delay,
            launched: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Launcher for AnsweringLauncher {
    fn launch(&self, invocation: &Invocation) -> Result<()> {
        self.launched.lock().unwrap().push(invocation.clone());
        let namespace = PathBuf::from(invocation.args.first().context("missing namespace")?);
        let answer = self.answers.lock().unwrap().pop();
        let delay = self.delay;

        thread::spawn(move || {
            let path = namespace.join(ANSWER_FILE);
            let _ = fs::write(&path, "");
            thread::sleep(delay);
            if let Some(answer) = answer {
                let _ = fs::write(&path, answer);
            }
        });
        Ok(())
    }
}
