//! Liveness protocol for the console helper.
//!
//! The helper rewrites `console.heartbeat` with its epoch milliseconds many
//! times per second. The helper is detached and cannot be joined or
//! signalled, so the host infers liveness from the age of that timestamp:
//!
//! - The first change to the heartbeat file arms the monitor
//! - A background thread then reads the file every interval
//! - Unreadable or unparseable content counts as "no signal yet"
//! - A gap above the threshold asks the host to exit without saving
//!
//! Both timestamps come from wall clocks of different processes. If those
//! clocks disagree the gap is skewed by the same amount; the threshold has to
//! absorb that along with scheduling jitter.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::main_queue::{ExitRequest, MainQueue};

/// Lifecycle of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatState {
    /// No monitor thread running
    Idle,
    /// Monitor thread polling the heartbeat file
    Monitoring,
    /// Heartbeat went stale and the host was asked to exit
    Terminated,
}

/// Outcome of one heartbeat read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatCheck {
    /// File missing, unreadable or not an integer yet
    Pending,
    Fresh { gap_ms: i64 },
    Stale { gap_ms: i64 },
}

type ArmHook = Box<dyn FnOnce() + Send + 'static>;

pub struct HeartbeatMonitor {
    path: PathBuf,
    threshold_ms: i64,
    interval: Duration,
    main: MainQueue,
    state: Mutex<HeartbeatState>,
    generation: AtomicU64,
    on_first_arm: Mutex<Option<ArmHook>>,
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

impl HeartbeatMonitor {
    pub fn new(path: PathBuf, threshold: Duration, interval: Duration, main: MainQueue) -> Self {
        Self {
            path,
            threshold_ms: i64::try_from(threshold.as_millis()).unwrap_or(i64::MAX),
            interval,
            main,
            state: Mutex::new(HeartbeatState::Idle),
            generation: AtomicU64::new(0),
            on_first_arm: Mutex::new(None),
        }
    }

    fn state_guard(&self) -> MutexGuard<'_, HeartbeatState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn state(&self) -> HeartbeatState {
        *self.state_guard()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hook fired exactly once, on the first successful `arm`.
    pub fn on_first_arm<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Ok(mut slot) = self.on_first_arm.lock() {
            *slot = Some(Box::new(hook));
        }
    }

    /// Start monitoring. Only the call that moves the monitor out of `Idle`
    /// spawns a thread; every other call is a no-op. Returns whether this call
    /// started monitoring.
    pub fn arm(self: &Arc<Self>) -> bool {
        let generation = {
            let mut state = self.state_guard();
            if *state != HeartbeatState::Idle {
                return false;
            }
            *state = HeartbeatState::Monitoring;
            self.generation.load(Ordering::SeqCst)
        };

        let hook = self.on_first_arm.lock().ok().and_then(|mut slot| slot.take());
        if let Some(hook) = hook {
            hook();
        }

        let monitor = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("console-heartbeat".to_string())
            .spawn(move || monitor.run(generation));

        match spawned {
            Ok(_) => {
                tracing::info!(
                    threshold_ms = self.threshold_ms,
                    "Console heartbeat detected, monitoring started"
                );
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to spawn heartbeat monitor thread");
                *self.state_guard() = HeartbeatState::Idle;
                false
            }
        }
    }

    /// Stop the monitor thread without asking the host to exit.
    pub fn stop(&self) {
        let mut state = self.state_guard();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if *state == HeartbeatState::Monitoring {
            *state = HeartbeatState::Idle;
        }
    }

    fn run(&self, generation: u64) {
        while self.generation.load(Ordering::SeqCst) == generation {
            match Self::check(&self.path, self.threshold_ms, now_millis()) {
                HeartbeatCheck::Pending | HeartbeatCheck::Fresh { .. } => {}
                HeartbeatCheck::Stale { gap_ms } => {
                    let mut state = self.state_guard();
                    if self.generation.load(Ordering::SeqCst) != generation {
                        return;
                    }
                    *state = HeartbeatState::Terminated;
                    tracing::error!(
                        gap_ms,
                        threshold_ms = self.threshold_ms,
                        "Console heartbeat is stale, exiting"
                    );
                    self.main.request_exit(ExitRequest::without_saving(format!(
                        "console heartbeat stale for {gap_ms}ms"
                    )));
                    return;
                }
            }
            thread::sleep(self.interval);
        }
    }

    /// Read the heartbeat at `path` and compare it against `now_ms`.
    pub fn check(path: &Path, threshold_ms: i64, now_ms: i64) -> HeartbeatCheck {
        let Ok(content) = std::fs::read_to_string(path) else {
            return HeartbeatCheck::Pending;
        };
        let Ok(beat_ms) = content.trim().parse::<i64>() else {
            return HeartbeatCheck::Pending;
        };

        let gap_ms = now_ms.saturating_sub(beat_ms);
        if gap_ms > threshold_ms {
            HeartbeatCheck::Stale { gap_ms }
        } else {
            HeartbeatCheck::Fresh { gap_ms }
        }
    }
}
