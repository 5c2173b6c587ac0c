//! Console heartbeat and exit-sentinel behavior with live watchers

use serial_test::serial;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ferry::console::{color_sequences, now_millis, HeartbeatState};
use ferry::helper::RecordingLauncher;
use ferry::host::Tick;
use ferry::namespace::{EXIT_SENTINEL_FILE, HEARTBEAT_FILE};

use super::helpers::*;

/// Console helper stand-in: rewrites the heartbeat until told to stop.
fn spawn_heartbeat(path: std::path::PathBuf, running: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while running.load(Ordering::SeqCst) {
            let _ = fs::write(&path, now_millis().to_string());
            thread::sleep(Duration::from_millis(15));
        }
    })
}

#[test]
#[serial]
fn test_stale_heartbeat_exits_once() {
    let tmp = tempfile::tempdir().unwrap();
    let launcher = RecordingLauncher::new();
    let mut host = test_host(&tmp, Arc::new(launcher.clone()));
    let console = host.enable_console().expect("console should start");
    let monitor = Arc::clone(console.monitor());
    let sink_path = console.sink().path().to_path_buf();
    assert_eq!(launcher.count(), 1);

    let running = Arc::new(AtomicBool::new(true));
    let writer = spawn_heartbeat(host.namespace().join(HEARTBEAT_FILE), Arc::clone(&running));

    // Alive: no exit while the helper keeps beating.
    let early = tick_until(&host, Duration::from_millis(400), || false);
    assert!(early.is_none());
    assert_eq!(monitor.state(), HeartbeatState::Monitoring);

    // The window is closed: heartbeat stops and goes stale.
    running.store(false, Ordering::SeqCst);
    writer.join().unwrap();

    let exit = tick_until(&host, Duration::from_secs(5), || false).expect("exit requested");
    assert!(!exit.save);
    assert_eq!(monitor.state(), HeartbeatState::Terminated);
    assert!(host.namespace().join(EXIT_SENTINEL_FILE).exists());

    for _ in 0..10 {
        assert!(matches!(host.tick(), Tick::Continue { .. }));
        thread::sleep(Duration::from_millis(10));
    }

    let log = fs::read_to_string(sink_path).unwrap();
    assert!(log.starts_with(&color_sequences(&test_config(&tmp).console.colors)));
}

#[test]
#[serial]
fn test_console_stays_idle_without_heartbeat() {
    let tmp = tempfile::tempdir().unwrap();
    let mut host = test_host(&tmp, Arc::new(RecordingLauncher::new()));
    let monitor = Arc::clone(host.enable_console().unwrap().monitor());

    let exit = tick_until(&host, Duration::from_millis(400), || false);
    assert!(exit.is_none());
    assert_eq!(monitor.state(), HeartbeatState::Idle);
}

#[test]
#[serial]
fn test_shutdown_signals_helper_without_exit_request() {
    let tmp = tempfile::tempdir().unwrap();
    let mut host = test_host(&tmp, Arc::new(RecordingLauncher::new()));
    host.enable_console().unwrap();
    let sentinel = host.namespace().join(EXIT_SENTINEL_FILE);
    assert!(!sentinel.exists());

    host.shutdown();

    assert!(sentinel.exists());
    assert!(matches!(host.tick(), Tick::Continue { .. }));
}
