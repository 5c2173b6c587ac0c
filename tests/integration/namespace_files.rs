//! Namespace allocation and helper script installation

use serial_test::serial;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ferry::helper::{RecordingLauncher, CONSOLE_SCRIPT_NAME, PICKER_SCRIPT_NAME};
use ferry::namespace::Namespace;

use super::helpers::*;

#[test]
#[serial]
fn test_namespaces_allocated_apart_are_distinct() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(&tmp);

    let first = Namespace::allocate(&config.namespace);
    thread::sleep(Duration::from_millis(5));
    let second = Namespace::allocate(&config.namespace);

    assert_ne!(first.unique_path(), second.unique_path());
    assert!(first
        .unique_path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("it-"));
}

#[test]
#[serial]
fn test_enabled_services_install_executable_helpers() {
    let tmp = tempfile::tempdir().unwrap();
    let mut host = test_host(&tmp, Arc::new(RecordingLauncher::new()));
    host.enable_console().unwrap();
    host.enable_picker().unwrap();

    for name in [CONSOLE_SCRIPT_NAME, PICKER_SCRIPT_NAME] {
        let script = host.namespace().join(name);
        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755, "{name} should be executable");
    }
}
