//! Pick requests answered by a simulated helper through the live watcher

use serial_test::serial;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ferry::picker::{FileFilter, PickError, PickMode, PickOutcome};

use super::helpers::*;

#[test]
#[serial]
fn test_single_pick_resolves_on_tick() {
    let tmp = tempfile::tempdir().unwrap();
    let launcher = AnsweringLauncher::new(&["/srv/levels/one.gmd\n"], Duration::from_millis(30));
    let mut host = test_host(&tmp, Arc::new(launcher.clone()));
    let picker = host.enable_picker().expect("picker should install");

    let task = picker
        .pick_one(
            None,
            PickMode::OpenFile,
            vec![FileFilter::new("Levels", ["*.gmd"])],
        )
        .unwrap();

    let exit = tick_until(&host, Duration::from_secs(5), || task.is_ready());
    assert!(exit.is_none());
    assert_eq!(
        task.try_take(),
        Some(PickOutcome::Picked(PathBuf::from("/srv/levels/one.gmd")))
    );
    assert!(!picker.is_active());

    let launched = launcher.launched.lock().unwrap();
    assert_eq!(launched[0].args[4], "Levels|*.gmd");
    assert_eq!(launched[0].args[5], "All Files|*.*");
}

#[test]
#[serial]
fn test_busy_while_helper_is_open() {
    let tmp = tempfile::tempdir().unwrap();
    let launcher = AnsweringLauncher::new(&["-1"], Duration::from_millis(150));
    let mut host = test_host(&tmp, Arc::new(launcher.clone()));
    let picker = host.enable_picker().unwrap();

    let task = picker.pick_many(None, vec![]).unwrap();
    assert_eq!(
        picker.pick_one(None, PickMode::SaveFile, vec![]).unwrap_err(),
        PickError::Busy
    );

    tick_until(&host, Duration::from_secs(5), || task.is_ready());
    assert_eq!(task.try_take(), Some(PickOutcome::Cancelled));
    assert_eq!(launcher.launched.lock().unwrap().len(), 1);

    // The slot is free again once the answer is consumed.
    assert!(picker.pick_one(None, PickMode::SaveFile, vec![]).is_ok());
}

#[test]
#[serial]
fn test_multi_pick_through_watcher() {
    let tmp = tempfile::tempdir().unwrap();
    let launcher = AnsweringLauncher::new(&["/a\n\n/b\n/c\n"], Duration::from_millis(30));
    let mut host = test_host(&tmp, Arc::new(launcher));
    let picker = host.enable_picker().unwrap();

    let task = picker.pick_many(Some(PathBuf::from("/tmp")), vec![]).unwrap();
    tick_until(&host, Duration::from_secs(5), || task.is_ready());

    assert_eq!(
        task.try_take(),
        Some(PickOutcome::Picked(vec![
            PathBuf::from("/a"),
            PathBuf::from("/b"),
            PathBuf::from("/c"),
        ]))
    );
}
