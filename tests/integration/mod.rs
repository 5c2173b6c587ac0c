//! Integration tests for ferry host services
//!
//! These tests drive a real `HostContext` with live directory watchers and
//! simulated helpers that talk to the host only through namespace files.

pub mod console_lifecycle;
pub mod helpers;
pub mod namespace_files;
pub mod pick_round_trip;
