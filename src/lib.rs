pub mod commands;
pub mod config;
pub mod console;
pub mod helper;
pub mod host;
pub mod logging;
pub mod main_queue;
pub mod namespace;
pub mod paths;
pub mod picker;
pub mod watcher;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use host::{HostContext, Tick};
pub use main_queue::{ExitRequest, MainQueue};
pub use namespace::Namespace;
pub use picker::{FileFilter, PickError, PickMode, PickOutcome, PickTask, PickerCoordinator};
pub use watcher::{DirectoryWatcher, DirectoryWatchers};
