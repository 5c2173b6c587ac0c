//! Host configuration loaded from `config.toml`.
//!
//! Every field has a default so an absent or partial file is valid. The
//! default location is `<config dir>/ferry/config.toml`.

mod color;

pub use color::Rgb;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Default delay between two watcher polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 20;

/// Default gap after which a heartbeat is considered stale.
///
/// The console helper refreshes its heartbeat roughly every 17ms, so this
/// leaves a wide margin for scheduler jitter.
pub const DEFAULT_HEARTBEAT_THRESHOLD_MS: u64 = 3000;

/// Default delay between two heartbeat checks.
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub namespace: NamespaceConfig,
    pub watcher: WatcherConfig,
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Parent directory of the per-run namespace
    pub base_dir: PathBuf,
    /// Directory name prefix, followed by `-<millis>`
    pub prefix: String,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            base_dir: std::env::temp_dir(),
            prefix: "ferry".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub poll_interval_ms: u64,
}

impl WatcherConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Spawn the console helper at startup
    pub enabled: bool,
    pub font_size: u32,
    pub heartbeat_threshold_ms: u64,
    pub heartbeat_interval_ms: u64,
    /// Minimum level mirrored into the console: debug, info, warning or error
    pub log_level: String,
    pub log_milliseconds: bool,
    pub colors: ConsoleColors,
}

impl ConsoleConfig {
    pub fn heartbeat_threshold(&self) -> Duration {
        Duration::from_millis(self.heartbeat_threshold_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.max(1))
    }

    pub fn level(&self) -> Level {
        parse_level(&self.log_level)
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font_size: 10,
            heartbeat_threshold_ms: DEFAULT_HEARTBEAT_THRESHOLD_MS,
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
            log_level: "info".to_string(),
            log_milliseconds: true,
            colors: ConsoleColors::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleColors {
    pub foreground: Rgb,
    pub background: Rgb,
    pub debug: Rgb,
    pub info: Rgb,
    pub warn: Rgb,
    pub error: Rgb,
}

impl Default for ConsoleColors {
    fn default() -> Self {
        Self {
            foreground: Rgb::new(0xff, 0xff, 0xff),
            background: Rgb::new(0x00, 0x00, 0x00),
            debug: Rgb::new(0x76, 0x76, 0x76),
            info: Rgb::new(0x00, 0x87, 0xff),
            warn: Rgb::new(0xff, 0xff, 0xaf),
            error: Rgb::new(0xff, 0x00, 0x00),
        }
    }
}

impl Config {
    /// Default config file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ferry").join("config.toml"))
    }

    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }
}

/// Map a level name to a tracing level. Unknown names fall back to info.
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
