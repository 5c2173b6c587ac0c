//! Global `tracing` subscriber.
//!
//! Events go to stderr in compact form and, once a console is running, to
//! the console log through [`ConsoleLayer`]. `RUST_LOG` overrides the default
//! level for both.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleLayer;

/// Install the global subscriber. Fails if one is already installed.
pub fn init(level: Level, console: Option<ConsoleLayer>) -> Result<()> {
    let stderr_is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_tty)
        .with_target(false)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(stderr_layer)
        .with(console)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_filter_uses_level() {
        std::env::remove_var("RUST_LOG");
        let filter = build_env_filter(Level::WARN);
        assert!(filter.to_string().eq_ignore_ascii_case("warn"));
    }
}
