//! `tracing` layer that mirrors log events into the console sink.
//!
//! The layer is installed with the global subscriber before the console
//! exists, so the sink is bound late through a [`ConsoleSinkSlot`]. Events
//! emitted before the slot is attached are dropped.

use std::fmt::{self, Write as _};
use std::sync::{Arc, OnceLock};

use chrono::Local;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use super::sink::SinkWriter;
use crate::config::{ConsoleColors, ConsoleConfig, Rgb};

const RESET: &str = "\x1b[0m";

/// Late-bound handle to the console sink shared between the layer and the
/// console service.
#[derive(Clone, Default)]
pub struct ConsoleSinkSlot {
    inner: Arc<OnceLock<Arc<SinkWriter>>>,
}

impl ConsoleSinkSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the sink. Only the first call wins; returns whether it did.
    pub fn attach(&self, sink: Arc<SinkWriter>) -> bool {
        self.inner.set(sink).is_ok()
    }

    pub fn get(&self) -> Option<&Arc<SinkWriter>> {
        self.inner.get()
    }
}

pub struct ConsoleLayer {
    slot: ConsoleSinkSlot,
    min_level: Level,
    milliseconds: bool,
    colors: ConsoleColors,
}

impl ConsoleLayer {
    pub fn new(config: &ConsoleConfig, slot: ConsoleSinkSlot) -> Self {
        Self {
            slot,
            min_level: config.level(),
            milliseconds: config.log_milliseconds,
            colors: config.colors.clone(),
        }
    }

    pub fn enabled_for(&self, level: &Level) -> bool {
        *level <= self.min_level
    }

    fn color_for(&self, level: &Level) -> Rgb {
        match *level {
            Level::ERROR => self.colors.error,
            Level::WARN => self.colors.warn,
            Level::INFO => self.colors.info,
            _ => self.colors.debug,
        }
    }
}

impl<S> Layer<S> for ConsoleLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !self.enabled_for(metadata.level()) {
            return;
        }
        let Some(sink) = self.slot.get() else {
            return;
        };

        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let now = Local::now();
        let time = if self.milliseconds {
            now.format("%H:%M:%S%.3f").to_string()
        } else {
            now.format("%H:%M:%S").to_string()
        };
        let current = std::thread::current();
        let thread = current.name().unwrap_or("unnamed");

        let line = format_line(
            &time,
            metadata.level(),
            self.color_for(metadata.level()),
            thread,
            metadata.target(),
            &fields.finish(),
        );
        // Logging a sink failure would re-enter this layer.
        let _ = sink.append(&line);
    }
}

/// Fixed-width level label.
pub fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN ",
        Level::INFO => "INFO ",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// Render one console line: colored `time LEVEL` prefix, then thread, target
/// and message.
pub fn format_line(
    time: &str,
    level: &Level,
    color: Rgb,
    thread: &str,
    target: &str,
    message: &str,
) -> String {
    format!(
        "{}{} {}{} [{}] [{}]: {}\n",
        color.fg_sequence(),
        time,
        level_label(level),
        RESET,
        thread,
        target,
        message
    )
}

/// Collects the `message` field plus any structured `key=value` fields.
#[derive(Default)]
struct FieldCollector {
    message: String,
    extra: String,
}

impl FieldCollector {
    fn finish(self) -> String {
        if self.extra.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.extra.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.extra)
        }
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.extra, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.extra, " {}={:?}", field.name(), value);
        }
    }
}
