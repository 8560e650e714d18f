//! Text formatting for console output.
//!
//! Provides the [`EventFormatter`] trait consumed by the console channel,
//! a [`SharedFormatter`] wrapper for trait objects, and the
//! [`DefaultFormatter`] producing coloured, human-readable lines.

use std::{
    fmt::{self, Write as _},
    sync::Arc,
};

use chrono::{
    DateTime, Local,
    format::{Item, StrftimeItems},
};

use crate::{event::LogEvent, level::Level};

mod ansi;

/// Default `strftime` pattern for console timestamps.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Whether every specifier in `pattern` is one `chrono` can render.
pub(crate) fn is_valid_timestamp_format(pattern: &str) -> bool {
    StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}

/// Render `now` with `pattern`, falling back to the default pattern when
/// `pattern` cannot be rendered.
fn render_timestamp(now: &DateTime<Local>, pattern: &str) -> String {
    let mut stamp = String::new();
    if write!(stamp, "{}", now.format(pattern)).is_err() {
        stamp.clear();
        let _ = write!(stamp, "{}", now.format(DEFAULT_TIMESTAMP_FORMAT));
    }
    stamp
}

/// Trait for formatting log events into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so formatters can be
/// shared across threads in a logging system.
pub trait EventFormatter: Send + Sync {
    /// Format an event into a string representation.
    fn format(&self, event: &LogEvent) -> String;
}

/// Shared formatter trait object used by channels.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn EventFormatter>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: EventFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Format an event using the wrapped formatter instance.
    pub fn format(&self, event: &LogEvent) -> String {
        self.inner.format(event)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn EventFormatter>)")
    }
}

/// Console formatter rendering
/// `"{timestamp}  [{scope}] › {level}  {message}"` with metadata as
/// indented JSON on the following lines.
#[derive(Clone, Debug)]
pub struct DefaultFormatter {
    timestamp_format: Option<String>,
    colors: bool,
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self {
            timestamp_format: Some(DEFAULT_TIMESTAMP_FORMAT.to_owned()),
            colors: true,
        }
    }
}

impl DefaultFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain output: no colours, no timestamps.
    pub fn plain() -> Self {
        Self {
            timestamp_format: None,
            colors: false,
        }
    }

    /// Prefix each line with the local time using a `strftime` pattern, or
    /// omit timestamps with `None`.
    pub fn with_timestamps(mut self, format: Option<String>) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    fn paint(&self, out: &mut String, style: &str, text: &str) {
        if self.colors {
            out.push_str(style);
            out.push_str(text);
            out.push_str(ansi::RESET);
        } else {
            out.push_str(text);
        }
    }

    fn format_at(&self, event: &LogEvent, now: DateTime<Local>) -> String {
        let mut out = String::with_capacity(64 + event.message().len());
        if let Some(pattern) = &self.timestamp_format {
            self.paint(&mut out, ansi::DIM, &render_timestamp(&now, pattern));
            out.push_str("  ");
        }
        if let Some(scope) = event.scope() {
            self.paint(&mut out, ansi::DIM, &format!("[{scope}] › "));
        }
        let level = format!("{:<10}", event.level());
        self.paint(&mut out, level_style(event.level()), &level);
        out.push_str("  ");
        out.push_str(event.message());
        if let Some(meta) = event.metadata() {
            let rendered = serde_json::to_string_pretty(meta)
                .unwrap_or_else(|err| format!("<unprintable metadata: {err}>"));
            out.push('\n');
            out.push_str(&rendered);
        }
        out
    }
}

fn level_style(level: Level) -> &'static str {
    match level {
        Level::Error => ansi::RED,
        Level::Warn => ansi::YELLOW,
        Level::Info => ansi::BLUE,
        Level::Success => ansi::GREEN,
        Level::Http => ansi::MAGENTA,
        Level::Db => ansi::CYAN,
        Level::Verbose => ansi::DIM_BLUE,
        Level::Debug => ansi::YELLOW,
        Level::Silly => ansi::DIM,
    }
}

impl EventFormatter for DefaultFormatter {
    fn format(&self, event: &LogEvent) -> String {
        self.format_at(event, Local::now())
    }
}

impl EventFormatter for Arc<dyn EventFormatter> {
    fn format(&self, event: &LogEvent) -> String {
        (**self).format(event)
    }
}

impl EventFormatter for Box<dyn EventFormatter> {
    fn format(&self, event: &LogEvent) -> String {
        (**self).format(event)
    }
}
