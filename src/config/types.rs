//! Channel configuration types.
//!
//! All types deserialise from camelCase JSON and also expose fluent
//! `with_*` setters for building configuration in code.

use std::time::Duration;

use serde::Deserialize;

use crate::{
    formatter::{DEFAULT_TIMESTAMP_FORMAT, DefaultFormatter},
    level::Level,
    rate_limited_warner::DEFAULT_WARN_INTERVAL,
};

/// Default connection timeout applied when establishing sockets.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default write timeout applied to socket writes.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);
/// Default maximum payload size (in bytes) accepted by the connector.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1 << 20; // 1 MiB
/// Default base delay for exponential backoff retries.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(100);
/// Default maximum delay for exponential backoff retries.
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(10);
/// Default duration of healthy writes that resets backoff state.
pub const DEFAULT_BACKOFF_RESET: Duration = Duration::from_secs(30);
/// Default absolute deadline for reconnection attempts.
pub const DEFAULT_BACKOFF_DEADLINE: Duration = Duration::from_secs(120);

fn enabled_by_default() -> bool {
    true
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_owned()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Timestamp rendering for console output.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimestampConfig {
    pub enabled: bool,
    /// `strftime` pattern.
    pub format: String,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: default_timestamp_format(),
        }
    }
}

/// Console channel options.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub level: Option<Level>,
    pub timestamps: TimestampConfig,
    pub colors: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: None,
            timestamps: TimestampConfig::default(),
            colors: true,
        }
    }
}

impl ConsoleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Toggle timestamps, keeping the configured pattern.
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps.enabled = enabled;
        self
    }

    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamps.format = format.into();
        self
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Formatter matching these options.
    pub fn formatter(&self) -> DefaultFormatter {
        let pattern = self
            .timestamps
            .enabled
            .then(|| self.timestamps.format.clone());
        DefaultFormatter::new()
            .with_timestamps(pattern)
            .with_colors(self.colors)
    }
}

/// Overrides for reconnection backoff timings, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackoffConfig {
    pub base_ms: u64,
    pub cap_ms: u64,
    pub reset_after_ms: u64,
    pub deadline_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_ms: millis(DEFAULT_BACKOFF_BASE),
            cap_ms: millis(DEFAULT_BACKOFF_CAP),
            reset_after_ms: millis(DEFAULT_BACKOFF_RESET),
            deadline_ms: millis(DEFAULT_BACKOFF_DEADLINE),
        }
    }
}

/// Remote collector channel options.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub level: Option<Level>,
    /// Collector address: `tcp://host:port`, `tls://host:port`,
    /// `unix:///path`, or a bare `host:port`.
    pub host: String,
    pub token: String,
    pub app_key: String,
    /// Maximum number of buffered events; unbounded when absent.
    #[serde(default)]
    pub capacity: Option<usize>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub write_timeout_ms: Option<u64>,
    #[serde(default)]
    pub max_frame_size: Option<usize>,
    #[serde(default)]
    pub backoff: BackoffConfig,
    #[serde(default)]
    pub warn_interval_ms: Option<u64>,
    /// Skip TLS certificate validation (intended for tests).
    #[serde(default)]
    pub tls_insecure: bool,
}

impl CloudConfig {
    pub fn new(host: impl Into<String>, token: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            enabled: true,
            level: None,
            host: host.into(),
            token: token.into(),
            app_key: app_key.into(),
            capacity: None,
            connect_timeout_ms: None,
            write_timeout_ms: None,
            max_frame_size: None,
            backoff: BackoffConfig::default(),
            warn_interval_ms: None,
            tls_insecure: false,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the buffer capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_write_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.write_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = Some(size);
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_tls_insecure(mut self, insecure: bool) -> Self {
        self.tls_insecure = insecure;
        self
    }

    pub fn buffer_capacity(&self) -> usize {
        self.capacity.unwrap_or(usize::MAX)
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout_ms
            .map_or(DEFAULT_CONNECT_TIMEOUT, Duration::from_millis)
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout_ms
            .map_or(DEFAULT_WRITE_TIMEOUT, Duration::from_millis)
    }

    pub fn frame_limit(&self) -> usize {
        self.max_frame_size.unwrap_or(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn warn_interval(&self) -> Duration {
        self.warn_interval_ms
            .map_or(DEFAULT_WARN_INTERVAL, Duration::from_millis)
    }
}
