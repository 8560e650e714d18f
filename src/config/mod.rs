//! Logger configuration.
//!
//! [`LoggerConfig`] carries the global minimum level and the optional
//! console and cloud channel options. It can be built fluently in code or
//! deserialised from JSON:
//!
//! ```
//! use logtowa::{Level, LoggerConfig};
//!
//! let config = LoggerConfig::from_json_str(
//!     r#"{
//!         "level": "debug",
//!         "console": { "level": "info", "timestamps": { "enabled": false } },
//!         "cloud": {
//!             "host": "tls://logs.example.com:443",
//!             "token": "secret",
//!             "appKey": "billing",
//!             "capacity": 1000
//!         }
//!     }"#,
//! )
//! .expect("valid configuration");
//! assert_eq!(config.level, Some(Level::Debug));
//! assert_eq!(config.cloud.as_ref().map(|c| c.buffer_capacity()), Some(1000));
//! ```

mod endpoint;
mod types;


use std::{fs, path::Path};

use serde::Deserialize;

use crate::{error::ConfigError, formatter::is_valid_timestamp_format, level::Level};

pub use endpoint::{DEFAULT_PORT, Endpoint};
pub use types::{
    BackoffConfig, CloudConfig, ConsoleConfig, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_CAP,
    DEFAULT_BACKOFF_DEADLINE, DEFAULT_BACKOFF_RESET, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_MAX_FRAME_SIZE, DEFAULT_WRITE_TIMEOUT, TimestampConfig,
};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ConfigError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok(())
        }
    }};
}

/// Top-level logger configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    /// Global minimum level; `None` allows every level.
    pub level: Option<Level>,
    /// Console channel; absent disables it.
    pub console: Option<ConsoleConfig>,
    /// Remote collector channel; absent disables it.
    pub cloud: Option<CloudConfig>,
}

impl LoggerConfig {
    /// Create an empty configuration with no channels.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_console(mut self, console: ConsoleConfig) -> Self {
        self.console = Some(console);
        self
    }

    pub fn with_cloud(mut self, cloud: CloudConfig) -> Self {
        self.cloud = Some(cloud);
        self
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Console options when the console channel is present and enabled.
    pub fn active_console(&self) -> Option<&ConsoleConfig> {
        self.console.as_ref().filter(|c| c.enabled)
    }

    /// Cloud options when the cloud channel is present and enabled.
    pub fn active_cloud(&self) -> Option<&CloudConfig> {
        self.cloud.as_ref().filter(|c| c.enabled)
    }

    /// Check the active channel options for values that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(console) = self.active_console() {
            validate_console(console)?;
        }
        if let Some(cloud) = self.active_cloud() {
            validate_cloud(cloud)?;
        }
        Ok(())
    }
}

fn validate_console(console: &ConsoleConfig) -> Result<(), ConfigError> {
    let timestamps = &console.timestamps;
    if timestamps.enabled && !is_valid_timestamp_format(&timestamps.format) {
        return Err(ConfigError::InvalidConfig(format!(
            "timestamps.format {:?} is not a valid strftime pattern",
            timestamps.format
        )));
    }
    Ok(())
}

fn validate_cloud(cloud: &CloudConfig) -> Result<(), ConfigError> {
    Endpoint::parse(&cloud.host)?;
    if cloud.app_key.trim().is_empty() {
        return Err(ConfigError::InvalidConfig("appKey must not be empty".into()));
    }
    if let Some(capacity) = cloud.capacity {
        ensure_positive!(capacity, "capacity")?;
    }
    if let Some(timeout) = cloud.connect_timeout_ms {
        ensure_positive!(timeout, "connectTimeoutMs")?;
    }
    if let Some(timeout) = cloud.write_timeout_ms {
        ensure_positive!(timeout, "writeTimeoutMs")?;
    }
    if let Some(size) = cloud.max_frame_size {
        ensure_positive!(size, "maxFrameSize")?;
    }
    ensure_positive!(cloud.backoff.base_ms, "backoff.baseMs")?;
    ensure_positive!(cloud.backoff.cap_ms, "backoff.capMs")?;
    ensure_positive!(cloud.backoff.reset_after_ms, "backoff.resetAfterMs")?;
    ensure_positive!(cloud.backoff.deadline_ms, "backoff.deadlineMs")?;
    Ok(())
}
