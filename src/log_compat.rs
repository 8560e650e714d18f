//! Compatibility bridge for the Rust `log` crate.
//!
//! [`LogBridge`] implements `log::Log` and forwards records from any crate
//! using the `log` macros into a [`Logger`]. The record target becomes the
//! event's explicit scope. Records emitted by this crate itself are
//! skipped, so internal diagnostics never loop back into the channels.

use std::sync::{Arc, OnceLock};

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::{event::Metadata as EventMetadata, level::Level, logger::Logger};

const OWN_TARGET: &str = "logtowa";

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug => Level::Debug,
            log::Level::Trace => Level::Silly,
        }
    }
}

fn is_own_target(target: &str) -> bool {
    target.starts_with(OWN_TARGET)
}

/// Adapter implementing the Rust `log::Log` trait.
pub struct LogBridge {
    logger: Arc<Logger>,
}

static INSTALL_RESULT: OnceLock<bool> = OnceLock::new();

impl LogBridge {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// Install a bridge to `logger` as the global `log` logger.
    ///
    /// Fails when another global logger is already set.
    pub fn install(logger: Arc<Logger>, max_level: LevelFilter) -> Result<(), SetLoggerError> {
        let bridge: &'static LogBridge = Box::leak(Box::new(Self::new(logger)));
        log::set_logger(bridge)?;
        log::set_max_level(max_level);
        INSTALL_RESULT.get_or_init(|| true);
        Ok(())
    }

    /// Whether a bridge was installed in this process.
    pub fn is_installed() -> bool {
        INSTALL_RESULT.get().copied().unwrap_or(false)
    }

    fn metadata_for(record: &Record<'_>) -> Option<EventMetadata> {
        let mut meta = EventMetadata::new();
        if let Some(module) = record.module_path() {
            meta.insert("module".into(), module.into());
        }
        if let Some(line) = record.line() {
            meta.insert("line".into(), line.into());
        }
        (!meta.is_empty()).then_some(meta)
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        !is_own_target(metadata.target())
            && self.logger.is_enabled_for(Level::from(metadata.level()))
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Bypasses the scope tracker: records from other crates must not
        // consume a transient scope set for a direct call.
        self.logger.log_scoped(
            Level::from(record.level()),
            Some(record.target().to_owned()),
            record.args().to_string(),
            Self::metadata_for(record),
        );
    }

    fn flush(&self) {}
}
