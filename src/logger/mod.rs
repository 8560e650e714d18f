//! Event dispatcher.
//!
//! [`Logger`] resolves the scope for each call, applies the global severity
//! threshold, builds one [`LogEvent`] and hands it to every registered
//! channel. Channels are isolated from each other: a failing channel is
//! reported in the returned [`DispatchReport`] and never stops delivery to
//! the rest.
//!
//! ```
//! use logtowa::{ConsoleChannel, DefaultFormatter, Level, Logger, meta};
//! use serde_json::json;
//!
//! let logger = Logger::with_level(Some(Level::Info));
//! logger.add_channel(ConsoleChannel::new(
//!     None,
//!     std::io::sink(),
//!     DefaultFormatter::plain(),
//! ));
//!
//! logger.set_scope("checkout");
//! logger.info("order placed", meta(json!({ "order": 42 })));
//! logger.with_scope("payments").warn("card declined", None);
//! assert!(logger.debug("filtered out", None).is_none());
//! ```

mod report;

#[cfg(test)]
mod tests;

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
};

use log::warn;
use parking_lot::{Mutex, RwLock};

use crate::{
    channel::Channel,
    config::LoggerConfig,
    connector::Connector,
    console::ConsoleChannel,
    error::ConfigError,
    event::{LogEvent, Metadata, split_scope},
    filter,
    level::Level,
    rate_limited_warner::RateLimitedWarner,
    remote::{ConnectionState, RemoteChannel, RemoteSettings},
    scope::ScopeTracker,
    transport::{TcpConnector, TransportConfig},
};

pub use report::{ChannelOutcome, DispatchReport};

/// Stored in place of an ordinal when no global minimum is set.
const NO_MINIMUM: u8 = u8::MAX;

fn encode_level(level: Option<Level>) -> u8 {
    level.map_or(NO_MINIMUM, u8::from)
}

fn decode_level(raw: u8) -> Option<Level> {
    Level::ALL.get(usize::from(raw)).copied()
}

/// Logger fanning events out to its channels.
pub struct Logger {
    level: AtomicU8,
    scope: Mutex<ScopeTracker>,
    channels: RwLock<Vec<Arc<dyn Channel>>>,
    failure_warner: RateLimitedWarner,
}

impl Default for Logger {
    fn default() -> Self {
        Self::with_level(None)
    }
}

impl Logger {
    /// Build a logger from configuration.
    ///
    /// The console channel writes to stdout; the cloud channel connects
    /// through a [`TcpConnector`]. Absent or disabled channels are not
    /// constructed.
    pub fn new(config: LoggerConfig) -> Result<Self, ConfigError> {
        let connector = match config.active_cloud() {
            Some(cloud) => Some(Arc::new(TcpConnector::new(TransportConfig::from_cloud(cloud)?))
                as Arc<dyn Connector>),
            None => None,
        };
        Self::assemble(&config, io::stdout(), connector)
    }

    /// Build a logger from configuration, using `connector` for the cloud
    /// channel and `writer` for the console.
    pub fn with_connector<W>(
        config: &LoggerConfig,
        writer: W,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, ConfigError>
    where
        W: io::Write + Send + 'static,
    {
        Self::assemble(config, writer, Some(connector))
    }

    fn assemble<W>(
        config: &LoggerConfig,
        writer: W,
        connector: Option<Arc<dyn Connector>>,
    ) -> Result<Self, ConfigError>
    where
        W: io::Write + Send + 'static,
    {
        config.validate()?;
        let logger = Self::with_level(config.level);
        if let Some(console) = config.active_console() {
            logger.add_channel(ConsoleChannel::new(
                console.level,
                writer,
                console.formatter(),
            ));
        }
        if let (Some(cloud), Some(connector)) = (config.active_cloud(), connector) {
            logger.add_channel(RemoteChannel::new(
                RemoteSettings::from_cloud(cloud),
                connector,
            ));
        }
        Ok(logger)
    }

    /// Create a logger with no channels.
    pub fn with_level(level: Option<Level>) -> Self {
        Self {
            level: AtomicU8::new(encode_level(level)),
            scope: Mutex::new(ScopeTracker::new()),
            channels: RwLock::new(Vec::new()),
            failure_warner: RateLimitedWarner::default(),
        }
    }

    /// Register a channel. Channels receive events in registration order.
    pub fn add_channel(&self, channel: impl Channel + 'static) {
        self.add_shared_channel(Arc::new(channel));
    }

    pub fn add_shared_channel(&self, channel: Arc<dyn Channel>) {
        self.channels.write().push(channel);
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.channels
            .read()
            .iter()
            .map(|c| c.name().to_owned())
            .collect()
    }

    /// Update the global minimum level. `None` allows every level.
    pub fn set_level(&self, level: Option<Level>) {
        self.level.store(encode_level(level), Ordering::Relaxed);
    }

    pub fn level(&self) -> Option<Level> {
        decode_level(self.level.load(Ordering::Relaxed))
    }

    /// Whether an event at `level` passes the global threshold.
    pub fn is_enabled_for(&self, level: Level) -> bool {
        filter::passes(level, self.level())
    }

    /// Set the scope used by every call without a more specific one.
    pub fn set_scope(&self, scope: impl Into<String>) {
        self.scope.lock().set_scope(scope);
    }

    pub fn clear_scope(&self) {
        self.scope.lock().clear_scope();
    }

    /// Scope only the next log call.
    ///
    /// The transient scope is consumed by whichever call resolves a scope
    /// next, so chain the call directly when sharing a logger across
    /// threads.
    pub fn with_scope(&self, scope: impl Into<String>) -> &Self {
        self.scope.lock().with_scope(scope);
        self
    }

    /// Current persistent scope.
    pub fn scope(&self) -> Option<String> {
        self.scope.lock().persistent().map(str::to_owned)
    }

    /// Log `message` at `level`.
    ///
    /// A string `scope` entry in `meta` overrides the tracked scopes and is
    /// removed from the metadata. Returns `None` when the global threshold
    /// filters the event; the transient scope is consumed either way.
    pub fn log(
        &self,
        level: Level,
        message: impl Into<String>,
        meta: Option<Metadata>,
    ) -> Option<DispatchReport> {
        let (explicit, meta) = split_scope(meta);
        let scope = self.scope.lock().resolve(explicit);
        self.log_scoped(level, scope, message, meta)
    }

    /// Log with an already resolved scope, leaving the tracker untouched.
    pub(crate) fn log_scoped(
        &self,
        level: Level,
        scope: Option<String>,
        message: impl Into<String>,
        meta: Option<Metadata>,
    ) -> Option<DispatchReport> {
        if !self.is_enabled_for(level) {
            return None;
        }
        let event = LogEvent::new(level, scope, message, meta);
        Some(self.dispatch(&event))
    }

    /// Hand a prepared event to every channel, skipping the global filter.
    pub fn dispatch(&self, event: &LogEvent) -> DispatchReport {
        let channels = self.channels.read().clone();
        let mut report = DispatchReport::default();
        for channel in &channels {
            let result = channel.log(event);
            if let Err(err) = &result {
                self.failure_warner.record_drop();
                self.failure_warner.warn_if_due(|count| {
                    warn!(
                        "{} channel failed ({err}); {count} deliveries failed in the last interval",
                        channel.name()
                    );
                });
            }
            report.push(channel.name(), result);
        }
        report
    }

    /// Run `f` against the first channel of type `T`.
    pub fn inspect<T, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R>
    where
        T: Channel + 'static,
    {
        let channels = self.channels.read();
        channels
            .iter()
            .find_map(|c| c.as_any().downcast_ref::<T>())
            .map(f)
    }

    /// State of the cloud channel's link, if one is registered.
    pub fn remote_state(&self) -> Option<ConnectionState> {
        self.inspect(RemoteChannel::state)
    }

    /// Events lost by the cloud channel, if one is registered.
    pub fn remote_dropped(&self) -> Option<u64> {
        self.inspect(RemoteChannel::dropped)
    }
}

macro_rules! level_methods {
    ($($(#[$doc:meta])* $name:ident => $level:ident),+ $(,)?) => {
        impl Logger {
            $(
                $(#[$doc])*
                pub fn $name(
                    &self,
                    message: impl Into<String>,
                    meta: Option<Metadata>,
                ) -> Option<DispatchReport> {
                    self.log(Level::$level, message, meta)
                }
            )+
        }
    };
}

level_methods! {
    error => Error,
    warn => Warn,
    info => Info,
    success => Success,
    http => Http,
    /// Log database activity.
    db => Db,
    verbose => Verbose,
    debug => Debug,
    /// Lowest severity.
    silly => Silly,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("scope", &self.scope())
            .field("channels", &self.channel_names())
            .finish()
    }
}
