//! Structured logging client with console and remote collector channels.
//!
//! A [`Logger`] filters each call against a global minimum [`Level`],
//! resolves the event's scope, and fans the resulting [`LogEvent`] out to
//! its channels:
//!
//! - [`ConsoleChannel`] renders events through an [`EventFormatter`] to
//!   stdout or any writer.
//! - [`RemoteChannel`] ships events to a collector through a [`Connector`],
//!   buffering them in order while the link is down and draining the buffer
//!   when it comes back. [`TcpConnector`] is the bundled socket transport.
//!
//! Internal diagnostics go through the `log` facade and stay silent unless
//! the application installs a logger.

mod channel;
pub mod config;
mod connector;
mod console;
mod error;
mod event;
mod filter;
mod formatter;
mod level;
#[cfg(feature = "log-compat")]
mod log_compat;
mod logger;
mod logging_macros;
mod queue;
mod rate_limited_warner;
mod remote;
mod scope;
#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;
mod transport;

pub use channel::{Channel, Delivery};
pub use config::{BackoffConfig, CloudConfig, ConsoleConfig, LoggerConfig, TimestampConfig};
pub use connector::{ConnectionListener, ConnectionNotifier, Connector};
pub use console::ConsoleChannel;
pub use error::{ChannelError, ConfigError, SendError};
pub use event::{BufferStamp, LogEvent, Metadata, meta, split_scope};
pub use filter::{LevelFilter, passes};
pub use formatter::{DEFAULT_TIMESTAMP_FORMAT, DefaultFormatter, EventFormatter, SharedFormatter};
pub use level::{Level, ParseLevelError};
#[cfg(feature = "log-compat")]
pub use log_compat::LogBridge;
pub use logger::{ChannelOutcome, DispatchReport, Logger};
pub use queue::{BoundedQueue, QueueFull};
pub use rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner};
pub use remote::{ConnectionState, RemoteChannel, RemoteSettings};
pub use scope::ScopeTracker;
pub use transport::{BackoffPolicy, TcpConnector, TransportConfig};
