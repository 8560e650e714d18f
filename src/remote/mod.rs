//! Remote delivery channel.
//!
//! [`RemoteChannel`] forwards events to a collector through a
//! [`Connector`](crate::connector::Connector). It tracks the link's
//! lifecycle from the connector's notifications, holds events back in a
//! bounded FIFO buffer while the link is unusable, and drains that buffer in
//! order whenever the link reports connected again.
//!
//! State and buffer live behind a single lock, so notification handlers and
//! `log` calls never interleave and at most one drain runs at a time. While
//! anything is buffered, new events join the back of the buffer instead of
//! being sent directly; this keeps delivery order total even when a drain
//! stopped early.

mod link;


use std::{any::Any, sync::Arc, time::Duration};

use crate::{
    channel::{Channel, Delivery},
    config::CloudConfig,
    connector::{ConnectionListener, ConnectionNotifier, Connector},
    error::ChannelError,
    event::LogEvent,
    filter::LevelFilter,
    level::Level,
    rate_limited_warner::DEFAULT_WARN_INTERVAL,
};

use link::Link;

/// Lifecycle of the remote link as last reported by the connector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial state; nothing is sent or drained.
    Connecting,
    /// The link is open; buffered events are drained on entry.
    Connected,
    /// The link closed; events are buffered until it reopens.
    Disconnected,
    /// The connector reported an error. A later connect notification still
    /// moves the channel back to [`ConnectionState::Connected`].
    Failed(String),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// Runtime settings for a [`RemoteChannel`].
#[derive(Clone, Debug)]
pub struct RemoteSettings {
    /// Channel threshold; `None` allows every level.
    pub level: Option<Level>,
    /// Application key attached to every event sent by this channel.
    pub app_key: String,
    /// Maximum number of buffered events.
    pub capacity: usize,
    /// Minimum interval between dropped-event warnings.
    pub warn_interval: Duration,
}

impl RemoteSettings {
    pub fn new(app_key: impl Into<String>) -> Self {
        Self {
            level: None,
            app_key: app_key.into(),
            capacity: usize::MAX,
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }

    pub fn with_level(mut self, level: Option<Level>) -> Self {
        self.level = level;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_warn_interval(mut self, interval: Duration) -> Self {
        self.warn_interval = interval;
        self
    }

    /// Settings taken from the cloud channel options.
    pub fn from_cloud(cloud: &CloudConfig) -> Self {
        Self::new(cloud.app_key.as_str())
            .with_level(cloud.level)
            .with_capacity(cloud.buffer_capacity())
            .with_warn_interval(cloud.warn_interval())
    }
}

/// Channel delivering events to a remote collector.
pub struct RemoteChannel {
    link: Arc<Link>,
    filter: LevelFilter,
    app_key: String,
}

impl RemoteChannel {
    /// Create the channel and ask `connector` to start connecting.
    ///
    /// The channel starts in [`ConnectionState::Connecting`].
    pub fn new(settings: RemoteSettings, connector: Arc<dyn Connector>) -> Self {
        let link = Arc::new(Link::new(
            settings.capacity,
            settings.warn_interval,
            Arc::clone(&connector),
        ));
        let listener: Arc<dyn ConnectionListener> = link.clone();
        connector.connect(ConnectionNotifier::new(Arc::downgrade(&listener)));
        Self {
            link,
            filter: LevelFilter::new(settings.level),
            app_key: settings.app_key,
        }
    }

    /// Deliver `event`, buffering it when the link is unusable.
    ///
    /// Returns [`ChannelError::QueueOverflow`] when the event had to be
    /// buffered but the buffer is full; the event is then lost.
    pub fn log(&self, event: LogEvent) -> Result<Delivery, ChannelError> {
        if !self.filter.should_log(event.level()) {
            return Ok(Delivery::Filtered);
        }
        self.link.submit(event.with_app_key(self.app_key.as_str()))
    }

    pub fn state(&self) -> ConnectionState {
        self.link.connection_state()
    }

    /// Reason given by the most recent connector error, if any.
    pub fn last_error(&self) -> Option<String> {
        self.link.last_error()
    }

    /// Number of events currently buffered.
    pub fn buffered(&self) -> usize {
        self.link.buffered()
    }

    /// Snapshot of the buffered events, oldest first.
    pub fn buffered_events(&self) -> Vec<LogEvent> {
        self.link.buffered_events()
    }

    /// Number of events lost to overflow or permanent rejection.
    pub fn dropped(&self) -> u64 {
        self.link.dropped()
    }

    pub fn capacity(&self) -> usize {
        self.link.capacity()
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    pub fn level(&self) -> Option<Level> {
        self.filter.minimum()
    }
}

impl Channel for RemoteChannel {
    fn name(&self) -> &str {
        "cloud"
    }

    fn log(&self, event: &LogEvent) -> Result<Delivery, ChannelError> {
        RemoteChannel::log(self, event.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for RemoteChannel {
    fn drop(&mut self) {
        self.link.close();
    }
}

impl std::fmt::Debug for RemoteChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteChannel")
            .field("app_key", &self.app_key)
            .field("level", &self.filter.minimum())
            .field("state", &self.state())
            .field("buffered", &self.buffered())
            .finish()
    }
}
