//! Transport seam used by the remote channel.
//!
//! A [`Connector`] owns the link to the collector: it connects, reconnects
//! on its own schedule, and reports lifecycle changes through the
//! [`ConnectionNotifier`] it receives in [`Connector::connect`]. The remote
//! channel only reacts to those notifications and to the result of each
//! [`Connector::send`].

use std::sync::Weak;

use crate::{error::SendError, event::LogEvent};

/// Receiver of link lifecycle notifications.
pub trait ConnectionListener: Send + Sync {
    fn on_connect(&self);
    fn on_disconnect(&self);
    fn on_error(&self, reason: &str);
}

/// Handle a connector uses to report lifecycle changes.
///
/// Holds a weak reference, so notifications arriving after the channel is
/// gone are ignored.
#[derive(Clone)]
pub struct ConnectionNotifier {
    listener: Weak<dyn ConnectionListener>,
}

impl ConnectionNotifier {
    pub fn new(listener: Weak<dyn ConnectionListener>) -> Self {
        Self { listener }
    }

    /// Report that the link is open.
    pub fn connected(&self) {
        if let Some(listener) = self.listener.upgrade() {
            listener.on_connect();
        }
    }

    /// Report that the link closed.
    pub fn disconnected(&self) {
        if let Some(listener) = self.listener.upgrade() {
            listener.on_disconnect();
        }
    }

    /// Report a connection error.
    pub fn error(&self, reason: impl AsRef<str>) {
        if let Some(listener) = self.listener.upgrade() {
            listener.on_error(reason.as_ref());
        }
    }

    /// Whether the receiving channel still exists.
    pub fn is_attached(&self) -> bool {
        self.listener.strong_count() > 0
    }
}

impl std::fmt::Debug for ConnectionNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionNotifier")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Transport collaborator for the remote channel.
///
/// `send` must not block on acknowledgement from the collector and must not
/// call back into the notifier on the calling thread: the channel holds its
/// state lock while sending. A local write may still block for a bounded
/// time (the [`TcpConnector`](crate::TcpConnector) waits up to its write
/// timeout), and concurrent `log` calls on the same channel wait for it, so
/// implementations should keep that bound short.
pub trait Connector: Send + Sync {
    /// Start connecting. Lifecycle changes are reported through `notifier`.
    fn connect(&self, notifier: ConnectionNotifier);

    /// Attempt to transmit one event over the current link.
    fn send(&self, event: &LogEvent) -> Result<(), SendError>;

    /// Tear down the link. Called when the owning channel is dropped.
    fn close(&self) {}
}
