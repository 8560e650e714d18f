//! Scriptable [`Connector`] for exercising the remote channel.

use parking_lot::Mutex;

use crate::{
    connector::{ConnectionNotifier, Connector},
    error::SendError,
    event::LogEvent,
};

#[derive(Default)]
struct MockState {
    notifier: Option<ConnectionNotifier>,
    writable: bool,
    successes_left: Option<usize>,
    reject_message: Option<String>,
    sent: Vec<LogEvent>,
    attempts: usize,
    connect_calls: usize,
    closed: bool,
}

/// Connector recording every event it is asked to send.
///
/// Lifecycle notifications are fired by the test through
/// [`open`](MockConnector::open), [`drop_link`](MockConnector::drop_link)
/// and [`fail`](MockConnector::fail). The notifier is always invoked with
/// the mock's own lock released, because the channel calls back into
/// [`Connector::send`] while draining.
#[derive(Default)]
pub struct MockConnector {
    state: Mutex<MockState>,
}

impl MockConnector {
    /// Create a connector whose link is not yet writable.
    pub fn new() -> Self {
        Self::default()
    }

    fn notifier(&self) -> Option<ConnectionNotifier> {
        self.state.lock().notifier.clone()
    }

    /// Make the link writable and fire a connect notification.
    pub fn open(&self) {
        self.state.lock().writable = true;
        if let Some(notifier) = self.notifier() {
            notifier.connected();
        }
    }

    /// Make the link unwritable and fire a disconnect notification.
    pub fn drop_link(&self) {
        self.state.lock().writable = false;
        if let Some(notifier) = self.notifier() {
            notifier.disconnected();
        }
    }

    /// Make the link unwritable and fire an error notification.
    pub fn fail(&self, reason: &str) {
        self.state.lock().writable = false;
        if let Some(notifier) = self.notifier() {
            notifier.error(reason);
        }
    }

    /// Change writability without notifying, simulating a link that closed
    /// before the connector noticed.
    pub fn set_writable(&self, writable: bool) {
        self.state.lock().writable = writable;
    }

    /// Allow `count` more successful sends, then report the link as closed.
    pub fn fail_after(&self, count: usize) {
        self.state.lock().successes_left = Some(count);
    }

    /// Permanently reject events whose message equals `message`.
    pub fn reject_message(&self, message: &str) {
        self.state.lock().reject_message = Some(message.to_owned());
    }

    /// Events accepted so far, in send order.
    pub fn sent(&self) -> Vec<LogEvent> {
        self.state.lock().sent.clone()
    }

    /// Messages of the events accepted so far, in send order.
    pub fn sent_messages(&self) -> Vec<String> {
        self.state
            .lock()
            .sent
            .iter()
            .map(|e| e.message().to_owned())
            .collect()
    }

    /// Number of send attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.state.lock().attempts
    }

    pub fn connect_calls(&self) -> usize {
        self.state.lock().connect_calls
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl Connector for MockConnector {
    fn connect(&self, notifier: ConnectionNotifier) {
        let mut state = self.state.lock();
        state.notifier = Some(notifier);
        state.connect_calls += 1;
    }

    fn send(&self, event: &LogEvent) -> Result<(), SendError> {
        let mut state = self.state.lock();
        state.attempts += 1;
        if state.reject_message.as_deref() == Some(event.message()) {
            return Err(SendError::Rejected("event refused by collector".into()));
        }
        if !state.writable {
            return Err(SendError::NotConnected);
        }
        if let Some(left) = state.successes_left.as_mut() {
            if *left == 0 {
                state.writable = false;
                return Err(SendError::NotConnected);
            }
            *left -= 1;
        }
        state.sent.push(event.clone());
        Ok(())
    }

    fn close(&self) {
        self.state.lock().closed = true;
    }
}
