//! Shared link state: connection lifecycle, buffer, and drain.

use std::{sync::Arc, time::Duration};

use log::{debug, error, info, warn};
use parking_lot::Mutex;

use crate::{
    channel::Delivery,
    connector::{ConnectionListener, Connector},
    error::{ChannelError, SendError},
    event::LogEvent,
    queue::BoundedQueue,
    rate_limited_warner::RateLimitedWarner,
};

use super::ConnectionState;

struct LinkState {
    connection: ConnectionState,
    queue: BoundedQueue<LogEvent>,
    last_error: Option<String>,
}

/// Counts gathered by one drain cycle.
#[derive(Debug, Default, PartialEq, Eq)]
struct DrainReport {
    delivered: usize,
    rejected: usize,
    remaining: usize,
}

pub(super) struct Link {
    state: Mutex<LinkState>,
    connector: Arc<dyn Connector>,
    warner: RateLimitedWarner,
}

impl Link {
    pub(super) fn new(
        capacity: usize,
        warn_interval: Duration,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            state: Mutex::new(LinkState {
                connection: ConnectionState::Connecting,
                queue: BoundedQueue::new(capacity),
                last_error: None,
            }),
            connector,
            warner: RateLimitedWarner::new(warn_interval),
        }
    }

    /// Send `event` directly when possible, otherwise buffer it.
    pub(super) fn submit(&self, mut event: LogEvent) -> Result<Delivery, ChannelError> {
        let mut state = self.state.lock();
        if state.connection.is_connected() && state.queue.is_empty() {
            match self.connector.send(&event) {
                Ok(()) => return Ok(Delivery::Sent),
                Err(err) if err.is_transient() => {
                    debug!("remote link not writable ({err}); buffering event");
                }
                Err(err) => return Err(self.reject(err)),
            }
        }

        event.stamp_buffered();
        match state.queue.enqueue(event) {
            Ok(()) => Ok(Delivery::Buffered),
            Err(full) => {
                self.record_drop("buffer full");
                Err(ChannelError::QueueOverflow {
                    capacity: full.capacity,
                })
            }
        }
    }

    /// Deliver buffered events oldest first.
    ///
    /// Stops at the first transient failure and puts the failed event back
    /// at the front. Permanently rejected events are dropped and the drain
    /// continues.
    fn drain(&self, state: &mut LinkState) -> DrainReport {
        let mut report = DrainReport::default();
        while let Some(event) = state.queue.dequeue() {
            match self.connector.send(&event) {
                Ok(()) => report.delivered += 1,
                Err(err) if err.is_transient() => {
                    debug!("remote drain interrupted: {err}");
                    if let Err(full) = state.queue.requeue_front(event) {
                        self.record_drop("buffer full while requeueing");
                        debug!("lost event on requeue (capacity {})", full.capacity);
                    }
                    break;
                }
                Err(err) => {
                    self.reject(err);
                    report.rejected += 1;
                }
            }
        }
        report.remaining = state.queue.len();
        report
    }

    fn reject(&self, err: SendError) -> ChannelError {
        self.record_drop("rejected by connector");
        ChannelError::Rejected {
            reason: err.to_string(),
        }
    }

    fn record_drop(&self, why: &str) {
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            warn!("remote channel dropped {count} events ({why})");
        });
    }

    pub(super) fn connection_state(&self) -> ConnectionState {
        self.state.lock().connection.clone()
    }

    pub(super) fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    pub(super) fn buffered(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub(super) fn buffered_events(&self) -> Vec<LogEvent> {
        self.state.lock().queue.iter().cloned().collect()
    }

    pub(super) fn capacity(&self) -> usize {
        self.state.lock().queue.capacity()
    }

    pub(super) fn dropped(&self) -> u64 {
        self.warner.total_dropped()
    }

    pub(super) fn close(&self) {
        self.warner.flush(|count| {
            warn!("remote channel dropped {count} events before shutdown");
        });
        let buffered = self.buffered();
        if buffered > 0 {
            warn!("remote channel closing with {buffered} undelivered events");
        }
        self.connector.close();
    }
}

impl ConnectionListener for Link {
    fn on_connect(&self) {
        let mut state = self.state.lock();
        state.connection = ConnectionState::Connected;
        info!("remote channel connected");
        let report = self.drain(&mut state);
        if report.remaining > 0 {
            warn!(
                "remote drain delivered {} events; {} remain buffered",
                report.delivered, report.remaining
            );
        } else if report.delivered > 0 || report.rejected > 0 {
            debug!(
                "remote drain delivered {} events, rejected {}",
                report.delivered, report.rejected
            );
        }
    }

    fn on_disconnect(&self) {
        let mut state = self.state.lock();
        state.connection = ConnectionState::Disconnected;
        warn!("remote channel disconnected");
    }

    fn on_error(&self, reason: &str) {
        let mut state = self.state.lock();
        state.connection = ConnectionState::Failed(reason.to_owned());
        state.last_error = Some(reason.to_owned());
        error!("remote channel connection error: {reason}");
    }
}
