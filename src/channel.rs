//! Delivery channels.
//!
//! A [`Channel`] is an independent sink with its own severity threshold.
//! The logger hands every event that passes its global filter to each
//! channel in turn; one channel failing never stops the others.

use std::any::Any;

use crate::{error::ChannelError, event::LogEvent};

/// Outcome of a successful channel `log` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Rejected by the channel's own threshold.
    Filtered,
    /// Rendered to a local sink.
    Written,
    /// Transmitted over a live link.
    Sent,
    /// Held in the buffer for a later drain.
    Buffered,
}

/// Trait implemented by all delivery channels.
///
/// Channels are `Send + Sync` so a logger can be shared across threads.
pub trait Channel: Send + Sync {
    /// Short name used in dispatch reports and diagnostics.
    fn name(&self) -> &str;

    /// Deliver `event`, applying the channel's own threshold first.
    fn log(&self, event: &LogEvent) -> Result<Delivery, ChannelError>;

    /// Allow downcasting to the concrete channel type.
    fn as_any(&self) -> &dyn Any;
}
