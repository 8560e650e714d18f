//! Error types shared across the crate.

use std::io;

use thiserror::Error;

/// Failure reported by a channel's `log` call.
///
/// Filtering is not an error; channels report it as
/// [`Delivery::Filtered`](crate::channel::Delivery::Filtered).
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The buffer was full when the event had to be held back. The event is
    /// lost.
    #[error("buffer reached its capacity of {capacity} events; event dropped")]
    QueueOverflow { capacity: usize },
    /// The connector refused the event permanently. The event is lost.
    #[error("connector rejected event: {reason}")]
    Rejected { reason: String },
}

/// Failure reported by [`Connector::send`](crate::connector::Connector::send).
#[derive(Debug, Error)]
pub enum SendError {
    /// No writable link at the moment of sending.
    #[error("link is not open")]
    NotConnected,
    /// The link broke while writing.
    #[error("link write failed: {0}")]
    Io(#[from] io::Error),
    /// The event can never be sent, e.g. it exceeds the frame limit.
    #[error("{0}")]
    Rejected(String),
}

impl SendError {
    /// Transient failures are absorbed by buffering the event for a later
    /// drain; permanent ones drop it.
    pub fn is_transient(&self) -> bool {
        !matches!(self, SendError::Rejected(_))
    }
}

/// Errors that may occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid user supplied configuration.
    #[error("invalid logger configuration: {0}")]
    InvalidConfig(String),
    /// Configuration text was not valid JSON for the expected shape.
    #[error("failed to parse logger configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// Underlying I/O error whilst reading configuration.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SendError::NotConnected, true)]
    #[case(SendError::Io(io::Error::from(io::ErrorKind::BrokenPipe)), true)]
    #[case(SendError::Rejected("frame too large".into()), false)]
    fn classifies_transient_failures(#[case] err: SendError, #[case] transient: bool) {
        assert_eq!(err.is_transient(), transient);
    }

    #[rstest]
    fn overflow_message_names_capacity() {
        let err = ChannelError::QueueOverflow { capacity: 2 };
        assert!(err.to_string().contains("capacity of 2"));
    }
}
