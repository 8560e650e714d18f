//! Log event representation.
//!
//! A [`LogEvent`] is built once per call by the logger and is immutable
//! afterwards, with two exceptions: the remote channel attaches its
//! application key, and the first time an event is buffered it receives a
//! wall-clock timestamp plus a monotonic sub-second sequence value. Events
//! delivered live never carry either, which lets the collector tell live and
//! replayed events apart.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::level::Level;

/// Structured key-value pairs attached to an event.
pub type Metadata = Map<String, Value>;

/// Metadata key carrying an explicit per-call scope.
pub const SCOPE_KEY: &str = "scope";

static MONOTONIC_ANCHOR: Lazy<Instant> = Lazy::new(Instant::now);

/// Sub-second part of a process-wide monotonic clock, in nanoseconds.
fn sequence_nanos() -> u32 {
    MONOTONIC_ANCHOR.elapsed().subsec_nanos()
}

/// Convert a JSON object into [`Metadata`].
///
/// Returns `None` for anything that is not an object.
///
/// ```
/// use serde_json::json;
///
/// let meta = logtowa::meta(json!({ "rows": 3 })).expect("object");
/// assert_eq!(meta["rows"], 3);
/// assert!(logtowa::meta(json!(42)).is_none());
/// ```
pub fn meta(value: Value) -> Option<Metadata> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Split an explicit scope out of call metadata.
///
/// The `scope` key is always removed; it only counts as a scope when it is
/// a string. Metadata left empty afterwards is dropped entirely.
pub fn split_scope(meta: Option<Metadata>) -> (Option<String>, Option<Metadata>) {
    let Some(mut meta) = meta else {
        return (None, None);
    };
    let scope = match meta.remove(SCOPE_KEY) {
        Some(Value::String(scope)) => Some(scope),
        _ => None,
    };
    let meta = (!meta.is_empty()).then_some(meta);
    (scope, meta)
}

/// Time information attached when an event enters the remote buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferStamp {
    /// Wall-clock instant of the first buffering.
    pub timestamp: DateTime<Utc>,
    /// Monotonic sub-second counter captured alongside `timestamp`.
    pub sequence_nanos: u32,
}

impl BufferStamp {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            sequence_nanos: sequence_nanos(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEvent {
    level: Level,
    scope: Option<String>,
    message: String,
    metadata: Option<Metadata>,
    app_key: Option<String>,
    stamp: Option<BufferStamp>,
}

impl LogEvent {
    /// Build an event. Empty metadata is stored as absent.
    pub fn new(
        level: Level,
        scope: Option<String>,
        message: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> Self {
        Self {
            level,
            scope,
            message: message.into(),
            metadata: metadata.filter(|m| !m.is_empty()),
            app_key: None,
            stamp: None,
        }
    }

    /// Attach the application key used for remote delivery.
    pub fn with_app_key(mut self, app_key: impl Into<String>) -> Self {
        self.app_key = Some(app_key.into());
        self
    }

    /// Record the first buffering of this event.
    ///
    /// Later calls keep the original stamp so a replayed event reports
    /// when it was first held back.
    pub fn stamp_buffered(&mut self) {
        if self.stamp.is_none() {
            self.stamp = Some(BufferStamp::now());
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn app_key(&self) -> Option<&str> {
        self.app_key.as_deref()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.stamp.map(|s| s.timestamp)
    }

    pub fn sequence_nanos(&self) -> Option<u32> {
        self.stamp.map(|s| s.sequence_nanos)
    }

    /// Whether the event has passed through the remote buffer.
    pub fn was_buffered(&self) -> bool {
        self.stamp.is_some()
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "[{scope}] {} - {}", self.level, self.message),
            None => write!(f, "{} - {}", self.level, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn empty_metadata_is_omitted() {
        let event = LogEvent::new(Level::Info, None, "hello", Some(Metadata::new()));
        assert!(event.metadata().is_none());
    }

    #[rstest]
    fn split_scope_extracts_string_scope() {
        let (scope, rest) = split_scope(meta(json!({ "scope": "db", "rows": 2 })));
        assert_eq!(scope.as_deref(), Some("db"));
        assert_eq!(rest, meta(json!({ "rows": 2 })));
    }

    #[rstest]
    fn split_scope_discards_non_string_scope() {
        let (scope, rest) = split_scope(meta(json!({ "scope": 7 })));
        assert_eq!(scope, None);
        assert_eq!(rest, None);
    }

    #[rstest]
    fn fresh_events_are_unstamped() {
        let event = LogEvent::new(Level::Warn, Some("api".into()), "slow", None);
        assert!(!event.was_buffered());
        assert_eq!(event.timestamp(), None);
        assert_eq!(event.sequence_nanos(), None);
        assert_eq!(event.app_key(), None);
    }

    #[rstest]
    fn stamping_is_one_time() {
        let mut event = LogEvent::new(Level::Info, None, "queued", None);
        event.stamp_buffered();
        let first = (event.timestamp(), event.sequence_nanos());
        event.stamp_buffered();
        assert!(event.was_buffered());
        assert_eq!((event.timestamp(), event.sequence_nanos()), first);
    }

    #[rstest]
    #[case(Some("db"), "[db] error - boom")]
    #[case(None, "error - boom")]
    fn display_includes_scope(#[case] scope: Option<&str>, #[case] expected: &str) {
        let event = LogEvent::new(Level::Error, scope.map(str::to_owned), "boom", None);
        assert_eq!(event.to_string(), expected);
    }
}
