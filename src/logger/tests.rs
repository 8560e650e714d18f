//! Unit tests for the dispatcher.

use std::{
    any::Any,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::{
    channel::Delivery,
    config::{CloudConfig, ConsoleConfig},
    error::ChannelError,
    event::meta,
    formatter::DefaultFormatter,
    test_utils::{MockConnector, SharedBuf},
};

/// Channel that fails every call and counts them.
#[derive(Default)]
struct BrokenChannel {
    calls: AtomicUsize,
}

impl Channel for BrokenChannel {
    fn name(&self) -> &str {
        "broken"
    }

    fn log(&self, _event: &LogEvent) -> Result<Delivery, ChannelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ChannelError::Rejected {
            reason: "always".into(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Fixture {
    logger: Logger,
    console: SharedBuf,
}

#[fixture]
fn console_logger() -> Fixture {
    let console = SharedBuf::new();
    let logger = Logger::with_level(None);
    logger.add_channel(ConsoleChannel::new(
        None,
        console.clone(),
        DefaultFormatter::plain(),
    ));
    Fixture { logger, console }
}

#[rstest]
fn leveled_methods_use_their_level(console_logger: Fixture) {
    let Fixture { logger, console } = console_logger;
    logger.error("e", None);
    logger.warn("w", None);
    logger.info("i", None);
    logger.success("s", None);
    logger.http("h", None);
    logger.db("d", None);
    logger.verbose("v", None);
    logger.debug("g", None);
    logger.silly("y", None);

    let levels: Vec<String> = console
        .lines()
        .iter()
        .filter_map(|line| line.split_whitespace().next().map(str::to_owned))
        .collect();
    assert_eq!(
        levels,
        ["error", "warn", "info", "success", "http", "db", "verbose", "debug", "silly"]
    );
}

#[rstest]
fn global_filter_stops_dispatch(console_logger: Fixture) {
    let Fixture { logger, console } = console_logger;
    logger.set_level(Some(Level::Warn));
    assert!(logger.info("quiet", None).is_none());
    assert!(logger.error("loud", None).is_some());
    assert_eq!(console.lines(), ["error       loud"]);
}

#[rstest]
fn filtered_call_still_consumes_transient_scope(console_logger: Fixture) {
    let Fixture { logger, console } = console_logger;
    logger.set_level(Some(Level::Info));
    logger.with_scope("temp").debug("dropped", None);
    logger.info("next", None);
    assert_eq!(console.lines(), ["info        next"]);
}

#[rstest]
fn scope_precedence(console_logger: Fixture) {
    let Fixture { logger, console } = console_logger;
    logger.set_scope("app");
    logger.info("persistent", None);
    logger.with_scope("once").info("transient", None);
    logger
        .with_scope("once")
        .info("explicit", meta(json!({ "scope": "meta" })));
    logger.info("again", None);
    logger.clear_scope();
    logger.info("bare", None);

    assert_eq!(
        console.lines(),
        [
            "[app] › info        persistent",
            "[once] › info        transient",
            "[meta] › info        explicit",
            "[app] › info        again",
            "info        bare",
        ]
    );
}

#[rstest]
fn scope_key_is_removed_from_metadata() {
    let connector = Arc::new(MockConnector::new());
    let logger = Logger::with_level(None);
    logger.add_channel(RemoteChannel::new(RemoteSettings::new("k"), connector.clone()));
    connector.open();

    logger.info("tagged", meta(json!({ "scope": "db", "rows": 1 })));

    let sent = connector.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].scope(), Some("db"));
    assert_eq!(sent[0].metadata(), meta(json!({ "rows": 1 })).as_ref());
}

#[rstest]
fn failing_channel_does_not_block_siblings(console_logger: Fixture) {
    let Fixture { logger, console } = console_logger;
    let broken = Arc::new(BrokenChannel::default());
    logger.add_shared_channel(broken.clone());
    let trailing = SharedBuf::new();
    logger.add_channel(ConsoleChannel::new(None, trailing.clone(), DefaultFormatter::plain()));

    let report = logger.warn("still delivered", None).expect("passes filter");

    assert_eq!(broken.calls.load(Ordering::SeqCst), 1);
    assert_eq!(console.lines().len(), 1);
    assert_eq!(trailing.lines().len(), 1);
    assert!(!report.is_ok());
    let errors: Vec<_> = report.errors().map(|(name, _)| name).collect();
    assert_eq!(errors, ["broken"]);
    assert!(matches!(report.outcome("console"), Some(Ok(Delivery::Written))));
}

#[rstest]
fn overflow_is_reported_per_channel() {
    let connector = Arc::new(MockConnector::new());
    let logger = Logger::with_level(None);
    logger.add_channel(RemoteChannel::new(
        RemoteSettings::new("k").with_capacity(1),
        connector,
    ));

    let first = logger.info("a", None).expect("dispatched");
    assert!(matches!(first.outcome("cloud"), Some(Ok(Delivery::Buffered))));
    let second = logger.info("b", None).expect("dispatched");
    assert!(matches!(
        second.outcome("cloud"),
        Some(Err(ChannelError::QueueOverflow { capacity: 1 }))
    ));
    assert_eq!(logger.remote_dropped(), Some(1));
}

#[rstest]
fn builds_channels_from_config() {
    let connector = Arc::new(MockConnector::new());
    let console = SharedBuf::new();
    let config = LoggerConfig::new()
        .with_level(Level::Debug)
        .with_console(
            ConsoleConfig::new()
                .with_level(Level::Info)
                .with_timestamps(false)
                .with_colors(false),
        )
        .with_cloud(CloudConfig::new("localhost:7000", "t", "shop").with_level(Level::Warn));

    let logger =
        Logger::with_connector(&config, console.clone(), connector.clone()).expect("valid config");
    assert_eq!(logger.channel_names(), ["console", "cloud"]);
    assert_eq!(connector.connect_calls(), 1);
    assert_eq!(logger.remote_state(), Some(ConnectionState::Connecting));

    connector.open();
    logger.info("console only", None);
    logger.error("both", None);

    assert_eq!(console.lines(), ["info        console only", "error       both"]);
    assert_eq!(connector.sent_messages(), ["both"]);
    assert_eq!(connector.sent()[0].app_key(), Some("shop"));
}

#[rstest]
fn disabled_channels_are_not_constructed() {
    let connector = Arc::new(MockConnector::new());
    let config = LoggerConfig::new()
        .with_console(ConsoleConfig::new().with_enabled(false))
        .with_cloud(CloudConfig::new("localhost", "t", "k").with_enabled(false));

    let logger =
        Logger::with_connector(&config, SharedBuf::new(), connector.clone()).expect("valid");
    assert!(logger.channel_names().is_empty());
    assert_eq!(connector.connect_calls(), 0);
    assert!(logger.remote_state().is_none());
}

#[rstest]
fn invalid_config_is_rejected() {
    let config = LoggerConfig::new().with_cloud(CloudConfig::new("localhost", "t", ""));
    let err = Logger::new(config).expect_err("empty appKey");
    assert!(matches!(err, ConfigError::InvalidConfig(_)));
}

#[rstest]
fn console_with_unrenderable_timestamp_still_writes() {
    let console = SharedBuf::new();
    let logger = Logger::with_level(None);
    logger.add_channel(ConsoleChannel::new(
        None,
        console.clone(),
        DefaultFormatter::plain().with_timestamps(Some("%Q".into())),
    ));

    let report = logger.info("hello", None).expect("passes filter");
    assert!(report.is_ok());
    let lines = console.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("  info        hello"), "got {lines:?}");
}

#[rstest]
fn no_channels_is_a_valid_logger() {
    let logger = Logger::new(LoggerConfig::new()).expect("empty config");
    let report = logger.info("nowhere", None).expect("passes filter");
    assert!(report.outcomes().is_empty());
    assert!(report.is_ok());
}

#[rstest]
#[case(None)]
#[case(Some(Level::Silly))]
#[case(Some(Level::Error))]
fn level_round_trips_through_atomic(#[case] level: Option<Level>) {
    let logger = Logger::with_level(Some(Level::Info));
    logger.set_level(level);
    assert_eq!(logger.level(), level);
}
