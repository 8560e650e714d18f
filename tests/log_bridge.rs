//! Installing the `log` bridge as the process-wide logger.
#![cfg(feature = "log-compat")]

use std::sync::Arc;

use logtowa::{ConsoleChannel, DefaultFormatter, Level, LogBridge, Logger, test_utils::SharedBuf};
use rstest::rstest;

#[rstest]
fn forwards_log_macros_into_the_logger() {
    let buf = SharedBuf::new();
    let logger = Arc::new(Logger::with_level(Some(Level::Info)));
    logger.add_channel(ConsoleChannel::new(None, buf.clone(), DefaultFormatter::plain()));

    LogBridge::install(Arc::clone(&logger), log::LevelFilter::Trace).expect("first install");
    assert!(LogBridge::is_installed());

    log::warn!(target: "payments", "card {} declined", 42);
    log::debug!(target: "payments", "below the logger threshold");
    log::error!(target: "logtowa::remote", "internal diagnostic");

    let lines = buf.lines();
    assert_eq!(lines[0], "[payments] › warn        card 42 declined");
    assert!(buf.text().contains("\"module\""));
    assert!(!buf.text().contains("threshold"));
    assert!(!buf.text().contains("internal diagnostic"));

    let again = Arc::new(Logger::with_level(None));
    assert!(LogBridge::install(again, log::LevelFilter::Info).is_err());
}
