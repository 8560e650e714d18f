//! Benchmarks for the dispatch path: filtering, console rendering, and
//! remote buffering.

use std::{io, sync::Arc};

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use logtowa::{
    ConnectionNotifier, ConnectionState, Connector, ConsoleChannel, DefaultFormatter, Level,
    LogEvent, Logger, RemoteChannel, RemoteSettings, SendError, meta, test_utils::MockConnector,
};
use serde_json::json;

/// Connector that accepts everything and keeps nothing.
struct NullConnector;

impl Connector for NullConnector {
    fn connect(&self, notifier: ConnectionNotifier) {
        notifier.connected();
    }

    fn send(&self, _event: &LogEvent) -> Result<(), SendError> {
        Ok(())
    }
}

fn console_logger() -> Logger {
    let logger = Logger::with_level(Some(Level::Info));
    logger.add_channel(ConsoleChannel::new(None, io::sink(), DefaultFormatter::default()));
    logger
}

fn bench_filtered(c: &mut Criterion) {
    let logger = console_logger();
    c.bench_function("dispatch_filtered_out", |b| {
        b.iter(|| black_box(logger.debug(black_box("ignored"), None)));
    });
}

fn bench_console(c: &mut Criterion) {
    let logger = console_logger();
    logger.set_scope("bench");
    c.bench_function("dispatch_console", |b| {
        b.iter(|| {
            black_box(logger.info(
                black_box("request served"),
                meta(json!({ "status": 200, "ms": 12 })),
            ))
        });
    });
}

fn bench_remote(c: &mut Criterion) {
    let mut group = c.benchmark_group("remote");
    group.bench_function("send_connected", |b| {
        let channel = RemoteChannel::new(RemoteSettings::new("bench"), Arc::new(NullConnector));
        assert_eq!(channel.state(), ConnectionState::Connected);
        let logger = Logger::with_level(None);
        logger.add_channel(channel);
        b.iter(|| black_box(logger.info("live", None)));
    });
    group.bench_function("buffer_then_drain_100", |b| {
        b.iter_batched(
            || {
                let connector = Arc::new(MockConnector::new());
                let channel =
                    RemoteChannel::new(RemoteSettings::new("bench"), connector.clone());
                (connector, channel)
            },
            |(connector, channel)| {
                for i in 0..100 {
                    let event = LogEvent::new(Level::Info, None, format!("e{i}"), None);
                    let _ = channel.log(event);
                }
                connector.open();
                black_box(channel.buffered())
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_filtered, bench_console, bench_remote);
criterion_main!(benches);
