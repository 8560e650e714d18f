//! Buffering, ordering and overflow behaviour of the remote channel.

use std::sync::Arc;

use logtowa::{
    ChannelError, ConnectionState, Delivery, Level, LogEvent, RemoteChannel, RemoteSettings,
    test_utils::MockConnector,
};
use rstest::{fixture, rstest};

struct Remote {
    connector: Arc<MockConnector>,
    channel: RemoteChannel,
}

fn remote_with(settings: RemoteSettings) -> Remote {
    let connector = Arc::new(MockConnector::new());
    let channel = RemoteChannel::new(settings, connector.clone());
    Remote { connector, channel }
}

#[fixture]
fn disconnected() -> Remote {
    let remote = remote_with(RemoteSettings::new("app"));
    remote.connector.open();
    remote.connector.drop_link();
    assert_eq!(remote.channel.state(), ConnectionState::Disconnected);
    remote
}

fn event(message: &str) -> LogEvent {
    LogEvent::new(Level::Info, None, message, None)
}

fn buffered_messages(channel: &RemoteChannel) -> Vec<String> {
    channel
        .buffered_events()
        .iter()
        .map(|e| e.message().to_owned())
        .collect()
}

#[rstest]
fn buffered_events_drain_in_order(disconnected: Remote) {
    let Remote { connector, channel } = disconnected;
    for message in ["A", "B", "C"] {
        assert_eq!(channel.log(event(message)).expect("buffered"), Delivery::Buffered);
    }
    assert_eq!(buffered_messages(&channel), ["A", "B", "C"]);

    connector.open();

    assert_eq!(connector.sent_messages(), ["A", "B", "C"]);
    assert_eq!(channel.buffered(), 0);
    assert!(connector.sent().iter().all(LogEvent::was_buffered));
}

#[rstest]
fn capacity_two_rejects_the_third_event() {
    let Remote { channel, .. } = remote_with(RemoteSettings::new("app").with_capacity(2));
    channel.log(event("A")).expect("room for A");
    channel.log(event("B")).expect("room for B");
    let err = channel.log(event("C")).expect_err("buffer is full");
    assert!(matches!(err, ChannelError::QueueOverflow { capacity: 2 }));
    assert_eq!(buffered_messages(&channel), ["A", "B"]);
    assert_eq!(channel.dropped(), 1);
}

#[rstest]
fn failed_drain_keeps_remaining_events_in_order(disconnected: Remote) {
    let Remote { connector, channel } = disconnected;
    for message in ["A", "B", "C"] {
        channel.log(event(message)).expect("buffered");
    }
    connector.fail_after(1);
    connector.open();

    assert_eq!(connector.sent_messages(), ["A"]);
    assert_eq!(buffered_messages(&channel), ["B", "C"]);

    connector.fail_after(usize::MAX);
    connector.open();
    assert_eq!(connector.sent_messages(), ["A", "B", "C"]);
}

#[rstest]
fn error_notification_is_observable_and_recoverable() {
    let Remote { connector, channel } = remote_with(RemoteSettings::new("app"));
    connector.fail("auth refused");
    assert_eq!(
        channel.state(),
        ConnectionState::Failed("auth refused".into())
    );
    assert_eq!(channel.last_error().as_deref(), Some("auth refused"));
    channel.log(event("held")).expect("buffered while failed");

    connector.open();
    assert_eq!(channel.state(), ConnectionState::Connected);
    assert_eq!(connector.sent_messages(), ["held"]);
}

#[rstest]
fn app_key_is_attached_to_every_event() {
    let Remote { connector, channel } = remote_with(RemoteSettings::new("billing"));
    connector.open();
    channel.log(event("live")).expect("sent");
    assert_eq!(connector.sent()[0].app_key(), Some("billing"));
    assert!(!connector.sent()[0].was_buffered());
}
