//! Send/Sync guarantees for core types.

use logtowa::{
    ConsoleChannel, DefaultFormatter, LogEvent, Logger, LoggerConfig, RemoteChannel,
    SharedFormatter, TcpConnector,
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn configuration_is_send_sync() {
    assert_impl_all!(LoggerConfig: Send, Sync, Clone);
    assert_impl_all!(DefaultFormatter: Send, Sync);
    assert_impl_all!(SharedFormatter: Send, Sync);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(Logger: Send, Sync);
    assert_impl_all!(ConsoleChannel: Send, Sync);
    assert_impl_all!(RemoteChannel: Send, Sync);
    assert_impl_all!(TcpConnector: Send, Sync);
    assert_impl_all!(LogEvent: Send, Sync, Clone);
}
