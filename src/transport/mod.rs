//! Socket transport for the remote channel.
//!
//! [`TcpConnector`] implements [`Connector`](crate::connector::Connector)
//! over TCP, TLS or Unix domain sockets. Events are serialised into
//! MessagePack maps and written as length-prefixed frames. A worker thread
//! maintains the connection, authenticates after every connect, and
//! reconnects using jittered exponential backoff.

pub(crate) mod backoff;
mod config;
mod connector;
mod serialise;
mod stream;


pub use backoff::BackoffPolicy;
pub use config::TransportConfig;
pub use connector::TcpConnector;
