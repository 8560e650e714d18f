//! Socket primitives for the TCP connector.

use std::{
    io::{self, Write},
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    path::Path,
    time::Duration,
};

use native_tls::{TlsConnector, TlsStream};

#[cfg(unix)]
use std::os::unix::net::UnixStream;

use crate::config::Endpoint;

/// TLS connection options.
#[derive(Clone, Debug)]
pub struct TlsOptions {
    /// Domain name presented during the TLS handshake.
    pub domain: String,
    /// Skip certificate validation when true (intended for tests).
    pub insecure_skip_verify: bool,
}

impl TlsOptions {
    fn connector(&self) -> io::Result<TlsConnector> {
        let mut builder = TlsConnector::builder();
        if self.insecure_skip_verify {
            builder.danger_accept_invalid_certs(true);
            builder.danger_accept_invalid_hostnames(true);
        }
        builder.build().map_err(io::Error::other)
    }
}

/// Open socket to the collector.
pub enum ActiveConnection {
    PlainTcp(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl ActiveConnection {
    /// Update the write timeout for the underlying socket.
    pub fn set_write_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        match self {
            ActiveConnection::PlainTcp(stream) => stream.set_write_timeout(Some(timeout)),
            ActiveConnection::Tls(stream) => stream.get_ref().set_write_timeout(Some(timeout)),
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => stream.set_write_timeout(Some(timeout)),
        }
    }

    /// Write a full frame and flush it.
    pub fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        match self {
            ActiveConnection::PlainTcp(stream) => write_and_flush(stream, frame),
            ActiveConnection::Tls(stream) => write_and_flush(stream.as_mut(), frame),
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => write_and_flush(stream, frame),
        }
    }
}

fn write_and_flush(writer: &mut impl Write, frame: &[u8]) -> io::Result<()> {
    writer.write_all(frame)?;
    writer.flush()
}

fn socket_addrs(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    (host, port).to_socket_addrs().map(|iter| iter.collect())
}

fn connect_tcp(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in socket_addrs(host, port)? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses resolved for {host}:{port}"),
        )
    }))
}

fn connect_tls(stream: TcpStream, tls: &TlsOptions, timeout: Duration) -> io::Result<ActiveConnection> {
    let connector = tls.connector()?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    let stream = connector
        .connect(&tls.domain, stream)
        .map_err(io::Error::other)?;
    let tcp_ref = stream.get_ref();
    tcp_ref.set_read_timeout(None)?;
    tcp_ref.set_write_timeout(None)?;
    Ok(ActiveConnection::Tls(Box::new(stream)))
}

#[cfg(unix)]
fn connect_unix(path: &Path) -> io::Result<ActiveConnection> {
    UnixStream::connect(path).map(ActiveConnection::Unix)
}

#[cfg(not(unix))]
fn connect_unix(_path: &Path) -> io::Result<ActiveConnection> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "unix domain sockets are not supported on this platform",
    ))
}

/// Establish a socket connection to `endpoint`.
pub fn connect_endpoint(
    endpoint: &Endpoint,
    tls_insecure: bool,
    connect_timeout: Duration,
) -> io::Result<ActiveConnection> {
    match endpoint {
        Endpoint::Tcp { host, port, tls } => {
            let stream = connect_tcp(host, *port, connect_timeout)?;
            if *tls {
                let options = TlsOptions {
                    domain: host.clone(),
                    insecure_skip_verify: tls_insecure,
                };
                connect_tls(stream, &options, connect_timeout)
            } else {
                Ok(ActiveConnection::PlainTcp(stream))
            }
        }
        Endpoint::Unix { path } => connect_unix(path),
    }
}
