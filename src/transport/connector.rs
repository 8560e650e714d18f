//! Socket-backed [`Connector`] with a reconnecting worker thread.

use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Instant,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::{
    connector::{ConnectionNotifier, Connector},
    error::SendError,
    event::LogEvent,
};

use super::{
    backoff::BackoffState,
    config::TransportConfig,
    serialise::{frame_payload, serialise_auth, serialise_event},
    stream::{ActiveConnection, connect_endpoint},
};

/// Commands processed by the worker thread.
#[derive(Debug)]
enum LinkCommand {
    /// A write failed; the stream has already been discarded.
    Broken,
    Shutdown,
}

type SharedStream = Arc<Mutex<Option<ActiveConnection>>>;

/// Connector writing MessagePack frames to a TCP, TLS or Unix socket.
///
/// [`connect`](Connector::connect) spawns a worker that opens the socket,
/// authenticates, and reports the link through the notifier. `send` writes
/// on the caller's thread; when a write fails the stream is discarded and
/// the worker reports the disconnect and reconnects with jittered backoff.
/// The worker gives up once failures outlast the backoff deadline.
pub struct TcpConnector {
    config: Arc<TransportConfig>,
    stream: SharedStream,
    control: Mutex<Option<Sender<LinkCommand>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TcpConnector {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config: Arc::new(config),
            stream: Arc::new(Mutex::new(None)),
            control: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Whether a socket is currently open.
    pub fn is_open(&self) -> bool {
        self.stream.lock().is_some()
    }

    fn signal(&self, command: LinkCommand) {
        if let Some(tx) = self.control.lock().as_ref() {
            // The worker may already have exited.
            let _ = tx.send(command);
        }
    }

    fn encode(&self, event: &LogEvent) -> Result<Vec<u8>, SendError> {
        let payload = serialise_event(event)
            .map_err(|err| SendError::Rejected(format!("serialisation failed: {err}")))?;
        frame_payload(&payload, self.config.max_frame_size).ok_or_else(|| {
            SendError::Rejected(format!(
                "frame of {} bytes exceeds limit of {} bytes",
                payload.len(),
                self.config.max_frame_size
            ))
        })
    }
}

impl Connector for TcpConnector {
    fn connect(&self, notifier: ConnectionNotifier) {
        let mut handle = self.handle.lock();
        if handle.is_some() {
            warn!("connector already started; ignoring second connect");
            return;
        }
        let (tx, rx) = unbounded();
        *self.control.lock() = Some(tx);
        let config = Arc::clone(&self.config);
        let stream = Arc::clone(&self.stream);
        let spawned = thread::Builder::new()
            .name("logtowa-connector".into())
            .spawn(move || worker_loop(&config, &stream, &rx, &notifier));
        match spawned {
            Ok(join) => *handle = Some(join),
            Err(err) => {
                self.control.lock().take();
                warn!("failed to spawn connector worker: {err}");
            }
        }
    }

    fn send(&self, event: &LogEvent) -> Result<(), SendError> {
        let frame = self.encode(event)?;
        let mut guard = self.stream.lock();
        let Some(conn) = guard.as_mut() else {
            return Err(SendError::NotConnected);
        };
        match conn.write_frame(&frame) {
            Ok(()) => Ok(()),
            Err(err) => {
                guard.take();
                drop(guard);
                self.signal(LinkCommand::Broken);
                Err(SendError::Io(err))
            }
        }
    }

    fn close(&self) {
        self.signal(LinkCommand::Shutdown);
        self.control.lock().take();
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!("connector worker thread panicked");
        }
    }
}

impl Drop for TcpConnector {
    fn drop(&mut self) {
        // Dropping the sender wakes the worker; joining is left to `close`.
        self.signal(LinkCommand::Shutdown);
    }
}

impl std::fmt::Debug for TcpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpConnector")
            .field("endpoint", &self.config.endpoint)
            .field("open", &self.is_open())
            .finish()
    }
}

fn establish(config: &TransportConfig) -> io::Result<ActiveConnection> {
    let mut conn = connect_endpoint(&config.endpoint, config.tls_insecure, config.connect_timeout)?;
    conn.set_write_timeout(config.write_timeout)?;
    let auth = serialise_auth(&config.token, &config.app_key)?;
    let frame = frame_payload(&auth, config.max_frame_size).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "authentication frame too large")
    })?;
    conn.write_frame(&frame)?;
    Ok(conn)
}

fn worker_loop(
    config: &TransportConfig,
    stream: &SharedStream,
    rx: &Receiver<LinkCommand>,
    notifier: &ConnectionNotifier,
) {
    let mut backoff = BackoffState::new(config.backoff.clone());
    while notifier.is_attached() {
        let now = Instant::now();
        match establish(config) {
            Ok(conn) => {
                *stream.lock() = Some(conn);
                backoff.record_success(now);
                debug!("connector linked to {:?}", config.endpoint);
                notifier.connected();
                match rx.recv() {
                    Ok(LinkCommand::Broken) => {
                        notifier.disconnected();
                        backoff.reset_after_idle(Instant::now());
                    }
                    Ok(LinkCommand::Shutdown) | Err(_) => break,
                }
            }
            Err(err) => {
                notifier.error(format!("connect to {:?} failed: {err}", config.endpoint));
                let Some(delay) = backoff.next_sleep(now) else {
                    notifier.error(format!(
                        "giving up after {:?} without a connection",
                        config.backoff.deadline
                    ));
                    break;
                };
                match rx.recv_timeout(delay) {
                    Ok(LinkCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                    Ok(LinkCommand::Broken) | Err(RecvTimeoutError::Timeout) => {}
                }
            }
        }
    }
    stream.lock().take();
    info!("connector worker stopped");
}
