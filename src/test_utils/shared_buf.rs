//! In-memory writer for capturing console output.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Thread-safe byte buffer implementing `io::Write`.
///
/// Clones share the same underlying buffer, so a test can hand one clone to
/// a channel and read back through another.
#[derive(Clone, Default)]
pub struct SharedBuf {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of the buffer contents.
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }

    /// Return the buffer contents as UTF-8 text, replacing invalid bytes.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Output split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
