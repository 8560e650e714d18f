//! Console delivery channel.
//!
//! [`ConsoleChannel`] renders events through an [`EventFormatter`] and
//! writes them synchronously to an `io::Write` sink (stdout by default).
//! It has no connection and no buffer: the only decision it makes is the
//! level check against its own threshold.

use std::{
    any::Any,
    io::{self, Write},
};

use log::warn;
use parking_lot::Mutex;

use crate::{
    channel::{Channel, Delivery},
    error::ChannelError,
    event::LogEvent,
    filter::LevelFilter,
    formatter::{DefaultFormatter, EventFormatter, SharedFormatter},
    level::Level,
};

/// Channel writing formatted events to a local stream.
pub struct ConsoleChannel {
    filter: LevelFilter,
    formatter: SharedFormatter,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleChannel {
    /// Create a channel writing to `stdout` with a [`DefaultFormatter`].
    pub fn stdout(level: Option<Level>) -> Self {
        Self::new(level, io::stdout(), DefaultFormatter::default())
    }

    /// Create a channel from an arbitrary writer and formatter.
    pub fn new<W, F>(level: Option<Level>, writer: W, formatter: F) -> Self
    where
        W: Write + Send + 'static,
        F: EventFormatter + 'static,
    {
        Self::with_shared_formatter(level, writer, SharedFormatter::new(formatter))
    }

    pub fn with_shared_formatter<W>(
        level: Option<Level>,
        writer: W,
        formatter: SharedFormatter,
    ) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            filter: LevelFilter::new(level),
            formatter,
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Render and write `event` if it meets the channel threshold.
    ///
    /// Write failures are reported through the `log` facade and otherwise
    /// ignored; console output never fails the caller.
    pub fn log(&self, event: &LogEvent) -> Delivery {
        if !self.filter.should_log(event.level()) {
            return Delivery::Filtered;
        }
        let line = self.formatter.format(event);
        let mut writer = self.writer.lock();
        if let Err(err) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
            warn!("console channel write error: {err}");
        }
        Delivery::Written
    }

    pub fn level(&self) -> Option<Level> {
        self.filter.minimum()
    }
}

impl Channel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    fn log(&self, event: &LogEvent) -> Result<Delivery, ChannelError> {
        Ok(ConsoleChannel::log(self, event))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for ConsoleChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleChannel")
            .field("level", &self.filter.minimum())
            .field("formatter", &self.formatter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::SharedBuf;
    use rstest::rstest;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[rstest]
    fn writes_formatted_line() {
        let buf = SharedBuf::new();
        let channel = ConsoleChannel::new(None, buf.clone(), DefaultFormatter::plain());
        let event = LogEvent::new(Level::Success, None, "done", None);
        assert_eq!(channel.log(&event), Delivery::Written);
        assert_eq!(buf.text(), "success     done\n");
    }

    #[rstest]
    #[case(Level::Error, true)]
    #[case(Level::Warn, true)]
    #[case(Level::Info, false)]
    fn honours_threshold(#[case] level: Level, #[case] written: bool) {
        let buf = SharedBuf::new();
        let channel = ConsoleChannel::new(Some(Level::Warn), buf.clone(), DefaultFormatter::plain());
        let delivery = channel.log(&LogEvent::new(level, None, "m", None));
        assert_eq!(delivery == Delivery::Written, written);
        assert_eq!(buf.text().is_empty(), !written);
    }

    #[rstest]
    fn write_errors_do_not_fail_the_call() {
        let channel = ConsoleChannel::new(None, FailingWriter, DefaultFormatter::plain());
        let event = LogEvent::new(Level::Info, None, "lost", None);
        assert_eq!(channel.log(&event), Delivery::Written);
    }
}
