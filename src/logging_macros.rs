//! `format!`-style logging macros.
//!
//! Each macro formats its arguments and forwards the message to the
//! matching [`Logger`](crate::Logger) method without metadata. The macros
//! are prefixed with `logtowa_` so they never clash with the `log` crate's
//! macros.
//!
//! ```
//! use logtowa::{Level, Logger, logtowa_info, logtowa_log};
//!
//! let logger = Logger::with_level(None);
//! logtowa_info!(logger, "server started on port {}", 8080);
//! logtowa_log!(logger, Level::Db, "migrated {} tables", 3);
//! ```

/// Log a formatted message at an explicit level.
#[macro_export]
macro_rules! logtowa_log {
    ($logger:expr, $level:expr, $message:expr) => {
        $logger.log($level, $message, ::std::option::Option::None)
    };
    ($logger:expr, $level:expr, $fmt:expr, $($arg:tt)+) => {
        $logger.log(
            $level,
            ::std::format!($fmt, $($arg)+),
            ::std::option::Option::None,
        )
    };
}

#[macro_export]
macro_rules! logtowa_error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logtowa_log!($logger, $crate::Level::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! logtowa_warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logtowa_log!($logger, $crate::Level::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! logtowa_info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logtowa_log!($logger, $crate::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! logtowa_success {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logtowa_log!($logger, $crate::Level::Success, $($arg)+)
    };
}

#[macro_export]
macro_rules! logtowa_http {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logtowa_log!($logger, $crate::Level::Http, $($arg)+)
    };
}

#[macro_export]
macro_rules! logtowa_db {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logtowa_log!($logger, $crate::Level::Db, $($arg)+)
    };
}

#[macro_export]
macro_rules! logtowa_verbose {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logtowa_log!($logger, $crate::Level::Verbose, $($arg)+)
    };
}

#[macro_export]
macro_rules! logtowa_debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logtowa_log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! logtowa_silly {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logtowa_log!($logger, $crate::Level::Silly, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use crate::{
        console::ConsoleChannel, formatter::DefaultFormatter, level::Level, logger::Logger,
        test_utils::SharedBuf,
    };

    #[fixture]
    fn logger_with_buf() -> (Logger, SharedBuf) {
        let buf = SharedBuf::new();
        let logger = Logger::with_level(None);
        logger.add_channel(ConsoleChannel::new(None, buf.clone(), DefaultFormatter::plain()));
        (logger, buf)
    }

    #[rstest]
    fn formats_arguments(logger_with_buf: (Logger, SharedBuf)) {
        let (logger, buf) = logger_with_buf;
        logtowa_warn!(logger, "retry {} of {}", 2, 5);
        assert_eq!(buf.lines(), ["warn        retry 2 of 5"]);
    }

    #[rstest]
    fn plain_message_is_forwarded(logger_with_buf: (Logger, SharedBuf)) {
        let (logger, buf) = logger_with_buf;
        logtowa_success!(logger, "deployed");
        assert_eq!(buf.lines(), ["success     deployed"]);
    }

    #[rstest]
    fn honours_global_threshold(logger_with_buf: (Logger, SharedBuf)) {
        let (logger, buf) = logger_with_buf;
        logger.set_level(Some(Level::Error));
        assert!(logtowa_silly!(logger, "noise {}", 1).is_none());
        assert!(logtowa_error!(logger, "kept").is_some());
        assert_eq!(buf.lines(), ["error       kept"]);
    }
}
