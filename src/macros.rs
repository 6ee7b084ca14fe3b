//! Logging macros that stamp the call site on every record.
//!
//! The structured macros take a message followed by `key => value` pairs;
//! the `*f!` variants take `format!`-style arguments.
//!
//! # Examples
//!
//! ```
//! use multilog::prelude::*;
//! use multilog::{info, infof};
//! use std::sync::Arc;
//!
//! let logger = Logger::new(vec![Arc::new(ConsoleSink::with_writer(
//!     SinkOptions::default(),
//!     std::io::sink(),
//! ))]);
//!
//! info!(logger, "Server started");
//! info!(logger, "User logged in", "user" => "john", "attempt" => 2);
//!
//! let port = 8080;
//! infof!(logger, "Server listening on port {}", port);
//! ```

/// Log a message with attributes at `level`.
///
/// # Examples
///
/// ```
/// # use multilog::prelude::*;
/// # let logger = Logger::new(Vec::new());
/// use multilog::log;
/// log!(logger, Level::Info, "Simple message");
/// log!(logger, Level::Error, "Request failed", "status" => 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        use $crate::core::LoggerApi as _;
        let attrs: ::std::vec::Vec<$crate::core::Attr> =
            ::std::vec![$($crate::core::Attr::new($key, $value)),*];
        let record = $crate::core::Record::new($level, $message)
            .with_attrs(attrs)
            .with_location(file!(), line!(), module_path!());
        $logger.emit(None, record);
    }};
}

/// Log a `format!`-style message at `level`.
///
/// # Examples
///
/// ```
/// # use multilog::prelude::*;
/// # let logger = Logger::new(Vec::new());
/// use multilog::logf;
/// logf!(logger, Level::Warn, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! logf {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        use $crate::core::LoggerApi as _;
        let record = $crate::core::Record::new($level, format!($($arg)+))
            .with_location(file!(), line!(), module_path!());
        $logger.emit(None, record);
    }};
}

/// Log a perf-level message; the record carries a metrics snapshot.
#[macro_export]
macro_rules! perf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::Level::Perf, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use multilog::prelude::*;
/// # let logger = Logger::new(Vec::new());
/// use multilog::debug;
/// debug!(logger, "Cache miss", "key" => "user:42");
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::Level::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::Level::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::Level::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use multilog::prelude::*;
/// # let logger = Logger::new(Vec::new());
/// use multilog::error;
/// error!(logger, "Failed to connect to database", "retries" => 3);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::Level::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! perff {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::core::Level::Perf, $($arg)+)
    };
}

#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::core::Level::Debug, $($arg)+)
    };
}

/// Log a `format!`-style info-level message.
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::core::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::core::Level::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logf!($logger, $crate::core::Level::Error, $($arg)+)
    };
}
