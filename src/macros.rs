//! Call-site macros
//!
//! The `log_*!` macros take a logger, a message template and any number of
//! arguments convertible with [`Value::from`](crate::Value). The template is
//! only rendered when the level is enabled.
//!
//! ```
//! use logbridge::providers::MemoryProvider;
//! use logbridge::{log_info, log_warn, LogProvider, Logger};
//!
//! let provider = MemoryProvider::new();
//! let logger = Logger::from_bound("net", provider.get_logger("net"));
//!
//! let host = String::from("example.org");
//! log_info!(logger, "Connected to {host} in {ms} ms", &host, 42);
//! log_warn!(logger, "Retrying");
//!
//! assert_eq!(provider.entries()[0].message, "Connected to example.org in 42 ms");
//! ```

/// Log at `Trace` through a [`Logger`](crate::Logger)
#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.trace_format($template, &[$($crate::Value::from($arg)),*])
    };
}

/// Log at `Debug` through a [`Logger`](crate::Logger)
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.debug_format($template, &[$($crate::Value::from($arg)),*])
    };
}

/// Log at `Info` through a [`Logger`](crate::Logger)
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.info_format($template, &[$($crate::Value::from($arg)),*])
    };
}

/// Log at `Warn` through a [`Logger`](crate::Logger)
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.warn_format($template, &[$($crate::Value::from($arg)),*])
    };
}

/// Log at `Error` through a [`Logger`](crate::Logger)
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.error_format($template, &[$($crate::Value::from($arg)),*])
    };
}

/// Log at `Fatal` through a [`Logger`](crate::Logger)
#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.fatal_format($template, &[$($crate::Value::from($arg)),*])
    };
}

/// Logger named after the current module path
#[macro_export]
macro_rules! current_logger {
    () => {
        $crate::get_logger(::core::module_path!())
    };
}
