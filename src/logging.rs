//! Internal diagnostics
//!
//! The facade reports its own behaviour (resolution, cache invalidation,
//! contained failures) through these macros. They write to `tracing` when that
//! feature is enabled, otherwise to `log`, otherwise nowhere.
//!
//! # Usage
//!
//! ```ignore
//! use crate::logging::{debug_log, trace_log};
//!
//! trace_log!("Cache miss for logger '{}'", name);
//! debug_log!("Resolved provider: {}", provider.name());
//! ```

/// Target used for every internal diagnostic
pub(crate) const TARGET: &str = "logbridge";

/// Trace-level diagnostics
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(all(feature = "log", not(feature = "tracing")))]
        ::log::trace!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(not(any(feature = "log", feature = "tracing")))]
        {
            let _ = format_args!($($arg)*);
        }
    };
}

/// Debug-level diagnostics
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(all(feature = "log", not(feature = "tracing")))]
        ::log::debug!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(not(any(feature = "log", feature = "tracing")))]
        {
            let _ = format_args!($($arg)*);
        }
    };
}

/// Warn-level diagnostics
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(all(feature = "log", not(feature = "tracing")))]
        ::log::warn!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(not(any(feature = "log", feature = "tracing")))]
        {
            let _ = format_args!($($arg)*);
        }
    };
}

pub(crate) use debug_log;
pub(crate) use trace_log;
pub(crate) use warn_log;
