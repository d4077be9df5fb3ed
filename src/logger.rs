//! The logger handed to library code
//!
//! A [`Logger`] wraps every call with the facade's guarantees: nothing is
//! emitted while the facade is disabled, the message is only built for enabled
//! levels, and a failing message producer is replaced by one fixed error entry
//! instead of propagating.

use crate::error::{describe_panic, FacadeError, LogOutcome};
use crate::level::LogLevel;
use crate::message::LazyMessage;
use crate::provider::{BoundLogger, CallSite, ErrorRef, LogEntry};
use crate::state;
use crate::value::Value;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

/// Text of the entry written when a message could not be produced
pub const FALLBACK_MESSAGE: &str = "Failed to generate log message";

#[derive(Clone)]
enum Binding {
    /// Bound through the facade, rebound whenever the provider changes
    Facade(Arc<FacadeBinding>),
    Fixed(Arc<dyn BoundLogger>),
    Noop,
}

/// Bound logger plus the provider generation it was bound under. Shared by
/// clones of one [`Logger`].
#[derive(Default)]
struct FacadeBinding {
    current: RwLock<Option<(u64, Arc<dyn BoundLogger>)>>,
}

impl FacadeBinding {
    fn get(&self, name: &str) -> Option<Arc<dyn BoundLogger>> {
        let state = state::global();
        let generation = state.generation();
        {
            let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
            if let Some((bound_at, bound)) = current.as_ref() {
                if *bound_at == generation {
                    return Some(Arc::clone(bound));
                }
            }
        }

        let (bound, bound_at) = state.bound_logger(name)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) =
            Some((bound_at, Arc::clone(&bound)));
        Some(bound)
    }
}

/// A named logger.
///
/// Loggers from [`get_logger`](crate::get_logger) follow the facade: they pick
/// up provider changes and emit nothing until a provider is available. Cheap
/// to clone.
///
/// # Example
///
/// ```
/// use logbridge::providers::MemoryProvider;
/// use logbridge::{LogProvider, Logger, Value};
///
/// let provider = MemoryProvider::new();
/// let logger = Logger::from_bound("jobs", provider.get_logger("jobs"));
///
/// logger.info_format("Job {id} took {ms:F1} ms", &[Value::from(7), Value::from(12.34)]);
/// logger.debug_lazy(|| format!("queue depth {}", 3));
///
/// let entries = provider.entries();
/// assert_eq!(entries[0].message, "Job 7 took 12.3 ms");
/// assert_eq!(entries[1].message, "queue depth 3");
/// ```
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    binding: Binding,
}

impl Logger {
    /// Logger that resolves through the facade on every call
    pub(crate) fn facade(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            binding: Binding::Facade(Arc::default()),
        }
    }

    /// Logger writing straight to `bound`, still honoring the disabled flag
    pub fn from_bound(name: &str, bound: Arc<dyn BoundLogger>) -> Self {
        Self {
            name: Arc::from(name),
            binding: Binding::Fixed(bound),
        }
    }

    /// Logger that never emits
    pub fn noop(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            binding: Binding::Noop,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_noop(&self) -> bool {
        matches!(self.binding, Binding::Noop)
    }

    fn bound(&self) -> Option<Arc<dyn BoundLogger>> {
        match &self.binding {
            Binding::Facade(binding) => binding.get(&self.name),
            Binding::Fixed(bound) => Some(Arc::clone(bound)),
            Binding::Noop => None,
        }
    }

    /// Log an entry; returns whether it was emitted.
    ///
    /// Without a message this only reports whether `level` is enabled.
    #[track_caller]
    pub fn log(
        &self,
        level: LogLevel,
        message: Option<LazyMessage<'_>>,
        error: Option<ErrorRef<'_>>,
        args: &[Value<'_>],
    ) -> bool {
        match message {
            Some(message) => self.log_outcome(level, message, error, args).is_emitted(),
            None => self.is_enabled(level),
        }
    }

    /// Whether entries at `level` would be emitted
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        if state::global().is_disabled() {
            return false;
        }
        let Some(bound) = self.bound() else {
            return false;
        };
        match catch_unwind(AssertUnwindSafe(|| bound.is_enabled(level))) {
            Ok(enabled) => enabled,
            Err(payload) => {
                state::report(&format!(
                    "logger '{}' panicked checking level {}: {}",
                    self.name,
                    level,
                    describe_panic(payload.as_ref())
                ));
                false
            }
        }
    }

    /// Log an entry and report exactly what happened to it.
    ///
    /// When the message cannot be produced, one entry with
    /// [`FALLBACK_MESSAGE`] is written at `Error` level carrying the failure,
    /// and [`LogOutcome::ProductionFailed`] is returned.
    #[track_caller]
    pub fn log_outcome(
        &self,
        level: LogLevel,
        message: LazyMessage<'_>,
        error: Option<ErrorRef<'_>>,
        args: &[Value<'_>],
    ) -> LogOutcome {
        if state::global().is_disabled() {
            return LogOutcome::Suppressed;
        }
        let Some(bound) = self.bound() else {
            return LogOutcome::Suppressed;
        };
        let caller = CallSite::caller();

        let outcome = self.write(
            bound.as_ref(),
            LogEntry {
                level,
                message,
                error,
                args,
                caller,
            },
        );

        if let LogOutcome::ProductionFailed(failure) = &outcome {
            let attached: ErrorRef<'_> = match failure {
                FacadeError::MessageProduction { source } => source.as_ref(),
                other => other,
            };
            // A literal message cannot fail, so this write cannot come back here
            self.write(
                bound.as_ref(),
                LogEntry {
                    level: LogLevel::Error,
                    message: LazyMessage::literal(FALLBACK_MESSAGE),
                    error: Some(attached),
                    args: &[],
                    caller,
                },
            );
        }
        outcome
    }

    fn write(&self, bound: &dyn BoundLogger, entry: LogEntry<'_>) -> LogOutcome {
        match catch_unwind(AssertUnwindSafe(|| bound.write(entry))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                state::report(&format!(
                    "logger '{}' panicked while writing: {}",
                    self.name,
                    describe_panic(payload.as_ref())
                ));
                LogOutcome::Suppressed
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binding = match self.binding {
            Binding::Facade(_) => "facade",
            Binding::Fixed(_) => "fixed",
            Binding::Noop => "noop",
        };
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("binding", &binding)
            .finish()
    }
}

// ============================================================================
// Per-level convenience methods
// ============================================================================

macro_rules! level_methods {
    ($($level:ident => $plain:ident, $lazy:ident, $format:ident, $err:ident, $enabled:ident;)*) => {
        impl Logger {
            $(
                #[doc = concat!("Log a plain message at `", stringify!($level), "`")]
                #[track_caller]
                pub fn $plain(&self, message: &str) -> bool {
                    self.log(LogLevel::$level, Some(LazyMessage::literal(message)), None, &[])
                }

                #[doc = concat!("Log at `", stringify!($level), "`, building the message only if enabled")]
                #[track_caller]
                pub fn $lazy<F, S>(&self, producer: F) -> bool
                where
                    F: FnOnce() -> S,
                    S: Into<String>,
                {
                    self.log(LogLevel::$level, Some(LazyMessage::from_fn(producer)), None, &[])
                }

                #[doc = concat!("Log a message template at `", stringify!($level), "`")]
                #[track_caller]
                pub fn $format(&self, template: &str, args: &[Value<'_>]) -> bool {
                    self.log(LogLevel::$level, Some(LazyMessage::literal(template)), None, args)
                }

                #[doc = concat!("Log a message with an attached error at `", stringify!($level), "`")]
                #[track_caller]
                pub fn $err(&self, message: &str, error: &(dyn std::error::Error + 'static)) -> bool {
                    self.log(LogLevel::$level, Some(LazyMessage::literal(message)), Some(error), &[])
                }

                #[doc = concat!("Whether `", stringify!($level), "` entries would be emitted")]
                pub fn $enabled(&self) -> bool {
                    self.is_enabled(LogLevel::$level)
                }
            )*
        }
    };
}

level_methods! {
    Trace => trace, trace_lazy, trace_format, trace_err, is_trace_enabled;
    Debug => debug, debug_lazy, debug_format, debug_err, is_debug_enabled;
    Info => info, info_lazy, info_format, info_err, is_info_enabled;
    Warn => warn, warn_lazy, warn_format, warn_err, is_warn_enabled;
    Error => error, error_lazy, error_format, error_err, is_error_enabled;
    Fatal => fatal, fatal_lazy, fatal_format, fatal_err, is_fatal_enabled;
}
