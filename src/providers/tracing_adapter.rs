//! Binding to the `tracing` ecosystem
//!
//! The binding counts as available once the host installed a global
//! subscriber. Entries become `tracing` events; nested and mapped context
//! become entered spans.
//!
//! | facade | tracing |
//! |--------|---------|
//! | Trace  | TRACE   |
//! | Debug  | DEBUG   |
//! | Info   | INFO    |
//! | Warn   | WARN    |
//! | Error  | ERROR   |
//! | Fatal  | ERROR   |
//!
//! # Filtering
//!
//! `tracing` callsites need a `'static` target, so every event and span uses
//! [`TARGET`] (`"logbridge"`) and the logger name travels in the `logger`
//! field. Host filters therefore select facade output as a whole, e.g.
//! `RUST_LOG=logbridge=info`; per-logger selection has to match on the
//! `logger` field in a custom `Layer` or filter. Enabled checks are made
//! against [`TARGET`] at the mapped level.

use crate::catalog::ProviderDescriptor;
use crate::context::ScopeHandle;
use crate::error::{FacadeError, LogOutcome};
use crate::level::{LevelMap, LogLevel};
use crate::provider::{BoundLogger, LogEntry, LogProvider, SharedProvider};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;

/// Target of every event and span emitted by this binding
pub const TARGET: &str = "logbridge";

static AVAILABLE: AtomicBool = AtomicBool::new(true);

const LEVELS: LevelMap<Level> = LevelMap::new([
    Level::TRACE,
    Level::DEBUG,
    Level::INFO,
    Level::WARN,
    Level::ERROR,
    Level::ERROR,
]);

// `tracing` macros need the level as a constant
macro_rules! at_level {
    ($level:expr, |$lvl:ident| $body:expr) => {{
        let level = $level;
        if level == Level::TRACE {
            const $lvl: Level = Level::TRACE;
            $body
        } else if level == Level::DEBUG {
            const $lvl: Level = Level::DEBUG;
            $body
        } else if level == Level::INFO {
            const $lvl: Level = Level::INFO;
            $body
        } else if level == Level::WARN {
            const $lvl: Level = Level::WARN;
            $body
        } else {
            const $lvl: Level = Level::ERROR;
            $body
        }
    }};
}

/// Provider emitting through `tracing`
#[derive(Debug, Clone)]
pub struct TracingProvider {
    levels: LevelMap<Level>,
}

impl TracingProvider {
    pub const NAME: &'static str = "tracing";

    /// Bind to the installed subscriber.
    ///
    /// Fails with [`FacadeError::ProviderUnavailable`] when no global
    /// subscriber is installed.
    pub fn new() -> Result<Self, FacadeError> {
        if !AVAILABLE.load(Ordering::Acquire) {
            return Err(FacadeError::ProviderUnavailable {
                provider: Self::NAME,
                reason: "disabled by availability override".to_string(),
            });
        }
        if !tracing::dispatcher::has_been_set() {
            return Err(FacadeError::ProviderUnavailable {
                provider: Self::NAME,
                reason: "no global subscriber installed".to_string(),
            });
        }
        Ok(Self { levels: LEVELS })
    }

    /// Whether a global subscriber is installed and the binding is not
    /// overridden off
    pub fn is_available() -> bool {
        AVAILABLE.load(Ordering::Acquire) && tracing::dispatcher::has_been_set()
    }

    /// Force the binding to look absent (`false`) or restore detection
    pub fn set_available_override(available: bool) {
        AVAILABLE.store(available, Ordering::Release);
    }

    /// Catalog entry for this binding
    pub fn descriptor() -> ProviderDescriptor {
        ProviderDescriptor::new(Self::NAME, Self::is_available, || {
            Ok(Arc::new(Self::new()?) as SharedProvider)
        })
    }
}

impl LogProvider for TracingProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn get_logger(&self, name: &str) -> Arc<dyn BoundLogger> {
        Arc::new(TracingLogger {
            name: name.to_string(),
            levels: self.levels,
        })
    }

    fn open_nested_context(&self, message: &str) -> ScopeHandle<'static> {
        let span = tracing::info_span!(target: TARGET, "ndc", message = %message).entered();
        ScopeHandle::new(move || drop(span))
    }

    fn open_mapped_context(&self, key: &str, value: &str) -> ScopeHandle<'static> {
        let span = tracing::info_span!(target: TARGET, "mdc", key = %key, value = %value).entered();
        ScopeHandle::new(move || drop(span))
    }
}

struct TracingLogger {
    name: String,
    levels: LevelMap<Level>,
}

impl BoundLogger for TracingLogger {
    fn is_enabled(&self, level: LogLevel) -> bool {
        at_level!(self.levels.map(level), |LVL| tracing::enabled!(target: TARGET, LVL))
    }

    fn write(&self, entry: LogEntry<'_>) -> LogOutcome {
        let native = self.levels.map(entry.level);
        if !at_level!(native, |LVL| tracing::enabled!(target: TARGET, LVL)) {
            return LogOutcome::Suppressed;
        }

        let rendered = match entry.render() {
            Ok(rendered) => rendered,
            Err(error) => return LogOutcome::ProductionFailed(error),
        };
        let properties = rendered.properties_text();

        at_level!(native, |LVL| {
            tracing::event!(
                target: TARGET,
                LVL,
                logger = %self.name,
                facade.level = rendered.level.as_str(),
                caller.file = rendered.caller.file,
                caller.line = rendered.caller.line,
                properties = properties.as_deref(),
                error = rendered.error,
                "{}",
                rendered.text
            );
        });
        LogOutcome::Emitted
    }
}
