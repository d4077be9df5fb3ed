//! Binding to the `log` crate
//!
//! Available once the host installed a logger and raised the maximum level
//! above `Off`. The logger name becomes the record target. `log` has no slot
//! for an error value, so the error and its causes are appended to the message
//! text. There is no context store: nested and mapped context are no-ops.
//!
//! | facade | log   |
//! |--------|-------|
//! | Trace  | Trace |
//! | Debug  | Debug |
//! | Info   | Info  |
//! | Warn   | Warn  |
//! | Error  | Error |
//! | Fatal  | Error |

use crate::catalog::ProviderDescriptor;
use crate::error::{FacadeError, LogOutcome};
use crate::level::{LevelMap, LogLevel};
use crate::provider::{BoundLogger, LogEntry, LogProvider, SharedProvider};
use log::{Level, LevelFilter, Metadata, Record};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static AVAILABLE: AtomicBool = AtomicBool::new(true);

const LEVELS: LevelMap<Level> = LevelMap::new([
    Level::Trace,
    Level::Debug,
    Level::Info,
    Level::Warn,
    Level::Error,
    Level::Error,
]);

/// Provider emitting through the `log` crate
#[derive(Debug, Clone)]
pub struct LogCrateProvider {
    levels: LevelMap<Level>,
}

impl LogCrateProvider {
    pub const NAME: &'static str = "log";

    /// Bind to the installed logger.
    ///
    /// Fails with [`FacadeError::ProviderUnavailable`] when the maximum level
    /// is `Off`, which is the case until a logger is installed.
    pub fn new() -> Result<Self, FacadeError> {
        if !AVAILABLE.load(Ordering::Acquire) {
            return Err(FacadeError::ProviderUnavailable {
                provider: Self::NAME,
                reason: "disabled by availability override".to_string(),
            });
        }
        if log::max_level() == LevelFilter::Off {
            return Err(FacadeError::ProviderUnavailable {
                provider: Self::NAME,
                reason: "no logger installed or max level is Off".to_string(),
            });
        }
        Ok(Self { levels: LEVELS })
    }

    pub fn is_available() -> bool {
        AVAILABLE.load(Ordering::Acquire) && log::max_level() != LevelFilter::Off
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

impl LogProvider for LogCrateProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn get_logger(&self, name: &str) -> Arc<dyn BoundLogger> {
        Arc::new(LogCrateLogger {
            target: name.to_string(),
            levels: self.levels,
        })
    }
}

struct LogCrateLogger {
    target: String,
    levels: LevelMap<Level>,
}

impl LogCrateLogger {
    fn native_enabled(&self, level: Level) -> bool {
        level <= log::max_level()
            && log::logger().enabled(&Metadata::builder().level(level).target(&self.target).build())
    }
}

impl BoundLogger for LogCrateLogger {
    fn is_enabled(&self, level: LogLevel) -> bool {
        self.native_enabled(self.levels.map(level))
    }

    fn write(&self, entry: LogEntry<'_>) -> LogOutcome {
        let native = self.levels.map(entry.level);
        if !self.native_enabled(native) {
            return LogOutcome::Suppressed;
        }

        let rendered = match entry.render() {
            Ok(rendered) => rendered,
            Err(error) => return LogOutcome::ProductionFailed(error),
        };
        let text = rendered.text_with_error();

        log::logger().log(
            &Record::builder()
                .args(format_args!("{}", text))
                .level(native)
                .target(&self.target)
                .file_static(Some(rendered.caller.file))
                .line(Some(rendered.caller.line))
                .build(),
        );
        LogOutcome::Emitted
    }
}
