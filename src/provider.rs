//! Provider capability traits
//!
//! A [`LogProvider`] is the binding to one concrete logging framework. It hands
//! out [`BoundLogger`]s by name and optionally supports nested and mapped
//! diagnostic context. Bindings are ordinary Rust types compiled against the
//! framework they drive; the catalog decides at runtime which one is used.

use crate::context::ScopeHandle;
use crate::error::{FacadeError, LogOutcome};
use crate::level::LogLevel;
use crate::message::LazyMessage;
use crate::template::render_structured;
use crate::value::Value;
use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Borrowed error attached to an entry
pub type ErrorRef<'a> = &'a (dyn Error + 'static);

/// Provider shared by the facade and every logger it handed out
pub type SharedProvider = Arc<dyn LogProvider>;

/// Source location of the code that called the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl CallSite {
    /// Location of the caller, skipping every `#[track_caller]` frame.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A named value attached to an entry, taken from the template's placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// One log call as handed to a binding.
///
/// The message is not built yet; a binding calls [`LogEntry::render`] only
/// after it checked that the level is enabled.
#[derive(Debug)]
pub struct LogEntry<'a> {
    pub level: LogLevel,
    pub message: LazyMessage<'a>,
    pub error: Option<ErrorRef<'a>>,
    pub args: &'a [Value<'a>],
    pub caller: CallSite,
}

impl<'a> LogEntry<'a> {
    /// Build the message and substitute its arguments.
    ///
    /// Fails when the producer fails or the template needs more arguments than
    /// were supplied.
    pub fn render(self) -> Result<RenderedEntry<'a>, FacadeError> {
        let text = self.message.materialize()?;
        let (text, names) = render_structured(text, self.args)?;
        let properties = names
            .into_iter()
            .zip(self.args)
            .map(|(name, value)| Property {
                name,
                value: value.to_string(),
            })
            .collect();

        Ok(RenderedEntry {
            level: self.level,
            text,
            properties,
            error: self.error,
            caller: self.caller,
        })
    }
}

/// An entry whose message has been built.
#[derive(Debug)]
pub struct RenderedEntry<'a> {
    pub level: LogLevel,
    pub text: String,
    pub properties: Vec<Property>,
    pub error: Option<ErrorRef<'a>>,
    pub caller: CallSite,
}

impl RenderedEntry<'_> {
    /// Message text followed by the attached error and its causes.
    ///
    /// For frameworks that have no dedicated slot for an error.
    pub fn text_with_error(&self) -> String {
        match self.error {
            Some(error) => format!("{}\n{}", self.text, error_chain(error)),
            None => self.text.clone(),
        }
    }

    /// Properties rendered as `name=value` pairs.
    pub fn properties_text(&self) -> Option<String> {
        if self.properties.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .properties
            .iter()
            .map(|p| format!("{}={}", p.name, p.value))
            .collect();
        Some(pairs.join(" "))
    }
}

/// `outer: inner: root` for an error and its sources.
pub fn error_chain(error: ErrorRef<'_>) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

// ============================================================================
// Traits
// ============================================================================

/// A logger bound to one name inside one framework.
pub trait BoundLogger: Send + Sync {
    /// Whether entries at `level` would be emitted
    fn is_enabled(&self, level: LogLevel) -> bool;

    /// Emit one entry.
    ///
    /// Implementations return [`LogOutcome::Suppressed`] without rendering the
    /// message when the level is disabled, and
    /// [`LogOutcome::ProductionFailed`] when rendering fails.
    fn write(&self, entry: LogEntry<'_>) -> LogOutcome;
}

/// Binding to one logging framework.
pub trait LogProvider: Send + Sync {
    /// Short identifier, e.g. `"tracing"`
    fn name(&self) -> &'static str;

    /// Logger for the given name
    fn get_logger(&self, name: &str) -> Arc<dyn BoundLogger>;

    /// Push a message on the framework's nested context stack
    fn open_nested_context(&self, message: &str) -> ScopeHandle<'static> {
        let _ = message;
        ScopeHandle::noop()
    }

    /// Set a key in the framework's mapped context; release removes the key
    fn open_mapped_context(&self, key: &str, value: &str) -> ScopeHandle<'static> {
        let _ = (key, value);
        ScopeHandle::noop()
    }
}

impl fmt::Debug for dyn LogProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogProvider").field("name", &self.name()).finish()
    }
}
