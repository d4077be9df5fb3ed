//! In-process capturing provider
//!
//! Keeps every emitted entry in memory together with a snapshot of the nested
//! and mapped context that was active when it was written. Useful for tests of
//! code that logs through the facade, and for hosts that want to inspect log
//! output without a framework.

use crate::context::ScopeHandle;
use crate::error::LogOutcome;
use crate::level::LogLevel;
use crate::provider::{error_chain, BoundLogger, CallSite, LogEntry, LogProvider, Property};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An entry recorded by [`MemoryProvider`]
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedEntry {
    pub logger: String,
    pub level: LogLevel,
    pub message: String,
    /// The attached error and its causes, rendered as text
    pub error: Option<String>,
    pub properties: Vec<Property>,
    /// Nested context stack, outermost first
    pub nested: Vec<String>,
    pub mapped: BTreeMap<String, String>,
    pub caller: CallSite,
}

/// Change to the provider's context store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextEvent {
    Pushed(String),
    Popped(String),
    Set { key: String, value: String },
    Removed(String),
}

#[derive(Debug, Default)]
struct Store {
    entries: Vec<CapturedEntry>,
    nested: Vec<String>,
    mapped: BTreeMap<String, String>,
    events: Vec<ContextEvent>,
}

#[derive(Debug)]
struct Shared {
    store: Mutex<Store>,
    min_level: LogLevel,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Provider that records entries in memory.
///
/// Clones share the same store.
///
/// # Example
///
/// ```
/// use logbridge::providers::MemoryProvider;
/// use logbridge::{LogProvider, Logger};
///
/// let provider = MemoryProvider::new();
/// let logger = Logger::from_bound("app", provider.get_logger("app"));
///
/// logger.info("started");
/// assert_eq!(provider.entries()[0].message, "started");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    name: &'static str,
    shared: Arc<Shared>,
}

impl MemoryProvider {
    pub const NAME: &'static str = "memory";

    /// Provider recording every level
    pub fn new() -> Self {
        Self::with_min_level(LogLevel::Trace)
    }

    /// Provider recording `min_level` and above
    pub fn with_min_level(min_level: LogLevel) -> Self {
        Self {
            name: Self::NAME,
            shared: Arc::new(Shared {
                store: Mutex::new(Store::default()),
                min_level,
            }),
        }
    }

    /// Same provider reporting a different [`LogProvider::name`]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// All recorded entries, oldest first
    pub fn entries(&self) -> Vec<CapturedEntry> {
        self.shared.lock().entries.clone()
    }

    /// Number of recorded entries
    pub fn count(&self) -> usize {
        self.shared.lock().entries.len()
    }

    /// Forget recorded entries and context events
    pub fn clear(&self) {
        let mut store = self.shared.lock();
        store.entries.clear();
        store.events.clear();
    }

    /// Context changes in the order they happened
    pub fn context_events(&self) -> Vec<ContextEvent> {
        self.shared.lock().events.clone()
    }

    /// Current nested context stack, outermost first
    pub fn nested_context(&self) -> Vec<String> {
        self.shared.lock().nested.clone()
    }

    /// Current mapped context
    pub fn mapped_context(&self) -> BTreeMap<String, String> {
        self.shared.lock().mapped.clone()
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LogProvider for MemoryProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn get_logger(&self, name: &str) -> Arc<dyn BoundLogger> {
        Arc::new(MemoryLogger {
            name: name.to_string(),
            shared: Arc::clone(&self.shared),
        })
    }

    fn open_nested_context(&self, message: &str) -> ScopeHandle<'static> {
        {
            let mut store = self.shared.lock();
            store.nested.push(message.to_string());
            store.events.push(ContextEvent::Pushed(message.to_string()));
        }

        let shared = Arc::clone(&self.shared);
        ScopeHandle::new(move || {
            let mut store = shared.lock();
            if let Some(popped) = store.nested.pop() {
                store.events.push(ContextEvent::Popped(popped));
            }
        })
    }

    fn open_mapped_context(&self, key: &str, value: &str) -> ScopeHandle<'static> {
        {
            let mut store = self.shared.lock();
            store.mapped.insert(key.to_string(), value.to_string());
            store.events.push(ContextEvent::Set {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        // Release removes the key even if an outer scope set it first
        let shared = Arc::clone(&self.shared);
        let key = key.to_string();
        ScopeHandle::new(move || {
            let mut store = shared.lock();
            store.mapped.remove(&key);
            store.events.push(ContextEvent::Removed(key));
        })
    }
}

struct MemoryLogger {
    name: String,
    shared: Arc<Shared>,
}

impl BoundLogger for MemoryLogger {
    fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.shared.min_level
    }

    fn write(&self, entry: LogEntry<'_>) -> LogOutcome {
        if !self.is_enabled(entry.level) {
            return LogOutcome::Suppressed;
        }

        let rendered = match entry.render() {
            Ok(rendered) => rendered,
            Err(error) => return LogOutcome::ProductionFailed(error),
        };

        let mut store = self.shared.lock();
        let captured = CapturedEntry {
            logger: self.name.clone(),
            level: rendered.level,
            message: rendered.text,
            error: rendered.error.map(error_chain),
            properties: rendered.properties,
            nested: store.nested.clone(),
            mapped: store.mapped.clone(),
            caller: rendered.caller,
        };
        store.entries.push(captured);
        LogOutcome::Emitted
    }
}
