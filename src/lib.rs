//! # logbridge
//!
//! A logging facade for library crates. Libraries log through `logbridge`
//! without committing to a logging framework; at first use the facade looks
//! at what the host application installed and binds to it:
//!
//! - **Provider Discovery** - an ordered catalog of bindings, first available wins
//! - **Framework Bindings** - `tracing` and `log` behind Cargo features, plus an in-memory provider
//! - **Message Templates** - `{name}` placeholders with alignment and invariant format specifiers
//! - **Lazy Messages** - messages are only built for enabled levels
//! - **Failure Containment** - a failing message producer, provider or hook never reaches the caller
//! - **Diagnostic Context** - nested and mapped context scopes released on drop
//!
//! # Quick Start
//!
//! ```
//! use logbridge::{get_logger, log_info};
//!
//! let logger = get_logger("my_library::client");
//!
//! // Emits nothing (and returns false) until the host installs a framework
//! log_info!(logger, "Connected to {host}:{port}", "db.local", 5432);
//! logger.debug_lazy(|| format!("handshake took {} ms", 12));
//! ```
//!
//! # Choosing the Provider
//!
//! With default features the facade binds to `tracing` when a global
//! subscriber is installed, otherwise to `log` when a logger is installed.
//! Hosts and tests can override this:
//!
//! ```
//! use logbridge::providers::MemoryProvider;
//! use logbridge::{get_logger, set_current_provider};
//! use std::sync::Arc;
//!
//! let memory = MemoryProvider::new();
//! set_current_provider(Some(Arc::new(memory.clone())));
//!
//! get_logger("app").warn("disk almost full");
//! assert_eq!(memory.entries()[0].message, "disk almost full");
//! # set_current_provider(None);
//! ```
//!
//! # Diagnostic Context
//!
//! ```
//! use logbridge::{get_logger, open_mapped_context, open_nested_context};
//!
//! let _request = open_mapped_context("request_id", "42");
//! let _step = open_nested_context("checkout");
//! get_logger("shop").info("charging card");
//! // both scopes end here, innermost first
//! ```
//!
//! # Feature Flags
//!
//! - `tracing` (default) - binding to the `tracing` crate
//! - `log` (default) - binding to the `log` crate
//! - `cache` (default) - LRU cache of bound loggers
//! - `test-util` - exposes [`reset`] for tests of downstream crates
//!
//! The facade's own diagnostics go to `tracing` when enabled, else to `log`.

#![doc(html_root_url = "https://docs.rs/logbridge/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Core types
pub mod error;
pub mod level;
pub mod message;
pub mod template;
pub mod value;

// Providers and discovery
pub mod catalog;
pub mod provider;
pub mod providers;

// Logging surface
pub mod context;
pub mod facade;
pub mod logger;
mod macros;

// Global state
mod state;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::{CacheStats, LoggerCache};
pub use catalog::{ProviderCatalog, ProviderDescriptor};
pub use context::ScopeHandle;
pub use error::{BoxError, FacadeError, FormatMismatch, LogOutcome};
#[cfg(feature = "cache")]
pub use facade::logger_cache_stats;
#[cfg(any(test, feature = "test-util"))]
pub use facade::reset;
pub use facade::{
    clear_on_provider_changed, current_provider, get_current_class_logger, get_logger,
    is_disabled, logger_for, open_mapped_context, open_nested_context, resolve_provider,
    set_current_provider, set_disabled, set_on_provider_changed, set_provider_catalog,
};
pub use level::{LevelMap, LogLevel};
pub use logger::{Logger, FALLBACK_MESSAGE};
pub use message::LazyMessage;
pub use provider::{
    BoundLogger, CallSite, ErrorRef, LogEntry, LogProvider, Property, RenderedEntry,
    SharedProvider,
};
pub use state::ProviderChangedHook;
pub use template::{format_deferred, format_eager, ParsedTemplate, Placeholder};
pub use value::Value;
