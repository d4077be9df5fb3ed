//! Built-in bindings
//!
//! - [`MemoryProvider`] - always compiled; records entries in memory
//! - [`TracingProvider`] - feature `tracing`
//! - [`LogCrateProvider`] - feature `log`

pub mod memory;

#[cfg(feature = "log")]
pub mod log_adapter;
#[cfg(feature = "tracing")]
pub mod tracing_adapter;

pub use memory::{CapturedEntry, ContextEvent, MemoryProvider};

#[cfg(feature = "log")]
pub use log_adapter::LogCrateProvider;
#[cfg(feature = "tracing")]
pub use tracing_adapter::TracingProvider;
