//! Process-wide entry points
//!
//! Library code asks for loggers here. The first logger that actually needs a
//! provider triggers resolution through the provider catalog; hosts and tests
//! can instead assign a provider explicitly.

#[cfg(feature = "cache")]
use crate::cache::CacheStats;
use crate::catalog::ProviderCatalog;
use crate::context::ScopeHandle;
use crate::error::describe_panic;
use crate::logger::Logger;
use crate::provider::SharedProvider;
use crate::state::{self, report};
use std::panic::{catch_unwind, AssertUnwindSafe, Location};
use std::sync::Arc;

/// Logger for `name`
pub fn get_logger(name: &str) -> Logger {
    Logger::facade(name)
}

/// Logger named after type `T`
pub fn logger_for<T: ?Sized>() -> Logger {
    Logger::facade(std::any::type_name::<T>())
}

/// Logger named after the calling source file.
///
/// `src/net/client.rs` becomes `net::client`; prefer
/// [`current_logger!`](crate::current_logger) for the exact module path.
#[track_caller]
pub fn get_current_class_logger() -> Logger {
    Logger::facade(&name_from_path(Location::caller().file()))
}

fn name_from_path(file: &str) -> String {
    let without_ext = file.strip_suffix(".rs").unwrap_or(file);
    let components: Vec<&str> = without_ext
        .split(['/', '\\'])
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();

    // The file itself is never a crate directory marker
    let dirs = &components[..components.len().saturating_sub(1)];
    let start = dirs
        .iter()
        .rposition(|c| matches!(*c, "src" | "tests" | "benches" | "examples"))
        .map_or(components.len().saturating_sub(1), |i| i + 1);

    let mut module: Vec<&str> = components[start..].to_vec();
    if module.len() > 1 && matches!(module.last(), Some(&"mod")) {
        module.pop();
    }

    if module.is_empty() {
        "unknown".to_string()
    } else {
        module.join("::")
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Assign the provider explicitly; `None` clears it so the next use resolves
/// again. Always notifies the provider-changed hook.
pub fn set_current_provider(provider: Option<SharedProvider>) {
    state::global().assign(provider);
}

/// The current provider, without resolving
pub fn current_provider() -> Option<SharedProvider> {
    state::global().current()
}

/// The current provider, resolving through the catalog if none is set
pub fn resolve_provider() -> Option<SharedProvider> {
    state::global().provider_or_resolve().0
}

/// Replace the catalog used by future resolutions.
///
/// An already current provider stays in place.
pub fn set_provider_catalog(catalog: ProviderCatalog) {
    state::global().set_catalog(catalog);
}

/// Register a callback for provider assignments.
///
/// The callback runs immediately with the current provider, then after every
/// assignment, including the first successful resolution. Replaces any
/// previous callback. Panics inside it are contained.
pub fn set_on_provider_changed<F>(hook: F)
where
    F: Fn(Option<&SharedProvider>) + Send + Sync + 'static,
{
    state::global().set_hook(Arc::new(hook));
}

/// Remove the provider-changed callback
pub fn clear_on_provider_changed() {
    state::global().clear_hook();
}

// ============================================================================
// Disabled flag
// ============================================================================

/// Whether all emission is suppressed
pub fn is_disabled() -> bool {
    state::global().is_disabled()
}

/// Suppress (`true`) or restore (`false`) all emission
pub fn set_disabled(disabled: bool) {
    state::global().set_disabled(disabled);
}

// ============================================================================
// Context
// ============================================================================

/// Push `message` on the provider's nested context until the handle drops
pub fn open_nested_context(message: &str) -> ScopeHandle<'static> {
    open_context(|provider| provider.open_nested_context(message))
}

/// Set `key` in the provider's mapped context until the handle drops.
///
/// Release removes the key; a value set by an enclosing scope is not restored.
pub fn open_mapped_context(key: &str, value: &str) -> ScopeHandle<'static> {
    open_context(|provider| provider.open_mapped_context(key, value))
}

fn open_context<F>(open: F) -> ScopeHandle<'static>
where
    F: FnOnce(&SharedProvider) -> ScopeHandle<'static>,
{
    let Some(provider) = resolve_provider() else {
        return ScopeHandle::noop();
    };
    match catch_unwind(AssertUnwindSafe(|| open(&provider))) {
        Ok(handle) => handle,
        Err(payload) => {
            report(&format!(
                "provider '{}' panicked opening context: {}",
                provider.name(),
                describe_panic(payload.as_ref())
            ));
            ScopeHandle::noop()
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Hit/miss counters of the bound logger cache
#[cfg(feature = "cache")]
pub fn logger_cache_stats() -> CacheStats {
    state::global().cache_stats()
}

/// Restore the state of a fresh process: no provider, default catalog, no
/// hook, not disabled, empty cache.
#[cfg(any(test, feature = "test-util"))]
pub fn reset() {
    state::global().reset();
}
