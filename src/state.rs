//! Process-wide facade state
//!
//! One [`FacadeState`] exists per process. It owns the current provider, the
//! disabled flag, the provider-changed hook, the catalog used for resolution
//! and (with feature `cache`) the bound logger cache.

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, LoggerCache};
use crate::catalog::ProviderCatalog;
use crate::error::describe_panic;
use crate::logging::{debug_log, warn_log};
use crate::provider::{BoundLogger, SharedProvider};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
#[cfg(feature = "cache")]
use std::sync::{Mutex, MutexGuard};

/// Callback invoked with the new provider on every assignment
pub type ProviderChangedHook = Arc<dyn Fn(Option<&SharedProvider>) + Send + Sync>;

pub(crate) struct FacadeState {
    provider: RwLock<Option<SharedProvider>>,
    /// Bumped under the `provider` write lock on every assignment; loggers
    /// bound under an older generation are stale
    generation: AtomicU64,
    disabled: AtomicBool,
    hook: RwLock<Option<ProviderChangedHook>>,
    catalog: RwLock<Arc<ProviderCatalog>>,
    #[cfg(feature = "cache")]
    cache: Mutex<LoggerCache>,
}

static STATE: OnceLock<FacadeState> = OnceLock::new();

/// The process-wide state, created on first use
pub(crate) fn global() -> &'static FacadeState {
    STATE.get_or_init(FacadeState::new)
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl FacadeState {
    fn new() -> Self {
        Self {
            provider: RwLock::new(None),
            generation: AtomicU64::new(0),
            disabled: AtomicBool::new(false),
            hook: RwLock::new(None),
            catalog: RwLock::new(Arc::new(ProviderCatalog::default())),
            #[cfg(feature = "cache")]
            cache: Mutex::new(LoggerCache::new()),
        }
    }

    // ========================================================================
    // Provider
    // ========================================================================

    /// The current provider without triggering resolution
    pub(crate) fn current(&self) -> Option<SharedProvider> {
        read(&self.provider).clone()
    }

    /// Generation of the current assignment, without locking
    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn current_with_generation(&self) -> (Option<SharedProvider>, u64) {
        let provider = read(&self.provider);
        (provider.clone(), self.generation())
    }

    /// The current provider, resolving it through the catalog if unset.
    ///
    /// Concurrent first callers may each build a provider; the first one
    /// stored wins and the others are dropped. An empty resolution is not
    /// stored, so the next call resolves again.
    pub(crate) fn provider_or_resolve(&self) -> (Option<SharedProvider>, u64) {
        let (current, generation) = self.current_with_generation();
        if current.is_some() {
            return (current, generation);
        }

        let catalog = Arc::clone(&read(&self.catalog));
        let Some(resolved) = catalog.resolve() else {
            return (None, generation);
        };

        let (provider, generation, stored) = {
            let mut slot = write(&self.provider);
            if let Some(existing) = slot.clone() {
                (existing, self.generation(), false)
            } else {
                *slot = Some(Arc::clone(&resolved));
                (resolved, self.bump_generation(), true)
            }
        };

        if stored {
            self.after_assignment(Some(&provider));
        }
        (Some(provider), generation)
    }

    /// Replace the current provider; `None` forces resolution on next use.
    pub(crate) fn assign(&self, provider: Option<SharedProvider>) {
        {
            let mut slot = write(&self.provider);
            slot.clone_from(&provider);
            self.bump_generation();
        }
        self.after_assignment(provider.as_ref());
    }

    // Callers hold the `provider` write lock
    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn after_assignment(&self, provider: Option<&SharedProvider>) {
        debug_log!(
            "Logging provider set to {}",
            provider.map_or("none", |p| p.name())
        );
        #[cfg(feature = "cache")]
        self.lock_cache().clear();
        self.fire_hook(provider);
    }

    /// Bind `name` against the current provider.
    ///
    /// Returns the bound logger together with the generation it belongs to.
    /// [`Logger`](crate::Logger) keeps the pair and only comes back here once
    /// the generation moves on, so this is off the per-call path.
    pub(crate) fn bound_logger(&self, name: &str) -> Option<(Arc<dyn BoundLogger>, u64)> {
        let (provider, generation) = self.provider_or_resolve();
        let provider = provider?;

        #[cfg(feature = "cache")]
        if let Some(cached) = self.lock_cache().get(name, generation) {
            return Some((cached, generation));
        }

        let bound = match catch_unwind(AssertUnwindSafe(|| provider.get_logger(name))) {
            Ok(bound) => bound,
            Err(payload) => {
                report(&format!(
                    "provider '{}' panicked binding logger '{}': {}",
                    provider.name(),
                    name,
                    describe_panic(payload.as_ref())
                ));
                return None;
            }
        };

        #[cfg(feature = "cache")]
        self.lock_cache().insert(name, generation, Arc::clone(&bound));
        Some((bound, generation))
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub(crate) fn set_catalog(&self, catalog: ProviderCatalog) {
        *write(&self.catalog) = Arc::new(catalog);
    }

    // ========================================================================
    // Disabled flag
    // ========================================================================

    pub(crate) fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    pub(crate) fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Release);
    }

    // ========================================================================
    // Provider-changed hook
    // ========================================================================

    /// Install the hook and call it once with the current provider
    pub(crate) fn set_hook(&self, hook: ProviderChangedHook) {
        *write(&self.hook) = Some(hook);
        let current = self.current();
        self.fire_hook(current.as_ref());
    }

    pub(crate) fn clear_hook(&self) {
        *write(&self.hook) = None;
    }

    fn fire_hook(&self, provider: Option<&SharedProvider>) {
        // Cloned out so the hook may call back into the facade
        let Some(hook) = read(&self.hook).clone() else {
            return;
        };
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| hook(provider))) {
            report(&format!(
                "provider-changed hook panicked: {}",
                describe_panic(payload.as_ref())
            ));
        }
    }

    // ========================================================================
    // Cache
    // ========================================================================

    #[cfg(feature = "cache")]
    fn lock_cache(&self) -> MutexGuard<'_, LoggerCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(feature = "cache")]
    pub(crate) fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats().clone()
    }

    /// Back to the state of a fresh process
    #[cfg(any(test, feature = "test-util"))]
    pub(crate) fn reset(&self) {
        *write(&self.hook) = None;
        {
            // Generations stay monotonic so loggers bound before the reset go stale
            let mut slot = write(&self.provider);
            *slot = None;
            self.bump_generation();
        }
        *write(&self.catalog) = Arc::new(ProviderCatalog::default());
        self.set_disabled(false);
        #[cfg(feature = "cache")]
        {
            let mut cache = self.lock_cache();
            cache.clear();
            cache.reset_stats();
        }
    }
}

/// Last-resort report for failures the facade contains
pub(crate) fn report(message: &str) {
    eprintln!(
        "{} {}: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        message
    );
    warn_log!("{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProviderDescriptor;
    use crate::providers::MemoryProvider;
    use serial_test::serial;
    use std::sync::atomic::AtomicUsize;

    fn memory() -> SharedProvider {
        Arc::new(MemoryProvider::new())
    }

    #[test]
    #[serial]
    fn test_assign_bumps_generation() {
        let state = global();
        state.reset();

        let (_, before) = state.current_with_generation();
        state.assign(Some(memory()));
        let (provider, after) = state.current_with_generation();
        assert!(provider.is_some());
        assert_eq!(after, before + 1);

        state.assign(None);
        assert!(state.current().is_none());
        state.reset();
    }

    #[test]
    #[serial]
    fn test_resolution_is_cached() {
        let state = global();
        state.reset();

        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        state.set_catalog(ProviderCatalog::empty().with(ProviderDescriptor::new(
            "memory",
            || true,
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(MemoryProvider::new()) as SharedProvider)
            },
        )));

        assert!(state.provider_or_resolve().0.is_some());
        assert!(state.provider_or_resolve().0.is_some());
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        state.reset();
    }

    #[test]
    #[serial]
    fn test_empty_resolution_retried() {
        let state = global();
        state.reset();

        let checks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&checks);
        state.set_catalog(ProviderCatalog::empty().with(ProviderDescriptor::new(
            "absent",
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            },
            || unreachable!(),
        )));

        assert!(state.provider_or_resolve().0.is_none());
        assert!(state.provider_or_resolve().0.is_none());
        assert_eq!(checks.load(Ordering::SeqCst), 2);
        state.reset();
    }

    #[test]
    #[serial]
    fn test_hook_panic_is_contained() {
        let state = global();
        state.reset();

        state.set_hook(Arc::new(|_: Option<&SharedProvider>| panic!("hook exploded")));
        state.assign(Some(memory()));
        assert!(state.current().is_some());
        state.reset();
    }

    #[test]
    #[serial]
    fn test_concurrent_first_use_agrees() {
        let state = global();
        state.reset();
        state.set_catalog(ProviderCatalog::empty().with(ProviderDescriptor::new(
            "memory",
            || true,
            || Ok(Arc::new(MemoryProvider::new()) as SharedProvider),
        )));

        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| global().provider_or_resolve().0))
            .collect();
        let providers: Vec<SharedProvider> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        let current = state.current().unwrap();
        assert!(providers.iter().all(|p| Arc::ptr_eq(p, &current)));
        state.reset();
    }

    #[cfg(feature = "cache")]
    #[test]
    #[serial]
    fn test_bound_logger_cached_per_generation() {
        let state = global();
        state.reset();
        state.assign(Some(memory()));

        let (_, first) = state.bound_logger("a").unwrap();
        let (_, second) = state.bound_logger("a").unwrap();
        assert_eq!(first, second);
        let stats = state.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);

        state.assign(Some(memory()));
        let (_, third) = state.bound_logger("a").unwrap();
        assert_eq!(third, first + 1);
        assert_eq!(state.cache_stats().misses, 2);
        state.reset();
    }
}
