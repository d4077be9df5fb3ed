//! Provider discovery
//!
//! A [`ProviderCatalog`] is an ordered list of candidate bindings. Resolution
//! asks each candidate in turn whether its framework is installed in the host
//! and builds the first one that is. Order is priority.

use crate::error::{describe_panic, FacadeError};
use crate::logging::{debug_log, trace_log, warn_log};
use crate::provider::SharedProvider;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

type AvailabilityCheck = Arc<dyn Fn() -> bool + Send + Sync>;
type Factory = Arc<dyn Fn() -> Result<SharedProvider, FacadeError> + Send + Sync>;

/// A candidate binding: an availability check plus a factory.
#[derive(Clone)]
pub struct ProviderDescriptor {
    name: String,
    available: AvailabilityCheck,
    factory: Factory,
}

impl ProviderDescriptor {
    pub fn new<P, F>(name: impl Into<String>, available: P, factory: F) -> Self
    where
        P: Fn() -> bool + Send + Sync + 'static,
        F: Fn() -> Result<SharedProvider, FacadeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            available: Arc::new(available),
            factory: Arc::new(factory),
        }
    }

    /// Candidate that is always available and yields `provider`
    pub fn always(name: impl Into<String>, provider: SharedProvider) -> Self {
        Self::new(name, || true, move || Ok(Arc::clone(&provider)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the availability check
    pub fn is_available(&self) -> bool {
        (self.available)()
    }

    /// Run the factory
    pub fn create(&self) -> Result<SharedProvider, FacadeError> {
        (self.factory)()
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered list of candidate bindings.
///
/// The default catalog holds the `tracing` binding, then the `log` binding,
/// each only when its Cargo feature is enabled.
///
/// # Example
///
/// ```
/// use logbridge::providers::MemoryProvider;
/// use logbridge::{ProviderCatalog, ProviderDescriptor};
/// use std::sync::Arc;
///
/// let catalog = ProviderCatalog::empty()
///     .with(ProviderDescriptor::new("missing", || false, || unreachable!()))
///     .with(ProviderDescriptor::always("memory", Arc::new(MemoryProvider::new())));
///
/// let provider = catalog.resolve().unwrap();
/// assert_eq!(provider.name(), "memory");
/// ```
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    descriptors: Vec<ProviderDescriptor>,
}

impl ProviderCatalog {
    /// Catalog with no candidates
    pub fn empty() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Append a candidate (builder style)
    pub fn with(mut self, descriptor: ProviderDescriptor) -> Self {
        self.push(descriptor);
        self
    }

    /// Append a candidate
    pub fn push(&mut self, descriptor: ProviderDescriptor) {
        self.descriptors.push(descriptor);
    }

    /// Candidate names in priority order
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(ProviderDescriptor::name).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Build the first available candidate.
    ///
    /// Returns `Ok(None)` when no candidate is available. An availability check or factory
    /// that fails or panics stops the scan with
    /// [`FacadeError::ResolutionFailure`]; later candidates are not consulted.
    pub fn try_resolve(&self) -> Result<Option<SharedProvider>, FacadeError> {
        for descriptor in &self.descriptors {
            let available = catch_unwind(AssertUnwindSafe(|| descriptor.is_available()))
                .map_err(|payload| FacadeError::ResolutionFailure {
                    provider: descriptor.name.clone(),
                    reason: format!("availability check panicked: {}", describe_panic(payload.as_ref())),
                })?;

            if !available {
                trace_log!("Provider '{}' is not available", descriptor.name);
                continue;
            }

            let provider = catch_unwind(AssertUnwindSafe(|| descriptor.create()))
                .map_err(|payload| FacadeError::ResolutionFailure {
                    provider: descriptor.name.clone(),
                    reason: format!("factory panicked: {}", describe_panic(payload.as_ref())),
                })?
                .map_err(|error| FacadeError::ResolutionFailure {
                    provider: descriptor.name.clone(),
                    reason: error.to_string(),
                })?;

            debug_log!("Resolved logging provider '{}'", descriptor.name);
            return Ok(Some(provider));
        }

        trace_log!("No logging provider available");
        Ok(None)
    }

    /// Build the first available candidate, never failing.
    ///
    /// Resolution failures are written to standard error and yield `None`.
    pub fn resolve(&self) -> Option<SharedProvider> {
        match self.try_resolve() {
            Ok(provider) => provider,
            Err(error) => {
                eprintln!(
                    "{} {}: {}",
                    env!("CARGO_PKG_NAME"),
                    env!("CARGO_PKG_VERSION"),
                    error
                );
                warn_log!("{}", error);
                None
            }
        }
    }
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        #[allow(unused_mut)]
        let mut catalog = Self::empty();
        #[cfg(feature = "tracing")]
        catalog.push(crate::providers::TracingProvider::descriptor());
        #[cfg(feature = "log")]
        catalog.push(crate::providers::LogCrateProvider::descriptor());
        catalog
    }
}
