//! Error handling for the facade
//!
//! Provides the error taxonomy and the outcome type returned by bindings.
//! None of these errors ever escape the public logging surface: they are
//! contained by the resolver or the execution wrapper and only surface to
//! callers that use the formatter or a provider constructor directly.

use thiserror::Error;

/// Boxed error accepted from fallible message producers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised inside the facade
#[derive(Debug, Error)]
pub enum FacadeError {
    /// A binding's framework is not installed in the host process
    #[error("logging provider '{provider}' is unavailable: {reason}")]
    ProviderUnavailable {
        provider: &'static str,
        reason: String,
    },

    /// An availability check or factory failed while scanning the provider catalog
    #[error("failed to resolve logging provider '{provider}': {reason}")]
    ResolutionFailure { provider: String, reason: String },

    /// The lazy message producer failed or panicked
    #[error("failed to produce log message: {source}")]
    MessageProduction {
        #[source]
        source: BoxError,
    },

    /// Template and argument count disagree
    #[error(transparent)]
    Format(#[from] FormatMismatch),
}

impl FacadeError {
    /// Wrap a producer failure
    pub fn message_production(source: impl Into<BoxError>) -> Self {
        FacadeError::MessageProduction {
            source: source.into(),
        }
    }

    /// Check if this is a provider-unavailable error
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(self, FacadeError::ProviderUnavailable { .. })
    }

    /// Check if this is a message production error
    pub fn is_message_production(&self) -> bool {
        matches!(self, FacadeError::MessageProduction { .. })
    }
}

/// Text carried by a panic payload, for diagnostics.
pub(crate) fn describe_panic(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// A template needs more arguments than were supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("template '{template}' requires {expected} argument(s) but {supplied} were supplied")]
pub struct FormatMismatch {
    /// The raw template
    pub template: String,
    /// Arguments the template refers to
    pub expected: usize,
    /// Arguments actually supplied
    pub supplied: usize,
}

// ============================================================================
// Write Outcome
// ============================================================================

/// Result of handing one entry to a binding
#[derive(Debug)]
pub enum LogOutcome {
    /// The entry reached the framework
    Emitted,
    /// Nothing was emitted: level disabled, facade disabled, or no provider
    Suppressed,
    /// The message could not be produced; nothing was emitted for it
    ProductionFailed(FacadeError),
}

impl LogOutcome {
    /// Check if the entry was emitted
    pub fn is_emitted(&self) -> bool {
        matches!(self, LogOutcome::Emitted)
    }

    /// Check if the entry was suppressed
    pub fn is_suppressed(&self) -> bool {
        matches!(self, LogOutcome::Suppressed)
    }

    /// Check if message production failed
    pub fn is_production_failed(&self) -> bool {
        matches!(self, LogOutcome::ProductionFailed(_))
    }

    /// Get the production error, if any
    pub fn error(&self) -> Option<&FacadeError> {
        match self {
            LogOutcome::ProductionFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<bool> for LogOutcome {
    fn from(emitted: bool) -> Self {
        if emitted {
            LogOutcome::Emitted
        } else {
            LogOutcome::Suppressed
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
