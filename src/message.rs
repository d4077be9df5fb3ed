//! Lazily produced log messages

use crate::error::{describe_panic, BoxError, FacadeError};
use std::borrow::Cow;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

type Producer<'a> = Box<dyn FnOnce() -> Result<String, BoxError> + 'a>;

enum Source<'a> {
    Literal(Cow<'a, str>),
    Producer(Producer<'a>),
}

/// A message that is only built when the level is enabled.
///
/// Literal messages cannot fail. Producers may return an error or panic; both
/// are turned into [`FacadeError::MessageProduction`] by [`materialize`].
///
/// [`materialize`]: LazyMessage::materialize
pub struct LazyMessage<'a> {
    source: Source<'a>,
}

impl<'a> LazyMessage<'a> {
    /// A pre-built message
    pub fn literal(text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            source: Source::Literal(text.into()),
        }
    }

    /// A producer that always yields a message
    pub fn from_fn<F, S>(producer: F) -> Self
    where
        F: FnOnce() -> S + 'a,
        S: Into<String>,
    {
        Self {
            source: Source::Producer(Box::new(move || Ok(producer().into()))),
        }
    }

    /// A producer that may fail
    pub fn try_from_fn<F, E>(producer: F) -> Self
    where
        F: FnOnce() -> Result<String, E> + 'a,
        E: Into<BoxError>,
    {
        Self {
            source: Source::Producer(Box::new(move || producer().map_err(Into::into))),
        }
    }

    /// Whether the message is pre-built
    pub fn is_literal(&self) -> bool {
        matches!(self.source, Source::Literal(_))
    }

    /// Build the message text, containing producer errors and panics.
    pub fn materialize(self) -> Result<String, FacadeError> {
        match self.source {
            Source::Literal(text) => Ok(text.into_owned()),
            Source::Producer(producer) => match catch_unwind(AssertUnwindSafe(producer)) {
                Ok(result) => result.map_err(FacadeError::message_production),
                Err(payload) => Err(FacadeError::message_production(format!(
                    "message producer panicked: {}",
                    describe_panic(payload.as_ref())
                ))),
            },
        }
    }
}

impl fmt::Debug for LazyMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::Literal(text) => f.debug_tuple("LazyMessage::Literal").field(text).finish(),
            Source::Producer(_) => f.write_str("LazyMessage::Producer(..)"),
        }
    }
}

impl<'a> From<&'a str> for LazyMessage<'a> {
    fn from(text: &'a str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for LazyMessage<'_> {
    fn from(text: String) -> Self {
        Self::literal(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_literal() {
        let message = LazyMessage::from("plain");
        assert!(message.is_literal());
        assert_eq!(message.materialize().unwrap(), "plain");
    }

    #[test]
    fn test_producer_runs_only_on_materialize() {
        let calls = Cell::new(0);
        let message = LazyMessage::from_fn(|| {
            calls.set(calls.get() + 1);
            "built"
        });
        assert!(!message.is_literal());
        assert_eq!(calls.get(), 0);
        assert_eq!(message.materialize().unwrap(), "built");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_dropped_producer_never_runs() {
        let calls = Cell::new(0);
        let message = LazyMessage::from_fn(|| {
            calls.set(1);
            String::new()
        });
        drop(message);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_fallible_producer_error() {
        let message = LazyMessage::try_from_fn(|| Err::<String, _>("no data"));
        let error = message.materialize().unwrap_err();
        assert!(error.is_message_production());
        assert!(error.to_string().contains("no data"));
    }

    #[test]
    fn test_panicking_producer_is_contained() {
        let message = LazyMessage::from_fn(|| -> String { panic!("kaboom") });
        let error = message.materialize().unwrap_err();
        assert!(error.is_message_production());
        assert!(error.to_string().contains("kaboom"));
    }
}
