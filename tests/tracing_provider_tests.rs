//! Tests for the `tracing` binding
//!
//! A capturing layer is installed as the global subscriber once for this test
//! binary; it records every event together with the fields of the spans it
//! happened in.

#![cfg(feature = "tracing")]

use logbridge::providers::tracing_adapter::TARGET;
use logbridge::providers::TracingProvider;
use logbridge::*;
use serial_test::serial;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Level, Subscriber};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

// ============================================================================
// Capture Layer
// ============================================================================

#[derive(Clone, Debug)]
struct CapturedEvent {
    level: Level,
    target: String,
    fields: HashMap<String, String>,
    /// (span name, span fields), root first
    spans: Vec<(String, HashMap<String, String>)>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}

struct SpanFields(HashMap<String, String>);

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(visitor.fields));
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut spans = Vec::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                let fields = span
                    .extensions()
                    .get::<SpanFields>()
                    .map(|f| f.0.clone())
                    .unwrap_or_default();
                spans.push((span.name().to_string(), fields));
            }
        }

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.fields,
            spans,
        };
        self.events
            .lock()
            .map(|mut events| events.push(captured))
            .ok();
    }
}

#[derive(Clone)]
struct Capture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl Capture {
    /// Events written by facade loggers; internal diagnostics are skipped
    fn facade_events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.fields.contains_key("logger"))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn clear(&self) {
        self.events.lock().map(|mut e| e.clear()).ok();
    }
}

static CAPTURE: OnceLock<Capture> = OnceLock::new();

/// Install the capturing subscriber (DEBUG and above) and bind the facade to it
fn capture() -> Capture {
    let capture = CAPTURE
        .get_or_init(|| {
            let events = Arc::new(Mutex::new(Vec::new()));
            let layer = CaptureLayer {
                events: Arc::clone(&events),
            };
            tracing_subscriber::registry()
                .with(LevelFilter::DEBUG)
                .with(layer)
                .init();
            Capture { events }
        })
        .clone();

    TracingProvider::set_available_override(true);
    set_disabled(false);
    set_provider_catalog(ProviderCatalog::default());
    set_current_provider(None);
    capture.clear();
    capture
}

// ============================================================================
// Availability Tests
// ============================================================================

#[test]
#[serial]
fn test_default_catalog_resolves_tracing() {
    capture();
    assert!(TracingProvider::is_available());
    let provider = resolve_provider().unwrap();
    assert_eq!(provider.name(), "tracing");
}

#[test]
#[serial]
fn test_availability_override() {
    capture();
    TracingProvider::set_available_override(false);
    assert!(!TracingProvider::is_available());
    let error = TracingProvider::new().unwrap_err();
    assert!(error.is_provider_unavailable());

    TracingProvider::set_available_override(true);
    assert!(TracingProvider::new().is_ok());
}

// ============================================================================
// Event Tests
// ============================================================================

#[test]
#[serial]
fn test_entry_becomes_event() {
    let capture = capture();
    let logger = get_logger("auth");

    assert!(log_info!(logger, "User {user} logged in", "ann"));

    let events = capture.facade_events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.level, Level::INFO);
    assert_eq!(event.target, TARGET);
    assert_eq!(event.field("message"), Some("User ann logged in"));
    assert_eq!(event.field("logger"), Some("auth"));
    assert_eq!(event.field("properties"), Some("user=ann"));
    assert_eq!(event.field("facade.level"), Some("INFO"));
    assert!(event
        .field("caller.file")
        .is_some_and(|f| f.ends_with("tracing_provider_tests.rs")));
}

#[test]
#[serial]
fn test_host_filters_facade_output_by_target() {
    capture();
    let events = Arc::new(Mutex::new(Vec::new()));
    let scoped = tracing_subscriber::registry()
        .with(Targets::new().with_target(TARGET, Level::WARN))
        .with(CaptureLayer {
            events: Arc::clone(&events),
        });

    let logger = get_logger("billing");
    tracing::subscriber::with_default(scoped, || {
        assert!(!logger.is_info_enabled());
        assert!(!logger.info("filtered out"));
        assert!(logger.warn("kept"));
    });

    let captured = Capture { events }.facade_events();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].field("logger"), Some("billing"));
    assert_eq!(captured[0].field("message"), Some("kept"));
}

#[test]
#[serial]
fn test_fatal_collapses_to_error() {
    let capture = capture();
    assert!(get_logger("core").fatal("out of memory"));

    let events = capture.facade_events();
    assert_eq!(events[0].level, Level::ERROR);
    assert_eq!(events[0].field("facade.level"), Some("FATAL"));
}

#[test]
#[serial]
fn test_error_recorded_as_field() {
    let capture = capture();
    let error = std::io::Error::other("connection reset");
    assert!(get_logger("net").warn_err("request failed", &error));

    let events = capture.facade_events();
    assert_eq!(events[0].field("error"), Some("connection reset"));
    assert_eq!(events[0].field("message"), Some("request failed"));
}

#[test]
#[serial]
fn test_filtered_level_is_lazy() {
    let capture = capture();
    let logger = get_logger("hot_path");
    let built = std::cell::Cell::new(false);

    assert!(!logger.is_trace_enabled());
    assert!(logger.is_debug_enabled());
    assert!(!logger.trace_lazy(|| {
        built.set(true);
        "never"
    }));
    assert!(!built.get());
    assert!(capture.facade_events().is_empty());
}

#[test]
#[serial]
fn test_fallback_entry_goes_through_tracing() {
    let capture = capture();
    let logger = get_logger("sensor");
    assert!(!logger.info_lazy(|| -> String { panic!("bad reading") }));

    let events = capture.facade_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, Level::ERROR);
    assert_eq!(events[0].field("message"), Some(FALLBACK_MESSAGE));
    assert!(events[0].field("error").is_some_and(|e| e.contains("bad reading")));
}

// ============================================================================
// Context Tests
// ============================================================================

#[test]
#[serial]
fn test_context_becomes_spans() {
    let capture = capture();
    {
        let _nested = open_nested_context("checkout");
        let _mapped = open_mapped_context("user", "ann");
        get_logger("shop").info("charging card");
    }
    get_logger("shop").info("outside");

    let events = capture.facade_events();
    assert_eq!(events.len(), 2);

    let spans = &events[0].spans;
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].0, "ndc");
    assert_eq!(spans[0].1.get("message").map(String::as_str), Some("checkout"));
    assert_eq!(spans[1].0, "mdc");
    assert_eq!(spans[1].1.get("key").map(String::as_str), Some("user"));
    assert_eq!(spans[1].1.get("value").map(String::as_str), Some("ann"));

    assert!(events[1].spans.is_empty());
}
