//! Span tracking for gateway operations.
//!
//! Provides trait-based tracing with span management and attribute tracking.

use std::collections::HashMap;
use std::time::Instant;

/// Tracer trait for creating spans.
pub trait Tracer: Send + Sync {
    /// Start a new span with the given name (e.g. `"gateway.chat_completion"`).
    fn start_span(&self, name: &str) -> Box<dyn Span>;
}

/// A traced operation.
///
/// Spans track the duration and context of operations. They can have
/// attributes attached and are marked with a status on completion.
pub trait Span: Send {
    /// Set an attribute on the span.
    fn set_attribute(&mut self, key: &str, value: &str);

    /// Set the span status.
    fn set_status(&mut self, status: SpanStatus);

    /// Record an event on the span.
    fn add_event(&mut self, name: &str, attributes: Option<HashMap<String, String>>);

    /// End the span and record its duration.
    fn end(self: Box<Self>);
}

/// Status of a span.
#[derive(Debug, Clone, PartialEq)]
pub enum SpanStatus {
    /// Operation completed successfully.
    Ok,
    /// Operation failed with an error message.
    Error(String),
}

/// Tracer that reports span lifecycles as `tracing` events.
pub struct TracingTracer {
    service_name: String,
}

impl TracingTracer {
    /// Create a new tracing tracer.
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
        }
    }
}

impl Tracer for TracingTracer {
    fn start_span(&self, name: &str) -> Box<dyn Span> {
        tracing::debug!(
            service = %self.service_name,
            span_name = %name,
            "Span started"
        );

        Box::new(TracingSpan {
            name: name.to_string(),
            service_name: self.service_name.clone(),
            start: Instant::now(),
            attributes: HashMap::new(),
            event_count: 0,
            status: None,
        })
    }
}

/// Span implementation using the tracing crate.
pub struct TracingSpan {
    name: String,
    service_name: String,
    start: Instant,
    attributes: HashMap<String, String>,
    event_count: usize,
    status: Option<SpanStatus>,
}

impl Span for TracingSpan {
    fn set_attribute(&mut self, key: &str, value: &str) {
        tracing::trace!(
            span_name = %self.name,
            attribute_key = %key,
            attribute_value = %value,
            "Span attribute set"
        );

        self.attributes.insert(key.to_string(), value.to_string());
    }

    fn set_status(&mut self, status: SpanStatus) {
        if let SpanStatus::Error(msg) = &status {
            tracing::debug!(
                span_name = %self.name,
                error = %msg,
                "Span failed"
            );
        }
        self.status = Some(status);
    }

    fn add_event(&mut self, name: &str, attributes: Option<HashMap<String, String>>) {
        tracing::debug!(
            span_name = %self.name,
            event_name = %name,
            event_attributes = ?attributes.unwrap_or_default(),
            "Span event recorded"
        );

        self.event_count += 1;
    }

    fn end(self: Box<Self>) {
        let status = match &self.status {
            Some(SpanStatus::Ok) => "ok",
            Some(SpanStatus::Error(_)) => "error",
            None => "unknown",
        };

        tracing::info!(
            service = %self.service_name,
            span_name = %self.name,
            duration_ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX),
            status,
            attributes = ?self.attributes,
            event_count = self.event_count,
            "Span ended"
        );
    }
}

/// Tracer that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn start_span(&self, _name: &str) -> Box<dyn Span> {
        Box::new(NoopSpan)
    }
}

struct NoopSpan;

impl Span for NoopSpan {
    fn set_attribute(&mut self, _key: &str, _value: &str) {}
    fn set_status(&mut self, _status: SpanStatus) {}
    fn add_event(&mut self, _name: &str, _attributes: Option<HashMap<String, String>>) {}
    fn end(self: Box<Self>) {}
}
