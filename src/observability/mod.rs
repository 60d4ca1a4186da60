//! Observability layer for the gateway.
//!
//! Trait-based abstractions for:
//! - **Logging**: structured logging with sensitive data redaction
//! - **Tracing**: spans with attributes and status
//! - **Metrics**: counters, histograms and gauges
//!
//! # Examples
//!
//! ```rust
//! use gemini_gateway::observability::{Logger, StructuredLogger, Tracer, TracingTracer, SpanStatus};
//! use gemini_gateway::config::LogLevel;
//! use serde_json::json;
//!
//! let logger = StructuredLogger::new("gateway").with_level(LogLevel::Debug);
//! logger.info("Starting chat completion", json!({ "model": "gemini-2.0-flash" }));
//!
//! let tracer = TracingTracer::new("gateway");
//! let mut span = tracer.start_span("gateway.chat_completion");
//! span.set_attribute("model", "gemini-2.0-flash");
//! span.set_status(SpanStatus::Ok);
//! span.end();
//! ```

pub mod logging;
pub mod metrics;
pub mod tracing;

use std::sync::Arc;

use crate::config::LogLevel;

pub use logging::{Logger, NoopLogger, StructuredLogger};
pub use metrics::{GatewayMetrics, MetricsRecorder, NoopMetricsRecorder, TracingMetricsRecorder};
pub use tracing::{NoopTracer, Span, SpanStatus, Tracer, TracingSpan, TracingTracer};

/// Shared handles to the three observability components.
#[derive(Clone)]
pub struct Observability {
    /// Structured logger.
    pub logger: Arc<dyn Logger>,
    /// Span factory.
    pub tracer: Arc<dyn Tracer>,
    /// Named gateway metrics.
    pub metrics: Arc<GatewayMetrics>,
}

/// Create the default observability stack, routed through `tracing`.
///
/// # Example
/// ```rust
/// use gemini_gateway::config::LogLevel;
/// use gemini_gateway::observability::create_default_stack;
///
/// let stack = create_default_stack("gateway", LogLevel::Info);
/// stack.metrics.record_credential_rotation();
/// ```
pub fn create_default_stack(service_name: &str, level: LogLevel) -> Observability {
    Observability {
        logger: Arc::new(StructuredLogger::new(service_name).with_level(level)),
        tracer: Arc::new(TracingTracer::new(service_name)),
        metrics: Arc::new(GatewayMetrics::new(
            service_name,
            Box::new(TracingMetricsRecorder::new()),
        )),
    }
}

/// Create a stack that records nothing.
pub fn create_noop_stack(service_name: &str) -> Observability {
    Observability {
        logger: Arc::new(NoopLogger),
        tracer: Arc::new(NoopTracer),
        metrics: Arc::new(GatewayMetrics::new(service_name, Box::new(NoopMetricsRecorder))),
    }
}
