//! Metrics recording for the gateway.
//!
//! Provides trait-based metrics recording with support for counters,
//! histograms, and gauges.

use std::collections::HashMap;

/// Metrics recorder trait.
///
/// Implementations decide where metrics go; the gateway only ever talks to
/// [`GatewayMetrics`], which names and labels them.
pub trait MetricsRecorder: Send + Sync {
    /// Increment a counter metric.
    fn increment_counter(&self, name: &str, labels: &[(&str, &str)]);

    /// Record a histogram value (durations, token counts).
    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]);

    /// Record a gauge value.
    fn record_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]);
}

/// Gateway-specific metrics with convenience methods.
pub struct GatewayMetrics {
    prefix: String,
    recorder: Box<dyn MetricsRecorder>,
}

impl GatewayMetrics {
    /// Create a new metrics facade.
    ///
    /// # Arguments
    /// * `prefix` - Metric name prefix (e.g., "gateway")
    /// * `recorder` - The underlying metrics recorder implementation
    pub fn new(prefix: &str, recorder: Box<dyn MetricsRecorder>) -> Self {
        Self {
            prefix: prefix.to_string(),
            recorder,
        }
    }

    /// Record one provider call.
    ///
    /// `outcome` is `"ok"` or the failing [`GatewayError::kind`](crate::GatewayError::kind).
    pub fn record_request(&self, operation: &str, model: &str, outcome: &str, duration_ms: u64) {
        let labels = [("operation", operation), ("model", model), ("outcome", outcome)];

        self.recorder.increment_counter(&format!("{}_requests_total", self.prefix), &labels);

        self.recorder.record_histogram(
            &format!("{}_request_duration_ms", self.prefix),
            duration_ms as f64,
            &[("operation", operation), ("model", model)],
        );

        if outcome != "ok" {
            self.recorder.increment_counter(&format!("{}_errors_total", self.prefix), &labels);
        }
    }

    /// Record token usage reported by the provider.
    pub fn record_tokens(&self, model: &str, prompt_tokens: u32, completion_tokens: u32) {
        self.recorder.record_histogram(
            &format!("{}_prompt_tokens", self.prefix),
            f64::from(prompt_tokens),
            &[("model", model)],
        );

        self.recorder.record_histogram(
            &format!("{}_completion_tokens", self.prefix),
            f64::from(completion_tokens),
            &[("model", model)],
        );

        self.recorder.record_histogram(
            &format!("{}_total_tokens", self.prefix),
            f64::from(prompt_tokens) + f64::from(completion_tokens),
            &[("model", model)],
        );
    }

    /// Record a chat completion retried against the fallback model.
    pub fn record_fallback(&self, from_model: &str, to_model: &str) {
        self.recorder.increment_counter(
            &format!("{}_fallbacks_total", self.prefix),
            &[("from_model", from_model), ("to_model", to_model)],
        );
    }

    /// Record an attachment that degraded to a text notice.
    pub fn record_attachment_degraded(&self, reason: &str) {
        self.recorder.increment_counter(
            &format!("{}_attachments_degraded_total", self.prefix),
            &[("reason", reason)],
        );
    }

    /// Record a successful credential replacement.
    pub fn record_credential_rotation(&self) {
        self.recorder
            .increment_counter(&format!("{}_credential_rotations_total", self.prefix), &[]);
    }

    /// Record a response blocked by the provider's safety filters.
    pub fn record_safety_block(&self, model: &str, reason: &str) {
        self.recorder.increment_counter(
            &format!("{}_safety_blocks_total", self.prefix),
            &[("model", model), ("reason", reason)],
        );
    }
}

/// Recorder that emits metrics as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetricsRecorder;

impl TracingMetricsRecorder {
    /// Create a new tracing metrics recorder.
    pub fn new() -> Self {
        Self
    }
}

impl MetricsRecorder for TracingMetricsRecorder {
    fn increment_counter(&self, name: &str, labels: &[(&str, &str)]) {
        let labels_map: HashMap<&str, &str> = labels.iter().copied().collect();
        tracing::debug!(
            metric_type = "counter",
            metric_name = name,
            metric_value = 1,
            labels = ?labels_map,
            "Counter incremented"
        );
    }

    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let labels_map: HashMap<&str, &str> = labels.iter().copied().collect();
        tracing::debug!(
            metric_type = "histogram",
            metric_name = name,
            metric_value = value,
            labels = ?labels_map,
            "Histogram recorded"
        );
    }

    fn record_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let labels_map: HashMap<&str, &str> = labels.iter().copied().collect();
        tracing::debug!(
            metric_type = "gauge",
            metric_name = name,
            metric_value = value,
            labels = ?labels_map,
            "Gauge recorded"
        );
    }
}

/// Recorder that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsRecorder;

impl MetricsRecorder for NoopMetricsRecorder {
    fn increment_counter(&self, _name: &str, _labels: &[(&str, &str)]) {}
    fn record_histogram(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}
    fn record_gauge(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}
}
