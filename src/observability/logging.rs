//! Structured logging for the gateway.
//!
//! Provides trait-based logging with structured field support.

use serde_json::Value;
use crate::config::LogLevel;

const REDACTED: &str = "***REDACTED***";

/// Field names whose values never reach a log sink.
const SENSITIVE_KEYS: [&str; 11] = [
    "api_key", "apiKey", "key",
    "token", "access_token", "accessToken",
    "secret", "password", "credential",
    "authorization", "x-goog-api-key",
];

/// Logger trait for structured logging.
///
/// Implementations can integrate with various logging backends (tracing, a
/// test recorder, or nothing at all).
pub trait Logger: Send + Sync {
    /// Log a debug message with structured context.
    fn debug(&self, message: &str, fields: Value);

    /// Log an info message with structured context.
    fn info(&self, message: &str, fields: Value);

    /// Log a warning message with structured context.
    fn warn(&self, message: &str, fields: Value);

    /// Log an error message with structured context.
    fn error(&self, message: &str, fields: Value);
}

/// Structured logger backed by the `tracing` crate.
///
/// Emits one event per call with the JSON context attached as a `fields`
/// value. Sensitive keys are masked at any nesting depth before emission.
pub struct StructuredLogger {
    name: String,
    level: LogLevel,
}

impl StructuredLogger {
    /// Create a new structured logger with the given name.
    ///
    /// # Example
    /// ```
    /// use gemini_gateway::observability::StructuredLogger;
    ///
    /// let logger = StructuredLogger::new("gateway.chat");
    /// ```
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: LogLevel::Info,
        }
    }

    /// Set the minimum log level for this logger.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    /// Mask sensitive values in `fields`, descending into objects and arrays.
    pub fn redact_sensitive_fields(mut fields: Value) -> Value {
        match &mut fields {
            Value::Object(obj) => {
                for (key, value) in obj.iter_mut() {
                    if SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key)) {
                        *value = Value::String(REDACTED.to_string());
                    } else if value.is_object() || value.is_array() {
                        *value = Self::redact_sensitive_fields(value.take());
                    }
                }
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    *item = Self::redact_sensitive_fields(item.take());
                }
            }
            _ => {}
        }

        fields
    }
}

impl Logger for StructuredLogger {
    fn debug(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Debug) {
            return;
        }

        let redacted_fields = Self::redact_sensitive_fields(fields);
        tracing::debug!(
            logger = %self.name,
            fields = %redacted_fields,
            "{}", message
        );
    }

    fn info(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Info) {
            return;
        }

        let redacted_fields = Self::redact_sensitive_fields(fields);
        tracing::info!(
            logger = %self.name,
            fields = %redacted_fields,
            "{}", message
        );
    }

    fn warn(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Warn) {
            return;
        }

        let redacted_fields = Self::redact_sensitive_fields(fields);
        tracing::warn!(
            logger = %self.name,
            fields = %redacted_fields,
            "{}", message
        );
    }

    fn error(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Error) {
            return;
        }

        let redacted_fields = Self::redact_sensitive_fields(fields);
        tracing::error!(
            logger = %self.name,
            fields = %redacted_fields,
            "{}", message
        );
    }
}

/// Logger that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: &str, _fields: Value) {}
    fn info(&self, _message: &str, _fields: Value) {}
    fn warn(&self, _message: &str, _fields: Value) {}
    fn error(&self, _message: &str, _fields: Value) {}
}
