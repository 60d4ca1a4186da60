//! Error category types for granular error handling.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Credential validation errors raised by the credential update operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("API key is empty after sanitization")]
    Empty,

    #[error("API key contains invalid character {ch:?}")]
    InvalidCharacter { ch: char },
}

/// Configuration-related errors.
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnvValue { key: String, value: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Attachment resolution errors.
///
/// These never fail a request; the resolver degrades to a text part and
/// logs the error instead.
#[derive(Error, Debug, Clone)]
pub enum AttachmentError {
    #[error("Failed to read attachment {path:?}: {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("Attachment {path:?} is {size} bytes (max: {max_size})")]
    TooLarge {
        path: PathBuf,
        size: usize,
        max_size: usize,
    },
}

/// Authentication-related errors.
#[derive(Error, Debug, Clone)]
pub enum AuthenticationError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Quota exceeded for API key")]
    QuotaExceeded,
}

/// Request validation errors.
#[derive(Error, Debug, Clone)]
pub enum RequestError {
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Invalid model: {model}")]
    InvalidModel { model: String },

    #[error("Payload too large: {size} bytes (max: {max_size})")]
    PayloadTooLarge { size: usize, max_size: usize },

    #[error("Unsupported media type: {mime_type}")]
    UnsupportedMediaType { mime_type: String },
}

/// Validation detail for field-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetail {
    pub field: String,
    pub description: String,
}

/// Rate limiting errors reported by the provider.
#[derive(Error, Debug, Clone)]
pub enum RateLimitError {
    #[error("Too many requests")]
    TooManyRequests { retry_after: Option<Duration> },

    #[error("Quota exceeded")]
    QuotaExceeded { retry_after: Option<Duration> },
}

impl RateLimitError {
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RateLimitError::TooManyRequests { retry_after }
            | RateLimitError::QuotaExceeded { retry_after } => *retry_after,
        }
    }
}

/// Network-related errors.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timed out after {duration:?}")]
    Timeout { duration: Duration },
}

/// Server-side errors.
#[derive(Error, Debug, Clone)]
pub enum ServerError {
    #[error("Internal server error: {message}")]
    InternalError { message: String },

    #[error("Service unavailable")]
    ServiceUnavailable { retry_after: Option<Duration> },

    #[error("Model overloaded: {model}")]
    ModelOverloaded { model: String },
}

/// Response parsing errors.
#[derive(Error, Debug, Clone)]
pub enum ResponseError {
    #[error("Failed to deserialize response: {message}")]
    DeserializationError { message: String },

    #[error("Unexpected response format: {message}")]
    UnexpectedFormat { message: String },

    #[error("Response contained no text")]
    EmptyResponse,
}

/// Content safety errors.
#[derive(Error, Debug, Clone)]
pub enum ContentError {
    #[error("Content blocked due to safety: {reason}")]
    SafetyBlocked {
        reason: String,
        safety_ratings: Vec<SafetyRatingInfo>,
    },

    #[error("Content blocked due to recitation")]
    RecitationBlocked,

    #[error("Prohibited content detected")]
    ProhibitedContent,
}

/// Information about a safety rating for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyRatingInfo {
    pub category: String,
    pub probability: String,
}

/// Resource-related errors.
#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    #[error("Resource not found: {name}")]
    NotFound { name: String },
}
