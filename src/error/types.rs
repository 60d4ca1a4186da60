//! Main error type for the gateway.

use std::time::Duration;
use thiserror::Error;
use super::categories::*;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Top-level error type for the gateway.
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("Invalid credential: {0}")]
    InvalidCredential(#[from] CredentialError),

    #[error("No API key configured and no per-request key supplied")]
    NotConfigured,

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
}

impl GatewayError {
    /// Returns true if this error originated from the remote provider call
    /// (transport, HTTP status, deadline, safety block or malformed response).
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::Authentication(_)
                | GatewayError::Request(_)
                | GatewayError::RateLimit(_)
                | GatewayError::Network(_)
                | GatewayError::Server(_)
                | GatewayError::Response(_)
                | GatewayError::Content(_)
                | GatewayError::Resource(_)
        )
    }

    /// Returns true if this error is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::RateLimit(_)
                | GatewayError::Network(_)
                | GatewayError::Server(ServerError::ServiceUnavailable { .. })
                | GatewayError::Server(ServerError::ModelOverloaded { .. })
        )
    }

    /// Returns the retry-after duration if the provider sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GatewayError::RateLimit(e) => e.retry_after(),
            GatewayError::Server(ServerError::ServiceUnavailable { retry_after }) => *retry_after,
            _ => None,
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::InvalidCredential(_) => "invalid_credential",
            GatewayError::NotConfigured => "not_configured",
            GatewayError::Configuration(_) => "configuration",
            GatewayError::Attachment(_) => "attachment",
            GatewayError::Authentication(_) => "authentication",
            GatewayError::Request(_) => "request",
            GatewayError::RateLimit(_) => "rate_limit",
            GatewayError::Network(_) => "network",
            GatewayError::Server(_) => "server",
            GatewayError::Response(_) => "response",
            GatewayError::Content(_) => "content",
            GatewayError::Resource(_) => "resource",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Network(NetworkError::Timeout {
                duration: Duration::from_secs(0), // Unknown actual duration
            })
        } else {
            GatewayError::Network(NetworkError::ConnectionFailed {
                message: err.to_string(),
            })
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Response(ResponseError::DeserializationError {
            message: err.to_string(),
        })
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(err: url::ParseError) -> Self {
        GatewayError::Configuration(ConfigurationError::InvalidBaseUrl {
            url: err.to_string(),
        })
    }
}
