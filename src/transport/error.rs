//! Transport layer error types.

use std::time::Duration;

use crate::error::{GatewayError, NetworkError};

/// Transport error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Request error: {0}")]
    Request(String),
}

impl From<TransportError> for GatewayError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(duration) => GatewayError::Network(NetworkError::Timeout { duration }),
            other => GatewayError::Network(NetworkError::ConnectionFailed {
                message: other.to_string(),
            }),
        }
    }
}
