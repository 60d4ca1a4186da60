//! HTTP response parser for the Gemini API.
//!
//! Deserializes successful responses and maps error responses to
//! [`GatewayError`], filling in retry-after from headers.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{map_http_status_with_body, GatewayError, RateLimitError, ServerError};
use super::http::HttpResponse;

/// Parser for HTTP responses from the Gemini API.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a successful HTTP response into the expected type.
    ///
    /// # Example
    ///
    /// ```
    /// use gemini_gateway::transport::{ResponseParser, HttpResponse};
    /// use bytes::Bytes;
    /// use serde::Deserialize;
    /// use std::collections::HashMap;
    ///
    /// #[derive(Deserialize)]
    /// struct ModelResponse {
    ///     name: String,
    /// }
    ///
    /// let response = HttpResponse {
    ///     status: 200,
    ///     headers: HashMap::new(),
    ///     body: Bytes::from(r#"{"name":"gemini-2.0-flash"}"#),
    /// };
    ///
    /// let parsed: ModelResponse = ResponseParser::parse_response(response).unwrap();
    /// assert_eq!(parsed.name, "gemini-2.0-flash");
    /// ```
    pub fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, GatewayError> {
        if (200..300).contains(&response.status) {
            Ok(serde_json::from_slice(&response.body)?)
        } else {
            Err(Self::parse_error_response(&response))
        }
    }

    /// Maps an error response to the matching [`GatewayError`] variant.
    pub fn parse_error_response(response: &HttpResponse) -> GatewayError {
        let retry_after = Self::parse_retry_after(&response.headers);
        let mut error = map_http_status_with_body(response.status, &response.body);

        match &mut error {
            GatewayError::RateLimit(
                RateLimitError::TooManyRequests { retry_after: ra }
                | RateLimitError::QuotaExceeded { retry_after: ra },
            )
            | GatewayError::Server(ServerError::ServiceUnavailable { retry_after: ra }) => {
                *ra = retry_after;
            }
            _ => {}
        }

        if let Some(id) = Self::extract_request_id(&response.headers) {
            tracing::debug!(
                request_id = %id,
                status = response.status,
                error = %error,
                "API error occurred"
            );
        }

        error
    }

    /// Parses the `Retry-After` header (delay in seconds).
    pub fn parse_retry_after(headers: &HashMap<String, String>) -> Option<Duration> {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("retry-after"))
            .and_then(|(_, value)| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Extracts the provider request id from response headers.
    pub fn extract_request_id(headers: &HashMap<String, String>) -> Option<String> {
        const CANDIDATES: [&str; 3] = ["x-request-id", "x-goog-request-id", "request-id"];

        headers
            .iter()
            .find(|(key, _)| CANDIDATES.iter().any(|c| key.eq_ignore_ascii_case(c)))
            .map(|(_, value)| value.clone())
    }
}
