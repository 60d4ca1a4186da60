//! Maps HTTP status codes and Gemini error bodies onto [`GatewayError`].

use serde::Deserialize;
use super::categories::*;
use super::types::GatewayError;

/// Structured API error response from Gemini.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Detailed error information from the API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

/// Maps an HTTP status code and raw response body to a [`GatewayError`].
///
/// The Gemini error envelope (`{"error": {"message", "status", "details"}}`)
/// is parsed when present; otherwise the body is used verbatim as the message.
pub fn map_http_status_with_body(status: u16, body: &[u8]) -> GatewayError {
    let (message, error_details) = match serde_json::from_slice::<ApiErrorResponse>(body) {
        Ok(response) => (response.error.message.clone(), Some(response.error)),
        Err(_) => (String::from_utf8_lossy(body).to_string(), None),
    };
    let lowered = message.to_lowercase();

    match status {
        400 => {
            let details = error_details
                .as_ref()
                .map(|e| parse_validation_details(&e.details))
                .unwrap_or_default();

            if lowered.contains("api key not valid") {
                GatewayError::Authentication(AuthenticationError::InvalidApiKey)
            } else {
                GatewayError::Request(RequestError::ValidationError { message, details })
            }
        }

        401 => GatewayError::Authentication(AuthenticationError::InvalidApiKey),

        403 => {
            if lowered.contains("quota") {
                GatewayError::Authentication(AuthenticationError::QuotaExceeded)
            } else {
                GatewayError::Authentication(AuthenticationError::PermissionDenied { message })
            }
        }

        404 => {
            let name = extract_resource_name(&message);
            if lowered.contains("model") {
                GatewayError::Resource(ResourceError::ModelNotFound { model: name })
            } else {
                GatewayError::Resource(ResourceError::NotFound { name })
            }
        }

        413 => {
            let (size, max_size) = extract_size_info(&message);
            GatewayError::Request(RequestError::PayloadTooLarge { size, max_size })
        }

        415 => GatewayError::Request(RequestError::UnsupportedMediaType {
            mime_type: extract_mime_type(&message),
        }),

        // retry_after is filled in from headers by the response parser
        429 => GatewayError::RateLimit(RateLimitError::TooManyRequests { retry_after: None }),

        500 => GatewayError::Server(ServerError::InternalError { message }),

        503 => {
            if lowered.contains("overload") {
                GatewayError::Server(ServerError::ModelOverloaded {
                    model: extract_resource_name(&message),
                })
            } else {
                GatewayError::Server(ServerError::ServiceUnavailable { retry_after: None })
            }
        }

        _ => GatewayError::Server(ServerError::InternalError {
            message: format!("HTTP {status}: {message}"),
        }),
    }
}

/// Extracts a resource name from an error message (simple heuristic).
fn extract_resource_name(message: &str) -> String {
    if let Some(found) = message.split_whitespace().find(|s| s.starts_with("models/")) {
        return found
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '/' && c != '-' && c != '_' && c != '.')
            .to_string();
    }

    for quote in ['\'', '"'] {
        if let Some(start) = message.find(quote) {
            if let Some(end) = message[start + 1..].find(quote) {
                return message[start + 1..start + 1 + end].to_string();
            }
        }
    }

    "unknown".to_string()
}

/// Extracts "size ... max" numbers from an error message.
fn extract_size_info(message: &str) -> (usize, usize) {
    let numbers: Vec<usize> = message
        .split_whitespace()
        .filter_map(|s| s.trim_matches(|c: char| !c.is_numeric()).parse().ok())
        .collect();

    match numbers.as_slice() {
        [] => (0, 0),
        [size] => (*size, 0),
        [size, max_size, ..] => (*size, *max_size),
    }
}

/// Extracts a MIME type such as `application/pdf` from an error message.
fn extract_mime_type(message: &str) -> String {
    const PREFIXES: [&str; 5] = ["image/", "video/", "audio/", "application/", "text/"];

    message
        .split_whitespace()
        .find(|word| PREFIXES.iter().any(|p| word.starts_with(p)))
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric() && c != '/')
                .to_string()
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Parses field-level validation details from the error `details` array.
fn parse_validation_details(details: &[serde_json::Value]) -> Vec<ValidationDetail> {
    details
        .iter()
        .filter_map(|detail| {
            let obj = detail.as_object()?;
            let field = obj
                .get("field")
                .or_else(|| obj.get("fieldPath"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            let description = obj
                .get("description")
                .or_else(|| obj.get("message"))
                .and_then(|v| v.as_str())
                .filter(|d| !d.is_empty())?;

            Some(ValidationDetail {
                field: field.to_string(),
                description: description.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_401() {
        let error = map_http_status_with_body(401, b"Unauthorized");
        assert!(matches!(
            error,
            GatewayError::Authentication(AuthenticationError::InvalidApiKey)
        ));
    }

    #[test]
    fn test_map_400_invalid_key_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let error = map_http_status_with_body(400, body.as_bytes());
        assert!(matches!(
            error,
            GatewayError::Authentication(AuthenticationError::InvalidApiKey)
        ));
    }

    #[test]
    fn test_map_400_validation_details() {
        let body = r#"{"error":{"code":400,"message":"Invalid parameter","status":"INVALID_ARGUMENT","details":[{"field":"generationConfig.temperature","description":"out of range"}]}}"#;
        match map_http_status_with_body(400, body.as_bytes()) {
            GatewayError::Request(RequestError::ValidationError { message, details }) => {
                assert_eq!(message, "Invalid parameter");
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "generationConfig.temperature");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_404_model() {
        let body = r#"{"error":{"message":"models/experimental-x is not found for API version v1beta"}}"#;
        match map_http_status_with_body(404, body.as_bytes()) {
            GatewayError::Resource(ResourceError::ModelNotFound { model }) => {
                assert_eq!(model, "models/experimental-x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_413() {
        let body = r#"{"error":{"message":"Payload size 1000000 exceeds maximum 500000"}}"#;
        match map_http_status_with_body(413, body.as_bytes()) {
            GatewayError::Request(RequestError::PayloadTooLarge { size, max_size }) => {
                assert_eq!(size, 1_000_000);
                assert_eq!(max_size, 500_000);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_415() {
        let body = r#"{"error":{"message":"Unsupported media type: application/x-foo"}}"#;
        match map_http_status_with_body(415, body.as_bytes()) {
            GatewayError::Request(RequestError::UnsupportedMediaType { mime_type }) => {
                assert_eq!(mime_type, "application/x-foo");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_503_overloaded() {
        let error = map_http_status_with_body(503, b"The model is overloaded");
        assert!(matches!(
            error,
            GatewayError::Server(ServerError::ModelOverloaded { .. })
        ));
    }

    #[test]
    fn test_map_unknown_status() {
        match map_http_status_with_body(418, b"teapot") {
            GatewayError::Server(ServerError::InternalError { message }) => {
                assert_eq!(message, "HTTP 418: teapot");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
