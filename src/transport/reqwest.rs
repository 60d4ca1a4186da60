//! Reqwest-based HTTP transport implementation.

use super::http::{HttpTransport, HttpRequest, HttpResponse, HttpMethod};
use super::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Reqwest-based HTTP transport.
///
/// One instance is shared by every provider client the gateway creates, so
/// credential rotation reuses the connection pool. Only connection setup is
/// bounded here; the overall deadline belongs to the caller.
pub struct ReqwestTransport {
    client: Client,
    connect_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a new reqwest transport with the given connect timeout.
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| TransportError::Connection(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            connect_timeout,
        })
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }

    fn convert_headers(headers: HashMap<String, String>) -> reqwest::header::HeaderMap {
        let mut header_map = reqwest::header::HeaderMap::new();
        for (key, value) in headers {
            if let (Ok(name), Ok(val)) = (
                reqwest::header::HeaderName::from_bytes(key.as_bytes()),
                reqwest::header::HeaderValue::from_str(&value),
            ) {
                header_map.insert(name, val);
            }
        }
        header_map
    }

    fn extract_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = Self::convert_method(request.method);
        let headers = Self::convert_headers(request.headers);

        let mut req_builder = self.client
            .request(method, &request.url)
            .headers(headers);

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.connect_timeout)
                } else {
                    TransportError::Connection(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let response_headers = Self::extract_headers(response.headers());
        let body = response.bytes().await
            .map_err(|e| TransportError::Request(format!("Failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}
