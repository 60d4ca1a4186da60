//! HTTP request builder for the Gemini API.
//!
//! The `RequestBuilder` handles URL construction with the API version prefix,
//! authentication via the configured [`AuthManager`], and JSON body
//! serialization.

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::auth::AuthManager;
use crate::error::GatewayError;
use super::http::{HttpRequest, HttpMethod};

/// Builder for constructing HTTP requests to the Gemini API.
#[derive(Clone)]
pub struct RequestBuilder {
    base_url: Url,
    api_version: String,
    auth_manager: Arc<dyn AuthManager>,
}

impl RequestBuilder {
    /// Creates a new request builder.
    ///
    /// # Example
    ///
    /// ```
    /// use gemini_gateway::auth::ApiKeyAuthManager;
    /// use gemini_gateway::config::{AuthMethod, GatewayConfig};
    /// use gemini_gateway::transport::RequestBuilder;
    /// use secrecy::SecretString;
    /// use std::sync::Arc;
    ///
    /// let config = GatewayConfig::default();
    /// let auth = ApiKeyAuthManager::new(SecretString::new("test-key".into()), AuthMethod::Header);
    /// let builder = RequestBuilder::new(config.base_url, config.api_version, Arc::new(auth));
    ///
    /// let url = builder.build_url("/models/gemini-2.0-flash:generateContent").unwrap();
    /// assert_eq!(
    ///     url.as_str(),
    ///     "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
    /// );
    /// ```
    pub fn new(base_url: Url, api_version: String, auth_manager: Arc<dyn AuthManager>) -> Self {
        Self {
            base_url,
            api_version,
            auth_manager,
        }
    }

    /// Builds a complete URL for the given path.
    ///
    /// Prepends the API version, joins with the base URL, and appends the
    /// `key` query parameter when query-parameter auth is configured.
    pub fn build_url(&self, path: &str) -> Result<Url, GatewayError> {
        let path = path.trim_start_matches('/');
        let full_path = format!("{}/{}", self.api_version, path);

        let mut url = self.base_url.join(&full_path)?;

        if let Some((key, value)) = self.auth_manager.get_auth_query_param() {
            url.query_pairs_mut().append_pair(&key, &value);
        }

        Ok(url)
    }

    /// Builds an HTTP request, serializing `body` as JSON.
    pub fn build_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&T>,
        extra_headers: Option<HashMap<String, String>>,
    ) -> Result<HttpRequest, GatewayError> {
        let url = self.build_url(path)?;

        let mut headers = HashMap::new();

        if body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }

        if let Some((key, value)) = self.auth_manager.get_auth_header() {
            headers.insert(key, value);
        }

        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let body_bytes = match body {
            Some(body) => Some(Bytes::from(serde_json::to_vec(body)?)),
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body: body_bytes,
        })
    }
}
