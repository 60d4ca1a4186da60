//! Authentication for Gemini API requests.

use crate::config::AuthMethod;
use secrecy::{ExposeSecret, SecretString};

/// Supplies the credential for outgoing requests.
pub trait AuthManager: Send + Sync {
    /// Get the authentication header name and value.
    fn get_auth_header(&self) -> Option<(String, String)>;

    /// Get the authentication query parameter.
    fn get_auth_query_param(&self) -> Option<(String, String)>;
}

/// API key authentication manager.
pub struct ApiKeyAuthManager {
    api_key: SecretString,
    auth_method: AuthMethod,
}

impl ApiKeyAuthManager {
    /// Create a new API key auth manager.
    pub fn new(api_key: SecretString, auth_method: AuthMethod) -> Self {
        Self { api_key, auth_method }
    }
}

impl std::fmt::Debug for ApiKeyAuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuthManager")
            .field("api_key", &"<redacted>")
            .field("auth_method", &self.auth_method)
            .finish()
    }
}

impl AuthManager for ApiKeyAuthManager {
    fn get_auth_header(&self) -> Option<(String, String)> {
        match self.auth_method {
            AuthMethod::Header => Some((
                "x-goog-api-key".to_string(),
                self.api_key.expose_secret().to_string(),
            )),
            AuthMethod::QueryParam => None,
        }
    }

    fn get_auth_query_param(&self) -> Option<(String, String)> {
        match self.auth_method {
            AuthMethod::QueryParam => Some((
                "key".to_string(),
                self.api_key.expose_secret().to_string(),
            )),
            AuthMethod::Header => None,
        }
    }
}
