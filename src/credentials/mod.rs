//! Credential lifecycle for the gateway.
//!
//! The [`CredentialManager`] owns the single active API key together with the
//! provider client built from it. Keys are sanitized and validated before a
//! client is constructed, and the pair is swapped in as one unit so that a
//! failed update never leaves a half-applied state behind.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::sync::{Arc, PoisonError, RwLock};

use crate::client::{ProviderClient, ProviderClientFactory};
use crate::error::{CredentialError, GatewayResult};
use crate::observability::{GatewayMetrics, Logger};

/// Strip whitespace and anything outside printable ASCII.
///
/// # Example
///
/// ```
/// use gemini_gateway::credentials::sanitize_api_key;
///
/// assert_eq!(sanitize_api_key("  sk-AbC123\u{2014} "), "sk-AbC123");
/// ```
pub fn sanitize_api_key(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_graphic).collect()
}

/// Check that a sanitized key is non-empty and matches `[A-Za-z0-9_-]+`.
pub fn validate_api_key(key: &str) -> Result<(), CredentialError> {
    if key.is_empty() {
        return Err(CredentialError::Empty);
    }

    match key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        Some(ch) => Err(CredentialError::InvalidCharacter { ch }),
        None => Ok(()),
    }
}

/// A sanitized, validated API key.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Sanitize and validate `raw`.
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        let sanitized = sanitize_api_key(raw);
        validate_api_key(&sanitized)?;
        Ok(Self(SecretString::new(sanitized)))
    }

    /// The key material.
    pub fn secret(&self) -> &SecretString {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// The active credential and the client constructed from it.
pub struct ActiveClient {
    credential: Credential,
    client: Arc<dyn ProviderClient>,
}

impl ActiveClient {
    /// The credential this client authenticates with.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// The provider client.
    pub fn client(&self) -> Arc<dyn ProviderClient> {
        Arc::clone(&self.client)
    }
}

/// Owner of the process-wide active credential.
pub struct CredentialManager {
    active: RwLock<Option<Arc<ActiveClient>>>,
    factory: Arc<dyn ProviderClientFactory>,
    logger: Arc<dyn Logger>,
    metrics: Arc<GatewayMetrics>,
}

impl CredentialManager {
    /// Create an unconfigured manager.
    pub fn new(
        factory: Arc<dyn ProviderClientFactory>,
        logger: Arc<dyn Logger>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            active: RwLock::new(None),
            factory,
            logger,
            metrics,
        }
    }

    /// Replace the active credential.
    ///
    /// On any error the previous credential and client stay active.
    pub fn set_api_key(&self, raw: &str) -> GatewayResult<()> {
        let credential = self.parse_logged(raw)?;
        let client = self.factory.create(&credential)?;

        let next = Arc::new(ActiveClient { credential, client });
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(next);

        self.metrics.record_credential_rotation();
        self.logger.info("API key updated", json!({}));
        Ok(())
    }

    /// Whether a credential and client are active.
    pub fn is_configured(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The active pair as of now. Later updates do not affect the snapshot.
    pub fn snapshot(&self) -> Option<Arc<ActiveClient>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the active credential.
    pub fn clear(&self) {
        let previous = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if previous.is_some() {
            self.logger.info("API key cleared", json!({}));
        }
    }

    /// Build a client for a single call without touching the active state.
    pub fn transient_client(&self, raw: &str) -> GatewayResult<Arc<dyn ProviderClient>> {
        let credential = self.parse_logged(raw)?;
        self.factory.create(&credential)
    }

    fn parse_logged(&self, raw: &str) -> GatewayResult<Credential> {
        let credential = Credential::parse(raw).map_err(|e| {
            self.logger.error(
                "Rejected API key",
                json!({ "reason": e.to_string() }),
            );
            e
        })?;

        if credential.secret().expose_secret() != raw {
            self.logger.warn(
                "API key contained whitespace or non-printable characters; they were removed",
                json!({
                    "original_length": raw.chars().count(),
                    "sanitized_length": credential.secret().expose_secret().len(),
                }),
            );
        }

        Ok(credential)
    }
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}
