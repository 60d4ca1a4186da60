//! Provider client trait definitions.

use async_trait::async_trait;
use std::sync::Arc;

use crate::credentials::Credential;
use crate::error::GatewayResult;
use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// Live handle to the remote model service.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Issue one `generateContent` call against `model`.
    async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> GatewayResult<GenerateContentResponse>;
}

/// Builds provider clients from credentials.
pub trait ProviderClientFactory: Send + Sync {
    /// Create a client authenticating with `credential`.
    fn create(&self, credential: &Credential) -> GatewayResult<Arc<dyn ProviderClient>>;
}
