//! Builder for [`Gateway`] instances.

use secrecy::ExposeSecret;
use std::sync::Arc;

use crate::attachments::{AttachmentResolver, FileReader, FsFileReader};
use crate::client::{HttpProviderClientFactory, ProviderClientFactory};
use crate::config::GatewayConfig;
use crate::credentials::CredentialManager;
use crate::error::GatewayResult;
use crate::observability::{create_default_stack, GatewayMetrics, Logger, MetricsRecorder, Tracer};
use crate::transport::{HttpTransport, ReqwestTransport};

use super::Gateway;

const SERVICE_NAME: &str = "gateway";

/// Builder for a [`Gateway`].
///
/// Every collaborator can be replaced, which is how tests swap in mocks.
///
/// # Example
///
/// ```no_run
/// use gemini_gateway::{Gateway, GatewayConfig};
/// use secrecy::SecretString;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GatewayConfig::builder()
///     .api_key(SecretString::new("your-api-key".into()))
///     .build()?;
///
/// let gateway = Gateway::builder().config(config).build()?;
/// assert!(gateway.is_configured());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct GatewayBuilder {
    config: Option<GatewayConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    provider_factory: Option<Arc<dyn ProviderClientFactory>>,
    file_reader: Option<Arc<dyn FileReader>>,
    logger: Option<Arc<dyn Logger>>,
    tracer: Option<Arc<dyn Tracer>>,
    metrics: Option<Box<dyn MetricsRecorder>>,
}

impl GatewayBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the HTTP transport used by the default provider factory.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replaces the provider client factory. The transport is then unused.
    pub fn provider_factory(mut self, factory: Arc<dyn ProviderClientFactory>) -> Self {
        self.provider_factory = Some(factory);
        self
    }

    /// Sets the attachment file reader.
    pub fn file_reader(mut self, reader: Arc<dyn FileReader>) -> Self {
        self.file_reader = Some(reader);
        self
    }

    /// Sets a custom logger.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Sets a custom tracer.
    pub fn tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Sets a custom metrics recorder.
    pub fn metrics(mut self, recorder: Box<dyn MetricsRecorder>) -> Self {
        self.metrics = Some(recorder);
        self
    }

    /// Builds the gateway.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP transport cannot be created or the configured
    /// initial API key is invalid.
    pub fn build(self) -> GatewayResult<Gateway> {
        let config = Arc::new(self.config.unwrap_or_default());

        let mut observability = create_default_stack(SERVICE_NAME, config.log_level);
        if let Some(logger) = self.logger {
            observability.logger = logger;
        }
        if let Some(tracer) = self.tracer {
            observability.tracer = tracer;
        }
        if let Some(recorder) = self.metrics {
            observability.metrics = Arc::new(GatewayMetrics::new(SERVICE_NAME, recorder));
        }

        let provider_factory: Arc<dyn ProviderClientFactory> = match self.provider_factory {
            Some(factory) => factory,
            None => {
                let transport: Arc<dyn HttpTransport> = match self.transport {
                    Some(transport) => transport,
                    None => Arc::new(ReqwestTransport::new(config.connect_timeout)?),
                };
                Arc::new(HttpProviderClientFactory::new(
                    Arc::clone(&config),
                    transport,
                    observability.clone(),
                ))
            }
        };

        let credentials = CredentialManager::new(
            provider_factory,
            Arc::clone(&observability.logger),
            Arc::clone(&observability.metrics),
        );
        if let Some(api_key) = &config.api_key {
            credentials.set_api_key(api_key.expose_secret())?;
        }

        let attachments = AttachmentResolver::new(
            self.file_reader.unwrap_or_else(|| Arc::new(FsFileReader)),
            config.max_attachment_bytes,
            Arc::clone(&observability.logger),
            Arc::clone(&observability.metrics),
        );

        observability.logger.info(
            "Gateway initialized",
            serde_json::json!({
                "base_url": config.base_url.as_str(),
                "api_version": config.api_version,
                "default_model": config.default_model,
                "fallback_model": config.fallback_model,
                "history_mode": format!("{:?}", config.history_mode),
                "configured": credentials.is_configured(),
            }),
        );

        Ok(Gateway {
            config,
            credentials,
            attachments,
            observability,
        })
    }
}
