//! Configuration types for the gateway.

use secrecy::SecretString;
use std::time::Duration;
use url::Url;
use crate::error::{ConfigurationError, GatewayError};

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default API version.
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// Default request timeout (120 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default model used when a call does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default maximum number of output tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 100;

/// Largest document accepted as inline data (Gemini's 20 MiB request limit).
pub const DEFAULT_MAX_ATTACHMENT_BYTES: usize = 20 * 1024 * 1024;

/// Authentication method for the API key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// Use x-goog-api-key header (recommended).
    #[default]
    Header,
    /// Use ?key= query parameter.
    QueryParam,
}

/// Log level for the gateway's structured logger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Errors and warnings.
    Warn,
    /// General information.
    #[default]
    Info,
    /// Detailed information.
    Debug,
    /// Very detailed information.
    Trace,
}

/// Which chat turns are transmitted to the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HistoryMode {
    /// Every role-translated turn is sent; only the final one is augmented.
    #[default]
    FullConversation,
    /// Only the final (augmented) turn is sent.
    FinalTurnOnly,
}

/// Configuration for the gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Initial API key, applied through the credential manager at build time.
    pub api_key: Option<SecretString>,
    /// Base URL for the API.
    pub base_url: Url,
    /// API version.
    pub api_version: String,
    /// Default deadline for a single remote call. `GenerationOptions::timeout` overrides it.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Model used when a call does not name one.
    pub default_model: String,
    /// Model substituted when a chat call with an explicit model fails.
    pub fallback_model: String,
    /// Temperature used when a call does not set one.
    pub default_temperature: f32,
    /// Output token budget used when a call does not set one.
    pub default_max_tokens: u32,
    /// Chat history transmission policy.
    pub history_mode: HistoryMode,
    /// Largest document attached inline.
    pub max_attachment_bytes: usize,
    /// Log level.
    pub log_level: LogLevel,
    /// Authentication method.
    pub auth_method: AuthMethod,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url.as_str())
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("default_model", &self.default_model)
            .field("fallback_model", &self.fallback_model)
            .field("history_mode", &self.history_mode)
            .finish_non_exhaustive()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            default_model: DEFAULT_MODEL.to_string(),
            fallback_model: DEFAULT_MODEL.to_string(),
            default_temperature: DEFAULT_TEMPERATURE,
            default_max_tokens: DEFAULT_MAX_TOKENS,
            history_mode: HistoryMode::default(),
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            log_level: LogLevel::default(),
            auth_method: AuthMethod::default(),
        }
    }
}

fn default_base_url() -> Url {
    // Constant input; parse cannot fail.
    Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|_| unreachable!("default base URL is valid"))
}

impl GatewayConfig {
    /// Create a new configuration builder.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `GEMINI_API_KEY` or `GOOGLE_API_KEY` (optional; the gateway starts
    ///   unconfigured without one)
    /// - `GEMINI_BASE_URL`, `GEMINI_API_VERSION`, `GEMINI_TIMEOUT_SECS`
    /// - `GEMINI_MODEL`, `GEMINI_FALLBACK_MODEL`
    pub fn from_env() -> Result<Self, GatewayError> {
        let mut builder = Self::builder();

        if let Ok(key) = std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("GOOGLE_API_KEY")) {
            builder = builder.api_key(SecretString::new(key));
        }

        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            builder = builder.base_url(&base_url)?;
        }

        if let Ok(version) = std::env::var("GEMINI_API_VERSION") {
            builder = builder.api_version(&version);
        }

        if let Ok(raw) = std::env::var("GEMINI_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigurationError::InvalidEnvValue {
                key: "GEMINI_TIMEOUT_SECS".to_string(),
                value: raw.clone(),
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            builder = builder.default_model(&model);
        }

        if let Ok(model) = std::env::var("GEMINI_FALLBACK_MODEL") {
            builder = builder.fallback_model(&model);
        }

        builder.build()
    }
}

/// Builder for [`GatewayConfig`].
#[derive(Default)]
pub struct GatewayConfigBuilder {
    api_key: Option<SecretString>,
    base_url: Option<Url>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    default_model: Option<String>,
    fallback_model: Option<String>,
    default_temperature: Option<f32>,
    default_max_tokens: Option<u32>,
    history_mode: Option<HistoryMode>,
    max_attachment_bytes: Option<usize>,
    log_level: Option<LogLevel>,
    auth_method: Option<AuthMethod>,
}

impl GatewayConfigBuilder {
    /// Set the initial API key.
    pub fn api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: &str) -> Result<Self, GatewayError> {
        self.base_url = Some(Url::parse(base_url)?);
        Ok(self)
    }

    /// Set the API version.
    pub fn api_version(mut self, version: &str) -> Self {
        self.api_version = Some(version.to_string());
        self
    }

    /// Set the per-call deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the default model.
    pub fn default_model(mut self, model: &str) -> Self {
        self.default_model = Some(model.to_string());
        self
    }

    /// Set the chat fallback model. Defaults to the default model.
    pub fn fallback_model(mut self, model: &str) -> Self {
        self.fallback_model = Some(model.to_string());
        self
    }

    /// Set the default temperature.
    pub fn default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = Some(temperature);
        self
    }

    /// Set the default output token budget.
    pub fn default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = Some(max_tokens);
        self
    }

    /// Set the chat history transmission policy.
    pub fn history_mode(mut self, mode: HistoryMode) -> Self {
        self.history_mode = Some(mode);
        self
    }

    /// Set the largest document attached inline.
    pub fn max_attachment_bytes(mut self, max: usize) -> Self {
        self.max_attachment_bytes = Some(max);
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the authentication method.
    pub fn auth_method(mut self, method: AuthMethod) -> Self {
        self.auth_method = Some(method);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<GatewayConfig, GatewayError> {
        let defaults = GatewayConfig::default();

        let default_model = self.default_model.unwrap_or(defaults.default_model);
        if default_model.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "default model must not be empty".to_string(),
            }
            .into());
        }
        let fallback_model = self.fallback_model.unwrap_or_else(|| default_model.clone());

        let timeout = self.timeout.unwrap_or(defaults.timeout);
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(GatewayConfig {
            api_key: self.api_key,
            base_url: self.base_url.unwrap_or(defaults.base_url),
            api_version: self.api_version.unwrap_or(defaults.api_version),
            timeout,
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            default_model,
            fallback_model,
            default_temperature: self.default_temperature.unwrap_or(defaults.default_temperature),
            default_max_tokens: self.default_max_tokens.unwrap_or(defaults.default_max_tokens),
            history_mode: self.history_mode.unwrap_or(defaults.history_mode),
            max_attachment_bytes: self.max_attachment_bytes.unwrap_or(defaults.max_attachment_bytes),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            auth_method: self.auth_method.unwrap_or(defaults.auth_method),
        })
    }
}
