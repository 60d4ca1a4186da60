//! # Gemini Gateway
//!
//! A provider gateway in front of the Google Gemini `generateContent` API.
//!
//! ## Features
//!
//! - Single-turn text generation and multi-turn chat completion
//! - Runtime API key rotation with sanitization and validation
//! - Per-call credential overrides
//! - Structured (JSON) output prompting
//! - Document attachments sent inline, degrading to text when unreadable
//! - One-shot fallback to a configured model for failed chat completions
//! - Per-call deadlines
//! - Observability (tracing, logging, metrics) and `SecretString` credentials
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gemini_gateway::{ChatMessage, Gateway, GatewayConfig, GenerationOptions};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::builder()
//!         .api_key(SecretString::new("your-api-key".into()))
//!         .build()?;
//!     let gateway = Gateway::new(config)?;
//!
//!     let haiku = gateway
//!         .generate_text("Write a haiku about Rust", &GenerationOptions::new())
//!         .await?;
//!     println!("{haiku}");
//!
//!     let reply = gateway
//!         .chat_completion(
//!             &[ChatMessage::user("List three colors")],
//!             &GenerationOptions::new().with_json_output(),
//!         )
//!         .await?;
//!     println!("{reply}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `gateway` - Public entry points, options and request composition
//! - `credentials` - API key sanitization, validation and rotation
//! - `attachments` - Attachment descriptors and their resolution to content parts
//! - `prompt` - JSON-output prompt formatting
//! - `client` - Gemini provider client and factory
//! - `transport` - HTTP transport layer
//! - `config` - Configuration types and builder
//! - `error` - Error types and taxonomy
//! - `types` - Wire types (Content, Part, Role, ...)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attachments;
pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod observability;
pub mod prompt;
pub mod transport;
pub mod types;

// Development/testing modules - always available for integration tests
pub mod fixtures;
pub mod mocks;

pub use attachments::{
    AttachmentDescriptor, AttachmentResolver, DocumentFormat, DocumentRef, FileReader, FsFileReader,
    ATTACHMENT_FAILURE_NOTICE, ATTACHMENT_PLACEHOLDER,
};
pub use auth::{ApiKeyAuthManager, AuthManager};
pub use client::{GeminiProviderClient, HttpProviderClientFactory, ProviderClient, ProviderClientFactory};
pub use config::{
    AuthMethod, GatewayConfig, GatewayConfigBuilder, HistoryMode, LogLevel, DEFAULT_API_VERSION,
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
pub use credentials::{sanitize_api_key, validate_api_key, ActiveClient, Credential, CredentialManager};
pub use error::{
    // Main error types
    GatewayError,
    GatewayResult,
    // Error categories
    AttachmentError,
    AuthenticationError,
    ConfigurationError,
    ContentError,
    CredentialError,
    NetworkError,
    RateLimitError,
    RequestError,
    ResourceError,
    ResponseError,
    ServerError,
    ValidationDetail,
};
pub use gateway::{compose_parts, ChatMessage, ChatRole, Gateway, GatewayBuilder, GenerationOptions};
pub use observability::{
    create_default_stack, create_noop_stack, GatewayMetrics, Logger, MetricsRecorder, Observability,
    Span, SpanStatus, StructuredLogger, Tracer, TracingMetricsRecorder, TracingTracer,
};
pub use prompt::{format_prompt, JSON_OUTPUT_INSTRUCTION};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
pub use types::{
    Blob, Candidate, Content, ContentPart, FinishReason, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, Part, Role, UsageMetadata,
};
