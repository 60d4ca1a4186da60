//! The generation gateway.
//!
//! [`Gateway`] is the public entry point. Each call resolves its client,
//! model and generation parameters, composes the request content, and issues
//! the remote call under a deadline. `chat_completion` falls back once to the
//! configured fallback model when an explicitly requested model fails.

mod builder;
mod compose;
mod options;

pub use builder::GatewayBuilder;
pub use compose::compose_parts;
pub use options::{ChatMessage, ChatRole, GenerationOptions};

use secrecy::ExposeSecret;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::attachments::AttachmentResolver;
use crate::client::{extract_text, ProviderClient};
use crate::config::{GatewayConfig, HistoryMode};
use crate::credentials::CredentialManager;
use crate::error::{GatewayError, GatewayResult, NetworkError, RequestError, ValidationDetail};
use crate::observability::{Observability, Span, SpanStatus};
use crate::prompt::format_prompt;
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Part, Role};

use compose::to_wire;

/// Everything a single remote call needs, fixed at call start.
struct ResolvedCall {
    client: Arc<dyn ProviderClient>,
    model: String,
    generation_config: GenerationConfig,
    deadline: Duration,
}

/// Gateway to the Gemini generation API.
pub struct Gateway {
    config: Arc<GatewayConfig>,
    credentials: CredentialManager,
    attachments: AttachmentResolver,
    observability: Observability,
}

impl Gateway {
    /// Creates a new gateway builder.
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Creates a gateway from a configuration object.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        GatewayBuilder::new().config(config).build()
    }

    /// Creates a gateway configured from environment variables.
    ///
    /// See [`GatewayConfig::from_env`].
    pub fn from_env() -> GatewayResult<Self> {
        Self::new(GatewayConfig::from_env()?)
    }

    /// Returns the gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Replace the active API key. See [`CredentialManager::set_api_key`].
    pub fn set_api_key(&self, raw: &str) -> GatewayResult<()> {
        self.credentials.set_api_key(raw)
    }

    /// Whether an API key is active.
    pub fn is_configured(&self) -> bool {
        self.credentials.is_configured()
    }

    /// Drop the active API key.
    pub fn clear_api_key(&self) {
        self.credentials.clear();
    }

    /// Generate text for a single prompt.
    ///
    /// Exactly one remote call is made; failures are returned unchanged.
    pub async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> GatewayResult<String> {
        let request_id = Uuid::new_v4().to_string();
        let mut span = self.observability.tracer.start_span("gateway.generate_text");
        span.set_attribute("request_id", &request_id);

        let result = async {
            let call = self.resolve(options)?;
            span.set_attribute("model", &call.model);

            let formatted = format_prompt(prompt, options.request_json);
            let attachment_parts = self
                .attachments
                .resolve(options.content_attachment.as_ref())
                .await;
            let parts = compose_parts(formatted, attachment_parts);

            let contents = vec![Content::new(Role::User, to_wire(parts))];
            self.invoke(&call, contents, "generate_text", &request_id).await
        }
        .await;

        match &result {
            Ok(_) => span.set_status(SpanStatus::Ok),
            Err(error) => {
                self.observability.logger.error(
                    "Text generation failed",
                    json!({ "request_id": request_id, "error": error.to_string(), "kind": error.kind() }),
                );
                span.set_status(SpanStatus::Error(error.to_string()));
            }
        }
        span.end();

        result
    }

    /// Complete a conversation.
    ///
    /// Only the final message is augmented with the JSON instruction and,
    /// when it comes from the user, the attachment. Which earlier turns are
    /// sent is governed by [`GatewayConfig::history_mode`]. If the call fails
    /// and `options.model` names a model other than the fallback model, the
    /// call is retried once against the fallback model.
    pub async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> GatewayResult<String> {
        let request_id = Uuid::new_v4().to_string();
        let mut span = self.observability.tracer.start_span("gateway.chat_completion");
        span.set_attribute("request_id", &request_id);
        span.set_attribute("message_count", &messages.len().to_string());

        let result = self.run_chat(messages, options, &request_id, &mut *span).await;

        match &result {
            Ok(_) => span.set_status(SpanStatus::Ok),
            Err(error) => {
                self.observability.logger.error(
                    "Chat completion failed",
                    json!({ "request_id": request_id, "error": error.to_string(), "kind": error.kind() }),
                );
                span.set_status(SpanStatus::Error(error.to_string()));
            }
        }
        span.end();

        result
    }

    async fn run_chat(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
        request_id: &str,
        span: &mut dyn Span,
    ) -> GatewayResult<String> {
        let Some((last, history)) = messages.split_last() else {
            return Err(RequestError::ValidationError {
                message: "Chat completion requires at least one message".to_string(),
                details: vec![ValidationDetail {
                    field: "messages".to_string(),
                    description: "Messages cannot be empty".to_string(),
                }],
            }
            .into());
        };

        let mut call = self.resolve(options)?;
        span.set_attribute("model", &call.model);

        let contents = self.chat_contents(last, history, options).await;

        let fallback_model = options
            .model
            .as_deref()
            .filter(|requested| *requested != self.config.fallback_model)
            .map(|_| self.config.fallback_model.clone());

        let error = match self.invoke(&call, contents.clone(), "chat_completion", request_id).await {
            Ok(text) => return Ok(text),
            Err(error) => error,
        };

        let Some(fallback_model) = fallback_model else {
            return Err(error);
        };

        self.observability.logger.warn(
            "Chat completion failed; retrying with fallback model",
            json!({
                "request_id": request_id,
                "model": call.model,
                "fallback_model": fallback_model,
                "error": error.to_string(),
            }),
        );
        self.observability.metrics.record_fallback(&call.model, &fallback_model);
        span.add_event(
            "fallback",
            Some(HashMap::from([
                ("from_model".to_string(), call.model.clone()),
                ("to_model".to_string(), fallback_model.clone()),
            ])),
        );

        // The retry runs with whichever credential is active at this point.
        call.client = self.resolve_client(options)?;
        call.model = fallback_model;
        self.invoke(&call, contents, "chat_completion", request_id).await
    }

    async fn chat_contents(
        &self,
        last: &ChatMessage,
        history: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Vec<Content> {
        let attachment_parts = match last.role {
            ChatRole::User => {
                self.attachments
                    .resolve(options.content_attachment.as_ref())
                    .await
            }
            ChatRole::Assistant => Vec::new(),
        };
        let parts = compose_parts(format_prompt(&last.content, options.request_json), attachment_parts);
        let final_turn = Content::new(translate_role(last.role), to_wire(parts));

        match self.config.history_mode {
            HistoryMode::FullConversation => history
                .iter()
                .map(|message| {
                    Content::new(translate_role(message.role), vec![Part::text(message.content.as_str())])
                })
                .chain(std::iter::once(final_turn))
                .collect(),
            HistoryMode::FinalTurnOnly => vec![final_turn],
        }
    }

    fn resolve(&self, options: &GenerationOptions) -> GatewayResult<ResolvedCall> {
        options.validate()?;

        let model = options
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());

        let generation_config = GenerationConfig {
            temperature: Some(options.temperature.unwrap_or(self.config.default_temperature)),
            max_output_tokens: Some(options.max_tokens.unwrap_or(self.config.default_max_tokens)),
        };

        Ok(ResolvedCall {
            client: self.resolve_client(options)?,
            model,
            generation_config,
            deadline: options.timeout.unwrap_or(self.config.timeout),
        })
    }

    fn resolve_client(&self, options: &GenerationOptions) -> GatewayResult<Arc<dyn ProviderClient>> {
        if let Some(api_key) = &options.api_key {
            return self.credentials.transient_client(api_key.expose_secret());
        }

        self.credentials
            .snapshot()
            .map(|active| active.client())
            .ok_or(GatewayError::NotConfigured)
    }

    async fn invoke(
        &self,
        call: &ResolvedCall,
        contents: Vec<Content>,
        operation: &str,
        request_id: &str,
    ) -> GatewayResult<String> {
        let request = GenerateContentRequest {
            contents,
            generation_config: Some(call.generation_config.clone()),
        };

        self.observability.logger.debug(
            "Issuing remote call",
            json!({
                "request_id": request_id,
                "operation": operation,
                "model": call.model,
                "turns": request.contents.len(),
                "parts": request.contents.last().map(|c| c.parts.len()).unwrap_or(0),
            }),
        );

        let start = Instant::now();
        let result = match tokio::time::timeout(
            call.deadline,
            call.client.generate_content(&call.model, request),
        )
        .await
        {
            Ok(response) => response.and_then(|response| extract_text(&response)),
            Err(_) => Err(NetworkError::Timeout {
                duration: call.deadline,
            }
            .into()),
        };
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let outcome = match &result {
            Ok(_) => "ok",
            Err(error) => error.kind(),
        };
        self.observability
            .metrics
            .record_request(operation, &call.model, outcome, duration_ms);

        result
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

fn translate_role(role: ChatRole) -> Role {
    match role {
        ChatRole::User => Role::User,
        ChatRole::Assistant => Role::Model,
    }
}
