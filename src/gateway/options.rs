//! Per-call options and chat message types.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::attachments::AttachmentDescriptor;
use crate::error::{GatewayResult, RequestError, ValidationDetail};

/// Options accepted by [`Gateway::generate_text`](super::Gateway::generate_text)
/// and [`Gateway::chat_completion`](super::Gateway::chat_completion).
///
/// Unset fields fall back to the gateway configuration.
#[derive(Clone, Default)]
pub struct GenerationOptions {
    /// Model override.
    pub model: Option<String>,
    /// Sampling temperature, `0.0..=2.0`.
    pub temperature: Option<f32>,
    /// Maximum output tokens.
    pub max_tokens: Option<u32>,
    /// Ask the model for a bare JSON response.
    pub request_json: bool,
    /// Credential used for this call only.
    pub api_key: Option<SecretString>,
    /// Extra content appended to the prompt.
    pub content_attachment: Option<AttachmentDescriptor>,
    /// Deadline for the remote call.
    pub timeout: Option<Duration>,
}

impl GenerationOptions {
    /// Options with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the output token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask for a JSON response.
    pub fn with_json_output(mut self) -> Self {
        self.request_json = true;
        self
    }

    /// Use `api_key` for this call instead of the active credential.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into()));
        self
    }

    /// Attach extra content.
    pub fn with_attachment(mut self, attachment: AttachmentDescriptor) -> Self {
        self.content_attachment = Some(attachment);
        self
    }

    /// Set the remote-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reject values the provider would refuse.
    pub fn validate(&self) -> GatewayResult<()> {
        let mut details = Vec::new();

        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                details.push(ValidationDetail {
                    field: "model".to_string(),
                    description: "Model name cannot be empty".to_string(),
                });
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                details.push(ValidationDetail {
                    field: "temperature".to_string(),
                    description: format!("Temperature must be between 0.0 and 2.0, got {temperature}"),
                });
            }
        }

        if self.max_tokens == Some(0) {
            details.push(ValidationDetail {
                field: "max_tokens".to_string(),
                description: "Max tokens must be greater than 0".to_string(),
            });
        }

        if self.timeout.is_some_and(|t| t.is_zero()) {
            details.push(ValidationDetail {
                field: "timeout".to_string(),
                description: "Timeout must be greater than zero".to_string(),
            });
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(RequestError::ValidationError {
                message: "Invalid generation options".to_string(),
                details,
            }
            .into())
        }
    }
}

impl std::fmt::Debug for GenerationOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationOptions")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_json", &self.request_json)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("content_attachment", &self.content_attachment)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The end user.
    User,
    /// The model.
    Assistant,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
