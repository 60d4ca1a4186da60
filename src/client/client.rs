//! HTTP provider client for the Gemini `generateContent` API.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::auth::{ApiKeyAuthManager, AuthManager};
use crate::config::GatewayConfig;
use crate::credentials::Credential;
use crate::error::{ContentError, GatewayError, GatewayResult, ResponseError, SafetyRatingInfo};
use crate::observability::{Observability, SpanStatus};
use crate::transport::{endpoints, HttpMethod, HttpTransport, RequestBuilder, ResponseParser};
use crate::types::{
    BlockReason, FinishReason, GenerateContentRequest, GenerateContentResponse, SafetyRating,
};

use super::traits::{ProviderClient, ProviderClientFactory};
use super::validation::validate_generate_request;

/// Provider client that talks to Gemini over an [`HttpTransport`].
pub struct GeminiProviderClient {
    transport: Arc<dyn HttpTransport>,
    request_builder: RequestBuilder,
    observability: Observability,
}

impl GeminiProviderClient {
    /// Create a client from its parts.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        request_builder: RequestBuilder,
        observability: Observability,
    ) -> Self {
        Self {
            transport,
            request_builder,
            observability,
        }
    }

    fn log_usage(&self, model: &str, response: &GenerateContentResponse, duration_ms: u64) {
        let candidates = response.candidates.as_ref().map(Vec::len).unwrap_or(0);

        match &response.usage_metadata {
            Some(usage) => {
                let completion_tokens = usage.candidates_token_count.unwrap_or(0);
                self.observability
                    .metrics
                    .record_tokens(model, usage.prompt_token_count, completion_tokens);
                self.observability.logger.info(
                    "Content generation completed",
                    json!({
                        "model": model,
                        "duration_ms": duration_ms,
                        "prompt_tokens": usage.prompt_token_count,
                        "completion_tokens": completion_tokens,
                        "total_tokens": usage.total_token_count,
                        "candidates": candidates,
                    }),
                );
            }
            None => self.observability.logger.info(
                "Content generation completed",
                json!({ "model": model, "duration_ms": duration_ms, "candidates": candidates }),
            ),
        }
    }
}

#[async_trait]
impl ProviderClient for GeminiProviderClient {
    async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> GatewayResult<GenerateContentResponse> {
        let mut span = self.observability.tracer.start_span("gemini.generate_content");
        span.set_attribute("model", model);

        let start = Instant::now();

        self.observability.logger.debug(
            "Sending generateContent request",
            json!({
                "model": model,
                "contents_count": request.contents.len(),
                "has_generation_config": request.generation_config.is_some(),
            }),
        );

        let result = async {
            validate_generate_request(&request)?;

            let http_request = self.request_builder.build_request(
                HttpMethod::Post,
                &endpoints::generate_content(model),
                Some(&request),
                None,
            )?;

            let http_response = self.transport.send(http_request).await?;
            let response: GenerateContentResponse = ResponseParser::parse_response(http_response)?;

            check_safety_blocks(&response)?;
            Ok::<_, GatewayError>(response)
        }
        .await;

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(response) => {
                self.log_usage(model, &response, duration_ms);
                span.set_status(SpanStatus::Ok);
                span.end();
                Ok(response)
            }
            Err(error) => {
                if let GatewayError::Content(content_error) = &error {
                    let reason = match content_error {
                        ContentError::SafetyBlocked { .. } => "safety",
                        ContentError::RecitationBlocked => "recitation",
                        ContentError::ProhibitedContent => "prohibited_content",
                    };
                    self.observability.metrics.record_safety_block(model, reason);
                }

                self.observability.logger.error(
                    "Content generation failed",
                    json!({
                        "model": model,
                        "duration_ms": duration_ms,
                        "error": error.to_string(),
                        "kind": error.kind(),
                    }),
                );
                span.set_status(SpanStatus::Error(error.to_string()));
                span.end();
                Err(error)
            }
        }
    }
}

fn rating_infos(ratings: Option<&Vec<SafetyRating>>) -> Vec<SafetyRatingInfo> {
    ratings
        .map(|ratings| {
            ratings
                .iter()
                .map(|r| SafetyRatingInfo {
                    category: format!("{:?}", r.category),
                    probability: format!("{:?}", r.probability),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn safety_reason(infos: &[SafetyRatingInfo]) -> String {
    infos
        .first()
        .map(|r| format!("Safety: {} ({})", r.category, r.probability))
        .unwrap_or_else(|| "Safety (unspecified)".to_string())
}

/// Turn prompt-level and candidate-level blocks into [`ContentError`]s.
pub fn check_safety_blocks(response: &GenerateContentResponse) -> GatewayResult<()> {
    if let Some((feedback, reason)) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_ref().map(|reason| (feedback, reason)))
    {
        tracing::warn!(block_reason = ?reason, "Prompt blocked by provider");

        return match reason {
            BlockReason::Safety => {
                let safety_ratings = rating_infos(feedback.safety_ratings.as_ref());
                Err(ContentError::SafetyBlocked {
                    reason: safety_reason(&safety_ratings),
                    safety_ratings,
                }
                .into())
            }
            BlockReason::Blocklist | BlockReason::ProhibitedContent => {
                Err(ContentError::ProhibitedContent.into())
            }
            BlockReason::Other => Ok(()),
        };
    }

    for (index, candidate) in response.candidates.iter().flatten().enumerate() {
        let error = match candidate.finish_reason {
            Some(FinishReason::Safety) => {
                let safety_ratings = rating_infos(candidate.safety_ratings.as_ref());
                ContentError::SafetyBlocked {
                    reason: safety_reason(&safety_ratings),
                    safety_ratings,
                }
            }
            Some(FinishReason::Recitation) => ContentError::RecitationBlocked,
            Some(FinishReason::ProhibitedContent | FinishReason::Blocklist) => {
                ContentError::ProhibitedContent
            }
            _ => continue,
        };

        tracing::warn!(
            candidate_index = index,
            finish_reason = ?candidate.finish_reason,
            "Candidate blocked by provider"
        );
        return Err(error.into());
    }

    Ok(())
}

/// Extract the generated text, failing when the provider returned none.
pub fn extract_text(response: &GenerateContentResponse) -> GatewayResult<String> {
    response
        .text()
        .ok_or(GatewayError::Response(ResponseError::EmptyResponse))
}

/// Factory producing [`GeminiProviderClient`]s that share one transport.
pub struct HttpProviderClientFactory {
    config: Arc<GatewayConfig>,
    transport: Arc<dyn HttpTransport>,
    observability: Observability,
}

impl HttpProviderClientFactory {
    /// Create a factory.
    pub fn new(
        config: Arc<GatewayConfig>,
        transport: Arc<dyn HttpTransport>,
        observability: Observability,
    ) -> Self {
        Self {
            config,
            transport,
            observability,
        }
    }
}

impl ProviderClientFactory for HttpProviderClientFactory {
    fn create(&self, credential: &Credential) -> GatewayResult<Arc<dyn ProviderClient>> {
        let auth_manager: Arc<dyn AuthManager> = Arc::new(ApiKeyAuthManager::new(
            credential.secret().clone(),
            self.config.auth_method,
        ));

        let request_builder = RequestBuilder::new(
            self.config.base_url.clone(),
            self.config.api_version.clone(),
            auth_manager,
        );

        Ok(Arc::new(GeminiProviderClient::new(
            Arc::clone(&self.transport),
            request_builder,
            self.observability.clone(),
        )))
    }
}
