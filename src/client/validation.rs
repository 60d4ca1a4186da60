//! Validation for outgoing `generateContent` requests.

use crate::error::{GatewayError, GatewayResult, RequestError, ValidationDetail};
use crate::types::{GenerateContentRequest, GenerationConfig, Part};

/// Validate a generate content request before it is sent.
pub fn validate_generate_request(request: &GenerateContentRequest) -> GatewayResult<()> {
    let mut details = Vec::new();

    if request.contents.is_empty() {
        details.push(ValidationDetail {
            field: "contents".to_string(),
            description: "Contents array cannot be empty".to_string(),
        });
    }

    for (idx, content) in request.contents.iter().enumerate() {
        if content.parts.is_empty() {
            details.push(ValidationDetail {
                field: format!("contents[{idx}].parts"),
                description: "Content must have at least one part".to_string(),
            });
        }

        for (part_idx, part) in content.parts.iter().enumerate() {
            validate_part(part, &format!("contents[{idx}].parts[{part_idx}]"), &mut details);
        }
    }

    if let Some(config) = &request.generation_config {
        validate_generation_config(config, &mut details);
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(GatewayError::Request(RequestError::ValidationError {
            message: "Invalid generate content request".to_string(),
            details,
        }))
    }
}

fn validate_part(part: &Part, field_prefix: &str, details: &mut Vec<ValidationDetail>) {
    if let Part::InlineData { inline_data } = part {
        if inline_data.mime_type.is_empty() {
            details.push(ValidationDetail {
                field: format!("{field_prefix}.inline_data.mime_type"),
                description: "MIME type is required".to_string(),
            });
        }
        if inline_data.data.is_empty() {
            details.push(ValidationDetail {
                field: format!("{field_prefix}.inline_data.data"),
                description: "Data cannot be empty".to_string(),
            });
        }
    }
}

/// Check generation parameters against the provider's accepted ranges.
pub fn validate_generation_config(config: &GenerationConfig, details: &mut Vec<ValidationDetail>) {
    if let Some(temperature) = config.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            details.push(ValidationDetail {
                field: "generation_config.temperature".to_string(),
                description: format!("Temperature must be between 0.0 and 2.0, got {temperature}"),
            });
        }
    }

    if config.max_output_tokens == Some(0) {
        details.push(ValidationDetail {
            field: "generation_config.max_output_tokens".to_string(),
            description: "Max output tokens must be greater than 0".to_string(),
        });
    }
}
