//! Recorded Gemini API payloads for tests.
//!
//! Fixture files live next to this module: `content/` holds
//! `generateContent` responses and `errors/` holds error bodies.

use std::path::PathBuf;

/// Get the path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .join("fixtures")
        .join(relative_path)
}

/// Load a fixture file as a string.
pub fn load_fixture(relative_path: &str) -> String {
    std::fs::read_to_string(fixture_path(relative_path))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", relative_path, e))
}

/// Load a JSON fixture and parse it.
pub fn load_json_fixture<T: serde::de::DeserializeOwned>(relative_path: &str) -> T {
    let content = load_fixture(relative_path);
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse JSON fixture {}: {}", relative_path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FinishReason, GenerateContentResponse};

    #[test]
    fn test_fixture_path() {
        let path = fixture_path("content/success_response.json");
        assert!(path.ends_with("src/fixtures/content/success_response.json"));
    }

    #[test]
    fn test_success_fixture_parses() {
        let response: GenerateContentResponse = load_json_fixture("content/success_response.json");

        assert_eq!(response.text().as_deref(), Some("Hello! How can I help you today?"));
        assert_eq!(response.usage_metadata.unwrap().total_token_count, 13);
    }

    #[test]
    fn test_safety_fixture_parses() {
        let response: GenerateContentResponse = load_json_fixture("content/safety_blocked.json");
        let candidate = &response.candidates.unwrap()[0];

        assert_eq!(candidate.finish_reason, Some(FinishReason::Safety));
        assert!(candidate.content.is_none());
    }

    #[test]
    fn test_error_fixture_is_json() {
        let body: serde_json::Value = load_json_fixture("errors/model_not_found.json");
        assert_eq!(body["error"]["code"], 404);
    }
}
