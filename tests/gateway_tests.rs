//! Integration tests for the generation gateway over a mocked HTTP transport.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use gemini_gateway::fixtures::load_fixture;
use gemini_gateway::mocks::{MockFileReader, MockHttpTransport, RecordingLogger, RecordingMetricsRecorder};
use gemini_gateway::observability::{NoopLogger, NoopTracer};
use gemini_gateway::transport::HttpMethod;
use gemini_gateway::*;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const SUCCESS_TEXT: &str = "Hello! How can I help you today?";

fn config_with_key(key: &str) -> GatewayConfigBuilder {
    GatewayConfig::builder().api_key(SecretString::new(key.to_string()))
}

fn create_gateway(transport: Arc<MockHttpTransport>, config: GatewayConfig) -> Gateway {
    Gateway::builder()
        .config(config)
        .transport(transport)
        .logger(Arc::new(NoopLogger))
        .tracer(Arc::new(NoopTracer))
        .build()
        .unwrap()
}

fn configured_gateway(transport: Arc<MockHttpTransport>) -> Gateway {
    create_gateway(transport, config_with_key("test-key").build().unwrap())
}

fn success_body() -> String {
    load_fixture("content/success_response.json")
}

fn request_body(transport: &MockHttpTransport, index: usize) -> Value {
    transport.get_requests()[index].json_body().unwrap()
}

fn part_texts(content: &Value) -> Vec<String> {
    content["parts"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|part| part["text"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_generate_text_sends_single_user_turn() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &success_body());
    let gateway = configured_gateway(transport.clone());

    // Act
    let text = gateway
        .generate_text("Say hi", &GenerationOptions::new())
        .await
        .unwrap();

    // Assert
    assert_eq!(text, SUCCESS_TEXT);
    transport.verify_request_count(1);
    transport.verify_request(0, HttpMethod::Post, "/v1beta/models/gemini-2.0-flash:generateContent");
    transport.verify_header(0, "x-goog-api-key", "test-key");

    let body = request_body(&transport, 0);
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(part_texts(&contents[0]), vec!["Say hi".to_string()]);

    let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 100);
}

#[tokio::test]
async fn test_generate_text_applies_overrides() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &success_body());
    let gateway = configured_gateway(transport.clone());
    let options = GenerationOptions::new()
        .with_model("gemini-1.5-pro")
        .with_temperature(0.0)
        .with_max_tokens(512);

    // Act
    gateway.generate_text("Say hi", &options).await.unwrap();

    // Assert
    transport.verify_request(0, HttpMethod::Post, "models/gemini-1.5-pro:generateContent");
    let body = request_body(&transport, 0);
    assert_eq!(body["generationConfig"]["temperature"].as_f64(), Some(0.0));
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 512);
}

#[tokio::test]
async fn test_generate_text_json_output_appends_instruction() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &load_fixture("content/json_response.json"));
    let gateway = configured_gateway(transport.clone());

    // Act
    let text = gateway
        .generate_text("Say hi", &GenerationOptions::new().with_json_output())
        .await
        .unwrap();

    // Assert
    assert_eq!(text, r#"{"greeting": "hi"}"#);
    let body = request_body(&transport, 0);
    assert_eq!(
        part_texts(&body["contents"][0]),
        vec![format!("Say hi\n\n{JSON_OUTPUT_INSTRUCTION}")]
    );
}

#[tokio::test]
async fn test_generate_text_with_plain_text_attachment() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &success_body());
    let gateway = configured_gateway(transport.clone());
    let options = GenerationOptions::new()
        .with_attachment(AttachmentDescriptor::PlainText("Meeting notes: ship Friday.".to_string()));

    // Act
    gateway.generate_text("Summarize", &options).await.unwrap();

    // Assert
    let body = request_body(&transport, 0);
    assert_eq!(
        part_texts(&body["contents"][0]),
        vec!["Summarize".to_string(), "Meeting notes: ship Friday.".to_string()]
    );
}

#[tokio::test]
async fn test_generate_text_inlines_pdf_attachment() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &success_body());
    let reader = Arc::new(MockFileReader::new());
    reader.insert("/docs/report.pdf", b"%PDF-1.7 report".to_vec());
    let gateway = Gateway::builder()
        .config(config_with_key("test-key").build().unwrap())
        .transport(transport.clone())
        .file_reader(reader.clone())
        .logger(Arc::new(NoopLogger))
        .build()
        .unwrap();
    let document = DocumentRef::new("/docs/report.pdf")
        .with_description("Q3 report")
        .presented_by_user(true);

    // Act
    gateway
        .generate_text(
            "What does it say?",
            &GenerationOptions::new().with_attachment(AttachmentDescriptor::DocumentRef(document)),
        )
        .await
        .unwrap();

    // Assert
    let body = request_body(&transport, 0);
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0]["text"], "What does it say?");
    assert_eq!(parts[1]["inlineData"]["mimeType"], "application/pdf");
    assert_eq!(parts[1]["inlineData"]["data"], STANDARD.encode(b"%PDF-1.7 report"));
    assert_eq!(
        parts[2]["text"],
        "Attached file: Q3 report. You are presenting this document."
    );
    assert_eq!(reader.reads().len(), 1);
}

#[tokio::test]
async fn test_generate_text_unreadable_pdf_degrades_to_notice() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &success_body());
    let gateway = Gateway::builder()
        .config(config_with_key("test-key").build().unwrap())
        .transport(transport.clone())
        .file_reader(Arc::new(MockFileReader::new()))
        .logger(Arc::new(NoopLogger))
        .build()
        .unwrap();
    let options = GenerationOptions::new()
        .with_attachment(AttachmentDescriptor::DocumentRef(DocumentRef::new("missing.pdf")));

    // Act
    let result = gateway.generate_text("Read this", &options).await;

    // Assert
    assert_eq!(result.unwrap(), SUCCESS_TEXT);
    let texts = part_texts(&request_body(&transport, 0)["contents"][0]);
    assert_eq!(texts.len(), 2);
    assert_eq!(
        texts[1],
        format!("{ATTACHMENT_FAILURE_NOTICE} {ATTACHMENT_PLACEHOLDER}")
    );
}

#[tokio::test]
async fn test_generate_text_failure_is_not_retried() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(500, r#"{"error": {"code": 500, "message": "boom", "status": "INTERNAL"}}"#);
    let gateway = configured_gateway(transport.clone());

    // Act
    let result = gateway
        .generate_text("Say hi", &GenerationOptions::new().with_model("experimental-x"))
        .await;

    // Assert
    assert!(matches!(result, Err(GatewayError::Server(ServerError::InternalError { .. }))));
    transport.verify_request_count(1);
}

#[tokio::test]
async fn test_generate_text_safety_block_is_content_error() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &load_fixture("content/safety_blocked.json"));
    let gateway = configured_gateway(transport.clone());

    // Act
    let result = gateway.generate_text("Something risky", &GenerationOptions::new()).await;

    // Assert
    assert!(matches!(result, Err(GatewayError::Content(ContentError::SafetyBlocked { .. }))));
}

#[tokio::test]
async fn test_generate_text_invalid_api_key_is_authentication_error() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(400, &load_fixture("errors/invalid_api_key.json"));
    let gateway = configured_gateway(transport.clone());

    // Act
    let result = gateway.generate_text("Say hi", &GenerationOptions::new()).await;

    // Assert
    assert!(matches!(
        result,
        Err(GatewayError::Authentication(AuthenticationError::InvalidApiKey))
    ));
}

#[tokio::test]
async fn test_unconfigured_gateway_makes_no_call() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    let gateway = create_gateway(transport.clone(), GatewayConfig::default());

    // Act
    let text_result = gateway.generate_text("Say hi", &GenerationOptions::new()).await;
    let chat_result = gateway
        .chat_completion(&[ChatMessage::user("hi")], &GenerationOptions::new())
        .await;

    // Assert
    assert!(!gateway.is_configured());
    assert!(matches!(text_result, Err(GatewayError::NotConfigured)));
    assert!(matches!(chat_result, Err(GatewayError::NotConfigured)));
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_per_call_api_key_does_not_replace_active_key() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &success_body());
    transport.enqueue_json_response(200, &success_body());
    let gateway = create_gateway(transport.clone(), config_with_key("active-key").build().unwrap());

    // Act
    gateway
        .generate_text("one", &GenerationOptions::new().with_api_key(" override-key\n"))
        .await
        .unwrap();
    gateway.generate_text("two", &GenerationOptions::new()).await.unwrap();

    // Assert
    transport.verify_header(0, "x-goog-api-key", "override-key");
    transport.verify_header(1, "x-goog-api-key", "active-key");
}

#[tokio::test]
async fn test_per_call_api_key_works_without_active_key() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &success_body());
    let gateway = create_gateway(transport.clone(), GatewayConfig::default());

    // Act
    let result = gateway
        .generate_text("hi", &GenerationOptions::new().with_api_key("one-off"))
        .await;

    // Assert
    assert_eq!(result.unwrap(), SUCCESS_TEXT);
    assert!(!gateway.is_configured());
    transport.verify_header(0, "x-goog-api-key", "one-off");
}

#[tokio::test]
async fn test_invalid_per_call_api_key_is_rejected_before_sending() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    let gateway = configured_gateway(transport.clone());

    // Act
    let result = gateway
        .generate_text("hi", &GenerationOptions::new().with_api_key("not valid!"))
        .await;

    // Assert
    assert!(matches!(
        result,
        Err(GatewayError::InvalidCredential(CredentialError::InvalidCharacter { ch: '!' }))
    ));
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_invalid_options_make_no_call() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    let gateway = configured_gateway(transport.clone());

    // Act
    let result = gateway
        .chat_completion(
            &[ChatMessage::user("hi")],
            &GenerationOptions::new().with_model("experimental-x").with_temperature(5.0),
        )
        .await;

    // Assert
    assert!(matches!(
        result,
        Err(GatewayError::Request(RequestError::ValidationError { .. }))
    ));
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_chat_translates_roles_and_sends_history() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &success_body());
    let gateway = configured_gateway(transport.clone());
    let messages = vec![
        ChatMessage::user("What is Rust?"),
        ChatMessage::assistant("A systems language."),
        ChatMessage::user("Give me an example"),
    ];

    // Act
    let text = gateway
        .chat_completion(&messages, &GenerationOptions::new().with_json_output())
        .await
        .unwrap();

    // Assert
    assert_eq!(text, SUCCESS_TEXT);
    let body = request_body(&transport, 0);
    let contents = body["contents"].as_array().unwrap();
    let roles: Vec<&str> = contents.iter().map(|c| c["role"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["user", "model", "user"]);
    assert_eq!(part_texts(&contents[0]), vec!["What is Rust?".to_string()]);
    assert_eq!(part_texts(&contents[1]), vec!["A systems language.".to_string()]);
    assert_eq!(
        part_texts(&contents[2]),
        vec![format!("Give me an example\n\n{JSON_OUTPUT_INSTRUCTION}")]
    );
}

#[tokio::test]
async fn test_chat_final_turn_only_mode() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &success_body());
    let config = config_with_key("test-key")
        .history_mode(HistoryMode::FinalTurnOnly)
        .build()
        .unwrap();
    let gateway = create_gateway(transport.clone(), config);
    let messages = vec![
        ChatMessage::user("first"),
        ChatMessage::assistant("second"),
        ChatMessage::user("third"),
    ];

    // Act
    gateway.chat_completion(&messages, &GenerationOptions::new()).await.unwrap();

    // Assert
    let body = request_body(&transport, 0);
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(part_texts(&contents[0]), vec!["third".to_string()]);
}

#[tokio::test]
async fn test_chat_attachment_only_follows_user_turn() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, &success_body());
    transport.enqueue_json_response(200, &success_body());
    let gateway = configured_gateway(transport.clone());
    let options = GenerationOptions::new()
        .with_attachment(AttachmentDescriptor::PlainText("context".to_string()));

    // Act
    gateway
        .chat_completion(&[ChatMessage::user("hi"), ChatMessage::assistant("partial")], &options)
        .await
        .unwrap();
    gateway
        .chat_completion(&[ChatMessage::user("hi")], &options)
        .await
        .unwrap();

    // Assert
    let assistant_final = request_body(&transport, 0);
    assert_eq!(assistant_final["contents"][1]["role"], "model");
    assert_eq!(part_texts(&assistant_final["contents"][1]), vec!["partial".to_string()]);

    let user_final = request_body(&transport, 1);
    assert_eq!(
        part_texts(&user_final["contents"][0]),
        vec!["hi".to_string(), "context".to_string()]
    );
}

#[tokio::test]
async fn test_chat_empty_messages_is_validation_error() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    let gateway = configured_gateway(transport.clone());

    // Act
    let result = gateway.chat_completion(&[], &GenerationOptions::new()).await;

    // Assert
    assert!(matches!(
        result,
        Err(GatewayError::Request(RequestError::ValidationError { .. }))
    ));
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_chat_falls_back_once_when_requested_model_fails() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(404, &load_fixture("errors/model_not_found.json"));
    transport.enqueue_json_response(200, &success_body());
    let recorder = RecordingMetricsRecorder::new();
    let logger = Arc::new(RecordingLogger::new());
    let gateway = Gateway::builder()
        .config(config_with_key("test-key").build().unwrap())
        .transport(transport.clone())
        .logger(logger.clone())
        .metrics(Box::new(recorder.clone()))
        .build()
        .unwrap();
    let messages = vec![ChatMessage::user("hello")];

    // Act
    let text = gateway
        .chat_completion(&messages, &GenerationOptions::new().with_model("experimental-x"))
        .await
        .unwrap();

    // Assert
    assert_eq!(text, SUCCESS_TEXT);
    transport.verify_request_count(2);
    transport.verify_request(0, HttpMethod::Post, "models/experimental-x:generateContent");
    transport.verify_request(1, HttpMethod::Post, "models/gemini-2.0-flash:generateContent");
    assert_eq!(request_body(&transport, 0)["contents"], request_body(&transport, 1)["contents"]);

    assert_eq!(
        recorder.counter_labels("gateway_fallbacks_total"),
        vec![vec![
            ("from_model".to_string(), "experimental-x".to_string()),
            ("to_model".to_string(), "gemini-2.0-flash".to_string()),
        ]]
    );
    assert!(logger.contains("fallback model"));
}

#[tokio::test]
async fn test_chat_fallback_failure_is_returned_without_third_attempt() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(404, &load_fixture("errors/model_not_found.json"));
    transport.enqueue_json_response(500, r#"{"error": {"code": 500, "message": "boom", "status": "INTERNAL"}}"#);
    let gateway = configured_gateway(transport.clone());

    // Act
    let result = gateway
        .chat_completion(&[ChatMessage::user("hello")], &GenerationOptions::new().with_model("experimental-x"))
        .await;

    // Assert
    assert!(matches!(result, Err(GatewayError::Server(ServerError::InternalError { .. }))));
    transport.verify_request_count(2);
}

#[tokio::test]
async fn test_chat_without_model_override_is_not_retried() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(500, r#"{"error": {"code": 500, "message": "boom", "status": "INTERNAL"}}"#);
    let gateway = configured_gateway(transport.clone());

    // Act
    let result = gateway
        .chat_completion(&[ChatMessage::user("hello")], &GenerationOptions::new())
        .await;

    // Assert
    assert!(result.is_err());
    transport.verify_request_count(1);
}

#[tokio::test]
async fn test_chat_override_equal_to_fallback_is_not_retried() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(500, r#"{"error": {"code": 500, "message": "boom", "status": "INTERNAL"}}"#);
    let gateway = configured_gateway(transport.clone());

    // Act
    let result = gateway
        .chat_completion(
            &[ChatMessage::user("hello")],
            &GenerationOptions::new().with_model(DEFAULT_MODEL),
        )
        .await;

    // Assert
    assert!(result.is_err());
    transport.verify_request_count(1);
}

#[tokio::test]
async fn test_chat_fallback_after_deadline_expiry() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.set_delay(Duration::from_millis(200));
    transport.enqueue_json_response(200, &success_body());
    transport.enqueue_json_response(200, &success_body());
    let gateway = configured_gateway(transport.clone());
    let options = GenerationOptions::new()
        .with_model("slow-model")
        .with_timeout(Duration::from_millis(20));

    // Act
    let result = gateway.chat_completion(&[ChatMessage::user("hello")], &options).await;

    // Assert
    assert!(matches!(result, Err(GatewayError::Network(NetworkError::Timeout { .. }))));
    transport.verify_request_count(2);
    transport.verify_request(1, HttpMethod::Post, "models/gemini-2.0-flash:generateContent");
}

#[tokio::test]
async fn test_custom_fallback_model() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(503, r#"{"error": {"code": 503, "message": "unavailable", "status": "UNAVAILABLE"}}"#);
    transport.enqueue_json_response(200, &success_body());
    let config = config_with_key("test-key")
        .fallback_model("gemini-1.5-flash")
        .build()
        .unwrap();
    let gateway = create_gateway(transport.clone(), config);

    // Act
    let result = gateway
        .chat_completion(&[ChatMessage::user("hello")], &GenerationOptions::new().with_model(DEFAULT_MODEL))
        .await;

    // Assert
    assert_eq!(result.unwrap(), SUCCESS_TEXT);
    transport.verify_request(1, HttpMethod::Post, "models/gemini-1.5-flash:generateContent");
}

#[tokio::test]
async fn test_rotation_applies_to_calls_started_afterwards() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    transport.set_delay(Duration::from_millis(50));
    transport.enqueue_json_response(200, &success_body());
    transport.enqueue_json_response(200, &success_body());
    let gateway = create_gateway(transport.clone(), config_with_key("key-one").build().unwrap());

    // Act
    let first_options = GenerationOptions::new();
    let (in_flight, rotation) = futures::join!(
        gateway.generate_text("first", &first_options),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            gateway.set_api_key("key-two")
        }
    );
    let after = gateway.generate_text("second", &GenerationOptions::new()).await;

    // Assert
    assert_eq!(in_flight.unwrap(), SUCCESS_TEXT);
    rotation.unwrap();
    assert_eq!(after.unwrap(), SUCCESS_TEXT);
    transport.verify_header(0, "x-goog-api-key", "key-one");
    transport.verify_header(1, "x-goog-api-key", "key-two");
}

#[tokio::test]
async fn test_concurrent_calls_share_active_credential() {
    // Arrange
    let transport = Arc::new(MockHttpTransport::new());
    for _ in 0..4 {
        transport.enqueue_json_response(200, &success_body());
    }
    let gateway = Arc::new(configured_gateway(transport.clone()));

    // Act
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let gateway = Arc::clone(&gateway);
            tokio::spawn(async move {
                gateway
                    .generate_text(&format!("prompt {i}"), &GenerationOptions::new())
                    .await
            })
        })
        .collect();
    let results = futures::future::join_all(handles).await;

    // Assert
    for result in results {
        assert_eq!(result.unwrap().unwrap(), SUCCESS_TEXT);
    }
    transport.verify_request_count(4);
    for index in 0..4 {
        transport.verify_header(index, "x-goog-api-key", "test-key");
    }
}
