//! Mock implementations for testing.
//!
//! Test doubles for every seam of the gateway: the HTTP transport, the auth
//! manager, the provider client and its factory, the attachment file reader,
//! and the logger and metrics sinks.

use async_trait::async_trait;
use bytes::Bytes;
use secrecy::ExposeSecret;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::attachments::FileReader;
use crate::auth::AuthManager;
use crate::client::{ProviderClient, ProviderClientFactory};
use crate::credentials::Credential;
use crate::error::{GatewayError, GatewayResult, NetworkError};
use crate::observability::{Logger, MetricsRecorder};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::types::{Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part, Role};

/// Mock HTTP transport for testing.
///
/// Tests enqueue responses and inspect the requests that were sent.
///
/// # Example
///
/// ```
/// use gemini_gateway::mocks::MockHttpTransport;
/// use gemini_gateway::transport::{HttpMethod, HttpRequest, HttpTransport};
/// use std::collections::HashMap;
///
/// # #[tokio::main]
/// # async fn main() {
/// let transport = MockHttpTransport::new();
/// transport.enqueue_json_response(200, r#"{"status": "ok"}"#);
///
/// let request = HttpRequest {
///     method: HttpMethod::Get,
///     url: "https://example.com".to_string(),
///     headers: HashMap::new(),
///     body: None,
/// };
///
/// let response = transport.send(request).await.unwrap();
/// assert_eq!(response.status, 200);
/// transport.verify_request_count(1);
/// # }
/// ```
#[derive(Default)]
pub struct MockHttpTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Mutex<Option<Duration>>,
}

impl MockHttpTransport {
    /// Create a new mock HTTP transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a response to be returned by the next request.
    pub fn enqueue_response(&self, response: Result<HttpResponse, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Enqueue a JSON response with the given status code and body.
    pub fn enqueue_json_response(&self, status: u16, body: &str) {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        self.enqueue_response(Ok(HttpResponse {
            status,
            headers,
            body: Bytes::from(body.to_string()),
        }));
    }

    /// Enqueue a transport failure.
    pub fn enqueue_error(&self, error: TransportError) {
        self.enqueue_response(Err(error));
    }

    /// Sleep this long before answering each request.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// All requests sent so far.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Assert that exactly `expected` requests were sent.
    pub fn verify_request_count(&self, expected: usize) {
        let actual = self.requests.lock().unwrap().len();
        assert_eq!(actual, expected, "Expected {} requests, got {}", expected, actual);
    }

    /// Assert the method and URL of the request at `index`.
    pub fn verify_request(&self, index: usize, method: HttpMethod, url_contains: &str) {
        let requests = self.requests.lock().unwrap();
        assert!(index < requests.len(), "No request at index {}", index);

        let request = &requests[index];
        assert_eq!(request.method, method, "Expected method {:?}, got {:?}", method, request.method);
        assert!(
            request.url.contains(url_contains),
            "Expected URL to contain '{}', got '{}'",
            url_contains,
            request.url
        );
    }

    /// Assert a header value on the request at `index`.
    pub fn verify_header(&self, index: usize, header_name: &str, header_value: &str) {
        let requests = self.requests.lock().unwrap();
        assert!(index < requests.len(), "No request at index {}", index);

        let actual_value = requests[index].headers.get(header_name);
        assert_eq!(
            actual_value,
            Some(&header_value.to_string()),
            "Expected header '{}' to be '{}', got {:?}",
            header_name,
            header_value,
            actual_value
        );
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Connection(
                    "No response configured in MockHttpTransport".to_string(),
                ))
            })
    }
}

/// Mock authentication manager with a plain-text key.
///
/// # Example
///
/// ```
/// use gemini_gateway::mocks::MockAuthManager;
/// use gemini_gateway::auth::AuthManager;
///
/// let auth = MockAuthManager::new("test-api-key");
/// assert_eq!(
///     auth.get_auth_header(),
///     Some(("x-goog-api-key".to_string(), "test-api-key".to_string()))
/// );
/// ```
#[derive(Clone, Debug)]
pub struct MockAuthManager {
    api_key: String,
    use_header: bool,
}

impl MockAuthManager {
    /// Header authentication with `api_key`.
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            use_header: true,
        }
    }

    /// Query-parameter authentication with `api_key`.
    pub fn with_query_param(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            use_header: false,
        }
    }
}

impl AuthManager for MockAuthManager {
    fn get_auth_header(&self) -> Option<(String, String)> {
        self.use_header
            .then(|| ("x-goog-api-key".to_string(), self.api_key.clone()))
    }

    fn get_auth_query_param(&self) -> Option<(String, String)> {
        (!self.use_header).then(|| ("key".to_string(), self.api_key.clone()))
    }
}

/// A successful `generateContent` response carrying `text`.
pub fn text_response(text: &str) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: Some(vec![Candidate {
            content: Some(Content::new(Role::Model, vec![Part::text(text)])),
            finish_reason: None,
            safety_ratings: None,
            index: Some(0),
        }]),
        prompt_feedback: None,
        usage_metadata: None,
        model_version: None,
    }
}

/// Provider client with scripted results.
///
/// Each call pops the next scripted result; with nothing scripted it fails
/// with a connection error.
#[derive(Default)]
pub struct MockProviderClient {
    results: Mutex<VecDeque<GatewayResult<GenerateContentResponse>>>,
    calls: Mutex<Vec<(String, GenerateContentRequest)>>,
    delay: Mutex<Option<Duration>>,
}

impl MockProviderClient {
    /// Create a client with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful response with `text`.
    pub fn enqueue_text(&self, text: &str) {
        self.results.lock().unwrap().push_back(Ok(text_response(text)));
    }

    /// Script a raw response.
    pub fn enqueue_response(&self, response: GenerateContentResponse) {
        self.results.lock().unwrap().push_back(Ok(response));
    }

    /// Script a failure.
    pub fn enqueue_error(&self, error: GatewayError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    /// Sleep this long before answering each call.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Every `(model, request)` received, in order.
    pub fn calls(&self) -> Vec<(String, GenerateContentRequest)> {
        self.calls.lock().unwrap().clone()
    }

    /// Models requested, in order.
    pub fn models(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    /// Number of calls received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ProviderClient for MockProviderClient {
    async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> GatewayResult<GenerateContentResponse> {
        self.calls.lock().unwrap().push((model.to_string(), request));

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.results.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(GatewayError::Network(NetworkError::ConnectionFailed {
                message: "No response configured in MockProviderClient".to_string(),
            }))
        })
    }
}

/// Factory handing out one [`MockProviderClient`] per distinct key.
#[derive(Default)]
pub struct MockProviderFactory {
    clients: Mutex<HashMap<String, Arc<MockProviderClient>>>,
    created: Mutex<Vec<String>>,
    failure: Mutex<Option<GatewayError>>,
}

impl MockProviderFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The client bound to `key`, created on first use.
    pub fn client_for(&self, key: &str) -> Arc<MockProviderClient> {
        Arc::clone(
            self.clients
                .lock()
                .unwrap()
                .entry(key.to_string())
                .or_default(),
        )
    }

    /// Keys passed to [`ProviderClientFactory::create`], in order.
    pub fn created_keys(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    /// Make every later `create` fail with `error`.
    pub fn fail_with(&self, error: GatewayError) {
        *self.failure.lock().unwrap() = Some(error);
    }
}

impl ProviderClientFactory for MockProviderFactory {
    fn create(&self, credential: &Credential) -> GatewayResult<Arc<dyn ProviderClient>> {
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        let key = credential.secret().expose_secret().to_string();
        self.created.lock().unwrap().push(key.clone());
        Ok(self.client_for(&key))
    }
}

/// In-memory file reader.
#[derive(Default)]
pub struct MockFileReader {
    files: Mutex<HashMap<PathBuf, Bytes>>,
    reads: Mutex<Vec<PathBuf>>,
}

impl MockFileReader {
    /// Create a reader with no files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `path` readable with `contents`.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Bytes>) {
        self.files.lock().unwrap().insert(path.into(), contents.into());
    }

    /// Paths read so far.
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileReader for MockFileReader {
    async fn read(&self, path: &Path, _max_bytes: usize) -> io::Result<Bytes> {
        self.reads.lock().unwrap().push(path.to_path_buf());

        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display())))
    }
}

/// One captured log call.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// `"debug"`, `"info"`, `"warn"` or `"error"`.
    pub level: &'static str,
    /// The message.
    pub message: String,
    /// The structured fields.
    pub fields: Value,
}

/// Logger that keeps every entry in memory.
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    /// Create an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Number of entries at `level`.
    pub fn count_at(&self, level: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .count()
    }

    /// Whether any entry's message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.message.contains(needle))
    }

    fn push(&self, level: &'static str, message: &str, fields: Value) {
        self.entries.lock().unwrap().push(LogEntry {
            level,
            message: message.to_string(),
            fields,
        });
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: &str, fields: Value) {
        self.push("debug", message, fields);
    }

    fn info(&self, message: &str, fields: Value) {
        self.push("info", message, fields);
    }

    fn warn(&self, message: &str, fields: Value) {
        self.push("warn", message, fields);
    }

    fn error(&self, message: &str, fields: Value) {
        self.push("error", message, fields);
    }
}

/// Metrics recorder that keeps counter names in memory. Clones share storage.
#[derive(Clone, Default)]
pub struct RecordingMetricsRecorder {
    counters: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
}

impl RecordingMetricsRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `name` was incremented.
    pub fn counter(&self, name: &str) -> usize {
        self.counters
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .count()
    }

    /// Labels of every increment of `name`.
    pub fn counter_labels(&self, name: &str) -> Vec<Vec<(String, String)>> {
        self.counters
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, labels)| labels.clone())
            .collect()
    }
}

impl MetricsRecorder for RecordingMetricsRecorder {
    fn increment_counter(&self, name: &str, labels: &[(&str, &str)]) {
        let labels = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.counters.lock().unwrap().push((name.to_string(), labels));
    }

    fn record_histogram(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}

    fn record_gauge(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}
}
