//! Attachment resolution.
//!
//! Turns an [`AttachmentDescriptor`] into request-ready [`ContentPart`]s.
//! Supported documents are read and attached inline; everything else, and
//! every read failure, degrades to text. Resolution never fails.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

use crate::error::AttachmentError;
use crate::observability::{GatewayMetrics, Logger};
use crate::types::ContentPart;

/// Prefix of the text part sent in place of a document that could not be read.
pub const ATTACHMENT_FAILURE_NOTICE: &str =
    "[The attached document could not be read and is not included in this message.]";

/// Used when a failed document carries neither a text prompt nor a description.
pub const ATTACHMENT_PLACEHOLDER: &str = "Document content unavailable.";

const DEFAULT_DESCRIPTION: &str = "the attached document";
const PRESENTER_NOTE: &str = "You are presenting this document.";
const AUDIENCE_NOTE: &str = "Someone else is presenting this document.";

/// What the caller wants attached to a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentDescriptor {
    /// Text appended verbatim.
    PlainText(String),
    /// A document on disk, with text to fall back on.
    DocumentRef(DocumentRef),
}

/// Reference to a document and its textual stand-ins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentRef {
    /// File to attach, if any.
    pub path: Option<PathBuf>,
    /// Text used when no supported document is attached.
    pub text_prompt: Option<String>,
    /// Short human description of the document.
    pub description: Option<String>,
    /// Whether the requesting user is the one presenting the document.
    pub is_presenter: bool,
}

impl DocumentRef {
    /// A reference to the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Set the fallback text prompt.
    pub fn with_text_prompt(mut self, text_prompt: impl Into<String>) -> Self {
        self.text_prompt = Some(text_prompt.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the requesting user as the presenter.
    pub fn presented_by_user(mut self, is_presenter: bool) -> Self {
        self.is_presenter = is_presenter;
        self
    }

    fn description_text(&self) -> String {
        let description = self.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION);
        let note = if self.is_presenter { PRESENTER_NOTE } else { AUDIENCE_NOTE };
        format!("Attached file: {description}. {note}")
    }

    fn failure_text(&self) -> String {
        let fallback = self
            .text_prompt
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or(ATTACHMENT_PLACEHOLDER);
        format!("{ATTACHMENT_FAILURE_NOTICE} {fallback}")
    }
}

/// Document formats that are attached as inline binary data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
}

impl DocumentFormat {
    /// Detect the format from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    /// MIME type sent with the inline data.
    pub fn mime_type(self) -> mime::Mime {
        match self {
            Self::Pdf => mime::APPLICATION_PDF,
        }
    }
}

/// Reads attachment files.
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Read the file at `path`.
    ///
    /// Implementations may stop once more than `max_bytes` bytes have been
    /// read; the caller rejects anything longer than `max_bytes`.
    async fn read(&self, path: &Path, max_bytes: usize) -> io::Result<Bytes>;
}

/// [`FileReader`] backed by `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileReader;

#[async_trait]
impl FileReader for FsFileReader {
    async fn read(&self, path: &Path, max_bytes: usize) -> io::Result<Bytes> {
        let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
        let file = tokio::fs::File::open(path).await?;
        let mut buffer = Vec::new();
        file.take(limit.saturating_add(1)).read_to_end(&mut buffer).await?;
        Ok(Bytes::from(buffer))
    }
}

/// Resolves descriptors to content parts.
pub struct AttachmentResolver {
    reader: Arc<dyn FileReader>,
    max_bytes: usize,
    logger: Arc<dyn Logger>,
    metrics: Arc<GatewayMetrics>,
}

impl AttachmentResolver {
    /// Create a resolver.
    pub fn new(
        reader: Arc<dyn FileReader>,
        max_bytes: usize,
        logger: Arc<dyn Logger>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            reader,
            max_bytes,
            logger,
            metrics,
        }
    }

    /// Resolve `descriptor` into content parts, in order.
    pub async fn resolve(&self, descriptor: Option<&AttachmentDescriptor>) -> Vec<ContentPart> {
        match descriptor {
            None => Vec::new(),
            Some(AttachmentDescriptor::PlainText(text)) => vec![ContentPart::Text(text.clone())],
            Some(AttachmentDescriptor::DocumentRef(document)) => self.resolve_document(document).await,
        }
    }

    async fn resolve_document(&self, document: &DocumentRef) -> Vec<ContentPart> {
        let supported = document
            .path
            .as_deref()
            .and_then(|path| DocumentFormat::from_path(path).map(|format| (path, format)));

        if let Some((path, format)) = supported {
            return match self.read_document(path).await {
                Ok(data) => vec![
                    ContentPart::InlineBinary {
                        mime_type: format.mime_type().to_string(),
                        data,
                    },
                    ContentPart::Text(document.description_text()),
                ],
                Err(error) => {
                    let reason = match &error {
                        AttachmentError::TooLarge { .. } => "too_large",
                        AttachmentError::Unreadable { .. } => "unreadable",
                    };
                    self.logger.warn(
                        "Attachment could not be read; sending text notice instead",
                        json!({ "path": path.display().to_string(), "error": error.to_string() }),
                    );
                    self.metrics.record_attachment_degraded(reason);
                    vec![ContentPart::Text(document.failure_text())]
                }
            };
        }

        match (&document.text_prompt, &document.description) {
            (Some(text_prompt), _) => vec![ContentPart::Text(text_prompt.clone())],
            (None, Some(description)) => vec![ContentPart::Text(description.clone())],
            (None, None) => Vec::new(),
        }
    }

    async fn read_document(&self, path: &Path) -> Result<Bytes, AttachmentError> {
        let data = self
            .reader
            .read(path, self.max_bytes)
            .await
            .map_err(|e| AttachmentError::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if data.len() > self.max_bytes {
            return Err(AttachmentError::TooLarge {
                path: path.to_path_buf(),
                size: data.len(),
                max_size: self.max_bytes,
            });
        }

        self.logger.debug(
            "Attachment read",
            json!({ "path": path.display().to_string(), "size": data.len() }),
        );
        Ok(data)
    }
}
