//! Integration tests for attachment resolution.

use async_trait::async_trait;
use bytes::Bytes;
use gemini_gateway::mocks::{RecordingLogger, RecordingMetricsRecorder};
use gemini_gateway::observability::{GatewayMetrics, NoopLogger, NoopMetricsRecorder};
use gemini_gateway::*;
use mockall::mock;
use pretty_assertions::assert_eq;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

mock! {
    pub Reader {}

    #[async_trait]
    impl FileReader for Reader {
        async fn read(&self, path: &Path, max_bytes: usize) -> io::Result<Bytes>;
    }
}

const MAX_BYTES: usize = 1024;

fn resolver_with(reader: Arc<dyn FileReader>) -> AttachmentResolver {
    AttachmentResolver::new(
        reader,
        MAX_BYTES,
        Arc::new(NoopLogger),
        Arc::new(GatewayMetrics::new("gateway", Box::new(NoopMetricsRecorder))),
    )
}

fn document(path: &str) -> AttachmentDescriptor {
    AttachmentDescriptor::DocumentRef(DocumentRef::new(path))
}

#[tokio::test]
async fn test_no_attachment_resolves_to_nothing() {
    // Arrange
    let mut reader = MockReader::new();
    reader.expect_read().never();
    let resolver = resolver_with(Arc::new(reader));

    // Act
    let parts = resolver.resolve(None).await;

    // Assert
    assert!(parts.is_empty());
}

#[tokio::test]
async fn test_plain_text_is_passed_through_verbatim() {
    // Arrange
    let mut reader = MockReader::new();
    reader.expect_read().never();
    let resolver = resolver_with(Arc::new(reader));
    let text = "  line one\nline two  ".to_string();

    // Act
    let parts = resolver
        .resolve(Some(&AttachmentDescriptor::PlainText(text.clone())))
        .await;

    // Assert
    assert_eq!(parts, vec![ContentPart::Text(text)]);
}

#[tokio::test]
async fn test_pdf_is_read_once_with_size_limit() {
    // Arrange
    let mut reader = MockReader::new();
    reader
        .expect_read()
        .withf(|path, max_bytes| path == Path::new("/tmp/slides.PDF") && *max_bytes == MAX_BYTES)
        .times(1)
        .returning(|_, _| Ok(Bytes::from_static(b"%PDF-1.4")));
    let resolver = resolver_with(Arc::new(reader));
    let descriptor = AttachmentDescriptor::DocumentRef(
        DocumentRef::new("/tmp/slides.PDF").with_description("Roadmap slides"),
    );

    // Act
    let parts = resolver.resolve(Some(&descriptor)).await;

    // Assert
    assert_eq!(
        parts,
        vec![
            ContentPart::InlineBinary {
                mime_type: "application/pdf".to_string(),
                data: Bytes::from_static(b"%PDF-1.4"),
            },
            ContentPart::Text(
                "Attached file: Roadmap slides. Someone else is presenting this document.".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_unsupported_format_is_never_read() {
    // Arrange
    let mut reader = MockReader::new();
    reader.expect_read().never();
    let resolver = resolver_with(Arc::new(reader));
    let descriptor = AttachmentDescriptor::DocumentRef(
        DocumentRef::new("notes.docx").with_text_prompt("Extracted notes text"),
    );

    // Act
    let parts = resolver.resolve(Some(&descriptor)).await;

    // Assert
    assert_eq!(parts, vec![ContentPart::text("Extracted notes text")]);
}

#[tokio::test]
async fn test_document_without_path_uses_description() {
    // Arrange
    let mut reader = MockReader::new();
    reader.expect_read().never();
    let resolver = resolver_with(Arc::new(reader));
    let descriptor = AttachmentDescriptor::DocumentRef(DocumentRef::default().with_description("A whiteboard photo"));

    // Act
    let parts = resolver.resolve(Some(&descriptor)).await;

    // Assert
    assert_eq!(parts, vec![ContentPart::text("A whiteboard photo")]);
}

#[tokio::test]
async fn test_empty_document_resolves_to_nothing() {
    // Arrange
    let mut reader = MockReader::new();
    reader.expect_read().never();
    let resolver = resolver_with(Arc::new(reader));

    // Act
    let parts = resolver
        .resolve(Some(&AttachmentDescriptor::DocumentRef(DocumentRef::default())))
        .await;

    // Assert
    assert!(parts.is_empty());
}

#[tokio::test]
async fn test_read_failure_degrades_to_notice_and_is_reported() {
    // Arrange
    let mut reader = MockReader::new();
    reader
        .expect_read()
        .withf(|path, max_bytes| path == Path::new("locked.pdf") && *max_bytes == MAX_BYTES)
        .times(1)
        .returning(|_, _| Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied")));
    let logger = Arc::new(RecordingLogger::new());
    let recorder = RecordingMetricsRecorder::new();
    let resolver = AttachmentResolver::new(
        Arc::new(reader),
        MAX_BYTES,
        logger.clone(),
        Arc::new(GatewayMetrics::new("gateway", Box::new(recorder.clone()))),
    );
    let descriptor = AttachmentDescriptor::DocumentRef(
        DocumentRef::new("locked.pdf").with_text_prompt("Budget spreadsheet export"),
    );

    // Act
    let parts = resolver.resolve(Some(&descriptor)).await;

    // Assert
    assert_eq!(
        parts,
        vec![ContentPart::Text(format!(
            "{ATTACHMENT_FAILURE_NOTICE} Budget spreadsheet export"
        ))]
    );
    assert_eq!(logger.count_at("warn"), 1);
    assert_eq!(
        recorder.counter_labels("gateway_attachments_degraded_total"),
        vec![vec![("reason".to_string(), "unreadable".to_string())]]
    );
}

#[tokio::test]
async fn test_oversized_pdf_degrades_to_notice() {
    // Arrange
    let mut reader = MockReader::new();
    reader
        .expect_read()
        .times(1)
        .returning(|_, max_bytes| Ok(Bytes::from(vec![0u8; max_bytes + 1])));
    let recorder = RecordingMetricsRecorder::new();
    let resolver = AttachmentResolver::new(
        Arc::new(reader),
        MAX_BYTES,
        Arc::new(NoopLogger),
        Arc::new(GatewayMetrics::new("gateway", Box::new(recorder.clone()))),
    );
    let descriptor = AttachmentDescriptor::DocumentRef(DocumentRef::new("huge.pdf").with_description("Scan"));

    // Act
    let parts = resolver.resolve(Some(&descriptor)).await;

    // Assert
    assert_eq!(parts, vec![ContentPart::Text(format!("{ATTACHMENT_FAILURE_NOTICE} Scan"))]);
    assert_eq!(
        recorder.counter_labels("gateway_attachments_degraded_total"),
        vec![vec![("reason".to_string(), "too_large".to_string())]]
    );
}

#[tokio::test]
async fn test_fs_reader_reads_real_pdf() {
    // Arrange
    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    file.write_all(b"%PDF-1.7\n%real bytes").unwrap();
    let resolver = resolver_with(Arc::new(FsFileReader));

    // Act
    let parts = resolver
        .resolve(Some(&AttachmentDescriptor::DocumentRef(
            DocumentRef::new(file.path()).presented_by_user(true),
        )))
        .await;

    // Assert
    assert_eq!(parts.len(), 2);
    assert_eq!(
        parts[0],
        ContentPart::InlineBinary {
            mime_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.7\n%real bytes"),
        }
    );
    assert!(parts[1]
        .as_text()
        .unwrap()
        .ends_with("You are presenting this document."));
}

#[tokio::test]
async fn test_fs_reader_missing_file_degrades() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver_with(Arc::new(FsFileReader));

    // Act
    let parts = resolver
        .resolve(Some(&document(dir.path().join("gone.pdf").to_str().unwrap())))
        .await;

    // Assert
    assert_eq!(
        parts,
        vec![ContentPart::Text(format!(
            "{ATTACHMENT_FAILURE_NOTICE} {ATTACHMENT_PLACEHOLDER}"
        ))]
    );
}
