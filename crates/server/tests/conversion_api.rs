//! Conversion endpoint tests.
//!
//! Drives `POST /api/v1/convert` and `GET /api/v1/formats` through the full
//! router with an in-memory library.

mod common;

use axum::http::StatusCode;
use common::{fixtures, MultipartBody, TestFixture};
use filedeck_core::conversion::{EXCEL_OOXML_MIME, WORD_MIME, WORD_OOXML_MIME};
use filedeck_core::{JobServiceError, ServerConfig, TargetFormat};

const CONVERT: &str = "/api/v1/convert";

fn upload(file_name: &str, mime: &str, bytes: &[u8], target: &str) -> MultipartBody {
    MultipartBody::new()
        .file(file_name, mime, bytes)
        .text("targetFormat", target)
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_missing_target_format_is_400() {
    let fixture = TestFixture::new();
    let body = MultipartBody::new().file("a.txt", "text/plain", b"hi");

    let response = fixture.post_multipart(CONVERT, body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(
        response.json()["error"],
        "File and target format are required"
    );
}

#[tokio::test]
async fn test_missing_file_is_400() {
    let fixture = TestFixture::new();
    let body = MultipartBody::new().text("targetFormat", "pdf");

    let response = fixture.post_multipart(CONVERT, body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["error"],
        "File and target format are required"
    );
}

#[tokio::test]
async fn test_empty_target_format_is_400() {
    let fixture = TestFixture::new();
    let response = fixture
        .post_multipart(CONVERT, upload("a.txt", "text/plain", b"hi", ""))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["error"],
        "File and target format are required"
    );
}

#[tokio::test]
async fn test_unsupported_pair_is_400_with_exact_message() {
    let fixture = TestFixture::new();
    let response = fixture
        .post_multipart(CONVERT, upload("a.txt", "text/plain", b"hi", "png"))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["error"],
        "Conversion from text/plain to png is not supported"
    );
}

#[tokio::test]
async fn test_unknown_mime_is_rejected() {
    let fixture = TestFixture::new();
    let response = fixture
        .post_multipart(
            CONVERT,
            upload("a.bin", "application/x-unknown", b"\x00\x01", "pdf"),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["error"],
        "Conversion from application/x-unknown to pdf is not supported"
    );
}

#[tokio::test]
async fn test_file_without_content_type_uses_octet_stream() {
    let fixture = TestFixture::new();
    let body = MultipartBody::new()
        .untyped_file("a.dat", b"data")
        .text("targetFormat", "pdf");

    let response = fixture.post_multipart(CONVERT, body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["error"],
        "Conversion from application/octet-stream to pdf is not supported"
    );
}

#[tokio::test]
async fn test_rejection_does_not_call_converter() {
    let fixture = TestFixture::with_mock_converter();
    let response = fixture
        .post_multipart(
            CONVERT,
            upload("a.docx", WORD_OOXML_MIME, fixtures::DOCX_BYTES, "png"),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let converter = fixture.converter.as_ref().unwrap();
    assert_eq!(converter.call_count().await, 0);
}

// ============================================================================
// Unexpected failures
// ============================================================================

#[tokio::test]
async fn test_non_multipart_body_is_500_json() {
    let fixture = TestFixture::new();
    let response = fixture
        .post_raw(CONVERT, r#"{"targetFormat":"pdf"}"#, "application/json")
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_truncated_multipart_body_is_500_json() {
    let fixture = TestFixture::new();
    let response = fixture
        .post_raw(
            CONVERT,
            "--filedeck-test-boundary\r\nContent-Disposition: form-data; name=\"file\"",
            "multipart/form-data; boundary=filedeck-test-boundary",
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_upload_over_limit_is_413() {
    let fixture = TestFixture::with_server(ServerConfig {
        max_upload_bytes: 1024,
        ..Default::default()
    });
    let big = vec![b'a'; 8 * 1024];

    let response = fixture
        .post_multipart(CONVERT, upload("big.txt", "text/plain", &big, "pdf"))
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.json()["error"].is_string());
}

// ============================================================================
// Strategies
// ============================================================================

#[tokio::test]
async fn test_word_to_pdf_without_converter_returns_placeholder() {
    let fixture = TestFixture::new();
    let response = fixture
        .post_multipart(
            CONVERT,
            upload("report.docx", WORD_OOXML_MIME, fixtures::DOCX_BYTES, "pdf"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/pdf"));
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"report.pdf\"")
    );
    assert_eq!(response.header("x-conversion-strategy"), Some("external_job"));
    assert_eq!(
        response.header("x-conversion-outcome"),
        Some("fallback_applied")
    );

    let text = response.text();
    assert!(text.starts_with("%PDF-1.4"));
    assert!(text.contains("/Type /Page "));
    assert!(text.contains("Original file: report.docx"));
    assert!(text.trim_end().ends_with("%%EOF"));
}

#[tokio::test]
async fn test_word_to_pdf_uses_converter_output() {
    let fixture = TestFixture::with_mock_converter();
    let converter = fixture.converter.clone().unwrap();
    converter.set_output(b"%PDF-1.7 real".to_vec()).await;

    let response = fixture
        .post_multipart(
            CONVERT,
            upload("Memo.DOC", WORD_MIME, fixtures::DOCX_BYTES, "pdf"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, b"%PDF-1.7 real");
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"Memo.pdf\"")
    );
    assert_eq!(response.header("x-conversion-outcome"), Some("succeeded"));

    let calls = converter.recorded_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].file_name, "Memo.DOC");
    assert_eq!(calls[0].bytes, fixtures::DOCX_BYTES);
    assert_eq!(calls[0].output_format, TargetFormat::Pdf);
}

#[tokio::test]
async fn test_word_to_pdf_converter_failure_falls_back() {
    let fixture = TestFixture::with_mock_converter();
    let converter = fixture.converter.clone().unwrap();
    converter
        .set_next_error(JobServiceError::JobFailed(
            "convert: password protected (INVALID_FILE)".to_string(),
        ))
        .await;

    let response = fixture
        .post_multipart(
            CONVERT,
            upload("secret.docx", WORD_OOXML_MIME, fixtures::DOCX_BYTES, "pdf"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/pdf"));
    assert_eq!(
        response.header("x-conversion-outcome"),
        Some("fallback_applied")
    );
    let text = response.text();
    assert!(text.contains("Original file: secret.docx"));
    assert!(!text.contains("password protected"));
}

#[tokio::test]
async fn test_image_passthrough_is_byte_identical() {
    let fixture = TestFixture::new();
    let response = fixture
        .post_multipart(
            CONVERT,
            upload("photo.png", "image/png", fixtures::PNG_BYTES, "jpg"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, fixtures::PNG_BYTES);
    assert_eq!(response.header("content-type"), Some("image/jpeg"));
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"photo.jpg\"")
    );
    assert_eq!(
        response.header("x-conversion-strategy"),
        Some("image_passthrough")
    );
}

#[tokio::test]
async fn test_image_to_pdf_is_placeholder() {
    let fixture = TestFixture::new();
    let response = fixture
        .post_multipart(
            CONVERT,
            upload("scan.png", "image/png", fixtures::PNG_BYTES, "pdf"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/pdf"));
    assert_eq!(
        response.header("x-conversion-strategy"),
        Some("placeholder_pdf")
    );
    assert!(response.text().contains("Original type: image/png"));
}

#[tokio::test]
async fn test_text_extraction_keeps_text_verbatim() {
    let fixture = TestFixture::new();
    let response = fixture
        .post_multipart(
            CONVERT,
            upload("doc.pdf", "application/pdf", b"%PDF-1.4 binary", "txt"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        Some("text/plain;charset=utf-8")
    );
    assert!(response.text().starts_with("Converted from: application/pdf"));
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"doc.txt\"")
    );
}

#[tokio::test]
async fn test_word_to_txt_does_not_delegate() {
    let fixture = TestFixture::with_mock_converter();
    let response = fixture
        .post_multipart(
            CONVERT,
            upload("notes.docx", WORD_OOXML_MIME, fixtures::DOCX_BYTES, "txt"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("x-conversion-strategy"),
        Some("text_extraction")
    );
    assert_eq!(fixture.converter.as_ref().unwrap().call_count().await, 0);
}

#[tokio::test]
async fn test_plain_text_to_pdf() {
    let fixture = TestFixture::new();
    let response = fixture
        .post_multipart(
            CONVERT,
            upload("readme.txt", "text/plain", b"hello world", "pdf"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"readme.pdf\"")
    );
    assert!(response.text().contains("Original file: readme.txt"));
}

#[tokio::test]
async fn test_spreadsheet_to_csv_echoes_input() {
    let fixture = TestFixture::new();
    let input = b"PK\x03\x04xl/workbook.xml";
    let response = fixture
        .post_multipart(CONVERT, upload("Q3.xlsx", EXCEL_OOXML_MIME, input, "csv"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, input);
    assert_eq!(
        response.header("content-type"),
        Some("text/csv;charset=utf-8")
    );
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"Q3.csv\"")
    );
    assert_eq!(response.header("x-conversion-strategy"), Some("echo"));
}

// ============================================================================
// Formats
// ============================================================================

#[tokio::test]
async fn test_formats_for_word() {
    let fixture = TestFixture::new();
    let response = fixture
        .get("/api/v1/formats?mime=application%2Fmsword")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let json = response.json();
    assert_eq!(json["kind"], "word");
    assert_eq!(json["targets"], serde_json::json!(["pdf", "txt"]));
    assert_eq!(json["delegation_enabled"], false);
}

#[tokio::test]
async fn test_formats_for_unknown_type_is_empty() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/formats?mime=audio%2Fmpeg").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["targets"], serde_json::json!([]));
}

#[tokio::test]
async fn test_formats_requires_mime() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/formats").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].is_string());
}
