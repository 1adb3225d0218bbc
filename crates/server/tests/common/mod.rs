//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the full router with
//! an in-memory file library and an optional mock document converter, so
//! every endpoint can be exercised without a running job service.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use filedeck_core::{
    create_authenticator, testing::MockDocumentConverter, AuthConfig, Config, ConversionService,
    DatabaseConfig, DocumentConverter, JobServiceConfig, ServerConfig, SqliteLibrary,
};
use filedeck_server::{create_router, AppState};

/// Re-export fixtures for test convenience
pub use filedeck_core::testing::fixtures;

/// Boundary used by [`MultipartBody`].
pub const BOUNDARY: &str = "filedeck-test-boundary";

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_convert() {
///     let fixture = TestFixture::new();
///     let body = MultipartBody::new()
///         .file("a.txt", "text/plain", b"hello")
///         .text("targetFormat", "pdf");
///     let response = fixture.post_multipart("/api/v1/convert", body).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock converter, when the fixture delegates word documents to one
    pub converter: Option<Arc<MockDocumentConverter>>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    /// Body parsed as JSON, `Null` when it is not JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestFixture {
    /// Fixture without an external converter (delegation disabled).
    pub fn new() -> Self {
        Self::build(AuthConfig::none(), None, ServerConfig::default())
    }

    /// Fixture that delegates word documents to a mock converter.
    pub fn with_mock_converter() -> Self {
        let converter = Arc::new(MockDocumentConverter::new());
        let mut fixture = Self::build(
            AuthConfig::none(),
            Some(Arc::clone(&converter) as Arc<dyn DocumentConverter>),
            ServerConfig::default(),
        );
        fixture.converter = Some(converter);
        fixture
    }

    /// Fixture with the given document converter.
    pub fn with_converter(converter: Arc<dyn DocumentConverter>) -> Self {
        Self::build(AuthConfig::none(), Some(converter), ServerConfig::default())
    }

    /// Fixture with custom authentication.
    pub fn with_auth(auth: AuthConfig) -> Self {
        Self::build(auth, None, ServerConfig::default())
    }

    /// Fixture with custom server settings (upload limit).
    pub fn with_server(server: ServerConfig) -> Self {
        Self::build(AuthConfig::none(), None, server)
    }

    fn build(
        auth: AuthConfig,
        converter: Option<Arc<dyn DocumentConverter>>,
        server: ServerConfig,
    ) -> Self {
        let authenticator =
            Arc::from(create_authenticator(&auth).expect("Failed to create authenticator"));
        let library = Arc::new(SqliteLibrary::in_memory().expect("Failed to create library"));

        let config = Config {
            auth,
            server,
            database: DatabaseConfig::default(),
            job_service: JobServiceConfig::default(),
        };

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            ConversionService::new(converter),
            library,
        ));

        Self {
            router: create_router(state),
            converter: None,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Request::builder().method("GET").uri(path), Body::empty())
            .await
    }

    /// Send a GET request with an API key.
    pub async fn get_as(&self, path: &str, api_key: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("GET")
                .uri(path)
                .header("X-API-Key", api_key),
            Body::empty(),
        )
        .await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.post_json_as(path, body, None).await
    }

    /// Send a POST request with JSON body and an optional API key.
    pub async fn post_json_as(
        &self,
        path: &str,
        body: Value,
        api_key: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json");
        if let Some(key) = api_key {
            builder = builder.header("X-API-Key", key);
        }
        self.send(builder, Body::from(serde_json::to_vec(&body).unwrap()))
            .await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.send(Request::builder().method("DELETE").uri(path), Body::empty())
            .await
    }

    /// Send a DELETE request with an API key.
    pub async fn delete_as(&self, path: &str, api_key: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(path)
                .header("X-API-Key", api_key),
            Body::empty(),
        )
        .await
    }

    /// Send a multipart POST.
    pub async fn post_multipart(&self, path: &str, body: MultipartBody) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("Content-Type", body.content_type()),
            Body::from(body.finish()),
        )
        .await
    }

    /// Send a POST request with raw body and custom content type.
    pub async fn post_raw(&self, path: &str, body: &str, content_type: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("Content-Type", content_type),
            Body::from(body.to_string()),
        )
        .await
    }

    async fn send(&self, builder: axum::http::request::Builder, body: Body) -> TestResponse {
        let request = builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            bytes,
        }
    }
}

/// Builder for `multipart/form-data` request bodies.
#[derive(Debug, Default)]
pub struct MultipartBody {
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file part.
    pub fn file(mut self, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: {}\r\n\r\n",
                BOUNDARY, file_name, content_type
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    /// Add a file part without a Content-Type header.
    pub fn untyped_file(mut self, file_name: &str, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    /// Add a text part.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.buf
    }
}
