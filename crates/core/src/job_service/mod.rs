//! External document conversion via an asynchronous job service.
//!
//! A job is three tasks run in order: an upload import, a conversion using
//! the service's office engine, and an export that yields a download URL.
//! [`CloudConvertClient`] drives that protocol; the rest of the crate only
//! sees the [`DocumentConverter`] trait so it can be swapped for a mock.

mod client;
mod config;
mod poll;
mod types;

pub use client::CloudConvertClient;
pub use config::{JobServiceConfig, PollConfig};
pub use poll::{poll_until, Backoff, Deadline};
pub use types::{
    input_format_for, ExportFile, Job, Status, Task, TaskResult, UploadForm, OP_CONVERT,
    OP_EXPORT_URL, OP_IMPORT_UPLOAD, TASK_CONVERT, TASK_EXPORT, TASK_IMPORT,
};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::conversion::TargetFormat;

/// Errors from the external job service. The request handler recovers from
/// all of them by falling back to a placeholder document.
#[derive(Debug, Error)]
pub enum JobServiceError {
    /// No credential configured.
    #[error("Job service not configured: {0}")]
    NotConfigured(String),

    /// Transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Job service API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// The job ended with one or more failed tasks.
    #[error("Conversion job failed: {0}")]
    JobFailed(String),

    /// The job did not have the shape this client created.
    #[error("Job protocol violation: {0}")]
    ProtocolViolation(String),

    /// The export task finished without a file URL.
    #[error("Export task produced no downloadable file")]
    MissingResultUrl,

    /// Fetching the converted file failed.
    #[error("Download of converted file failed with status {status}")]
    DownloadFailed { status: u16 },

    /// No terminal status within the configured wait.
    #[error("Timed out after {waited_secs}s waiting for {what}")]
    Timeout { what: String, waited_secs: u64 },

    /// Response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl JobServiceError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::ApiError { status, .. } => *status == 429 || *status >= 500,
            Self::DownloadFailed { status } => *status >= 500,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::Http(_) => "http",
            Self::ApiError { .. } => "api_error",
            Self::JobFailed(_) => "job_failed",
            Self::ProtocolViolation(_) => "protocol_violation",
            Self::MissingResultUrl => "missing_result_url",
            Self::DownloadFailed { .. } => "download_failed",
            Self::Timeout { .. } => "timeout",
            Self::ParseError(_) => "parse_error",
        }
    }
}

/// Converts documents through an external service.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Name of this implementation.
    fn name(&self) -> &str;

    /// Convert `bytes` (originally named `file_name`) into `output_format`.
    async fn convert_document(
        &self,
        bytes: &[u8],
        file_name: &str,
        output_format: TargetFormat,
    ) -> Result<Vec<u8>, JobServiceError>;
}

/// Build the document converter for `config`.
///
/// Returns `Ok(None)` when no API key is configured, which disables
/// delegation without failing startup.
pub fn create_document_converter(
    config: &JobServiceConfig,
) -> Result<Option<Arc<dyn DocumentConverter>>, JobServiceError> {
    if !config.is_configured() {
        return Ok(None);
    }
    Ok(Some(Arc::new(CloudConvertClient::new(config.clone())?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_without_key_is_disabled() {
        let converter = create_document_converter(&JobServiceConfig::default()).unwrap();
        assert!(converter.is_none());
    }

    #[test]
    fn test_create_with_key() {
        let converter =
            create_document_converter(&JobServiceConfig::with_api_key("secret")).unwrap();
        assert_eq!(converter.unwrap().name(), "cloudconvert");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(JobServiceError::ApiError {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(JobServiceError::ApiError {
            status: 429,
            message: String::new()
        }
        .is_retryable());
        assert!(!JobServiceError::ApiError {
            status: 422,
            message: String::new()
        }
        .is_retryable());
        assert!(!JobServiceError::JobFailed("x".to_string()).is_retryable());
        assert!(!JobServiceError::MissingResultUrl.is_retryable());
        assert!(JobServiceError::DownloadFailed { status: 502 }.is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = JobServiceError::Timeout {
            what: "job abc".to_string(),
            waited_secs: 300,
        };
        assert_eq!(err.to_string(), "Timed out after 300s waiting for job abc");
        assert_eq!(err.kind(), "timeout");
    }
}
