//! Mock document converter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::conversion::TargetFormat;
use crate::job_service::{DocumentConverter, JobServiceError};

/// A recorded call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub output_format: TargetFormat,
}

/// Mock implementation of the DocumentConverter trait.
///
/// Provides controllable behavior for testing:
/// - Track calls for assertions
/// - Return configurable output bytes
/// - Fail the next call with a given error
/// - Simulate service latency
///
/// # Example
///
/// ```rust,ignore
/// use filedeck_core::testing::MockDocumentConverter;
///
/// let converter = Arc::new(MockDocumentConverter::new());
/// converter.set_next_error(JobServiceError::MissingResultUrl).await;
///
/// let service = ConversionService::new(Some(converter.clone()));
/// // ... the next word-to-pdf conversion falls back to a placeholder
/// assert_eq!(converter.call_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockDocumentConverter {
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    output: Arc<RwLock<Vec<u8>>>,
    next_error: Arc<RwLock<Option<JobServiceError>>>,
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockDocumentConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDocumentConverter {
    /// Create a new mock that returns a small fake PDF.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            output: Arc::new(RwLock::new(b"%PDF-1.7\n% mock output\n%%EOF\n".to_vec())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Get the number of calls made.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Set the bytes returned by successful calls.
    pub async fn set_output(&self, output: Vec<u8>) {
        *self.output.write().await = output;
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: JobServiceError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set a simulated service latency.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }
}

#[async_trait]
impl DocumentConverter for MockDocumentConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert_document(
        &self,
        bytes: &[u8],
        file_name: &str,
        output_format: TargetFormat,
    ) -> Result<Vec<u8>, JobServiceError> {
        self.calls.write().await.push(RecordedCall {
            bytes: bytes.to_vec(),
            file_name: file_name.to_string(),
            output_format,
        });

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(self.output.read().await.clone())
    }
}
