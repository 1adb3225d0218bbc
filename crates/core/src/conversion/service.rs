//! Conversion request handling.
//!
//! Each call is independent: validate against the classifier, pick a
//! strategy, run it. Only the external job strategy can fail at run time,
//! and its failures are absorbed by substituting a placeholder PDF.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::job_service::{DocumentConverter, JobServiceError};
use crate::metrics::{CONVERSIONS_REJECTED, CONVERSIONS_TOTAL, CONVERSION_DURATION, FALLBACKS_TOTAL};

use super::error::ConversionError;
use super::filename::derive_file_name;
use super::formats::{allowed_targets, TargetFormat};
use super::placeholder;
use super::strategy::{select_strategy, Strategy};
use super::text::extract_text;
use super::types::{ConversionOutcome, ConversionRequest, ConversionResult, UploadedFile};

/// Runs conversions. Holds no per-request state and is shared across requests.
#[derive(Clone)]
pub struct ConversionService {
    document_converter: Option<Arc<dyn DocumentConverter>>,
}

impl ConversionService {
    /// Create a service. `None` disables delegation to the external service.
    pub fn new(document_converter: Option<Arc<dyn DocumentConverter>>) -> Self {
        Self { document_converter }
    }

    /// Whether word documents are sent to the external service.
    pub fn delegation_enabled(&self) -> bool {
        self.document_converter.is_some()
    }

    /// Name of the external converter, if any.
    pub fn converter_name(&self) -> Option<&str> {
        self.document_converter.as_deref().map(|c| c.name())
    }

    /// Check the requested target against the declared type.
    pub fn validate(&self, request: &ConversionRequest) -> Result<TargetFormat, ConversionError> {
        let mime = &request.file.mime_type;
        allowed_targets(mime)
            .iter()
            .copied()
            .find(|f| f.as_str() == request.target_format)
            .ok_or_else(|| ConversionError::Unsupported {
                mime: mime.clone(),
                target: request.target_format.clone(),
            })
    }

    /// Convert a request into a result.
    pub async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionResult, ConversionError> {
        let target = match self.validate(&request) {
            Ok(target) => target,
            Err(e) => {
                CONVERSIONS_REJECTED.with_label_values(&["unsupported"]).inc();
                debug!("Rejected conversion of {}: {}", request.file.file_name, e);
                return Err(e);
            }
        };

        let file = request.file;
        let strategy = select_strategy(&file.mime_type, target);
        info!(
            "Converting {} ({}, {} bytes) to {} via {}",
            file.file_name,
            file.mime_type,
            file.bytes.len(),
            target,
            strategy
        );

        let start = Instant::now();
        let suggested_file_name = derive_file_name(&file.file_name, target);
        let (bytes, outcome) = self.run_strategy(strategy, file, target).await;

        CONVERSION_DURATION
            .with_label_values(&[strategy.as_str()])
            .observe(start.elapsed().as_secs_f64());
        CONVERSIONS_TOTAL
            .with_label_values(&[strategy.as_str(), outcome.as_str()])
            .inc();

        Ok(ConversionResult {
            bytes,
            mime_type: target.mime_type(),
            suggested_file_name,
            strategy,
            outcome,
        })
    }

    async fn run_strategy(
        &self,
        strategy: Strategy,
        file: UploadedFile,
        target: TargetFormat,
    ) -> (Vec<u8>, ConversionOutcome) {
        match strategy {
            Strategy::ExternalJob => self.convert_externally(file, target).await,
            Strategy::ImagePassthrough => {
                debug!(
                    "Image {} passed through unchanged as {}",
                    file.file_name, target
                );
                (file.bytes, ConversionOutcome::Succeeded)
            }
            Strategy::TextExtraction => {
                let text = extract_text(&file.mime_type, &file.file_name, &file.bytes);
                (text.into_bytes(), ConversionOutcome::Succeeded)
            }
            Strategy::PlaceholderPdf => (
                placeholder::synthesize(&file.mime_type, &file.file_name),
                ConversionOutcome::Succeeded,
            ),
            Strategy::Echo => {
                debug!(
                    "No dedicated conversion from {} to {}, returning original bytes",
                    file.mime_type, target
                );
                (file.bytes, ConversionOutcome::Succeeded)
            }
        }
    }

    async fn convert_externally(
        &self,
        file: UploadedFile,
        target: TargetFormat,
    ) -> (Vec<u8>, ConversionOutcome) {
        let result = match &self.document_converter {
            Some(converter) => {
                converter
                    .convert_document(&file.bytes, &file.file_name, target)
                    .await
            }
            None => Err(JobServiceError::NotConfigured(
                "no job service credential".to_string(),
            )),
        };

        match result {
            Ok(bytes) => (bytes, ConversionOutcome::Succeeded),
            Err(e) => {
                warn!(
                    "External conversion of {} failed, using placeholder document: {}",
                    file.file_name, e
                );
                FALLBACKS_TOTAL.with_label_values(&[e.kind()]).inc();
                (
                    placeholder::synthesize(&file.mime_type, &file.file_name),
                    ConversionOutcome::FallbackApplied,
                )
            }
        }
    }
}
