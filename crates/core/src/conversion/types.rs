//! Request and result types for a single conversion.

use serde::Serialize;

use super::error::ConversionError;
use super::strategy::Strategy;

/// Fallback MIME type when the client does not declare one.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl UploadedFile {
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// One conversion request. Lives for a single call; never persisted.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub file: UploadedFile,
    /// Target format exactly as the client sent it.
    pub target_format: String,
}

impl ConversionRequest {
    pub fn new(file: UploadedFile, target_format: impl Into<String>) -> Self {
        Self {
            file,
            target_format: target_format.into(),
        }
    }

    /// Build a request from optional form fields.
    ///
    /// Fails with [`ConversionError::MissingInput`] when the file is absent
    /// or the target format is empty.
    pub fn from_parts(
        file: Option<UploadedFile>,
        target_format: Option<String>,
    ) -> Result<Self, ConversionError> {
        match (file, target_format) {
            (Some(file), Some(target)) if !target.is_empty() => Ok(Self::new(file, target)),
            _ => Err(ConversionError::MissingInput),
        }
    }
}

/// How a successful conversion was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// The selected strategy produced the output.
    Succeeded,
    /// The external service failed or was unavailable; a placeholder was returned.
    FallbackApplied,
}

impl ConversionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionOutcome::Succeeded => "succeeded",
            ConversionOutcome::FallbackApplied => "fallback_applied",
        }
    }
}

/// Output of a conversion, ready to be written to the response.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub suggested_file_name: String,
    pub strategy: Strategy,
    pub outcome: ConversionOutcome,
}
