//! Error types for the conversion module.

use thiserror::Error;

/// Errors surfaced by a conversion request.
///
/// External service failures never appear here: they are recovered inside
/// the service by falling back to a placeholder document.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The request lacked a file or a target format.
    #[error("File and target format are required")]
    MissingInput,

    /// The target format is not reachable from the declared type.
    #[error("Conversion from {mime} to {target} is not supported")]
    Unsupported { mime: String, target: String },

    /// Anything else, such as an unreadable request body.
    #[error("{0}")]
    Unexpected(String),
}

impl ConversionError {
    pub fn unexpected(reason: impl Into<String>) -> Self {
        Self::Unexpected(reason.into())
    }

    /// Whether the caller sent a bad request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingInput | Self::Unsupported { .. })
    }
}
