//! File format conversion.
//!
//! An upload is classified by its declared MIME type, checked against the
//! formats reachable from that type, and routed to one of a fixed set of
//! strategies:
//!
//! - word documents to PDF go through the external job service
//! - images to other image formats pass through unchanged
//! - anything to `txt` gets a text rendition
//! - anything else to PDF gets a placeholder document
//! - remaining approved pairs echo the input
//!
//! # Example
//!
//! ```ignore
//! use filedeck_core::conversion::{ConversionRequest, ConversionService, UploadedFile};
//!
//! let service = ConversionService::new(None);
//! let file = UploadedFile::new(bytes, "report.docx", WORD_OOXML_MIME);
//! let result = service.convert(ConversionRequest::new(file, "pdf")).await?;
//! assert_eq!(result.suggested_file_name, "report.pdf");
//! ```

mod error;
mod filename;
mod formats;
pub mod placeholder;
mod service;
mod strategy;
mod text;
mod types;

pub use error::ConversionError;
pub use filename::{base_name, derive_file_name};
pub use formats::{
    allowed_targets, is_allowed, is_word_mime, SourceKind, TargetFormat, UnknownFormat,
    EXCEL_MIME, EXCEL_OOXML_MIME, PDF_MIME, PLAIN_TEXT_MIME, WORD_MIME, WORD_OOXML_MIME,
};
pub use service::ConversionService;
pub use strategy::{select_strategy, Strategy, STRATEGY_TABLE};
pub use text::extract_text;
pub use types::{
    ConversionOutcome, ConversionRequest, ConversionResult, UploadedFile, DEFAULT_MIME,
};
