//! Testing utilities and mock implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use filedeck_core::testing::{fixtures, MockDocumentConverter};
//!
//! let converter = Arc::new(MockDocumentConverter::new());
//! let service = ConversionService::new(Some(converter.clone()));
//! let result = service.convert(fixtures::docx_request("report.docx", "pdf")).await?;
//! ```

mod mock_document_converter;

pub use mock_document_converter::{MockDocumentConverter, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::conversion::{ConversionRequest, UploadedFile, WORD_OOXML_MIME};
    use crate::library::NewFileObject;

    /// Minimal bytes that look like an OOXML container.
    pub const DOCX_BYTES: &[u8] = b"PK\x03\x04\x14\x00\x06\x00word/document.xml";

    /// PNG signature followed by a few payload bytes.
    pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

    /// A word document upload.
    pub fn docx_file(name: &str) -> UploadedFile {
        UploadedFile::new(DOCX_BYTES.to_vec(), name, WORD_OOXML_MIME)
    }

    /// A PNG upload.
    pub fn png_file(name: &str) -> UploadedFile {
        UploadedFile::new(PNG_BYTES.to_vec(), name, "image/png")
    }

    /// A plain text upload.
    pub fn text_file(name: &str, content: &str) -> UploadedFile {
        UploadedFile::new(content.as_bytes().to_vec(), name, "text/plain")
    }

    /// A word document conversion request.
    pub fn docx_request(name: &str, target: &str) -> ConversionRequest {
        ConversionRequest::new(docx_file(name), target)
    }

    /// Library metadata for an unprocessed upload.
    pub fn new_file_object(name: &str, mime_type: &str, size_bytes: u64) -> NewFileObject {
        NewFileObject {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes,
        }
    }
}
