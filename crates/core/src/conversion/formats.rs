//! Output formats and MIME classification.
//!
//! Classification works on the MIME string the client declared for the
//! upload. Matching is case-sensitive, the way browsers report types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const WORD_MIME: &str = "application/msword";
pub const WORD_OOXML_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const EXCEL_MIME: &str = "application/vnd.ms-excel";
pub const EXCEL_OOXML_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const PDF_MIME: &str = "application/pdf";
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// A format a file can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpg,
    Png,
    Webp,
    Gif,
    Bmp,
    Pdf,
    Docx,
    Txt,
    Csv,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 9] = [
        TargetFormat::Jpg,
        TargetFormat::Png,
        TargetFormat::Webp,
        TargetFormat::Gif,
        TargetFormat::Bmp,
        TargetFormat::Pdf,
        TargetFormat::Docx,
        TargetFormat::Txt,
        TargetFormat::Csv,
    ];

    /// Wire name, also used as the file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFormat::Jpg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::Webp => "webp",
            TargetFormat::Gif => "gif",
            TargetFormat::Bmp => "bmp",
            TargetFormat::Pdf => "pdf",
            TargetFormat::Docx => "docx",
            TargetFormat::Txt => "txt",
            TargetFormat::Csv => "csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Content type sent back for a result in this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            TargetFormat::Jpg => "image/jpeg",
            TargetFormat::Png => "image/png",
            TargetFormat::Webp => "image/webp",
            TargetFormat::Gif => "image/gif",
            TargetFormat::Bmp => "image/bmp",
            TargetFormat::Pdf => PDF_MIME,
            TargetFormat::Txt => "text/plain;charset=utf-8",
            TargetFormat::Csv => "text/csv;charset=utf-8",
            TargetFormat::Docx => WORD_OOXML_MIME,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown format: {}", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for TargetFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetFormat::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Family a declared MIME type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Image,
    Pdf,
    Word,
    Spreadsheet,
    Presentation,
    PlainText,
    Unknown,
}

impl SourceKind {
    /// Classify a MIME string. Word is checked before the substring rules
    /// for spreadsheets and presentations.
    pub fn classify(mime: &str) -> Self {
        if mime.starts_with("image/") {
            SourceKind::Image
        } else if mime == PDF_MIME {
            SourceKind::Pdf
        } else if is_word_mime(mime) {
            SourceKind::Word
        } else if mime == EXCEL_MIME
            || mime == EXCEL_OOXML_MIME
            || mime.contains("excel")
            || mime.contains("spreadsheet")
        {
            SourceKind::Spreadsheet
        } else if mime.contains("powerpoint") || mime.contains("presentation") {
            SourceKind::Presentation
        } else if mime == PLAIN_TEXT_MIME {
            SourceKind::PlainText
        } else {
            SourceKind::Unknown
        }
    }

    pub fn allowed_targets(&self) -> &'static [TargetFormat] {
        use TargetFormat::*;
        match self {
            SourceKind::Image => &[Jpg, Png, Webp, Gif, Bmp, Pdf],
            SourceKind::Pdf => &[Jpg, Png, Txt],
            SourceKind::Word => &[Pdf, Txt],
            SourceKind::Spreadsheet => &[Pdf, Csv],
            SourceKind::Presentation => &[Pdf, Jpg],
            SourceKind::PlainText => &[Pdf],
            SourceKind::Unknown => &[],
        }
    }
}

pub fn is_word_mime(mime: &str) -> bool {
    mime == WORD_MIME || mime == WORD_OOXML_MIME
}

/// Formats a file with the given MIME type may be converted into.
///
/// Unrecognized types yield an empty slice rather than an error.
pub fn allowed_targets(mime: &str) -> &'static [TargetFormat] {
    SourceKind::classify(mime).allowed_targets()
}

/// Whether `target` (as sent by the client) is reachable from `mime`.
pub fn is_allowed(mime: &str, target: &str) -> bool {
    allowed_targets(mime).iter().any(|f| f.as_str() == target)
}
