//! Types for the file library.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metadata for a file in a user's library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileObject {
    /// Unique id (uuid v4).
    pub id: String,
    /// Owner of the file.
    pub user_id: String,
    /// Original file name.
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
    pub date_added: DateTime<Utc>,
    /// Whether the file has been converted.
    pub processed: bool,
    /// Target format of the last conversion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_processed: Option<DateTime<Utc>>,
}

/// Metadata supplied when adding a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFileObject {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Field to sort library listings by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    #[default]
    Date,
    Size,
    Type,
}

impl SortField {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name COLLATE NOCASE",
            SortField::Date => "date_added",
            SortField::Size => "size_bytes",
            SortField::Type => "mime_type",
        }
    }
}

impl FromStr for SortField {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "date" => Ok(SortField::Date),
            "size" => Ok(SortField::Size),
            "type" => Ok(SortField::Type),
            other => Err(LibraryError::InvalidQuery(format!(
                "unknown sort field: {}",
                other
            ))),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub(crate) fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(LibraryError::InvalidQuery(format!(
                "unknown sort order: {}",
                other
            ))),
        }
    }
}

/// Query for listing a user's files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryQuery {
    /// Case-insensitive substring matched against the file name.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

impl Default for LibraryQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: SortField::default(),
            order: SortOrder::default(),
            limit: default_limit(),
        }
    }
}

/// Errors from file library operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("database error: {0}")]
    Database(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for LibraryError {
    fn from(e: rusqlite::Error) -> Self {
        LibraryError::Database(e.to_string())
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortField::Name => "name",
            SortField::Date => "date",
            SortField::Size => "size",
            SortField::Type => "type",
        };
        write!(f, "{}", s)
    }
}
