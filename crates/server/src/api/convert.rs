//! Conversion API handlers.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Query, State,
    },
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use filedeck_core::{
    allowed_targets,
    conversion::DEFAULT_MIME,
    metrics::CONVERSIONS_REJECTED,
    ConversionError, ConversionRequest, ConversionResult, SourceKind, TargetFormat, UploadedFile,
};
use tracing::{debug, error, info};

use super::handlers::error_response;
use super::middleware::AuthUser;
use crate::state::AppState;

/// Multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Multipart field carrying the requested format.
pub const TARGET_FIELD: &str = "targetFormat";

/// Name used when the upload part has no file name.
const DEFAULT_FILE_NAME: &str = "upload";

static STRATEGY_HEADER: HeaderName = HeaderName::from_static("x-conversion-strategy");
static OUTCOME_HEADER: HeaderName = HeaderName::from_static("x-conversion-outcome");

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the format picker
#[derive(Debug, Deserialize)]
pub struct FormatsParams {
    pub mime: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormatsResponse {
    pub mime: String,
    pub kind: SourceKind,
    pub targets: &'static [TargetFormat],
    /// Whether word to PDF goes through the external service.
    pub delegation_enabled: bool,
}

#[derive(Debug, Default)]
struct ConvertForm {
    file: Option<UploadedFile>,
    target_format: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/formats?mime=<type>
///
/// List the formats an upload of the given type can be converted to.
pub async fn list_formats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormatsParams>,
) -> Result<Json<FormatsResponse>, impl IntoResponse> {
    let mime = match params.mime {
        Some(m) if !m.is_empty() => m,
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "mime query parameter is required",
            ))
        }
    };

    Ok(Json(FormatsResponse {
        kind: SourceKind::classify(&mime),
        targets: allowed_targets(&mime),
        delegation_enabled: state.conversion().delegation_enabled(),
        mime,
    }))
}

/// POST /api/v1/convert
///
/// Convert a multipart upload (`file`, `targetFormat`) and return the
/// converted bytes as an attachment.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let form = match multipart {
        Ok(multipart) => read_form(multipart).await,
        Err(rejection) => {
            error!("Unreadable conversion request from {}: {}", user_id, rejection);
            return conversion_error(&ConversionError::unexpected(rejection.body_text()));
        }
    };

    let form = match form {
        Ok(form) => form,
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            CONVERSIONS_REJECTED.with_label_values(&["too_large"]).inc();
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, e.body_text()).into_response();
        }
        Err(e) => {
            error!("Malformed multipart body from {}: {}", user_id, e);
            return conversion_error(&ConversionError::unexpected(e.body_text()));
        }
    };

    let request = match ConversionRequest::from_parts(form.file, form.target_format) {
        Ok(request) => request,
        Err(e) => {
            CONVERSIONS_REJECTED
                .with_label_values(&["missing_input"])
                .inc();
            debug!("Conversion request from {} is incomplete", user_id);
            return conversion_error(&e);
        }
    };

    match state.conversion().convert(request).await {
        Ok(result) => {
            info!(
                "Converted for {}: {} ({} bytes, {}, {})",
                user_id,
                result.suggested_file_name,
                result.bytes.len(),
                result.strategy,
                result.outcome.as_str()
            );
            conversion_response(result)
        }
        Err(e) => conversion_error(&e),
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn read_form(mut multipart: Multipart) -> Result<ConvertForm, MultipartError> {
    let mut form = ConvertForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(DEFAULT_FILE_NAME)
                    .to_string();
                let mime_type = field
                    .content_type()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(DEFAULT_MIME)
                    .to_string();
                let bytes = field.bytes().await?;
                form.file = Some(UploadedFile::new(bytes.to_vec(), file_name, mime_type));
            }
            Some(TARGET_FIELD) => {
                form.target_format = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn conversion_response(result: ConversionResult) -> Response {
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(result.mime_type)),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(&result.suggested_file_name),
        ),
        (
            STRATEGY_HEADER.clone(),
            HeaderValue::from_static(result.strategy.as_str()),
        ),
        (
            OUTCOME_HEADER.clone(),
            HeaderValue::from_static(result.outcome.as_str()),
        ),
    ];
    (StatusCode::OK, headers, result.bytes).into_response()
}

fn conversion_error(err: &ConversionError) -> Response {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error_response(status, err.to_string()).into_response()
}

/// `attachment; filename="<name>"`, plus an RFC 5987 `filename*` parameter
/// when the name cannot be sent as a plain quoted string.
pub fn content_disposition(file_name: &str) -> HeaderValue {
    let plain = file_name
        .chars()
        .all(|c| (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\');

    let value = if plain {
        format!("attachment; filename=\"{}\"", file_name)
    } else {
        let fallback: String = file_name
            .chars()
            .map(|c| {
                if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(file_name)
        )
    };

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
