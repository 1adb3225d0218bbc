//! File library API handlers.
//!
//! Every route is scoped to the authenticated user: ids belonging to
//! someone else answer 404 like ids that never existed.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use filedeck_core::{
    FileObject, LibraryError, LibraryQuery, NewFileObject, SortField, SortOrder, TargetFormat,
};
use tracing::error;

use super::handlers::{error_response, ErrorResponse, SuccessResponse};
use super::middleware::AuthUser;
use crate::state::AppState;

/// Maximum allowed limit for file listings
const MAX_LIMIT: u32 = 1000;

/// Default limit for file listings
const DEFAULT_LIMIT: u32 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing files
#[derive(Debug, Deserialize)]
pub struct ListFilesParams {
    /// Case-insensitive name filter
    pub search: Option<String>,
    /// One of name, date, size, type
    pub sort: Option<String>,
    /// asc or desc
    pub order: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ListFilesResponse {
    pub files: Vec<FileObject>,
    pub count: usize,
    pub total: u64,
}

/// Request body for marking a file as processed
#[derive(Debug, Deserialize)]
pub struct MarkProcessedBody {
    pub converted_format: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn library_error(e: LibraryError) -> ApiError {
    match e {
        LibraryError::NotFound(id) => {
            error_response(StatusCode::NOT_FOUND, format!("File not found: {}", id))
        }
        LibraryError::InvalidQuery(msg) => error_response(StatusCode::BAD_REQUEST, msg),
        e => {
            error!("File library error: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

impl ListFilesParams {
    fn into_query(self) -> Result<LibraryQuery, LibraryError> {
        let sort = match self.sort.as_deref() {
            Some(s) if !s.is_empty() => s.parse::<SortField>()?,
            _ => SortField::default(),
        };
        let order = match self.order.as_deref() {
            Some(s) if !s.is_empty() => s.parse::<SortOrder>()?,
            _ => SortOrder::default(),
        };

        Ok(LibraryQuery {
            search: self.search,
            sort,
            order,
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/files
///
/// List the caller's files, optionally filtered and sorted.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ListFilesParams>,
) -> Result<Json<ListFilesResponse>, ApiError> {
    let query = params.into_query().map_err(library_error)?;
    let library = state.library();

    let files = library.list(&user_id, &query).map_err(library_error)?;
    let total = library.count(&user_id).map_err(library_error)?;

    Ok(Json(ListFilesResponse {
        count: files.len(),
        files,
        total,
    }))
}

/// POST /api/v1/files
///
/// Record a new upload in the caller's library.
pub async fn add_file(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<NewFileObject>,
) -> Result<(StatusCode, Json<FileObject>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "File name cannot be empty",
        ));
    }

    match state.library().add(&user_id, body) {
        Ok(file) => Ok((StatusCode::CREATED, Json(file))),
        Err(e) => Err(library_error(e)),
    }
}

/// GET /api/v1/files/{id}
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<FileObject>, ApiError> {
    state
        .library()
        .get(&user_id, &id)
        .map(Json)
        .map_err(library_error)
}

/// DELETE /api/v1/files/{id}
pub async fn remove_file(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    match state.library().remove(&user_id, &id) {
        Ok(()) => Ok(Json(SuccessResponse {
            message: format!("File {} removed", id),
        })),
        Err(e) => Err(library_error(e)),
    }
}

/// POST /api/v1/files/{id}/processed
///
/// Mark a file as converted to `converted_format`.
pub async fn mark_processed(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<MarkProcessedBody>,
) -> Result<Json<FileObject>, ApiError> {
    let format = match body.converted_format.parse::<TargetFormat>() {
        Ok(f) => f,
        Err(e) => return Err(error_response(StatusCode::BAD_REQUEST, e.to_string())),
    };

    state
        .library()
        .mark_processed(&user_id, &id, format.as_str())
        .map(Json)
        .map_err(library_error)
}
