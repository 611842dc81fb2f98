// HTTP handlers for documents and single-use downloads

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::documents::{Document, DocumentError, DocumentService, DownloadToken};
use crate::error::ApiError;
use crate::AppState;

/// Header naming the uploaded file
pub const FILE_NAME_HEADER: &str = "filename";
/// Header naming the target directory, relative to the storage root
pub const FILE_PATH_HEADER: &str = "filepath";

pub(crate) fn document_service(state: &AppState) -> DocumentService {
    DocumentService::new(
        state.db.clone(),
        state.storage.clone(),
        state.config.download_token_ttl,
    )
}

fn header_text(headers: &HeaderMap, name: &str, missing: DocumentError) -> Result<String, DocumentError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or(missing)
}

/// Handler for POST /api/documents
/// Raw file bytes in the body, `fileName` and `filePath` in headers
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    params(
        ("fileName" = String, Header, description = "Name of the uploaded file"),
        ("filePath" = String, Header, description = "Directory relative to the storage root")
    ),
    responses(
        (status = 201, description = "Document stored", body = Document),
        (status = 400, description = "Missing header or path outside storage", body = crate::error::ErrorResponse,
            example = json!({"error_code": "badRequest.missingFileNameHeader", "message": "The request is invalid", "timestamp": "2024-09-13T15:00:00.000Z"}))
    ),
    tag = "documents"
)]
pub async fn upload_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let file_name = header_text(&headers, FILE_NAME_HEADER, DocumentError::MissingFileNameHeader)?;
    let directory = header_text(&headers, FILE_PATH_HEADER, DocumentError::MissingFilePathHeader)?;

    tracing::debug!("User {} uploading {} into {}", user.id, file_name, directory);
    let document = document_service(&state).upload(&directory, &file_name, &body).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Handler for GET /api/documents
#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "All documents", body = Vec<Document>)
    ),
    tag = "documents"
)]
pub async fn list_documents(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(document_service(&state).list().await?))
}

/// Handler for GET /api/documents/:id
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document found", body = Document),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn get_document(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Document>, ApiError> {
    Ok(Json(document_service(&state).get(id).await?))
}

/// Handler for GET /api/documents/:id/downloadToken
#[utoipa::path(
    get,
    path = "/api/documents/{id}/downloadToken",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Single-use download token", body = DownloadToken),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn create_download_token(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DownloadToken>, ApiError> {
    let token = document_service(&state).create_download_token(id, Utc::now()).await?;
    tracing::info!("User {} requested a download of document {}", user.id, id);
    Ok(Json(token))
}

/// Handler for GET /api/documents/download/:token
/// Needs only the API key; the token itself is the credential
#[utoipa::path(
    get,
    path = "/api/documents/download/{token}",
    params(("token" = String, Path, description = "Download token")),
    responses(
        (status = 200, description = "File content", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 403, description = "Token already used", body = crate::error::ErrorResponse,
            example = json!({"error_code": "forbidden.tokenAlreadyUsed", "message": "Access is forbidden", "timestamp": "2024-09-13T15:00:00.000Z"})),
        (status = 404, description = "Unknown token or file", body = crate::error::ErrorResponse),
        (status = 410, description = "Token expired", body = crate::error::ErrorResponse,
            example = json!({"error_code": "gone.downloadTokenExpired", "message": "The resource is no longer available", "timestamp": "2024-09-13T15:00:00.000Z"}))
    ),
    tag = "documents"
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let file = document_service(&state).download(&token, Utc::now()).await?;

    let disposition = HeaderValue::from_str(&content_disposition(&file.file_name))
        .map_err(|e| ApiError::InternalError(format!("content-disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// Handler for DELETE /api/documents/:id
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Document and file removed"),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Document still referenced", body = crate::error::ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn delete_document(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    document_service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `attachment` disposition; quotes and control characters are dropped from the name
fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}
