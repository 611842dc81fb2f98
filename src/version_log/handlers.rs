// HTTP handlers for the version log

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::version_log::{CreateVersionLog, UpdateVersionLog, VersionLog, VersionLogRepository};
use crate::AppState;

/// Handler for GET /api/versionLogs
/// Readable without an API key
#[utoipa::path(
    get,
    path = "/api/versionLogs",
    responses(
        (status = 200, description = "Current versions", body = VersionLog),
        (status = 404, description = "No version log yet", body = crate::error::ErrorResponse)
    ),
    tag = "versionLogs"
)]
pub async fn get_version_log(State(state): State<AppState>) -> Result<Json<VersionLog>, ApiError> {
    let log = VersionLogRepository::new(state.db.clone())
        .find_current()
        .await?
        .ok_or_else(|| ApiError::not_found("versionLog"))?;
    Ok(Json(log))
}

/// Handler for POST /api/versionLogs
#[utoipa::path(
    post,
    path = "/api/versionLogs",
    request_body = CreateVersionLog,
    responses(
        (status = 201, description = "Version log created", body = VersionLog),
        (status = 409, description = "A version log already exists", body = crate::error::ErrorResponse,
            example = json!({"error_code": "conflict.versionLogAlreadyExists", "message": "The resource already exists", "timestamp": "2024-09-13T15:00:00.000Z"}))
    ),
    tag = "versionLogs"
)]
pub async fn create_version_log(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateVersionLog>,
) -> Result<(StatusCode, Json<VersionLog>), ApiError> {
    payload.validate()?;

    let log = VersionLogRepository::new(state.db.clone())
        .create(&payload)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::conflict("versionLogAlreadyExists")
            }
            _ => ApiError::from(e),
        })?;

    tracing::info!("Version log created: interface {}, api {}, calculator {}", log.interface, log.api, log.calculator);
    Ok((StatusCode::CREATED, Json(log)))
}

/// Handler for PUT /api/versionLogs
#[utoipa::path(
    put,
    path = "/api/versionLogs",
    request_body = UpdateVersionLog,
    responses(
        (status = 200, description = "Version log updated", body = VersionLog),
        (status = 404, description = "No version log yet", body = crate::error::ErrorResponse)
    ),
    tag = "versionLogs"
)]
pub async fn update_version_log(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<UpdateVersionLog>,
) -> Result<Json<VersionLog>, ApiError> {
    let log = VersionLogRepository::new(state.db.clone())
        .update(&payload)
        .await?
        .ok_or_else(|| ApiError::not_found("versionLog"))?;
    Ok(Json(log))
}

/// Handler for PUT /api/versionLogs/package
#[utoipa::path(
    put,
    path = "/api/versionLogs/package",
    responses(
        (status = 200, description = "Package number incremented", body = VersionLog),
        (status = 404, description = "No version log yet", body = crate::error::ErrorResponse)
    ),
    tag = "versionLogs"
)]
pub async fn increment_package(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<VersionLog>, ApiError> {
    let log = VersionLogRepository::new(state.db.clone())
        .increment_package()
        .await?
        .ok_or_else(|| ApiError::not_found("versionLog"))?;
    tracing::info!("Package is now {}", log.package);
    Ok(Json(log))
}
