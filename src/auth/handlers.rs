// HTTP handlers for session tokens and API keys

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{
    api_keys::ApiKeyService,
    basic::decode_basic_auth,
    middleware::AdminUser,
    models::{ApiKey, ApiKeyCreated, CreateApiKey, LoginResponse, Token},
    repository::TokenRepository,
    service::AuthService,
};
use crate::error::ApiError;
use crate::AppState;

/// Handler for POST /api/tokens/login
/// Credentials come from `Authorization: Basic base64(mail:password)`
#[utoipa::path(
    post,
    path = "/api/tokens/login",
    responses(
        (status = 200, description = "Logged in, bearer value returned once", body = LoginResponse),
        (status = 401, description = "Malformed credentials or wrong password", body = crate::error::ErrorResponse,
            example = json!({"error_code": "unauthorized.invalidCredentials", "message": "Authentication failed", "timestamp": "2024-09-13T15:00:00.000Z"})),
        (status = 403, description = "Account locked after repeated failures", body = crate::error::ErrorResponse,
            example = json!({"error_code": "forbidden.tooManyFailedAttempts", "message": "Access is forbidden", "timestamp": "2024-09-13T15:00:00.000Z"})),
        (status = 404, description = "Unknown mail address", body = crate::error::ErrorResponse)
    ),
    tag = "tokens"
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LoginResponse>, ApiError> {
    let credentials = decode_basic_auth(&headers)?;
    tracing::debug!("Login attempt for {}", credentials.mail_address);

    let response = AuthService::new(state.db.clone(), state.config.lockout)
        .login(credentials, Utc::now())
        .await?;
    Ok(Json(response))
}

/// Handler for DELETE /api/tokens/logout/:id
#[utoipa::path(
    delete,
    path = "/api/tokens/logout/{id}",
    params(("id" = Uuid, Path, description = "Token ID")),
    responses(
        (status = 204, description = "Token deleted"),
        (status = 404, description = "Token not found", body = crate::error::ErrorResponse)
    ),
    tag = "tokens"
)]
pub async fn logout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    AuthService::new(state.db.clone(), state.config.lockout)
        .logout(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/tokens
#[utoipa::path(
    get,
    path = "/api/tokens",
    responses(
        (status = 200, description = "Active sessions", body = Vec<Token>),
        (status = 401, description = "Not an admin", body = crate::error::ErrorResponse)
    ),
    tag = "tokens"
)]
pub async fn list_tokens(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Token>>, ApiError> {
    let tokens = TokenRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(tokens))
}

/// Handler for POST /api/apiKeys
#[utoipa::path(
    post,
    path = "/api/apiKeys",
    request_body = CreateApiKey,
    responses(
        (status = 201, description = "Key created, value returned once", body = ApiKeyCreated),
        (status = 401, description = "Limit reached, duplicate name or not an admin", body = crate::error::ErrorResponse,
            example = json!({"error_code": "unauthorized.maximumApiKeysReached", "message": "Authentication failed", "timestamp": "2024-09-13T15:00:00.000Z"}))
    ),
    tag = "apiKeys"
)]
pub async fn create_api_key(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateApiKey>,
) -> Result<(StatusCode, Json<ApiKeyCreated>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("missingApiKeyName"));
    }
    tracing::info!("Admin {} creating API key '{}'", admin.id, payload.name);

    let created = ApiKeyService::new(state.db.clone())
        .create(payload.name.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for GET /api/apiKeys
#[utoipa::path(
    get,
    path = "/api/apiKeys",
    responses(
        (status = 200, description = "Registered keys, without values", body = Vec<ApiKey>)
    ),
    tag = "apiKeys"
)]
pub async fn list_api_keys(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<ApiKey>>, ApiError> {
    let keys = ApiKeyService::new(state.db.clone()).list().await?;
    Ok(Json(keys))
}

/// Handler for DELETE /api/apiKeys/:id
#[utoipa::path(
    delete,
    path = "/api/apiKeys/{id}",
    params(("id" = Uuid, Path, description = "API key ID")),
    responses(
        (status = 204, description = "Key deleted"),
        (status = 404, description = "Key not found", body = crate::error::ErrorResponse)
    ),
    tag = "apiKeys"
)]
pub async fn delete_api_key(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ApiKeyService::new(state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
