// HTTP handlers for user accounts

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::{AdminUser, AuthenticatedUser, UserResponse};
use crate::error::ApiError;
use crate::users::{CreateUser, UserService};
use crate::AppState;

/// Handler for POST /api/users/first
/// Creates the initial admin account; refused once any user exists
#[utoipa::path(
    post,
    path = "/api/users/first",
    request_body = CreateUser,
    responses(
        (status = 201, description = "First admin created", body = UserResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Users already exist", body = crate::error::ErrorResponse,
            example = json!({"error_code": "forbidden.usersAlreadyExist", "message": "Access is forbidden", "timestamp": "2024-09-13T15:00:00.000Z"}))
    ),
    tag = "users"
)]
pub async fn create_first_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = UserService::new(state.db.clone()).create_first(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input or duplicate mail address", body = crate::error::ErrorResponse,
            example = json!({"error_code": "badRequest.password.missingDigit", "message": "The request is invalid", "timestamp": "2024-09-13T15:00:00.000Z"})),
        (status = 401, description = "Not an admin", body = crate::error::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    tracing::debug!("Creating user {}", payload.mail_address);
    let user = UserService::new(state.db.clone()).create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Not an admin", body = crate::error::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserService::new(state.db.clone()).list().await?;
    Ok(Json(users))
}

/// Handler for GET /api/users/:id
/// Users may read their own account, admins any account
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Another user's account", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    user.require_self_or_admin(id)?;
    let found = UserService::new(state.db.clone()).get(id).await?;
    Ok(Json(found))
}

/// Handler for DELETE /api/users/:id
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
        (status = 409, description = "A treatment of the user has follow-ups", body = crate::error::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    UserService::new(state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
