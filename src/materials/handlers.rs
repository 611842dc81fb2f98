// HTTP handlers for materials

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::error::ApiError;
use crate::materials::{CreateMaterial, Material, MaterialRepository, UpdateMaterial};
use crate::AppState;

/// Handler for POST /api/materials
#[utoipa::path(
    post,
    path = "/api/materials",
    request_body = CreateMaterial,
    responses(
        (status = 201, description = "Material created", body = Material),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    ),
    tag = "materials"
)]
pub async fn create_material(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateMaterial>,
) -> Result<(StatusCode, Json<Material>), ApiError> {
    payload.validate()?;
    let material = MaterialRepository::new(state.db.clone()).create(&payload).await?;
    tracing::info!("Created material {} ({})", material.id, material.mat_name);
    Ok((StatusCode::CREATED, Json(material)))
}

/// Handler for GET /api/materials
#[utoipa::path(
    get,
    path = "/api/materials",
    responses(
        (status = 200, description = "All materials", body = Vec<Material>)
    ),
    tag = "materials"
)]
pub async fn list_materials(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Material>>, ApiError> {
    Ok(Json(MaterialRepository::new(state.db.clone()).find_all().await?))
}

/// Handler for PUT /api/materials/:id
#[utoipa::path(
    put,
    path = "/api/materials/{id}",
    params(("id" = Uuid, Path, description = "Material ID")),
    request_body = UpdateMaterial,
    responses(
        (status = 200, description = "Material updated", body = Material),
        (status = 404, description = "Material not found", body = crate::error::ErrorResponse)
    ),
    tag = "materials"
)]
pub async fn update_material(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMaterial>,
) -> Result<Json<Material>, ApiError> {
    payload.validate()?;
    let repository = MaterialRepository::new(state.db.clone());
    let material = repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("material"))?;

    let updated = repository
        .update(&payload.apply(material))
        .await?
        .ok_or_else(|| ApiError::not_found("material"))?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/materials
#[utoipa::path(
    delete,
    path = "/api/materials",
    responses(
        (status = 204, description = "All materials deleted"),
        (status = 401, description = "Admin role required", body = crate::error::ErrorResponse)
    ),
    tag = "materials"
)]
pub async fn delete_all_materials(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<StatusCode, ApiError> {
    let deleted = MaterialRepository::new(state.db.clone()).delete_all().await?;
    tracing::info!("Deleted {} materials", deleted);
    Ok(StatusCode::NO_CONTENT)
}
