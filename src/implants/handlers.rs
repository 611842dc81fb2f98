// HTTP handlers for the implant catalogue

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{AdminUser, AuthenticatedUser, Role};
use crate::documents::{handlers::document_service, Document, DocumentRepository, DownloadToken};
use crate::error::ApiError;
use crate::implants::{CreateImplant, Implant, ImplantRepository, UpdateImplant};
use crate::materials::{Material, MaterialRepository};
use crate::AppState;

fn implant_conflict(e: sqlx::Error) -> ApiError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => ApiError::conflict("implantAlreadyExists"),
        _ => ApiError::from(e),
    }
}

async fn find_by_reference(state: &AppState, reference: &str) -> Result<Implant, ApiError> {
    if reference.trim().is_empty() {
        return Err(ApiError::bad_request("reference"));
    }
    ImplantRepository::new(state.db.clone())
        .find_by_reference(reference)
        .await?
        .ok_or_else(|| ApiError::not_found("implant"))
}

/// Handler for POST /api/implants
#[utoipa::path(
    post,
    path = "/api/implants",
    request_body = CreateImplant,
    responses(
        (status = 201, description = "Implant created", body = Implant),
        (status = 400, description = "Invalid dimensions, axes or model", body = crate::error::ErrorResponse,
            example = json!({"error_code": "badRequest.diameterHasTooMuchPrecision", "message": "The request is invalid", "timestamp": "2024-09-13T15:00:00.000Z"})),
        (status = 409, description = "Reference already used", body = crate::error::ErrorResponse)
    ),
    tag = "implants"
)]
pub async fn create_implant(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateImplant>,
) -> Result<(StatusCode, Json<Implant>), ApiError> {
    payload.check_measurements().map_err(|code| ApiError::bad_request(&code))?;
    if !DocumentRepository::new(state.db.clone()).exists(payload.model_id).await? {
        return Err(ApiError::bad_request("inexistantModel"));
    }
    payload.check_axes().map_err(|code| ApiError::bad_request(&code))?;

    let implant = ImplantRepository::new(state.db.clone())
        .create(&payload)
        .await
        .map_err(implant_conflict)?;
    tracing::info!("Created implant {} ({})", implant.id, implant.reference);
    Ok((StatusCode::CREATED, Json(implant)))
}

/// Handler for GET /api/implants
#[utoipa::path(
    get,
    path = "/api/implants",
    responses(
        (status = 200, description = "All implants", body = Vec<Implant>)
    ),
    tag = "implants"
)]
pub async fn list_implants(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Implant>>, ApiError> {
    Ok(Json(ImplantRepository::new(state.db.clone()).find_all().await?))
}

/// Handler for GET /api/implants/by/reference/:reference
#[utoipa::path(
    get,
    path = "/api/implants/by/reference/{reference}",
    params(("reference" = String, Path, description = "Implant reference")),
    responses(
        (status = 200, description = "Implant found", body = Implant),
        (status = 404, description = "Implant not found", body = crate::error::ErrorResponse)
    ),
    tag = "implants"
)]
pub async fn get_implant_by_reference(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(reference): Path<String>,
) -> Result<Json<Implant>, ApiError> {
    Ok(Json(find_by_reference(&state, &reference).await?))
}

/// Handler for GET /api/implants/material/:id
/// The material whose name the implant carries
#[utoipa::path(
    get,
    path = "/api/implants/material/{id}",
    params(("id" = Uuid, Path, description = "Implant ID")),
    responses(
        (status = 200, description = "Material of the implant", body = Material),
        (status = 404, description = "Implant or material not found", body = crate::error::ErrorResponse)
    ),
    tag = "implants"
)]
pub async fn get_implant_material(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Material>, ApiError> {
    let implant = ImplantRepository::new(state.db.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("implant"))?;

    let material = MaterialRepository::new(state.db.clone())
        .find_by_name(&implant.mat_name)
        .await?
        .ok_or_else(|| ApiError::not_found("material"))?;
    Ok(Json(material))
}

/// Handler for GET /api/implants/model/by/reference/:reference
#[utoipa::path(
    get,
    path = "/api/implants/model/by/reference/{reference}",
    params(("reference" = String, Path, description = "Implant reference")),
    responses(
        (status = 200, description = "3D model document of the implant", body = Document),
        (status = 404, description = "Implant or document not found", body = crate::error::ErrorResponse)
    ),
    tag = "implants"
)]
pub async fn get_implant_model(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(reference): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let implant = find_by_reference(&state, &reference).await?;
    Ok(Json(document_service(&state).get(implant.model_id).await?))
}

/// Handler for GET /api/implants/download/token/for/model/:reference
#[utoipa::path(
    get,
    path = "/api/implants/download/token/for/model/{reference}",
    params(("reference" = String, Path, description = "Implant reference")),
    responses(
        (status = 200, description = "Single-use download token for the 3D model", body = DownloadToken),
        (status = 404, description = "Implant or document not found", body = crate::error::ErrorResponse)
    ),
    tag = "implants"
)]
pub async fn create_implant_model_download_token(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(reference): Path<String>,
) -> Result<Json<DownloadToken>, ApiError> {
    let implant = find_by_reference(&state, &reference).await?;
    let token = document_service(&state)
        .create_download_token(implant.model_id, Utc::now())
        .await?;
    Ok(Json(token))
}

/// Handler for PUT /api/implants/:reference
/// Refused to practitioners: only operators and admins maintain the catalogue
#[utoipa::path(
    put,
    path = "/api/implants/{reference}",
    params(("reference" = String, Path, description = "Implant reference")),
    request_body = UpdateImplant,
    responses(
        (status = 200, description = "Implant updated", body = Implant),
        (status = 400, description = "Invalid dimensions, axes or model", body = crate::error::ErrorResponse),
        (status = 401, description = "Role not allowed", body = crate::error::ErrorResponse),
        (status = 404, description = "Implant not found", body = crate::error::ErrorResponse)
    ),
    tag = "implants"
)]
pub async fn update_implant(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(reference): Path<String>,
    Json(payload): Json<UpdateImplant>,
) -> Result<Json<Implant>, ApiError> {
    user.require_role(&[Role::Admin, Role::CompanyOperator])?;
    let implant = find_by_reference(&state, &reference).await?;

    payload.check_measurements().map_err(|code| ApiError::bad_request(&code))?;
    if let Some(model_id) = payload.model_id {
        if !DocumentRepository::new(state.db.clone()).exists(model_id).await? {
            return Err(ApiError::bad_request("inexistantModel"));
        }
    }
    payload.check_axes().map_err(|code| ApiError::bad_request(&code))?;

    let updated = ImplantRepository::new(state.db.clone())
        .update(&payload.apply(implant))
        .await
        .map_err(implant_conflict)?
        .ok_or_else(|| ApiError::not_found("implant"))?;
    tracing::info!("Updated implant {} ({})", updated.id, updated.reference);
    Ok(Json(updated))
}

/// Remove an implant, then its model document unless something else uses it
async fn remove_implant(state: &AppState, implant: &Implant) -> Result<(), ApiError> {
    if !ImplantRepository::new(state.db.clone()).delete(implant.id).await? {
        return Err(ApiError::not_found("implant"));
    }
    document_service(state).delete_unreferenced(&[implant.model_id]).await?;
    tracing::info!("Deleted implant {} ({})", implant.id, implant.reference);
    Ok(())
}

/// Handler for DELETE /api/implants
#[utoipa::path(
    delete,
    path = "/api/implants",
    responses(
        (status = 204, description = "All implants and their unused models deleted"),
        (status = 401, description = "Admin role required", body = crate::error::ErrorResponse)
    ),
    tag = "implants"
)]
pub async fn delete_all_implants(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<StatusCode, ApiError> {
    for implant in ImplantRepository::new(state.db.clone()).find_all().await? {
        remove_implant(&state, &implant).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for DELETE /api/implants/:id
#[utoipa::path(
    delete,
    path = "/api/implants/{id}",
    params(("id" = Uuid, Path, description = "Implant ID")),
    responses(
        (status = 204, description = "Implant and its unused model deleted"),
        (status = 404, description = "Implant not found", body = crate::error::ErrorResponse)
    ),
    tag = "implants"
)]
pub async fn delete_implant(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let implant = ImplantRepository::new(state.db.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("implant"))?;
    remove_implant(&state, &implant).await?;
    Ok(StatusCode::NO_CONTENT)
}
