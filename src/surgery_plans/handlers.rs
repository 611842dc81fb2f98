// HTTP handlers for surgery plans

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::documents::handlers::document_service;
use crate::error::ApiError;
use crate::implants::Implant;
use crate::surgery_plans::{CreateSurgeryPlan, SurgeryPlan, SurgeryPlanService, UpdateSurgeryPlan};
use crate::AppState;

fn service(state: &AppState) -> SurgeryPlanService {
    SurgeryPlanService::new(state.db.clone(), document_service(state))
}

/// Handler for POST /api/surgeryPlans
#[utoipa::path(
    post,
    path = "/api/surgeryPlans",
    request_body = CreateSurgeryPlan,
    responses(
        (status = 201, description = "Surgery plan created with the next PLAN Medscope ID", body = SurgeryPlan),
        (status = 400, description = "Array too long or depth too precise", body = crate::error::ErrorResponse,
            example = json!({"error_code": "badRequest.tooManyReportDocuments", "message": "The request is invalid", "timestamp": "2024-09-13T15:00:00.000Z"})),
        (status = 404, description = "Unknown treatment, implant or document", body = crate::error::ErrorResponse)
    ),
    tag = "surgeryPlans"
)]
pub async fn create_surgery_plan(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateSurgeryPlan>,
) -> Result<(StatusCode, Json<SurgeryPlan>), ApiError> {
    let plan = service(&state).create(payload).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// Handler for GET /api/surgeryPlans
#[utoipa::path(
    get,
    path = "/api/surgeryPlans",
    responses(
        (status = 200, description = "All surgery plans", body = Vec<SurgeryPlan>)
    ),
    tag = "surgeryPlans"
)]
pub async fn list_surgery_plans(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<SurgeryPlan>>, ApiError> {
    Ok(Json(service(&state).list().await?))
}

/// Handler for GET /api/surgeryPlans/:id
#[utoipa::path(
    get,
    path = "/api/surgeryPlans/{id}",
    params(("id" = Uuid, Path, description = "Surgery plan ID")),
    responses(
        (status = 200, description = "Surgery plan found", body = SurgeryPlan),
        (status = 404, description = "Surgery plan not found", body = crate::error::ErrorResponse)
    ),
    tag = "surgeryPlans"
)]
pub async fn get_surgery_plan(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SurgeryPlan>, ApiError> {
    Ok(Json(service(&state).get(id).await?))
}

/// Handler for GET /api/surgeryPlans/:id/implants
#[utoipa::path(
    get,
    path = "/api/surgeryPlans/{id}/implants",
    params(("id" = Uuid, Path, description = "Surgery plan ID")),
    responses(
        (status = 200, description = "Implants used by the plan, each once", body = Vec<Implant>),
        (status = 404, description = "Surgery plan or implant not found", body = crate::error::ErrorResponse)
    ),
    tag = "surgeryPlans"
)]
pub async fn get_surgery_plan_implants(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Implant>>, ApiError> {
    Ok(Json(service(&state).implants(id).await?))
}

/// Handler for PUT /api/surgeryPlans/:id
#[utoipa::path(
    put,
    path = "/api/surgeryPlans/{id}",
    params(("id" = Uuid, Path, description = "Surgery plan ID")),
    request_body = UpdateSurgeryPlan,
    responses(
        (status = 200, description = "Surgery plan updated", body = SurgeryPlan),
        (status = 400, description = "Array too long or depth too precise", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown plan, implant or document", body = crate::error::ErrorResponse)
    ),
    tag = "surgeryPlans"
)]
pub async fn update_surgery_plan(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSurgeryPlan>,
) -> Result<Json<SurgeryPlan>, ApiError> {
    Ok(Json(service(&state).update(id, payload).await?))
}

/// Handler for PUT /api/surgeryPlans/:id/toggle/treated
#[utoipa::path(
    put,
    path = "/api/surgeryPlans/{id}/toggle/treated",
    params(("id" = Uuid, Path, description = "Surgery plan ID")),
    responses(
        (status = 200, description = "Treated flag flipped", body = SurgeryPlan),
        (status = 404, description = "Surgery plan not found", body = crate::error::ErrorResponse)
    ),
    tag = "surgeryPlans"
)]
pub async fn toggle_surgery_plan_treated(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SurgeryPlan>, ApiError> {
    Ok(Json(service(&state).toggle_treated(id).await?))
}

/// Handler for DELETE /api/surgeryPlans
#[utoipa::path(
    delete,
    path = "/api/surgeryPlans",
    responses(
        (status = 204, description = "All plans and their unused documents deleted"),
        (status = 401, description = "Admin role required", body = crate::error::ErrorResponse)
    ),
    tag = "surgeryPlans"
)]
pub async fn delete_all_surgery_plans(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<StatusCode, ApiError> {
    service(&state).delete_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for DELETE /api/surgeryPlans/:id
#[utoipa::path(
    delete,
    path = "/api/surgeryPlans/{id}",
    params(("id" = Uuid, Path, description = "Surgery plan ID")),
    responses(
        (status = 204, description = "Plan and its unused documents deleted"),
        (status = 401, description = "Admin role required", body = crate::error::ErrorResponse),
        (status = 404, description = "Surgery plan not found", body = crate::error::ErrorResponse)
    ),
    tag = "surgeryPlans"
)]
pub async fn delete_surgery_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
