// HTTP handlers for treatment follow-up endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::follow_ups::{
    CalculateTreatmentFollowUp, CreateTreatmentFollowUp, FollowUpService, OpenTreatmentFollowUp,
    TreatmentFollowUp, UpdateTreatmentFollowUpStatus, ValidateTreatmentFollowUp,
};
use crate::AppState;

/// Handler for POST /api/treatmentFollowUps
/// Registers a follow-up for a treatment, always in the `received` state
#[utoipa::path(
    post,
    path = "/api/treatmentFollowUps",
    request_body = CreateTreatmentFollowUp,
    responses(
        (status = 201, description = "Follow-up created", body = TreatmentFollowUp),
        (status = 400, description = "Unknown treatment or malformed creation date", body = crate::error::ErrorResponse,
            example = json!({"error_code": "badRequest.inexistantTreatment", "message": "The request is invalid", "timestamp": "2024-09-13T15:00:00.000Z"})),
        (status = 401, description = "Missing or invalid credentials", body = crate::error::ErrorResponse)
    ),
    tag = "treatmentFollowUps"
)]
pub async fn create_follow_up(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTreatmentFollowUp>,
) -> Result<(StatusCode, Json<TreatmentFollowUp>), ApiError> {
    tracing::debug!("User {} creating follow-up for treatment {}", user.id, payload.treatment_id);

    let follow_up = FollowUpService::new(state.db.clone()).create(payload).await?;
    Ok((StatusCode::CREATED, Json(follow_up)))
}

/// Handler for GET /api/treatmentFollowUps
#[utoipa::path(
    get,
    path = "/api/treatmentFollowUps",
    responses(
        (status = 200, description = "All follow-ups", body = Vec<TreatmentFollowUp>),
        (status = 401, description = "Missing or invalid credentials", body = crate::error::ErrorResponse)
    ),
    tag = "treatmentFollowUps"
)]
pub async fn list_follow_ups(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<TreatmentFollowUp>>, ApiError> {
    let follow_ups = FollowUpService::new(state.db.clone()).list().await?;
    tracing::debug!("Retrieved {} follow-ups", follow_ups.len());
    Ok(Json(follow_ups))
}

/// Handler for GET /api/treatmentFollowUps/:id
#[utoipa::path(
    get,
    path = "/api/treatmentFollowUps/{id}",
    params(("id" = Uuid, Path, description = "Follow-up ID")),
    responses(
        (status = 200, description = "Follow-up found", body = TreatmentFollowUp),
        (status = 404, description = "Follow-up not found", body = crate::error::ErrorResponse)
    ),
    tag = "treatmentFollowUps"
)]
pub async fn get_follow_up(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TreatmentFollowUp>, ApiError> {
    let follow_up = FollowUpService::new(state.db.clone()).get(id).await?;
    Ok(Json(follow_up))
}

/// Handler for PUT /api/treatmentFollowUps/calculate/:id
/// received → inProgress
#[utoipa::path(
    put,
    path = "/api/treatmentFollowUps/calculate/{id}",
    params(("id" = Uuid, Path, description = "Follow-up ID")),
    request_body = CalculateTreatmentFollowUp,
    responses(
        (status = 200, description = "Calculation recorded", body = TreatmentFollowUp),
        (status = 400, description = "Wrong state, missing or malformed field, unknown operator", body = crate::error::ErrorResponse,
            example = json!({"error_code": "badRequest.missingCalculationDate", "message": "The request is invalid", "timestamp": "2024-09-13T15:00:00.000Z"})),
        (status = 404, description = "Follow-up not found", body = crate::error::ErrorResponse)
    ),
    tag = "treatmentFollowUps"
)]
pub async fn calculate_follow_up(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CalculateTreatmentFollowUp>,
) -> Result<Json<TreatmentFollowUp>, ApiError> {
    tracing::debug!("Calculating follow-up {}", id);
    let follow_up = FollowUpService::new(state.db.clone()).calculate(id, payload).await?;
    Ok(Json(follow_up))
}

/// Handler for PUT /api/treatmentFollowUps/validate/:id
/// inProgress → sent
#[utoipa::path(
    put,
    path = "/api/treatmentFollowUps/validate/{id}",
    params(("id" = Uuid, Path, description = "Follow-up ID")),
    request_body = ValidateTreatmentFollowUp,
    responses(
        (status = 200, description = "Validation recorded", body = TreatmentFollowUp),
        (status = 400, description = "Wrong state, missing or malformed field, unknown validator", body = crate::error::ErrorResponse,
            example = json!({"error_code": "badRequest.incorrectFollowUpState", "message": "The request is invalid", "timestamp": "2024-09-13T15:00:00.000Z"})),
        (status = 404, description = "Follow-up not found", body = crate::error::ErrorResponse)
    ),
    tag = "treatmentFollowUps"
)]
pub async fn validate_follow_up(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ValidateTreatmentFollowUp>,
) -> Result<Json<TreatmentFollowUp>, ApiError> {
    tracing::debug!("Validating follow-up {}", id);
    let follow_up = FollowUpService::new(state.db.clone()).validate(id, payload).await?;
    Ok(Json(follow_up))
}

/// Handler for PUT /api/treatmentFollowUps/open/:id
/// sent → open
#[utoipa::path(
    put,
    path = "/api/treatmentFollowUps/open/{id}",
    params(("id" = Uuid, Path, description = "Follow-up ID")),
    request_body = OpenTreatmentFollowUp,
    responses(
        (status = 200, description = "Opening recorded", body = TreatmentFollowUp),
        (status = 400, description = "Wrong state, missing or malformed opening date", body = crate::error::ErrorResponse),
        (status = 404, description = "Follow-up not found", body = crate::error::ErrorResponse)
    ),
    tag = "treatmentFollowUps"
)]
pub async fn open_follow_up(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OpenTreatmentFollowUp>,
) -> Result<Json<TreatmentFollowUp>, ApiError> {
    tracing::debug!("Opening follow-up {}", id);
    let follow_up = FollowUpService::new(state.db.clone()).open(id, payload).await?;
    Ok(Json(follow_up))
}

/// Handler for PUT /api/treatmentFollowUps/status/:id
/// Overwrites the status without any ordering check
#[utoipa::path(
    put,
    path = "/api/treatmentFollowUps/status/{id}",
    params(("id" = Uuid, Path, description = "Follow-up ID")),
    request_body = UpdateTreatmentFollowUpStatus,
    responses(
        (status = 200, description = "Status set, or unchanged when none was given", body = TreatmentFollowUp),
        (status = 404, description = "Follow-up not found", body = crate::error::ErrorResponse)
    ),
    tag = "treatmentFollowUps"
)]
pub async fn set_follow_up_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTreatmentFollowUpStatus>,
) -> Result<Json<TreatmentFollowUp>, ApiError> {
    if let Some(status) = payload.status {
        tracing::info!("User {} overriding status of follow-up {} to {}", user.id, id, status);
    }
    let follow_up = FollowUpService::new(state.db.clone()).set_status(id, payload).await?;
    Ok(Json(follow_up))
}
