// HTTP handlers for patients

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{repository::UserRepository, AuthenticatedUser};
use crate::error::ApiError;
use crate::patients::{CreatePatient, Patient, PatientService};
use crate::validation::validate_medscope_id;
use crate::AppState;

/// Handler for POST /api/patients
#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = CreatePatient,
    responses(
        (status = 201, description = "Patient created with the next Medscope ID", body = Patient),
        (status = 400, description = "Invalid input or unknown practitioner", body = crate::error::ErrorResponse,
            example = json!({"error_code": "badRequest.invalidAge", "message": "Request validation failed", "timestamp": "2024-09-13T15:00:00.000Z"})),
        (status = 409, description = "Patient already exists or no Medscope ID left", body = crate::error::ErrorResponse)
    ),
    tag = "patients"
)]
pub async fn create_patient(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePatient>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    payload.validate()?;
    user.require_self_or_admin(payload.user_id)?;

    if !UserRepository::new(state.db.clone()).exists(payload.user_id).await? {
        return Err(ApiError::bad_request("userDoesntExist"));
    }

    let patient = PatientService::new(state.db.clone()).create(&payload).await?;

    tracing::info!(
        "Created patient {} ({}) for user {}",
        patient.id,
        patient.medscope_id,
        patient.user_id
    );
    Ok((StatusCode::CREATED, Json(patient)))
}

/// Handler for GET /api/patients
/// Admins see every patient, practitioners their own
#[utoipa::path(
    get,
    path = "/api/patients",
    responses(
        (status = 200, description = "Visible patients", body = Vec<Patient>)
    ),
    tag = "patients"
)]
pub async fn list_patients(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let owner = (!user.is_admin()).then_some(user.id);
    let patients = PatientService::new(state.db.clone()).list(owner).await?;
    Ok(Json(patients))
}

/// Handler for GET /api/patients/:id
#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient found", body = Patient),
        (status = 404, description = "Patient not found", body = crate::error::ErrorResponse)
    ),
    tag = "patients"
)]
pub async fn get_patient(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let patient = PatientService::new(state.db.clone()).get(id).await?;
    user.require_self_or_admin(patient.user_id)?;
    Ok(Json(patient))
}

/// Handler for GET /api/patients/medscopeID/:medscope_id
#[utoipa::path(
    get,
    path = "/api/patients/medscopeID/{medscope_id}",
    params(("medscope_id" = String, Path, description = "Medscope ID, MEDP followed by four digits")),
    responses(
        (status = 200, description = "Patient found", body = Patient),
        (status = 400, description = "Malformed Medscope ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Patient not found", body = crate::error::ErrorResponse)
    ),
    tag = "patients"
)]
pub async fn get_patient_by_medscope_id(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(medscope_id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    if validate_medscope_id(&medscope_id).is_err() {
        return Err(ApiError::bad_request("medscopeIDBadlyFormatted"));
    }
    let patient = PatientService::new(state.db.clone())
        .get_by_medscope_id(&medscope_id)
        .await?;
    user.require_self_or_admin(patient.user_id)?;
    Ok(Json(patient))
}
