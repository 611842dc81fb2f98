// HTTP handlers for treatments

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::documents::DocumentRepository;
use crate::error::ApiError;
use crate::patients::PatientRepository;
use crate::treatments::{CreateTreatment, Treatment, TreatmentRepository, MAX_MODEL_3DS};
use crate::validation::is_valid_iso8601;
use crate::AppState;

/// Handler for POST /api/treatments
#[utoipa::path(
    post,
    path = "/api/treatments",
    request_body = CreateTreatment,
    responses(
        (status = 201, description = "Treatment created", body = Treatment),
        (status = 400, description = "Malformed date or unknown patient/document", body = crate::error::ErrorResponse,
            example = json!({"error_code": "badRequest.inexistantDicomDocument", "message": "The request is invalid", "timestamp": "2024-09-13T15:00:00.000Z"}))
    ),
    tag = "treatments"
)]
pub async fn create_treatment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateTreatment>,
) -> Result<(StatusCode, Json<Treatment>), ApiError> {
    if !is_valid_iso8601(&payload.date) {
        return Err(ApiError::bad_request("invalidDateFormat"));
    }
    if !PatientRepository::new(state.db.clone()).exists(payload.patient_id).await? {
        return Err(ApiError::bad_request("inexistantPatient"));
    }

    let documents = DocumentRepository::new(state.db.clone());
    if !documents.exists(payload.dicom_id).await? {
        return Err(ApiError::bad_request("inexistantDicomDocument"));
    }
    if payload.model_3ds.len() > MAX_MODEL_3DS {
        return Err(ApiError::bad_request("tooManyModel3Ds"));
    }
    for model_id in &payload.model_3ds {
        if !documents.exists(*model_id).await? {
            return Err(ApiError::bad_request("inexistantModel3DDocument"));
        }
    }

    let treatment = TreatmentRepository::new(state.db.clone()).create(&payload).await?;
    tracing::info!("Created treatment {} for patient {}", treatment.id, treatment.patient_id);
    Ok((StatusCode::CREATED, Json(treatment)))
}

/// Handler for GET /api/treatments
#[utoipa::path(
    get,
    path = "/api/treatments",
    responses(
        (status = 200, description = "Visible treatments", body = Vec<Treatment>)
    ),
    tag = "treatments"
)]
pub async fn list_treatments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Treatment>>, ApiError> {
    let repository = TreatmentRepository::new(state.db.clone());
    let treatments = if user.is_admin() {
        repository.find_all().await?
    } else {
        repository.find_by_owner(user.id).await?
    };
    Ok(Json(treatments))
}

/// Handler for GET /api/treatments/:id
#[utoipa::path(
    get,
    path = "/api/treatments/{id}",
    params(("id" = Uuid, Path, description = "Treatment ID")),
    responses(
        (status = 200, description = "Treatment found", body = Treatment),
        (status = 404, description = "Treatment not found", body = crate::error::ErrorResponse)
    ),
    tag = "treatments"
)]
pub async fn get_treatment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Treatment>, ApiError> {
    let treatment = TreatmentRepository::new(state.db.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("treatment"))?;
    Ok(Json(treatment))
}
