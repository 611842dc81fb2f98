// Medscope API: backend for patients, treatments, their follow-up workflow and documents

pub mod auth;
pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod follow_ups;
pub mod implants;
pub mod materials;
pub mod patients;
pub mod surgery_plans;
pub mod treatments;
pub mod users;
pub mod validation;
pub mod version_log;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::documents::FileStorage;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::list_tokens,
        auth::handlers::create_api_key,
        auth::handlers::list_api_keys,
        auth::handlers::delete_api_key,
        users::handlers::create_first_user,
        users::handlers::create_user,
        users::handlers::list_users,
        users::handlers::get_user,
        users::handlers::delete_user,
        patients::handlers::create_patient,
        patients::handlers::list_patients,
        patients::handlers::get_patient,
        patients::handlers::get_patient_by_medscope_id,
        treatments::handlers::create_treatment,
        treatments::handlers::list_treatments,
        treatments::handlers::get_treatment,
        follow_ups::handlers::create_follow_up,
        follow_ups::handlers::list_follow_ups,
        follow_ups::handlers::get_follow_up,
        follow_ups::handlers::calculate_follow_up,
        follow_ups::handlers::validate_follow_up,
        follow_ups::handlers::open_follow_up,
        follow_ups::handlers::set_follow_up_status,
        documents::handlers::upload_document,
        documents::handlers::list_documents,
        documents::handlers::get_document,
        documents::handlers::create_download_token,
        documents::handlers::download_file,
        documents::handlers::delete_document,
        materials::handlers::create_material,
        materials::handlers::list_materials,
        materials::handlers::update_material,
        materials::handlers::delete_all_materials,
        implants::handlers::create_implant,
        implants::handlers::list_implants,
        implants::handlers::get_implant_by_reference,
        implants::handlers::get_implant_material,
        implants::handlers::get_implant_model,
        implants::handlers::create_implant_model_download_token,
        implants::handlers::update_implant,
        implants::handlers::delete_all_implants,
        implants::handlers::delete_implant,
        surgery_plans::handlers::create_surgery_plan,
        surgery_plans::handlers::list_surgery_plans,
        surgery_plans::handlers::get_surgery_plan,
        surgery_plans::handlers::get_surgery_plan_implants,
        surgery_plans::handlers::update_surgery_plan,
        surgery_plans::handlers::toggle_surgery_plan_treated,
        surgery_plans::handlers::delete_all_surgery_plans,
        surgery_plans::handlers::delete_surgery_plan,
        version_log::handlers::get_version_log,
        version_log::handlers::create_version_log,
        version_log::handlers::update_version_log,
        version_log::handlers::increment_package,
    ),
    components(
        schemas(
            error::ErrorResponse,
            auth::models::Role,
            auth::models::UserResponse,
            auth::models::Token,
            auth::models::LoginResponse,
            auth::models::ApiKey,
            auth::models::CreateApiKey,
            auth::models::ApiKeyCreated,
            users::models::CreateUser,
            patients::models::Gender,
            patients::models::Patient,
            patients::models::CreatePatient,
            treatments::models::AffectedBone,
            treatments::models::Treatment,
            treatments::models::CreateTreatment,
            follow_ups::models::TreatmentFollowUpStatus,
            follow_ups::models::TreatmentFollowUp,
            follow_ups::models::CreateTreatmentFollowUp,
            follow_ups::models::CalculateTreatmentFollowUp,
            follow_ups::models::ValidateTreatmentFollowUp,
            follow_ups::models::OpenTreatmentFollowUp,
            follow_ups::models::UpdateTreatmentFollowUpStatus,
            documents::models::Document,
            documents::models::DownloadToken,
            materials::models::Material,
            materials::models::CreateMaterial,
            materials::models::UpdateMaterial,
            implants::models::Implant,
            implants::models::CreateImplant,
            implants::models::UpdateImplant,
            surgery_plans::models::SurgeryPlan,
            surgery_plans::models::CreateSurgeryPlan,
            surgery_plans::models::UpdateSurgeryPlan,
            version_log::models::VersionLog,
            version_log::models::CreateVersionLog,
            version_log::models::UpdateVersionLog,
        )
    ),
    tags(
        (name = "tokens", description = "Login, logout and sessions"),
        (name = "apiKeys", description = "Client application keys"),
        (name = "users", description = "Accounts"),
        (name = "patients", description = "Patients"),
        (name = "treatments", description = "Treatments"),
        (name = "treatmentFollowUps", description = "Review workflow of treatment calculations"),
        (name = "documents", description = "Uploaded files and single-use downloads"),
        (name = "materials", description = "Implant materials"),
        (name = "implants", description = "Implant catalogue"),
        (name = "surgeryPlans", description = "Implant placement plans of treatments"),
        (name = "versionLogs", description = "Deployed component versions")
    ),
    info(
        title = "Medscope API",
        version = "1.0.0",
        description = "Backend for surgical planning: patients, treatments, follow-ups, surgery plans and documents"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub storage: FileStorage,
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        let storage = FileStorage::new(config.storage_dir.clone());
        Self {
            db,
            config: Arc::new(config),
            storage,
        }
    }
}

/// Liveness check, served without an API key
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// All `/api` routes; every one of them sits behind the API key middleware
fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Sessions and keys
        .route("/api/tokens/login", post(auth::handlers::login))
        .route("/api/tokens/logout/:id", delete(auth::handlers::logout))
        .route("/api/tokens", get(auth::handlers::list_tokens))
        .route(
            "/api/apiKeys",
            post(auth::handlers::create_api_key).get(auth::handlers::list_api_keys),
        )
        .route("/api/apiKeys/:id", delete(auth::handlers::delete_api_key))
        // Users
        .route("/api/users/first", post(users::handlers::create_first_user))
        .route(
            "/api/users",
            post(users::handlers::create_user).get(users::handlers::list_users),
        )
        .route(
            "/api/users/:id",
            get(users::handlers::get_user).delete(users::handlers::delete_user),
        )
        // Patients and treatments
        .route(
            "/api/patients",
            post(patients::handlers::create_patient).get(patients::handlers::list_patients),
        )
        .route("/api/patients/:id", get(patients::handlers::get_patient))
        .route(
            "/api/patients/medscopeID/:medscope_id",
            get(patients::handlers::get_patient_by_medscope_id),
        )
        .route(
            "/api/treatments",
            post(treatments::handlers::create_treatment).get(treatments::handlers::list_treatments),
        )
        .route("/api/treatments/:id", get(treatments::handlers::get_treatment))
        // Follow-up workflow
        .route(
            "/api/treatmentFollowUps",
            post(follow_ups::handlers::create_follow_up).get(follow_ups::handlers::list_follow_ups),
        )
        .route("/api/treatmentFollowUps/:id", get(follow_ups::handlers::get_follow_up))
        .route(
            "/api/treatmentFollowUps/calculate/:id",
            put(follow_ups::handlers::calculate_follow_up),
        )
        .route(
            "/api/treatmentFollowUps/validate/:id",
            put(follow_ups::handlers::validate_follow_up),
        )
        .route("/api/treatmentFollowUps/open/:id", put(follow_ups::handlers::open_follow_up))
        .route(
            "/api/treatmentFollowUps/status/:id",
            put(follow_ups::handlers::set_follow_up_status),
        )
        // Documents
        .route(
            "/api/documents",
            post(documents::handlers::upload_document).get(documents::handlers::list_documents),
        )
        .route(
            "/api/documents/:id",
            get(documents::handlers::get_document).delete(documents::handlers::delete_document),
        )
        .route(
            "/api/documents/:id/downloadToken",
            get(documents::handlers::create_download_token),
        )
        .route(
            "/api/documents/download/:token",
            get(documents::handlers::download_file),
        )
        // Catalogue and surgery plans
        .route(
            "/api/materials",
            post(materials::handlers::create_material)
                .get(materials::handlers::list_materials)
                .delete(materials::handlers::delete_all_materials),
        )
        .route("/api/materials/:id", put(materials::handlers::update_material))
        .route(
            "/api/implants",
            post(implants::handlers::create_implant)
                .get(implants::handlers::list_implants)
                .delete(implants::handlers::delete_all_implants),
        )
        .route(
            "/api/implants/by/reference/:reference",
            get(implants::handlers::get_implant_by_reference),
        )
        .route("/api/implants/material/:id", get(implants::handlers::get_implant_material))
        .route(
            "/api/implants/model/by/reference/:reference",
            get(implants::handlers::get_implant_model),
        )
        .route(
            "/api/implants/download/token/for/model/:reference",
            get(implants::handlers::create_implant_model_download_token),
        )
        // updates address a reference, deletes an ID
        .route(
            "/api/implants/:key",
            put(implants::handlers::update_implant).delete(implants::handlers::delete_implant),
        )
        .route(
            "/api/surgeryPlans",
            post(surgery_plans::handlers::create_surgery_plan)
                .get(surgery_plans::handlers::list_surgery_plans)
                .delete(surgery_plans::handlers::delete_all_surgery_plans),
        )
        .route(
            "/api/surgeryPlans/:id",
            get(surgery_plans::handlers::get_surgery_plan)
                .put(surgery_plans::handlers::update_surgery_plan)
                .delete(surgery_plans::handlers::delete_surgery_plan),
        )
        .route(
            "/api/surgeryPlans/:id/implants",
            get(surgery_plans::handlers::get_surgery_plan_implants),
        )
        .route(
            "/api/surgeryPlans/:id/toggle/treated",
            put(surgery_plans::handlers::toggle_surgery_plan_treated),
        )
        // Version log
        .route(
            "/api/versionLogs",
            get(version_log::handlers::get_version_log)
                .post(version_log::handlers::create_version_log)
                .put(version_log::handlers::update_version_log),
        )
        .route("/api/versionLogs/package", put(version_log::handlers::increment_package))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_api_key))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(health))
        .merge(api_routes(&state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests;
