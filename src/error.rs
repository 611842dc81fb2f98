// Error handling module for the Medscope API
// Provides the central error type and its HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

/// Main error type for the API
/// All handlers return `Result<T, ApiError>`
///
/// Client errors carry a dotted error code such as `badRequest.missingCalculationDate`.
/// The prefix of the code always matches the HTTP status of the variant.
#[derive(Debug)]
pub enum ApiError {
    /// Maps to HTTP 400 Bad Request
    BadRequest(String),

    /// Request validation failures from the validator crate
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Maps to HTTP 401 Unauthorized
    Unauthorized(String),

    /// Maps to HTTP 403 Forbidden
    Forbidden(String),

    /// Maps to HTTP 404 Not Found
    NotFound(String),

    /// Maps to HTTP 409 Conflict
    Conflict(String),

    /// Maps to HTTP 410 Gone
    Gone(String),

    /// Database operation errors
    /// Maps to HTTP 500, details are only logged
    DatabaseError(sqlx::Error),

    /// Internal server errors
    /// Maps to HTTP 500, details are only logged
    InternalError(String),
}

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Dotted machine-readable code, e.g. `notFound.treatmentFollowUp`
    pub error_code: String,

    /// Human-readable message
    pub message: String,

    /// Field-level validation details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_error_response();
        (status, Json(body)).into_response()
    }
}

impl ApiError {
    pub fn bad_request(code: &str) -> Self {
        ApiError::BadRequest(format!("badRequest.{}", code))
    }

    pub fn unauthorized(code: &str) -> Self {
        ApiError::Unauthorized(format!("unauthorized.{}", code))
    }

    pub fn forbidden(code: &str) -> Self {
        ApiError::Forbidden(format!("forbidden.{}", code))
    }

    pub fn not_found(code: &str) -> Self {
        ApiError::NotFound(format!("notFound.{}", code))
    }

    pub fn conflict(code: &str) -> Self {
        ApiError::Conflict(format!("conflict.{}", code))
    }

    pub fn gone(code: &str) -> Self {
        ApiError::Gone(format!("gone.{}", code))
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Gone(_) => StatusCode::GONE,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The dotted error code reported to the client
    pub fn error_code(&self) -> String {
        match self {
            ApiError::BadRequest(code)
            | ApiError::Unauthorized(code)
            | ApiError::Forbidden(code)
            | ApiError::NotFound(code)
            | ApiError::Conflict(code)
            | ApiError::Gone(code) => code.clone(),
            ApiError::ValidationError(errors) => {
                format!("badRequest.{}", first_validation_code(errors))
            }
            ApiError::DatabaseError(_) => "internalServerError.database".to_string(),
            ApiError::InternalError(_) => "internalServerError.internal".to_string(),
        }
    }

    /// Convert to the client-facing body, logging at a level matching severity:
    /// - error!: database and internal errors (500)
    /// - warn!: authentication and authorization failures
    /// - debug!: other expected client errors
    fn to_error_response(&self) -> ErrorResponse {
        let code = self.error_code();
        let (message, details) = match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                (
                    "Request validation failed".to_string(),
                    Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({}))),
                )
            }
            ApiError::BadRequest(_) => {
                debug!("Bad request: {}", code);
                ("The request is invalid".to_string(), None)
            }
            ApiError::NotFound(_) => {
                debug!("Not found: {}", code);
                ("The requested resource does not exist".to_string(), None)
            }
            ApiError::Conflict(_) => {
                warn!("Conflict: {}", code);
                ("The resource already exists".to_string(), None)
            }
            ApiError::Gone(_) => {
                debug!("Gone: {}", code);
                ("The resource is no longer available".to_string(), None)
            }
            ApiError::Unauthorized(_) => {
                warn!("Unauthorized access attempt: {}", code);
                ("Authentication failed".to_string(), None)
            }
            ApiError::Forbidden(_) => {
                warn!("Forbidden access attempt: {}", code);
                ("Access is forbidden".to_string(), None)
            }
            ApiError::DatabaseError(db_error) => {
                error!("Database error: {:?}", db_error);
                ("A database error occurred".to_string(), None)
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                ("An internal server error occurred".to_string(), None)
            }
        };

        ErrorResponse {
            error_code: code,
            message,
            details,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error_code())
    }
}

impl std::error::Error for ApiError {}

/// First error code found in a validation error tree, field names sorted for stability
fn first_validation_code(errors: &validator::ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.keys().copied().collect();
    fields.sort_unstable();
    fields
        .first()
        .and_then(|field| field_errors.get(field))
        .and_then(|errs| errs.first())
        .map(|err| err.code.to_string())
        .unwrap_or_else(|| "validation".to_string())
}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}
