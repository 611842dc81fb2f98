// Authentication and authorization error types

use crate::error::ApiError;

/// Authentication and authorization error types
///
/// Every variant maps to one dotted error code; the prefix of the code is the
/// HTTP status the client sees.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    // Basic credentials
    #[error("Authorization header is missing")]
    MissingAuthorizationHeader,
    #[error("Authorization header is not a Basic header")]
    InvalidAuthorizationHeader,
    #[error("Authorization header is not valid base64")]
    WrongAuthorizationHeader,
    #[error("Authorization header data is not UTF-8")]
    WrongAuthorizationHeaderData,
    #[error("Authorization header data has no ':' separator")]
    InvalidAuthorizationFormat,

    // Login
    #[error("No user with this mail address")]
    UserNotFound,
    #[error("Too many failed login attempts")]
    TooManyFailedAttempts,
    #[error("Stored last failed attempt timestamp is unreadable")]
    InvalidLastFailedTimestamp,
    #[error("Invalid mail address or password")]
    InvalidCredentials,
    #[error("Token not found")]
    TokenNotFound,

    // Request gate
    #[error("api-key header is missing")]
    MissingApiKey,
    #[error("api-key does not match any registered key")]
    InvalidApiKey,
    #[error("Bearer token is missing")]
    MissingBearerToken,
    #[error("Bearer token does not match any session")]
    InvalidToken,
    #[error("User role is not allowed for this operation")]
    InsufficientRole,

    // API key management
    #[error("Maximum number of API keys reached")]
    MaximumApiKeysReached,
    #[error("An API key with this name already exists")]
    ApiKeyAlreadyExists,
    #[error("API key not found")]
    ApiKeyNotFound,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    /// Error code without its status prefix
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorizationHeader => "missingAuthorizationHeader",
            AuthError::InvalidAuthorizationHeader => "invalidAuthorizationHeader",
            AuthError::WrongAuthorizationHeader => "wrongAuthorizationHeader",
            AuthError::WrongAuthorizationHeaderData => "wrongAuthorizationHeaderData",
            AuthError::InvalidAuthorizationFormat => "invalidAuthorizationFormat",
            AuthError::UserNotFound => "user",
            AuthError::TooManyFailedAttempts => "tooManyFailedAttempts",
            AuthError::InvalidLastFailedTimestamp => "invalidLastFailedTimestamp",
            AuthError::InvalidCredentials => "invalidCredentials",
            AuthError::TokenNotFound => "token",
            AuthError::MissingApiKey => "missingAPIKey",
            AuthError::InvalidApiKey => "invalidApiKey",
            AuthError::MissingBearerToken => "missingBearerToken",
            AuthError::InvalidToken => "invalidToken",
            AuthError::InsufficientRole => "role",
            AuthError::MaximumApiKeysReached => "maximumApiKeysReached",
            AuthError::ApiKeyAlreadyExists => "apiKeyAlreadyExists",
            AuthError::ApiKeyNotFound => "apiKey",
            AuthError::PasswordHash(_) => "passwordHash",
            AuthError::Database(_) => "database",
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserNotFound | AuthError::TokenNotFound | AuthError::ApiKeyNotFound => {
                ApiError::not_found(err.code())
            }
            AuthError::TooManyFailedAttempts => ApiError::forbidden(err.code()),
            AuthError::PasswordHash(msg) => ApiError::InternalError(msg),
            AuthError::Database(db_err) => ApiError::DatabaseError(db_err),
            other => ApiError::unauthorized(other.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_lockout_is_forbidden() {
        let err = ApiError::from(AuthError::TooManyFailedAttempts);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.error_code(), "forbidden.tooManyFailedAttempts");
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let err = ApiError::from(AuthError::UserNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "notFound.user");
    }

    #[test]
    fn test_gate_errors_are_unauthorized() {
        let cases = [
            (AuthError::MissingApiKey, "unauthorized.missingAPIKey"),
            (AuthError::InvalidApiKey, "unauthorized.invalidApiKey"),
            (AuthError::MissingBearerToken, "unauthorized.missingBearerToken"),
            (AuthError::InsufficientRole, "unauthorized.role"),
            (AuthError::InvalidLastFailedTimestamp, "unauthorized.invalidLastFailedTimestamp"),
            (AuthError::InvalidCredentials, "unauthorized.invalidCredentials"),
        ];
        for (err, code) in cases {
            let api_err = ApiError::from(err);
            assert_eq!(api_err.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(api_err.error_code(), code);
        }
    }

    #[test]
    fn test_password_hash_failure_is_internal() {
        let err = ApiError::from(AuthError::PasswordHash("salt".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
