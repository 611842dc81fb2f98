// Request gate: API key middleware, bearer extractor and role checks

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{
    api_keys::ApiKeyService, error::AuthError, models::Role, repository::TokenRepository, token,
};
use crate::error::ApiError;
use crate::AppState;

/// Header carrying the client application's API key
pub const API_KEY_HEADER: &str = "api-key";

/// Routes served without an API key
fn is_public(method: &Method, path: &str) -> bool {
    method == Method::GET && path == "/api/versionLogs"
}

fn api_key_value(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(API_KEY_HEADER)
        .ok_or(AuthError::MissingApiKey)?
        .to_str()
        .map_err(|_| AuthError::InvalidApiKey)
}

fn bearer_value(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingBearerToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    match value.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::MissingBearerToken),
    }
}

/// Middleware rejecting requests without a registered `api-key` header
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public(request.method(), request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let value = api_key_value(request.headers())
        .map_err(|err| {
            warn!("Request to {} without api-key", request.uri().path());
            err
        })?
        .to_owned();

    if !ApiKeyService::new(state.db.clone()).is_valid(&value).await? {
        warn!("Request to {} with unknown api-key", request.uri().path());
        return Err(AuthError::InvalidApiKey.into());
    }

    Ok(next.run(request).await)
}

/// User resolved from the bearer token of the request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub mail_address: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail with `unauthorized.role` unless the user has one of `allowed`
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AuthError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            warn!("User {} with role {} refused, requires one of {:?}", self.id, self.role, allowed);
            Err(AuthError::InsufficientRole)
        }
    }

    /// Admins may act on any account, other users only on their own
    pub fn require_self_or_admin(&self, user_id: Uuid) -> Result<(), AuthError> {
        if self.id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::InsufficientRole)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let value_hash = token::hash_secret(bearer_value(&parts.headers)?);

        let user = TokenRepository::new(state.db.clone())
            .find_user_by_hash(&value_hash)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        debug!("Authenticated user {} for {}", user.id, parts.uri.path());
        Ok(AuthenticatedUser {
            id: user.id,
            mail_address: user.mail_address,
            role: user.role,
        })
    }
}

/// Extractor for admin-only routes
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        user.require_role(&[Role::Admin])?;
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            mail_address: "jane@clinic.fr".to_string(),
            role,
        }
    }

    #[test]
    fn test_only_version_log_read_is_public() {
        assert!(is_public(&Method::GET, "/api/versionLogs"));
        assert!(!is_public(&Method::PUT, "/api/versionLogs"));
        assert!(!is_public(&Method::GET, "/api/treatmentFollowUps"));
    }

    #[test]
    fn test_api_key_header() {
        assert_eq!(api_key_value(&headers(&[("api-key", "k1")])).unwrap(), "k1");
        assert!(matches!(api_key_value(&HeaderMap::new()), Err(AuthError::MissingApiKey)));
    }

    #[test]
    fn test_bearer_value() {
        assert_eq!(bearer_value(&headers(&[("authorization", "Bearer abc")])).unwrap(), "abc");
        assert_eq!(bearer_value(&headers(&[("authorization", "bearer  abc ")])).unwrap(), "abc");
        assert!(matches!(bearer_value(&HeaderMap::new()), Err(AuthError::MissingBearerToken)));
        assert!(matches!(
            bearer_value(&headers(&[("authorization", "Basic amFuZTpwdw==")])),
            Err(AuthError::MissingBearerToken)
        ));
        assert!(matches!(
            bearer_value(&headers(&[("authorization", "Bearer ")])),
            Err(AuthError::MissingBearerToken)
        ));
    }

    #[test]
    fn test_role_checks() {
        let admin = user(Role::Admin);
        let operator = user(Role::CompanyOperator);

        assert!(admin.require_role(&[Role::Admin]).is_ok());
        assert!(matches!(operator.require_role(&[Role::Admin]), Err(AuthError::InsufficientRole)));
        assert!(operator.require_role(&[Role::Admin, Role::CompanyOperator]).is_ok());

        assert!(operator.require_self_or_admin(operator.id).is_ok());
        assert!(operator.require_self_or_admin(admin.id).is_err());
        assert!(admin.require_self_or_admin(operator.id).is_ok());
    }
}
