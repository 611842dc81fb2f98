// Decoding of `Authorization: Basic` credentials

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::auth::error::AuthError;

/// Mail address and password sent with a login request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub mail_address: String,
    pub password: String,
}

/// Read `Authorization: Basic base64(mail:password)` from the request headers
///
/// The password may itself contain `:`; only the first separator splits.
pub fn decode_basic_auth(headers: &HeaderMap) -> Result<BasicCredentials, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorizationHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationHeader)?;

    let encoded = match value.trim().split_once(' ') {
        Some((scheme, encoded)) if scheme.eq_ignore_ascii_case("basic") => encoded.trim(),
        _ => return Err(AuthError::InvalidAuthorizationHeader),
    };

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| AuthError::WrongAuthorizationHeader)?;
    let decoded = String::from_utf8(bytes).map_err(|_| AuthError::WrongAuthorizationHeaderData)?;

    let (mail_address, password) = decoded
        .split_once(':')
        .ok_or(AuthError::InvalidAuthorizationFormat)?;

    Ok(BasicCredentials {
        mail_address: mail_address.to_string(),
        password: password.to_string(),
    })
}
