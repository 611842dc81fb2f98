// Login and logout

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{
    basic::BasicCredentials,
    error::AuthError,
    lockout::LoginGuard,
    models::LoginResponse,
    password::PasswordService,
    repository::{TokenRepository, UserRepository},
    token,
};
use crate::config::LockoutPolicy;
use crate::validation::format_iso8601;

/// Authentication service: credential checks, lockout bookkeeping, sessions
pub struct AuthService {
    users: UserRepository,
    tokens: TokenRepository,
    guard: LoginGuard,
}

impl AuthService {
    pub fn new(pool: PgPool, policy: LockoutPolicy) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tokens: TokenRepository::new(pool),
            guard: LoginGuard::new(policy),
        }
    }

    /// Log a user in at time `now`
    ///
    /// 1. Look the account up by mail address
    /// 2. Refuse while the account is locked out
    /// 3. Verify the password; a failure is counted atomically
    /// 4. Clear the failure counter and rotate the session token
    pub async fn login(
        &self,
        credentials: BasicCredentials,
        now: DateTime<Utc>,
    ) -> Result<LoginResponse, AuthError> {
        let user = self
            .users
            .find_by_mail(&credentials.mail_address)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.guard.check(
            user.login_failed_attempts,
            user.last_login_failed_attempt.as_deref(),
            now,
        )?;

        if !PasswordService::verify_password(&credentials.password, &user.password_hash)? {
            let attempts = self
                .users
                .record_failed_login(user.id, &format_iso8601(now))
                .await?;
            tracing::warn!("Failed login for user {} ({} consecutive)", user.id, attempts);
            return Err(AuthError::InvalidCredentials);
        }

        if user.login_failed_attempts > 0 {
            self.users.reset_failed_logins(user.id).await?;
        }

        let value = token::generate_secret();
        let session = self.tokens.rotate(user.id, &token::hash_secret(&value)).await?;

        tracing::info!("User {} logged in", user.id);
        Ok(LoginResponse {
            id: session.id,
            value,
            user_id: user.id,
        })
    }

    /// Delete a session token
    pub async fn logout(&self, token_id: Uuid) -> Result<(), AuthError> {
        if !self.tokens.delete(token_id).await? {
            return Err(AuthError::TokenNotFound);
        }
        tracing::info!("Token {} revoked", token_id);
        Ok(())
    }
}
