// Database repositories for users, session tokens and API keys

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::models::{ApiKey, NewUser, Token, User};

const USER_COLUMNS: &str = "id, name, first_name, address, mail_address, password_hash, role, \
     conditions_accepted, conditions_accepted_timestamp, login_failed_attempts, \
     last_login_failed_attempt, created_at";

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user. A duplicate mail address surfaces as a unique violation.
    pub async fn create(&self, new: &NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (name, first_name, address, mail_address, password_hash, role,
                 conditions_accepted, conditions_accepted_timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&new.name)
        .bind(&new.first_name)
        .bind(&new.address)
        .bind(&new.mail_address)
        .bind(&new.password_hash)
        .bind(new.role)
        .bind(new.conditions_accepted)
        .bind(&new.conditions_accepted_timestamp)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a user by mail address (case-insensitive)
    pub async fn find_by_mail(&self, mail_address: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(mail_address) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(mail_address)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users ORDER BY created_at", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn mail_exists(&self, mail_address: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(mail_address) = LOWER($1))")
            .bind(mail_address)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
    }

    /// Whether any follow-up hangs off a treatment of one of the user's patients
    pub async fn has_treatment_follow_ups(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM treatment_follow_ups f
                JOIN treatments t ON t.id = f.treatment_id
                JOIN patients p ON p.id = t.patient_id
                WHERE p.user_id = $1
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    /// Delete a user; returns false when no row matched
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a failed login in one statement and return the new counter value
    pub async fn record_failed_login(&self, id: Uuid, at: &str) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            UPDATE users
            SET login_failed_attempts = login_failed_attempts + 1,
                last_login_failed_attempt = $2
            WHERE id = $1
            RETURNING login_failed_attempts
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_one(&self.pool)
        .await
    }

    /// Clear the failure bookkeeping after a successful login
    pub async fn reset_failed_logins(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET login_failed_attempts = 0, last_login_failed_attempt = NULL WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Session token repository
///
/// Only SHA-256 digests of bearer values are stored.
#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    /// Create a new TokenRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a new value digest for the user, replacing any previous session
    pub async fn rotate(&self, user_id: Uuid, value_hash: &str) -> Result<Token, sqlx::Error> {
        sqlx::query_as::<_, Token>(
            r#"
            INSERT INTO tokens (user_id, value_hash)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET value_hash = EXCLUDED.value_hash, created_at = NOW()
            RETURNING id, user_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(value_hash)
        .fetch_one(&self.pool)
        .await
    }

    /// Resolve a bearer value digest to its user
    pub async fn find_user_by_hash(&self, value_hash: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = (SELECT user_id FROM tokens WHERE value_hash = $1)",
            USER_COLUMNS
        ))
        .bind(value_hash)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<Token>, sqlx::Error> {
        sqlx::query_as::<_, Token>("SELECT id, user_id, created_at FROM tokens ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
    }

    /// Delete a token; returns false when no row matched
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// API key repository
#[derive(Clone)]
pub struct ApiKeyRepository {
    pool: PgPool,
}

impl ApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists_by_hash(&self, value_hash: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM api_keys WHERE value_hash = $1)")
            .bind(value_hash)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn name_exists(&self, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM api_keys WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM api_keys")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn create(&self, name: &str, value_hash: &str) -> Result<ApiKey, sqlx::Error> {
        sqlx::query_as::<_, ApiKey>(
            "INSERT INTO api_keys (name, value_hash) VALUES ($1, $2) RETURNING id, name, created_at",
        )
        .bind(name)
        .bind(value_hash)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<ApiKey>, sqlx::Error> {
        sqlx::query_as::<_, ApiKey>("SELECT id, name, created_at FROM api_keys ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
    }

    /// Delete an API key; returns false when no row matched
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
