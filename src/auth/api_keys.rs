// API key management

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    models::{ApiKey, ApiKeyCreated},
    repository::ApiKeyRepository,
    token,
};

/// Upper bound on registered API keys
pub const MAX_API_KEYS: i64 = 3;

/// Name under which the startup key is stored
pub const BOOTSTRAP_KEY_NAME: &str = "bootstrap";

pub struct ApiKeyService {
    keys: ApiKeyRepository,
}

impl ApiKeyService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            keys: ApiKeyRepository::new(pool),
        }
    }

    /// Register a new key and return its value, which is never readable again
    pub async fn create(&self, name: &str) -> Result<ApiKeyCreated, AuthError> {
        if self.keys.count().await? >= MAX_API_KEYS {
            return Err(AuthError::MaximumApiKeysReached);
        }
        if self.keys.name_exists(name).await? {
            return Err(AuthError::ApiKeyAlreadyExists);
        }

        let value = token::generate_secret();
        let key = self.keys.create(name, &token::hash_secret(&value)).await?;
        tracing::info!("API key '{}' registered", key.name);

        Ok(ApiKeyCreated { name: key.name, value })
    }

    pub async fn list(&self) -> Result<Vec<ApiKey>, AuthError> {
        Ok(self.keys.find_all().await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AuthError> {
        if !self.keys.delete(id).await? {
            return Err(AuthError::ApiKeyNotFound);
        }
        tracing::info!("API key {} deleted", id);
        Ok(())
    }

    /// Store `value` as the first key when none exists yet.
    /// Returns whether a key was stored.
    pub async fn bootstrap(&self, value: &str) -> Result<bool, AuthError> {
        if self.keys.count().await? > 0 {
            return Ok(false);
        }
        self.keys
            .create(BOOTSTRAP_KEY_NAME, &token::hash_secret(value))
            .await?;
        Ok(true)
    }

    /// Whether a presented key value is registered
    pub async fn is_valid(&self, value: &str) -> Result<bool, AuthError> {
        Ok(self.keys.exists_by_hash(&token::hash_secret(value)).await?)
    }
}
