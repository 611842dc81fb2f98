use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    models::NewUser, password::PasswordService, repository::UserRepository, Role, UserResponse,
};
use crate::error::ApiError;
use crate::users::CreateUser;
use crate::validation::{check_password_strength, is_valid_iso8601};

/// Account management
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Validate and store a new account
    pub async fn create(&self, input: CreateUser) -> Result<UserResponse, ApiError> {
        input.validate()?;

        if !input.conditions_accepted {
            return Err(ApiError::bad_request("conditionsNotAccepted"));
        }
        let accepted_at = input
            .conditions_accepted_timestamp
            .ok_or_else(|| ApiError::bad_request("noConditionsAcceptedTimestamp"))?;
        if !is_valid_iso8601(&accepted_at) {
            return Err(ApiError::bad_request("invalidConditionsAcceptedTimestamp"));
        }
        check_password_strength(&input.password).map_err(ApiError::bad_request)?;

        if self.users.mail_exists(&input.mail_address).await? {
            return Err(ApiError::bad_request("userAlreadyExists"));
        }

        let new = NewUser {
            name: input.name,
            first_name: input.first_name,
            address: input.address,
            mail_address: input.mail_address,
            password_hash: PasswordService::hash_password(&input.password)?,
            role: input.role,
            conditions_accepted: true,
            conditions_accepted_timestamp: Some(accepted_at),
        };

        let user = self.users.create(&new).await.map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::bad_request("userAlreadyExists")
            }
            _ => ApiError::from(e),
        })?;

        tracing::info!("Created user {} with role {}", user.id, user.role);
        Ok(user.into())
    }

    /// Create the first account of an empty installation, always as an admin
    pub async fn create_first(&self, mut input: CreateUser) -> Result<UserResponse, ApiError> {
        if self.users.count().await? > 0 {
            return Err(ApiError::forbidden("usersAlreadyExist"));
        }
        input.role = Role::Admin;
        self.create(input).await
    }

    pub async fn list(&self) -> Result<Vec<UserResponse>, ApiError> {
        let users = self.users.find_all().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<UserResponse, ApiError> {
        self.users
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| ApiError::not_found("user"))
    }

    /// Delete an account together with its patients and treatments.
    /// Refused while any of those treatments carries a follow-up, which must
    /// outlive the account as the review record.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.users.exists(id).await? {
            return Err(ApiError::not_found("user"));
        }
        if self.users.has_treatment_follow_ups(id).await? {
            return Err(ApiError::conflict("userHasTreatmentFollowUps"));
        }

        let deleted = self.users.delete(id).await.map_err(|e| match &e {
            // a follow-up was created between the check and the delete
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                ApiError::conflict("userHasTreatmentFollowUps")
            }
            _ => ApiError::from(e),
        })?;
        if !deleted {
            return Err(ApiError::not_found("user"));
        }

        tracing::info!("Deleted user {}", id);
        Ok(())
    }
}
