// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    CompanyOperator,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::CompanyOperator => "companyOperator",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User database model
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub first_name: String,
    pub address: Option<String>,
    pub mail_address: String,
    pub password_hash: String,
    pub role: Role,
    pub conditions_accepted: bool,
    pub conditions_accepted_timestamp: Option<String>,
    pub login_failed_attempts: i32,
    pub last_login_failed_attempt: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated user ready to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub first_name: String,
    pub address: Option<String>,
    pub mail_address: String,
    pub password_hash: String,
    pub role: Role,
    pub conditions_accepted: bool,
    pub conditions_accepted_timestamp: Option<String>,
}

/// User response model (excludes password_hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub first_name: String,
    pub address: Option<String>,
    pub mail_address: String,
    pub role: Role,
    pub conditions_accepted: bool,
    pub conditions_accepted_timestamp: Option<String>,
    pub login_failed_attempts: i32,
    pub last_login_failed_attempt: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            first_name: user.first_name,
            address: user.address,
            mail_address: user.mail_address,
            role: user.role,
            conditions_accepted: user.conditions_accepted,
            conditions_accepted_timestamp: user.conditions_accepted_timestamp,
            login_failed_attempts: user.login_failed_attempts,
            last_login_failed_attempt: user.last_login_failed_attempt,
        }
    }
}

/// Session token row; the hashed value is never read back
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: Uuid,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Returned once by a successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub id: Uuid,
    /// Bearer value for the `Authorization` header
    pub value: String,
    #[serde(rename = "userID")]
    pub user_id: Uuid,
}

/// API key row without its hash
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/apiKeys`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateApiKey {
    pub name: String,
}

/// Returned once when an API key is created
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyCreated {
    pub name: String,
    pub value: String,
}
