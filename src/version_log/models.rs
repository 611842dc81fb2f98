use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Versions of the deployed components; a single row at most
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VersionLog {
    pub id: Uuid,
    pub interface: String,
    pub api: String,
    pub calculator: String,
    /// Incremented on every package release
    pub package: i32,
    pub package_update_timestamp: DateTime<Utc>,
    /// Unique device identifier of the medical device
    pub udi: String,
}

/// Body of `POST /api/versionLogs`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVersionLog {
    #[validate(length(min = 1, code = "missingInterfaceVersion"))]
    pub interface: String,
    #[validate(length(min = 1, code = "missingApiVersion"))]
    pub api: String,
    #[validate(length(min = 1, code = "missingCalculatorVersion"))]
    pub calculator: String,
    #[serde(default)]
    #[validate(range(min = 0, code = "invalidPackage"))]
    pub package: i32,
    #[validate(length(min = 1, code = "missingUdi"))]
    pub udi: String,
}

/// Body of `PUT /api/versionLogs`; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateVersionLog {
    pub interface: Option<String>,
    pub api: Option<String>,
    pub calculator: Option<String>,
    pub udi: Option<String>,
}
