use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Uploaded file (DICOM archive, 3D model, report)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    /// Location relative to the storage root
    pub path: String,
    pub updated_at: DateTime<Utc>,
}

/// Single-use download grant
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct FileDownload {
    pub id: Uuid,
    pub file_path: String,
    pub download_token: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl FileDownload {
    /// Whether the grant may serve its file at `now`.
    /// Expiry is reported before prior use.
    pub fn check_usable(&self, now: DateTime<Utc>) -> Result<(), crate::documents::DocumentError> {
        if now >= self.expires_at {
            Err(crate::documents::DocumentError::DownloadTokenExpired)
        } else if self.used_at.is_some() {
            Err(crate::documents::DocumentError::TokenAlreadyUsed)
        } else {
            Ok(())
        }
    }
}

/// Returned by `GET /api/documents/{id}/downloadToken`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::DocumentError;
    use chrono::Duration;

    fn grant(expires_in: Duration, used: bool) -> FileDownload {
        let now = Utc::now();
        FileDownload {
            id: Uuid::new_v4(),
            file_path: "patients/42/scan.dcm".to_string(),
            download_token: "token".to_string(),
            expires_at: now + expires_in,
            used_at: used.then_some(now),
        }
    }

    #[test]
    fn test_fresh_grant_is_usable() {
        assert!(grant(Duration::hours(1), false).check_usable(Utc::now()).is_ok());
    }

    #[test]
    fn test_used_grant() {
        assert!(matches!(
            grant(Duration::hours(1), true).check_usable(Utc::now()),
            Err(DocumentError::TokenAlreadyUsed)
        ));
    }

    #[test]
    fn test_expiry_reported_first() {
        assert!(matches!(
            grant(Duration::hours(-1), true).check_usable(Utc::now()),
            Err(DocumentError::DownloadTokenExpired)
        ));
    }
}
