use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::documents::{Document, FileDownload};

/// Repository for document records
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, path: &str) -> Result<Document, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            "INSERT INTO documents (name, path) VALUES ($1, $2) RETURNING id, name, path, updated_at",
        )
        .bind(name)
        .bind(path)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<Document>, sqlx::Error> {
        sqlx::query_as::<_, Document>("SELECT id, name, path, updated_at FROM documents ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, sqlx::Error> {
        sqlx::query_as::<_, Document>("SELECT id, name, path, updated_at FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM documents WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    /// Whether a treatment, implant or surgery plan still points at the document
    pub async fn is_referenced(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM treatments WHERE dicom_id = $1 OR $1 = ANY(model_3ds))
                OR EXISTS(SELECT 1 FROM implants WHERE model_id = $1)
                OR EXISTS(
                    SELECT 1 FROM surgery_plans
                    WHERE $1 = ANY(surgery_report)
                       OR implants_models = $1
                       OR final_report = $1
                       OR surgery_guide = $1
                       OR other_results = $1
                       OR $1 = ANY(images_bone_stress)
                       OR $1 = ANY(images_implant_stress)
                       OR $1 = ANY(images_density)
                       OR $1 = ANY(results_bone_stress)
                       OR $1 = ANY(results_implant_stress)
                       OR $1 = ANY(results_density)
                )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Repository for single-use download grants
#[derive(Clone)]
pub struct FileDownloadRepository {
    pool: PgPool,
}

impl FileDownloadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        file_path: &str,
        download_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<FileDownload, sqlx::Error> {
        sqlx::query_as::<_, FileDownload>(
            r#"
            INSERT INTO file_downloads (file_path, download_token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, file_path, download_token, expires_at, used_at
            "#,
        )
        .bind(file_path)
        .bind(download_token)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_token(&self, download_token: &str) -> Result<Option<FileDownload>, sqlx::Error> {
        sqlx::query_as::<_, FileDownload>(
            "SELECT id, file_path, download_token, expires_at, used_at FROM file_downloads WHERE download_token = $1",
        )
        .bind(download_token)
        .fetch_optional(&self.pool)
        .await
    }

    /// Consume a grant. Only one caller can win: the row is updated only while
    /// unused and unexpired, and false is returned otherwise.
    pub async fn mark_used(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE file_downloads
            SET used_at = $2
            WHERE id = $1 AND used_at IS NULL AND expires_at > $2
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Remove grants past their expiry; returns how many were removed
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM file_downloads WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
