use sqlx::PgPool;
use uuid::Uuid;

use crate::treatments::{CreateTreatment, Treatment};

/// Repository for treatments
#[derive(Clone)]
pub struct TreatmentRepository {
    pool: PgPool,
}

impl TreatmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &CreateTreatment) -> Result<Treatment, sqlx::Error> {
        sqlx::query_as::<_, Treatment>(
            r#"
            INSERT INTO treatments (date, affected_bone, patient_id, dicom_id, model_3ds)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, date, affected_bone, patient_id, dicom_id, model_3ds
            "#,
        )
        .bind(&input.date)
        .bind(input.affected_bone)
        .bind(input.patient_id)
        .bind(input.dicom_id)
        .bind(&input.model_3ds)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<Treatment>, sqlx::Error> {
        sqlx::query_as::<_, Treatment>(
            "SELECT id, date, affected_bone, patient_id, dicom_id, model_3ds FROM treatments ORDER BY date DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Treatments of the patients owned by a practitioner
    pub async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Treatment>, sqlx::Error> {
        sqlx::query_as::<_, Treatment>(
            r#"
            SELECT t.id, t.date, t.affected_bone, t.patient_id, t.dicom_id, t.model_3ds
            FROM treatments t
            JOIN patients p ON p.id = t.patient_id
            WHERE p.user_id = $1
            ORDER BY t.date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Treatment>, sqlx::Error> {
        sqlx::query_as::<_, Treatment>(
            "SELECT id, date, affected_bone, patient_id, dicom_id, model_3ds FROM treatments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM treatments WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }
}
