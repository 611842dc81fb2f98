use sqlx::PgPool;
use uuid::Uuid;

use crate::patients::{Gender, Patient};

/// Repository for patient records
#[derive(Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a patient; names must already be normalized.
    /// The (name, first_name, birthdate, user_id) tuple and the Medscope ID are unique.
    pub async fn create(
        &self,
        name: &str,
        first_name: &str,
        birthdate: &str,
        gender: Gender,
        medscope_id: &str,
        user_id: Uuid,
    ) -> Result<Patient, sqlx::Error> {
        sqlx::query_as::<_, Patient>(
            r#"
            INSERT INTO patients (name, first_name, birthdate, gender, medscope_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, first_name, birthdate, gender, medscope_id, user_id
            "#,
        )
        .bind(name)
        .bind(first_name)
        .bind(birthdate)
        .bind(gender)
        .bind(medscope_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(
            "SELECT id, name, first_name, birthdate, gender, medscope_id, user_id FROM patients ORDER BY name, first_name",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(
            r#"
            SELECT id, name, first_name, birthdate, gender, medscope_id, user_id
            FROM patients
            WHERE user_id = $1
            ORDER BY name, first_name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(
            "SELECT id, name, first_name, birthdate, gender, medscope_id, user_id FROM patients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_medscope_id(&self, medscope_id: &str) -> Result<Option<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(
            "SELECT id, name, first_name, birthdate, gender, medscope_id, user_id FROM patients WHERE medscope_id = $1",
        )
        .bind(medscope_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Largest well-formed Medscope ID in use; the fixed width makes text order numeric
    pub async fn highest_medscope_id(&self) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT medscope_id
            FROM patients
            WHERE medscope_id ~ '^MEDP[0-9]{4}$'
            ORDER BY medscope_id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM patients WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }
}
