use sqlx::PgPool;
use uuid::Uuid;

use crate::implants::{CreateImplant, Implant};

const IMPLANT_COLUMNS: &str = "id, reference, internal_diam, abutment_contact_height, diameter, hneck, length, \
     mat_name, up_center, center_z, up_index, model_id";

/// Repository for the implant catalogue
#[derive(Clone)]
pub struct ImplantRepository {
    pool: PgPool,
}

impl ImplantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &CreateImplant) -> Result<Implant, sqlx::Error> {
        sqlx::query_as::<_, Implant>(&format!(
            r#"
            INSERT INTO implants (reference, internal_diam, abutment_contact_height, diameter, hneck, length,
                                  mat_name, up_center, center_z, up_index, model_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            IMPLANT_COLUMNS
        ))
        .bind(&input.reference)
        .bind(input.internal_diam)
        .bind(input.abutment_contact_height)
        .bind(input.diameter)
        .bind(input.hneck)
        .bind(input.length)
        .bind(&input.mat_name)
        .bind(&input.up_center)
        .bind(&input.center_z)
        .bind(&input.up_index)
        .bind(input.model_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<Implant>, sqlx::Error> {
        sqlx::query_as::<_, Implant>(&format!("SELECT {} FROM implants ORDER BY reference", IMPLANT_COLUMNS))
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Implant>, sqlx::Error> {
        sqlx::query_as::<_, Implant>(&format!("SELECT {} FROM implants WHERE id = $1", IMPLANT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_reference(&self, reference: &str) -> Result<Option<Implant>, sqlx::Error> {
        sqlx::query_as::<_, Implant>(&format!("SELECT {} FROM implants WHERE reference = $1", IMPLANT_COLUMNS))
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
    }

    /// Which of `references` exist, for validating a surgery plan
    pub async fn existing_references(&self, references: &[String]) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT reference FROM implants WHERE reference = ANY($1)")
            .bind(references)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn update(&self, implant: &Implant) -> Result<Option<Implant>, sqlx::Error> {
        sqlx::query_as::<_, Implant>(&format!(
            r#"
            UPDATE implants
            SET reference = $2, internal_diam = $3, abutment_contact_height = $4, diameter = $5,
                hneck = $6, length = $7, mat_name = $8, up_center = $9, center_z = $10,
                up_index = $11, model_id = $12
            WHERE id = $1
            RETURNING {}
            "#,
            IMPLANT_COLUMNS
        ))
        .bind(implant.id)
        .bind(&implant.reference)
        .bind(implant.internal_diam)
        .bind(implant.abutment_contact_height)
        .bind(implant.diameter)
        .bind(implant.hneck)
        .bind(implant.length)
        .bind(&implant.mat_name)
        .bind(&implant.up_center)
        .bind(&implant.center_z)
        .bind(&implant.up_index)
        .bind(implant.model_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM implants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
