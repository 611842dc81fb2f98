use sqlx::PgPool;
use uuid::Uuid;

use crate::materials::{CreateMaterial, Material};

const MATERIAL_COLUMNS: &str = "id, mat_name, e, nu, sigma_dam, sigma_fa";

/// Repository for materials
#[derive(Clone)]
pub struct MaterialRepository {
    pool: PgPool,
}

impl MaterialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &CreateMaterial) -> Result<Material, sqlx::Error> {
        sqlx::query_as::<_, Material>(&format!(
            "INSERT INTO materials (mat_name, e, nu, sigma_dam, sigma_fa) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            MATERIAL_COLUMNS
        ))
        .bind(&input.mat_name)
        .bind(input.e)
        .bind(input.nu)
        .bind(input.sigma_dam)
        .bind(input.sigma_fa)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<Material>, sqlx::Error> {
        sqlx::query_as::<_, Material>(&format!("SELECT {} FROM materials ORDER BY mat_name", MATERIAL_COLUMNS))
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Material>, sqlx::Error> {
        sqlx::query_as::<_, Material>(&format!("SELECT {} FROM materials WHERE id = $1", MATERIAL_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// First material carrying the given name
    pub async fn find_by_name(&self, mat_name: &str) -> Result<Option<Material>, sqlx::Error> {
        sqlx::query_as::<_, Material>(&format!(
            "SELECT {} FROM materials WHERE mat_name = $1 ORDER BY id LIMIT 1",
            MATERIAL_COLUMNS
        ))
        .bind(mat_name)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update(&self, material: &Material) -> Result<Option<Material>, sqlx::Error> {
        sqlx::query_as::<_, Material>(&format!(
            r#"
            UPDATE materials
            SET mat_name = $2, e = $3, nu = $4, sigma_dam = $5, sigma_fa = $6
            WHERE id = $1
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        ))
        .bind(material.id)
        .bind(&material.mat_name)
        .bind(material.e)
        .bind(material.nu)
        .bind(material.sigma_dam)
        .bind(material.sigma_fa)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM materials").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
