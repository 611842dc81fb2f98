use sqlx::PgPool;
use uuid::Uuid;

use crate::surgery_plans::SurgeryPlan;

const SURGERY_PLAN_COLUMNS: &str = "id, medscope_id, treatment_id, natural_teeth, artificial_teeth, position, \
     center, apex, up_index, implants_reference, surgery_report, is_treated, depth, implants_models, \
     loading_protocol, images_bone_stress, images_implant_stress, images_density, final_report, surgery_guide, \
     results_bone_stress, results_implant_stress, results_density, other_results";

/// Repository for surgery plans
#[derive(Clone)]
pub struct SurgeryPlanRepository {
    pool: PgPool,
}

impl SurgeryPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert `plan` under `medscope_id`; its `id` and `medscope_id` fields are ignored
    pub async fn create(&self, plan: &SurgeryPlan, medscope_id: &str) -> Result<SurgeryPlan, sqlx::Error> {
        sqlx::query_as::<_, SurgeryPlan>(&format!(
            r#"
            INSERT INTO surgery_plans (medscope_id, treatment_id, natural_teeth, artificial_teeth, position,
                                       center, apex, up_index, implants_reference, surgery_report, is_treated,
                                       depth, implants_models, loading_protocol, images_bone_stress,
                                       images_implant_stress, images_density, final_report, surgery_guide,
                                       results_bone_stress, results_implant_stress, results_density, other_results)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19,
                    $20, $21, $22, $23)
            RETURNING {}
            "#,
            SURGERY_PLAN_COLUMNS
        ))
        .bind(medscope_id)
        .bind(plan.treatment_id)
        .bind(&plan.natural_teeth)
        .bind(&plan.artificial_teeth)
        .bind(&plan.position)
        .bind(&plan.center)
        .bind(&plan.apex)
        .bind(&plan.up_index)
        .bind(&plan.implants_reference)
        .bind(&plan.surgery_report)
        .bind(plan.is_treated)
        .bind(&plan.depth)
        .bind(plan.implants_models)
        .bind(&plan.loading_protocol)
        .bind(&plan.images_bone_stress)
        .bind(&plan.images_implant_stress)
        .bind(&plan.images_density)
        .bind(plan.final_report)
        .bind(plan.surgery_guide)
        .bind(&plan.results_bone_stress)
        .bind(&plan.results_implant_stress)
        .bind(&plan.results_density)
        .bind(plan.other_results)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<SurgeryPlan>, sqlx::Error> {
        sqlx::query_as::<_, SurgeryPlan>(&format!(
            "SELECT {} FROM surgery_plans ORDER BY medscope_id",
            SURGERY_PLAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SurgeryPlan>, sqlx::Error> {
        sqlx::query_as::<_, SurgeryPlan>(&format!("SELECT {} FROM surgery_plans WHERE id = $1", SURGERY_PLAN_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn highest_medscope_id(&self) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT medscope_id FROM surgery_plans
            WHERE medscope_id ~ '^PLAN[0-9]{8}$'
            ORDER BY medscope_id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
    }

    /// Overwrite every mutable column of the plan with `plan.id`
    pub async fn update(&self, plan: &SurgeryPlan) -> Result<Option<SurgeryPlan>, sqlx::Error> {
        sqlx::query_as::<_, SurgeryPlan>(&format!(
            r#"
            UPDATE surgery_plans
            SET natural_teeth = $2, artificial_teeth = $3, position = $4, center = $5, apex = $6,
                up_index = $7, implants_reference = $8, surgery_report = $9, is_treated = $10, depth = $11,
                implants_models = $12, loading_protocol = $13, images_bone_stress = $14,
                images_implant_stress = $15, images_density = $16, final_report = $17, surgery_guide = $18,
                results_bone_stress = $19, results_implant_stress = $20, results_density = $21,
                other_results = $22
            WHERE id = $1
            RETURNING {}
            "#,
            SURGERY_PLAN_COLUMNS
        ))
        .bind(plan.id)
        .bind(&plan.natural_teeth)
        .bind(&plan.artificial_teeth)
        .bind(&plan.position)
        .bind(&plan.center)
        .bind(&plan.apex)
        .bind(&plan.up_index)
        .bind(&plan.implants_reference)
        .bind(&plan.surgery_report)
        .bind(plan.is_treated)
        .bind(&plan.depth)
        .bind(plan.implants_models)
        .bind(&plan.loading_protocol)
        .bind(&plan.images_bone_stress)
        .bind(&plan.images_implant_stress)
        .bind(&plan.images_density)
        .bind(plan.final_report)
        .bind(plan.surgery_guide)
        .bind(&plan.results_bone_stress)
        .bind(&plan.results_implant_stress)
        .bind(&plan.results_density)
        .bind(plan.other_results)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn toggle_treated(&self, id: Uuid) -> Result<Option<SurgeryPlan>, sqlx::Error> {
        sqlx::query_as::<_, SurgeryPlan>(&format!(
            "UPDATE surgery_plans SET is_treated = NOT is_treated WHERE id = $1 RETURNING {}",
            SURGERY_PLAN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM surgery_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
