use sqlx::PgPool;
use uuid::Uuid;

use crate::follow_ups::{NewTreatmentFollowUp, PlannedTransition, TreatmentFollowUp, TreatmentFollowUpStatus};

const FOLLOW_UP_COLUMNS: &str = "id, treatment_id, status, creation_date, calculation_date, operator_id, \
     validation_date, validator_id, first_open_date, version_interface, version_calculator, \
     version_sp, version_api";

/// Repository for treatment follow-up records
#[derive(Clone)]
pub struct FollowUpRepository {
    pool: PgPool,
}

impl FollowUpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<TreatmentFollowUp>, sqlx::Error> {
        sqlx::query_as::<_, TreatmentFollowUp>(&format!(
            "SELECT {} FROM treatment_follow_ups ORDER BY creation_date DESC",
            FOLLOW_UP_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TreatmentFollowUp>, sqlx::Error> {
        sqlx::query_as::<_, TreatmentFollowUp>(&format!(
            "SELECT {} FROM treatment_follow_ups WHERE id = $1",
            FOLLOW_UP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Insert a follow-up in the `received` state
    pub async fn create(&self, new: &NewTreatmentFollowUp) -> Result<TreatmentFollowUp, sqlx::Error> {
        sqlx::query_as::<_, TreatmentFollowUp>(&format!(
            r#"
            INSERT INTO treatment_follow_ups
                (treatment_id, status, creation_date, version_interface, version_calculator, version_sp, version_api)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            FOLLOW_UP_COLUMNS
        ))
        .bind(new.treatment_id)
        .bind(TreatmentFollowUpStatus::Received)
        .bind(&new.creation_date)
        .bind(&new.version_interface)
        .bind(&new.version_calculator)
        .bind(&new.version_sp)
        .bind(&new.version_api)
        .fetch_one(&self.pool)
        .await
    }

    /// Write a planned transition as a single-row UPDATE.
    ///
    /// When the plan names an expected status the row is only updated if it still
    /// has that status; `None` is returned when it no longer does (or the row is gone).
    pub async fn apply(&self, planned: &PlannedTransition) -> Result<Option<TreatmentFollowUp>, sqlx::Error> {
        let follow_up = &planned.follow_up;

        sqlx::query_as::<_, TreatmentFollowUp>(&format!(
            r#"
            UPDATE treatment_follow_ups
            SET status = $2,
                calculation_date = $3,
                operator_id = $4,
                validation_date = $5,
                validator_id = $6,
                first_open_date = $7
            WHERE id = $1 AND ($8::text IS NULL OR status = $8)
            RETURNING {}
            "#,
            FOLLOW_UP_COLUMNS
        ))
        .bind(follow_up.id)
        .bind(follow_up.status)
        .bind(&follow_up.calculation_date)
        .bind(follow_up.operator_id)
        .bind(&follow_up.validation_date)
        .bind(follow_up.validator_id)
        .bind(&follow_up.first_open_date)
        .bind(planned.expected_status)
        .fetch_optional(&self.pool)
        .await
    }
}
