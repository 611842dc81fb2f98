use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repository::UserRepository;
use crate::follow_ups::{
    CalculateTreatmentFollowUp, CreateTreatmentFollowUp, FollowUpError, FollowUpRepository,
    FollowUpWorkflow, OpenTreatmentFollowUp, PlannedTransition, ReferencedUser, TreatmentFollowUp,
    UpdateTreatmentFollowUpStatus, ValidateTreatmentFollowUp,
};
use crate::treatments::TreatmentRepository;
use crate::version_log::VersionLogRepository;

/// Drives the follow-up workflow against the database
///
/// Each transition runs its checks in a fixed order: date format, referenced user,
/// record lookup, state precondition, missing fields, then the update.
/// Nothing is written unless every check passed.
pub struct FollowUpService {
    follow_ups: FollowUpRepository,
    treatments: TreatmentRepository,
    users: UserRepository,
    version_logs: VersionLogRepository,
}

impl FollowUpService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            follow_ups: FollowUpRepository::new(pool.clone()),
            treatments: TreatmentRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            version_logs: VersionLogRepository::new(pool),
        }
    }

    pub async fn list(&self) -> Result<Vec<TreatmentFollowUp>, FollowUpError> {
        Ok(self.follow_ups.find_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<TreatmentFollowUp, FollowUpError> {
        self.follow_ups
            .find_by_id(id)
            .await?
            .ok_or(FollowUpError::NotFound)
    }

    pub async fn create(&self, input: CreateTreatmentFollowUp) -> Result<TreatmentFollowUp, FollowUpError> {
        let treatment_id = input.treatment_id;
        if !self.treatments.exists(treatment_id).await? {
            return Err(FollowUpError::InexistantTreatment);
        }

        let versions = self.version_logs.find_current().await?;
        let new = FollowUpWorkflow::create(input, versions.as_ref())?;

        let follow_up = self.follow_ups.create(&new).await?;
        tracing::info!("Created treatment follow-up {} for treatment {}", follow_up.id, treatment_id);
        Ok(follow_up)
    }

    pub async fn calculate(
        &self,
        id: Uuid,
        input: CalculateTreatmentFollowUp,
    ) -> Result<TreatmentFollowUp, FollowUpError> {
        let operator = FollowUpWorkflow::check_calculation(&input)?;
        self.require_user(operator).await?;
        let current = self.get(id).await?;
        let planned = FollowUpWorkflow::calculate(&current, &input)?;
        self.commit(planned).await
    }

    pub async fn validate(
        &self,
        id: Uuid,
        input: ValidateTreatmentFollowUp,
    ) -> Result<TreatmentFollowUp, FollowUpError> {
        let validator = FollowUpWorkflow::check_validation(&input)?;
        self.require_user(validator).await?;
        let current = self.get(id).await?;
        let planned = FollowUpWorkflow::validate(&current, &input)?;
        self.commit(planned).await
    }

    pub async fn open(&self, id: Uuid, input: OpenTreatmentFollowUp) -> Result<TreatmentFollowUp, FollowUpError> {
        FollowUpWorkflow::check_opening(&input)?;
        let current = self.get(id).await?;
        let planned = FollowUpWorkflow::open(&current, &input)?;
        self.commit(planned).await
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        input: UpdateTreatmentFollowUpStatus,
    ) -> Result<TreatmentFollowUp, FollowUpError> {
        let current = self.get(id).await?;
        match FollowUpWorkflow::set_status(&current, input.status) {
            Some(planned) => self.commit(planned).await,
            None => Ok(current),
        }
    }

    async fn require_user(&self, user: Option<ReferencedUser>) -> Result<(), FollowUpError> {
        match user {
            Some(user) if !self.users.exists(user.id()).await? => Err(user.missing()),
            _ => Ok(()),
        }
    }

    async fn commit(&self, planned: PlannedTransition) -> Result<TreatmentFollowUp, FollowUpError> {
        let updated = match self.follow_ups.apply(&planned).await? {
            Some(updated) => updated,
            // a concurrent request moved the record first
            None if planned.expected_status.is_some() => return Err(FollowUpError::IncorrectState),
            None => return Err(FollowUpError::NotFound),
        };

        tracing::info!(
            "Treatment follow-up {} is now {}",
            updated.id,
            updated.status
        );
        Ok(updated)
    }
}
