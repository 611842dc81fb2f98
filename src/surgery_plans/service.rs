use sqlx::PgPool;
use uuid::Uuid;

use crate::documents::{DocumentRepository, DocumentService};
use crate::error::ApiError;
use crate::implants::{Implant, ImplantRepository};
use crate::surgery_plans::{next_plan_id, CreateSurgeryPlan, SurgeryPlan, SurgeryPlanRepository, UpdateSurgeryPlan};
use crate::treatments::TreatmentRepository;

/// Unique constraint on the generated plan Medscope ID
const PLAN_ID_CONSTRAINT: &str = "surgery_plans_medscope_id_key";

const PLAN_ID_ATTEMPTS: usize = 3;

/// Surgery plans and the rows they point at.
///
/// Writes are checked in a fixed order: array sizes and depth precision,
/// treatment, implant references, then each referenced document.
pub struct SurgeryPlanService {
    plans: SurgeryPlanRepository,
    treatments: TreatmentRepository,
    implants: ImplantRepository,
    documents: DocumentRepository,
    files: DocumentService,
}

impl SurgeryPlanService {
    pub fn new(pool: PgPool, files: DocumentService) -> Self {
        Self {
            plans: SurgeryPlanRepository::new(pool.clone()),
            treatments: TreatmentRepository::new(pool.clone()),
            implants: ImplantRepository::new(pool.clone()),
            documents: DocumentRepository::new(pool),
            files,
        }
    }

    /// Implant and document references of `plan` must all resolve
    async fn check_references(&self, plan: &SurgeryPlan) -> Result<(), ApiError> {
        let references = plan.distinct_implant_references();
        if !references.is_empty() {
            let existing = self.implants.existing_references(&references).await?;
            if references.iter().any(|reference| !existing.contains(reference)) {
                return Err(ApiError::not_found("implant"));
            }
        }

        for (code, id) in plan.document_references() {
            if !self.documents.exists(id).await? {
                return Err(ApiError::not_found(code));
            }
        }
        Ok(())
    }

    pub async fn create(&self, input: CreateSurgeryPlan) -> Result<SurgeryPlan, ApiError> {
        let draft = input.into_draft();
        draft.check_shape().map_err(ApiError::bad_request)?;
        if !self.treatments.exists(draft.treatment_id).await? {
            return Err(ApiError::not_found("treatment"));
        }
        self.check_references(&draft).await?;

        for _ in 0..PLAN_ID_ATTEMPTS {
            let highest = self.plans.highest_medscope_id().await?;
            let medscope_id =
                next_plan_id(highest.as_deref()).ok_or_else(|| ApiError::conflict("medscopeIDExhausted"))?;

            match self.plans.create(&draft, &medscope_id).await {
                Ok(plan) => {
                    tracing::info!("Created surgery plan {} for treatment {}", plan.medscope_id, plan.treatment_id);
                    return Ok(plan);
                }
                Err(sqlx::Error::Database(db_err))
                    if db_err.is_unique_violation() && db_err.constraint() == Some(PLAN_ID_CONSTRAINT) =>
                {
                    tracing::debug!("Plan ID {} taken concurrently, retrying", medscope_id);
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                    return Err(ApiError::not_found("treatment"));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ApiError::conflict("medscopeIDTaken"))
    }

    pub async fn list(&self) -> Result<Vec<SurgeryPlan>, ApiError> {
        Ok(self.plans.find_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<SurgeryPlan, ApiError> {
        self.plans
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("surgeryPlan"))
    }

    /// Implants named by the plan, each reference once
    pub async fn implants(&self, id: Uuid) -> Result<Vec<Implant>, ApiError> {
        let plan = self.get(id).await?;
        let mut implants = Vec::new();
        for reference in plan.distinct_implant_references() {
            let implant = self
                .implants
                .find_by_reference(&reference)
                .await?
                .ok_or_else(|| ApiError::not_found("implant"))?;
            implants.push(implant);
        }
        Ok(implants)
    }

    pub async fn update(&self, id: Uuid, input: UpdateSurgeryPlan) -> Result<SurgeryPlan, ApiError> {
        let plan = input.apply(self.get(id).await?);
        plan.check_shape().map_err(ApiError::bad_request)?;
        self.check_references(&plan).await?;

        let updated = self
            .plans
            .update(&plan)
            .await?
            .ok_or_else(|| ApiError::not_found("surgeryPlan"))?;
        tracing::info!("Updated surgery plan {}", updated.medscope_id);
        Ok(updated)
    }

    pub async fn toggle_treated(&self, id: Uuid) -> Result<SurgeryPlan, ApiError> {
        let plan = self
            .plans
            .toggle_treated(id)
            .await?
            .ok_or_else(|| ApiError::not_found("surgeryPlan"))?;
        tracing::info!("Surgery plan {} marked treated: {}", plan.medscope_id, plan.is_treated);
        Ok(plan)
    }

    /// Remove the plan, then the documents nothing else points at
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let plan = self.get(id).await?;
        self.remove(&plan).await
    }

    pub async fn delete_all(&self) -> Result<(), ApiError> {
        for plan in self.plans.find_all().await? {
            self.remove(&plan).await?;
        }
        Ok(())
    }

    async fn remove(&self, plan: &SurgeryPlan) -> Result<(), ApiError> {
        if !self.plans.delete(plan.id).await? {
            return Err(ApiError::not_found("surgeryPlan"));
        }
        let documents: Vec<Uuid> = plan.document_references().into_iter().map(|(_, id)| id).collect();
        self.files.delete_unreferenced(&documents).await?;
        tracing::info!("Deleted surgery plan {}", plan.medscope_id);
        Ok(())
    }
}
