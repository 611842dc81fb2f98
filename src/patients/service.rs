use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::patients::{next_medscope_id, CreatePatient, Patient, PatientRepository};
use crate::validation::normalize_name;

/// Unique constraint on the generated Medscope ID
const MEDSCOPE_ID_CONSTRAINT: &str = "patients_medscope_id_key";

/// Attempts at claiming a Medscope ID when concurrent creations collide
const MEDSCOPE_ID_ATTEMPTS: usize = 3;

/// Patient creation and lookup
pub struct PatientService {
    patients: PatientRepository,
}

impl PatientService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            patients: PatientRepository::new(pool),
        }
    }

    /// Store a patient under the next free Medscope ID
    pub async fn create(&self, input: &CreatePatient) -> Result<Patient, ApiError> {
        let name = normalize_name(&input.name);
        let first_name = normalize_name(&input.first_name);

        for _ in 0..MEDSCOPE_ID_ATTEMPTS {
            let highest = self.patients.highest_medscope_id().await?;
            let medscope_id =
                next_medscope_id(highest.as_deref()).ok_or_else(|| ApiError::conflict("medscopeIDExhausted"))?;

            let created = self
                .patients
                .create(&name, &first_name, &input.birthdate, input.gender, &medscope_id, input.user_id)
                .await;

            match created {
                Ok(patient) => return Ok(patient),
                Err(sqlx::Error::Database(db_err))
                    if db_err.is_unique_violation() && db_err.constraint() == Some(MEDSCOPE_ID_CONSTRAINT) =>
                {
                    tracing::debug!("Medscope ID {} taken concurrently, retrying", medscope_id);
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    return Err(ApiError::conflict("patientAlreadyExists"));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ApiError::conflict("medscopeIDTaken"))
    }

    pub async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<Patient>, ApiError> {
        Ok(match user_id {
            Some(user_id) => self.patients.find_by_user(user_id).await?,
            None => self.patients.find_all().await?,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Patient, ApiError> {
        self.patients
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("patient"))
    }

    pub async fn get_by_medscope_id(&self, medscope_id: &str) -> Result<Patient, ApiError> {
        self.patients
            .find_by_medscope_id(medscope_id)
            .await?
            .ok_or_else(|| ApiError::not_found("patient"))
    }
}
