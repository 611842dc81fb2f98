use uuid::Uuid;

use crate::follow_ups::{
    CalculateTreatmentFollowUp, CreateTreatmentFollowUp, FollowUpError, OpenTreatmentFollowUp,
    TreatmentFollowUp, TreatmentFollowUpStatus, ValidateTreatmentFollowUp,
};
use crate::validation::is_valid_iso8601;
use crate::version_log::VersionLog;

/// User referenced by a transition, checked for existence before anything is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencedUser {
    Operator(Uuid),
    Validator(Uuid),
}

impl ReferencedUser {
    pub fn id(&self) -> Uuid {
        match self {
            ReferencedUser::Operator(id) | ReferencedUser::Validator(id) => *id,
        }
    }

    /// Error reported when the referenced user does not exist
    pub fn missing(&self) -> FollowUpError {
        match self {
            ReferencedUser::Operator(_) => FollowUpError::InexistantOperator,
            ReferencedUser::Validator(_) => FollowUpError::InexistantValidator,
        }
    }
}

/// A transition that passed every check not needing the database
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTransition {
    /// Status the stored row must still have when the update runs.
    /// `None` for the unconditional status override.
    pub expected_status: Option<TreatmentFollowUpStatus>,
    /// Record as it will be stored
    pub follow_up: TreatmentFollowUp,
}

/// Follow-up ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewTreatmentFollowUp {
    pub treatment_id: Uuid,
    pub creation_date: String,
    pub version_interface: Option<String>,
    pub version_calculator: Option<String>,
    pub version_sp: Option<String>,
    pub version_api: Option<String>,
}

/// Status machine of the treatment follow-up review
pub struct FollowUpWorkflow;

impl FollowUpWorkflow {
    /// The status a forward step leads to from `from`
    ///
    /// # Forward steps
    /// - received → inProgress (calculate)
    /// - inProgress → sent (validate)
    /// - sent → open (open)
    /// - open, deleted → none
    pub fn next_status(from: TreatmentFollowUpStatus) -> Option<TreatmentFollowUpStatus> {
        match from {
            TreatmentFollowUpStatus::Received => Some(TreatmentFollowUpStatus::InProgress),
            TreatmentFollowUpStatus::InProgress => Some(TreatmentFollowUpStatus::Sent),
            TreatmentFollowUpStatus::Sent => Some(TreatmentFollowUpStatus::Open),
            TreatmentFollowUpStatus::Open | TreatmentFollowUpStatus::Deleted => None,
        }
    }

    /// Check if a forward step from one status to another is allowed
    pub fn is_valid_transition(from: TreatmentFollowUpStatus, to: TreatmentFollowUpStatus) -> bool {
        Self::next_status(from) == Some(to)
    }

    /// Prepare a new follow-up. The stored record always starts as `received`,
    /// whatever status the submission carried.
    ///
    /// Version fields left empty are taken from the current version log.
    pub fn create(
        input: CreateTreatmentFollowUp,
        versions: Option<&VersionLog>,
    ) -> Result<NewTreatmentFollowUp, FollowUpError> {
        if !is_valid_iso8601(&input.creation_date) {
            return Err(FollowUpError::InvalidCreationDateFormat);
        }

        let fill = |value: Option<String>, current: Option<&String>| {
            value
                .filter(|v| !v.trim().is_empty())
                .or_else(|| current.cloned())
        };

        Ok(NewTreatmentFollowUp {
            treatment_id: input.treatment_id,
            creation_date: input.creation_date,
            version_interface: fill(input.version_interface, versions.map(|v| &v.interface)),
            version_calculator: fill(input.version_calculator, versions.map(|v| &v.calculator)),
            version_sp: input.version_sp,
            version_api: fill(input.version_api, versions.map(|v| &v.api)),
        })
    }

    /// Checks on a calculation body that need neither the record nor the database.
    /// Returns the operator whose existence must be confirmed next.
    pub fn check_calculation(
        input: &CalculateTreatmentFollowUp,
    ) -> Result<Option<ReferencedUser>, FollowUpError> {
        if let Some(date) = &input.calculation_date {
            if !is_valid_iso8601(date) {
                return Err(FollowUpError::InvalidCalculationDateFormat);
            }
        }
        Ok(input.operator_id.map(ReferencedUser::Operator))
    }

    pub fn check_validation(
        input: &ValidateTreatmentFollowUp,
    ) -> Result<Option<ReferencedUser>, FollowUpError> {
        if let Some(date) = &input.validation_date {
            if !is_valid_iso8601(date) {
                return Err(FollowUpError::InvalidValidationDateFormat);
            }
        }
        Ok(input.validator_id.map(ReferencedUser::Validator))
    }

    pub fn check_opening(input: &OpenTreatmentFollowUp) -> Result<(), FollowUpError> {
        match &input.first_open_date {
            Some(date) if !is_valid_iso8601(date) => Err(FollowUpError::InvalidFirstOpenDateFormat),
            _ => Ok(()),
        }
    }

    /// received → inProgress, recording who calculated and when
    pub fn calculate(
        current: &TreatmentFollowUp,
        input: &CalculateTreatmentFollowUp,
    ) -> Result<PlannedTransition, FollowUpError> {
        Self::check_calculation(input)?;
        Self::require_status(current, TreatmentFollowUpStatus::Received)?;

        let calculation_date = input
            .calculation_date
            .as_ref()
            .ok_or(FollowUpError::MissingCalculationDate)?;
        let operator_id = input.operator_id.ok_or(FollowUpError::MissingOperatorId)?;

        let mut follow_up = current.clone();
        follow_up.status = TreatmentFollowUpStatus::InProgress;
        follow_up.calculation_date = Some(calculation_date.clone());
        follow_up.operator_id = Some(operator_id);

        Ok(PlannedTransition {
            expected_status: Some(current.status),
            follow_up,
        })
    }

    /// inProgress → sent, recording who validated and when
    pub fn validate(
        current: &TreatmentFollowUp,
        input: &ValidateTreatmentFollowUp,
    ) -> Result<PlannedTransition, FollowUpError> {
        Self::check_validation(input)?;
        Self::require_status(current, TreatmentFollowUpStatus::InProgress)?;

        let validation_date = input
            .validation_date
            .as_ref()
            .ok_or(FollowUpError::MissingValidationDate)?;
        let validator_id = input.validator_id.ok_or(FollowUpError::MissingValidatorId)?;

        let mut follow_up = current.clone();
        follow_up.status = TreatmentFollowUpStatus::Sent;
        follow_up.validation_date = Some(validation_date.clone());
        follow_up.validator_id = Some(validator_id);

        Ok(PlannedTransition {
            expected_status: Some(current.status),
            follow_up,
        })
    }

    /// sent → open, recording when the practitioner first opened the result
    pub fn open(
        current: &TreatmentFollowUp,
        input: &OpenTreatmentFollowUp,
    ) -> Result<PlannedTransition, FollowUpError> {
        Self::check_opening(input)?;
        Self::require_status(current, TreatmentFollowUpStatus::Sent)?;

        let first_open_date = input
            .first_open_date
            .as_ref()
            .ok_or(FollowUpError::MissingOpeningDate)?;

        let mut follow_up = current.clone();
        follow_up.status = TreatmentFollowUpStatus::Open;
        follow_up.first_open_date = Some(first_open_date.clone());

        Ok(PlannedTransition {
            expected_status: Some(current.status),
            follow_up,
        })
    }

    /// Administrative override: any status to any status.
    /// Returns `None` when no status was supplied, leaving the record untouched.
    pub fn set_status(
        current: &TreatmentFollowUp,
        status: Option<TreatmentFollowUpStatus>,
    ) -> Option<PlannedTransition> {
        let status = status?;
        let mut follow_up = current.clone();
        follow_up.status = status;

        Some(PlannedTransition {
            expected_status: None,
            follow_up,
        })
    }

    fn require_status(
        current: &TreatmentFollowUp,
        required: TreatmentFollowUpStatus,
    ) -> Result<(), FollowUpError> {
        if current.status == required {
            Ok(())
        } else {
            Err(FollowUpError::IncorrectState)
        }
    }
}
