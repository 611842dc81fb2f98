use crate::error::ApiError;

/// Error types for treatment follow-up operations
#[derive(Debug, thiserror::Error)]
pub enum FollowUpError {
    #[error("Treatment follow-up not found")]
    NotFound,

    #[error("Treatment follow-up is not in the state required by this step")]
    IncorrectState,

    #[error("Referenced treatment does not exist")]
    InexistantTreatment,

    #[error("creationDate is not ISO 8601")]
    InvalidCreationDateFormat,

    #[error("calculationDate is missing")]
    MissingCalculationDate,

    #[error("calculationDate is not ISO 8601")]
    InvalidCalculationDateFormat,

    #[error("operatorID is missing")]
    MissingOperatorId,

    #[error("Operator does not exist")]
    InexistantOperator,

    #[error("validationDate is missing")]
    MissingValidationDate,

    #[error("validationDate is not ISO 8601")]
    InvalidValidationDateFormat,

    #[error("validatorID is missing")]
    MissingValidatorId,

    #[error("Validator does not exist")]
    InexistantValidator,

    #[error("firstOpenDate is missing")]
    MissingOpeningDate,

    #[error("firstOpenDate is not ISO 8601")]
    InvalidFirstOpenDateFormat,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl FollowUpError {
    /// Error code without its status prefix
    pub fn code(&self) -> &'static str {
        match self {
            FollowUpError::NotFound => "treatmentFollowUp",
            FollowUpError::IncorrectState => "incorrectFollowUpState",
            FollowUpError::InexistantTreatment => "inexistantTreatment",
            FollowUpError::InvalidCreationDateFormat => "invalidCreationDateFormat",
            FollowUpError::MissingCalculationDate => "missingCalculationDate",
            FollowUpError::InvalidCalculationDateFormat => "invalidCalculationDateFormat",
            FollowUpError::MissingOperatorId => "missingOperatorID",
            FollowUpError::InexistantOperator => "inexistantOperator",
            FollowUpError::MissingValidationDate => "missingValidationDate",
            FollowUpError::InvalidValidationDateFormat => "invalidValidationDateFormat",
            FollowUpError::MissingValidatorId => "missingValidatorID",
            FollowUpError::InexistantValidator => "inexistantValidator",
            FollowUpError::MissingOpeningDate => "missingOpeningDate",
            FollowUpError::InvalidFirstOpenDateFormat => "invalidFirstOpenDateFormat",
            FollowUpError::Database(_) => "database",
        }
    }
}

impl From<FollowUpError> for ApiError {
    fn from(err: FollowUpError) -> Self {
        match err {
            FollowUpError::NotFound => ApiError::not_found(err.code()),
            FollowUpError::Database(db_err) => ApiError::DatabaseError(db_err),
            other => ApiError::bad_request(other.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from(FollowUpError::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "notFound.treatmentFollowUp");
    }

    #[test]
    fn test_workflow_errors_are_bad_requests() {
        let cases = [
            (FollowUpError::IncorrectState, "badRequest.incorrectFollowUpState"),
            (FollowUpError::MissingCalculationDate, "badRequest.missingCalculationDate"),
            (FollowUpError::MissingOperatorId, "badRequest.missingOperatorID"),
            (FollowUpError::InexistantValidator, "badRequest.inexistantValidator"),
            (FollowUpError::InvalidFirstOpenDateFormat, "badRequest.invalidFirstOpenDateFormat"),
        ];

        for (err, code) in cases {
            let api_err = ApiError::from(err);
            assert_eq!(api_err.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(api_err.error_code(), code);
        }
    }
}
