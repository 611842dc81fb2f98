use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_birthdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

/// Patient of a practitioner
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub first_name: String,
    pub birthdate: String,
    pub gender: Gender,
    #[serde(rename = "medscopeID")]
    pub medscope_id: String,
    /// Owning practitioner
    #[serde(rename = "userID")]
    pub user_id: Uuid,
}

/// Prefix of every patient Medscope ID
pub const MEDSCOPE_ID_PREFIX: &str = "MEDP";

/// Body of `POST /api/patients`; the Medscope ID is assigned by the server
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatient {
    #[validate(length(min = 1, max = 32, code = "nameLength"))]
    pub name: String,

    #[validate(length(min = 1, max = 32, code = "firstNameLength"))]
    pub first_name: String,

    /// ISO 8601; the patient must be between 1 and 120 years old
    #[validate(custom = "validate_birthdate")]
    pub birthdate: String,

    pub gender: Gender,

    #[serde(rename = "userID")]
    pub user_id: Uuid,
}

/// Medscope ID following `highest`, the largest one in use.
/// `None` once the four-digit range is exhausted.
pub fn next_medscope_id(highest: Option<&str>) -> Option<String> {
    let current = highest
        .and_then(|id| id.strip_prefix(MEDSCOPE_ID_PREFIX))
        .and_then(|digits| digits.parse::<u32>().ok())
        .unwrap_or(0);
    let next = current + 1;
    (next <= 9999).then(|| format!("{}{:04}", MEDSCOPE_ID_PREFIX, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> serde_json::Value {
        json!({
            "name": "Martin",
            "firstName": "Louis",
            "birthdate": "1975-04-02T00:00:00.000Z",
            "gender": "male",
            "userID": Uuid::nil()
        })
    }

    fn code_of(value: serde_json::Value) -> String {
        let input: CreatePatient = serde_json::from_value(value).unwrap();
        crate::error::ApiError::from(input.validate().unwrap_err()).error_code()
    }

    #[test]
    fn test_valid_patient() {
        let input: CreatePatient = serde_json::from_value(body()).unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.gender, Gender::Male);
    }

    #[test]
    fn test_invalid_fields() {
        let mut value = body();
        value["birthdate"] = json!("02/04/1975");
        assert_eq!(code_of(value), "badRequest.invalidDateFormat");

        let mut value = body();
        value["birthdate"] = json!("1850-01-01T00:00:00.000Z");
        assert_eq!(code_of(value), "badRequest.invalidAge");

        let mut value = body();
        value["firstName"] = json!("x".repeat(40));
        assert_eq!(code_of(value), "badRequest.firstNameLength");
    }

    #[test]
    fn test_next_medscope_id() {
        assert_eq!(next_medscope_id(None).as_deref(), Some("MEDP0001"));
        assert_eq!(next_medscope_id(Some("MEDP0041")).as_deref(), Some("MEDP0042"));
        assert_eq!(next_medscope_id(Some("MEDP0999")).as_deref(), Some("MEDP1000"));
        assert_eq!(next_medscope_id(Some("MEDP9999")), None);
    }

    #[test]
    fn test_generated_ids_pass_validation() {
        let id = next_medscope_id(Some("MEDP0007")).unwrap();
        assert!(crate::validation::validate_medscope_id(&id).is_ok());
    }

    #[test]
    fn test_client_medscope_id_is_ignored() {
        let mut value = body();
        value["medscopeID"] = json!("MEDP0001");
        let input: CreatePatient = serde_json::from_value(value).unwrap();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_unknown_gender_rejected() {
        let mut value = body();
        value["gender"] = json!("other");
        assert!(serde_json::from_value::<CreatePatient>(value).is_err());
    }
}
