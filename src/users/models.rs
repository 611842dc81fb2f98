use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::Role;

/// Body of `POST /api/users` and `POST /api/users/first`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 1, max = 32, code = "nameLength"))]
    pub name: String,

    #[validate(length(min = 1, max = 32, code = "firstNameLength"))]
    pub first_name: String,

    #[validate(length(max = 128, code = "addressLength"))]
    pub address: Option<String>,

    #[validate(email(code = "incorrectMailAddressFormat"))]
    pub mail_address: String,

    pub password: String,

    pub role: Role,

    #[serde(default)]
    pub conditions_accepted: bool,

    pub conditions_accepted_timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> serde_json::Value {
        json!({
            "name": "Doe",
            "firstName": "Jane",
            "address": "12 rue de la Paix, Paris",
            "mailAddress": "jane@clinic.fr",
            "password": "Passwordlong12(",
            "role": "companyOperator",
            "conditionsAccepted": true,
            "conditionsAcceptedTimestamp": "2024-09-13T14:33:10.123Z"
        })
    }

    fn first_code(input: &CreateUser) -> String {
        let errors = input.validate().unwrap_err();
        crate::error::ApiError::from(errors).error_code()
    }

    #[test]
    fn test_valid_user() {
        let input: CreateUser = serde_json::from_value(valid()).unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.role, Role::CompanyOperator);
    }

    #[test]
    fn test_name_too_long() {
        let mut body = valid();
        body["name"] = json!("x".repeat(33));
        let input: CreateUser = serde_json::from_value(body).unwrap();
        assert_eq!(first_code(&input), "badRequest.nameLength");
    }

    #[test]
    fn test_address_too_long() {
        let mut body = valid();
        body["address"] = json!("x".repeat(129));
        let input: CreateUser = serde_json::from_value(body).unwrap();
        assert_eq!(first_code(&input), "badRequest.addressLength");
    }

    #[test]
    fn test_bad_mail_address() {
        let mut body = valid();
        body["mailAddress"] = json!("jane.clinic.fr");
        let input: CreateUser = serde_json::from_value(body).unwrap();
        assert_eq!(first_code(&input), "badRequest.incorrectMailAddressFormat");
    }

    #[test]
    fn test_conditions_default_to_false() {
        let mut body = valid();
        body.as_object_mut().unwrap().remove("conditionsAccepted");
        let input: CreateUser = serde_json::from_value(body).unwrap();
        assert!(!input.conditions_accepted);
    }
}
