use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Review lifecycle of a treatment calculation
///
/// `received → inProgress → sent → open`, plus `deleted` as a soft-delete marker
/// reachable only through the status override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum TreatmentFollowUpStatus {
    Received,
    InProgress,
    Sent,
    Open,
    Deleted,
}

impl TreatmentFollowUpStatus {
    pub const ALL: [TreatmentFollowUpStatus; 5] = [
        TreatmentFollowUpStatus::Received,
        TreatmentFollowUpStatus::InProgress,
        TreatmentFollowUpStatus::Sent,
        TreatmentFollowUpStatus::Open,
        TreatmentFollowUpStatus::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentFollowUpStatus::Received => "received",
            TreatmentFollowUpStatus::InProgress => "inProgress",
            TreatmentFollowUpStatus::Sent => "sent",
            TreatmentFollowUpStatus::Open => "open",
            TreatmentFollowUpStatus::Deleted => "deleted",
        }
    }
}

impl Default for TreatmentFollowUpStatus {
    fn default() -> Self {
        TreatmentFollowUpStatus::Received
    }
}

impl std::fmt::Display for TreatmentFollowUpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored follow-up record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentFollowUp {
    pub id: Uuid,
    #[serde(rename = "treatmentID")]
    pub treatment_id: Uuid,
    pub status: TreatmentFollowUpStatus,
    pub creation_date: String,
    pub calculation_date: Option<String>,
    #[serde(rename = "operatorID")]
    pub operator_id: Option<Uuid>,
    pub validation_date: Option<String>,
    #[serde(rename = "validatorID")]
    pub validator_id: Option<Uuid>,
    pub first_open_date: Option<String>,
    pub version_interface: Option<String>,
    pub version_calculator: Option<String>,
    #[serde(rename = "versionSP")]
    pub version_sp: Option<String>,
    #[serde(rename = "versionAPI")]
    pub version_api: Option<String>,
}

/// Body of `POST /api/treatmentFollowUps`
///
/// `status` is accepted for compatibility with the submission form but the record
/// always starts as `received`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreatmentFollowUp {
    #[serde(rename = "treatmentID")]
    pub treatment_id: Uuid,
    pub creation_date: String,
    pub status: Option<TreatmentFollowUpStatus>,
    pub version_interface: Option<String>,
    pub version_calculator: Option<String>,
    #[serde(rename = "versionSP")]
    pub version_sp: Option<String>,
    #[serde(rename = "versionAPI")]
    pub version_api: Option<String>,
}

/// Body of `PUT /api/treatmentFollowUps/calculate/{id}`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculateTreatmentFollowUp {
    pub calculation_date: Option<String>,
    #[serde(rename = "operatorID")]
    pub operator_id: Option<Uuid>,
}

/// Body of `PUT /api/treatmentFollowUps/validate/{id}`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTreatmentFollowUp {
    pub validation_date: Option<String>,
    #[serde(rename = "validatorID")]
    pub validator_id: Option<Uuid>,
}

/// Body of `PUT /api/treatmentFollowUps/open/{id}`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenTreatmentFollowUp {
    pub first_open_date: Option<String>,
}

/// Body of `PUT /api/treatmentFollowUps/status/{id}`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateTreatmentFollowUpStatus {
    pub status: Option<TreatmentFollowUpStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        for status in TreatmentFollowUpStatus::ALL {
            let encoded = serde_json::to_value(status).unwrap();
            assert_eq!(encoded, json!(status.as_str()));
        }
        assert_eq!(
            serde_json::from_value::<TreatmentFollowUpStatus>(json!("inProgress")).unwrap(),
            TreatmentFollowUpStatus::InProgress
        );
        assert!(serde_json::from_value::<TreatmentFollowUpStatus>(json!("in_progress")).is_err());
    }

    #[test]
    fn test_follow_up_serializes_id_suffixes() {
        let follow_up = TreatmentFollowUp {
            id: Uuid::nil(),
            treatment_id: Uuid::nil(),
            status: TreatmentFollowUpStatus::Received,
            creation_date: "2024-09-13T14:33:10.123Z".to_string(),
            calculation_date: None,
            operator_id: None,
            validation_date: None,
            validator_id: None,
            first_open_date: None,
            version_interface: Some("1.2.0".to_string()),
            version_calculator: None,
            version_sp: None,
            version_api: None,
        };

        let value = serde_json::to_value(&follow_up).unwrap();
        assert!(value.get("treatmentID").is_some());
        assert!(value.get("operatorID").is_some());
        assert!(value.get("versionSP").is_some());
        assert_eq!(value["creationDate"], "2024-09-13T14:33:10.123Z");
        assert_eq!(value["versionInterface"], "1.2.0");
    }

    #[test]
    fn test_calculate_body_fields_are_optional() {
        let body: CalculateTreatmentFollowUp = serde_json::from_value(json!({})).unwrap();
        assert!(body.calculation_date.is_none());
        assert!(body.operator_id.is_none());
    }
}
