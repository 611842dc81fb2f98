use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum number of 3D model documents attached to a treatment
pub const MAX_MODEL_3DS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AffectedBone {
    Mandible,
    Maxillary,
    Both,
}

/// Implant treatment planned for a patient
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub id: Uuid,
    pub date: String,
    pub affected_bone: AffectedBone,
    #[serde(rename = "patientID")]
    pub patient_id: Uuid,
    /// DICOM archive document
    #[serde(rename = "dicomID")]
    pub dicom_id: Uuid,
    /// 3D model documents
    #[serde(rename = "model3Ds")]
    pub model_3ds: Vec<Uuid>,
}

/// Body of `POST /api/treatments`
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreatment {
    pub date: String,
    pub affected_bone: AffectedBone,
    #[serde(rename = "patientID")]
    pub patient_id: Uuid,
    #[serde(rename = "dicomID")]
    pub dicom_id: Uuid,
    #[serde(rename = "model3Ds", default)]
    pub model_3ds: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_body() {
        let body: CreateTreatment = serde_json::from_value(json!({
            "date": "2024-09-13T14:33:10.123Z",
            "affectedBone": "maxillary",
            "patientID": Uuid::nil(),
            "dicomID": Uuid::nil()
        }))
        .unwrap();
        assert_eq!(body.affected_bone, AffectedBone::Maxillary);
        assert!(body.model_3ds.is_empty());
    }

    #[test]
    fn test_unknown_bone_rejected() {
        let result = serde_json::from_value::<CreateTreatment>(json!({
            "date": "2024-09-13T14:33:10.123Z",
            "affectedBone": "skull",
            "patientID": Uuid::nil(),
            "dicomID": Uuid::nil()
        }));
        assert!(result.is_err());
    }
}
