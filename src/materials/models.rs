use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Material an implant is made of
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    pub mat_name: String,
    /// Young's modulus
    pub e: f32,
    /// Poisson's ratio
    pub nu: f32,
    pub sigma_dam: f32,
    pub sigma_fa: f32,
}

/// Body of `POST /api/materials`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterial {
    #[validate(length(min = 1, max = 32, code = "matNameLength"))]
    pub mat_name: String,
    pub e: f32,
    pub nu: f32,
    pub sigma_dam: f32,
    pub sigma_fa: f32,
}

/// Body of `PUT /api/materials/{id}`; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterial {
    #[validate(length(min = 1, max = 32, code = "matNameLength"))]
    pub mat_name: Option<String>,
    pub e: Option<f32>,
    pub nu: Option<f32>,
    pub sigma_dam: Option<f32>,
    pub sigma_fa: Option<f32>,
}

impl UpdateMaterial {
    pub fn apply(self, mut material: Material) -> Material {
        if let Some(mat_name) = self.mat_name {
            material.mat_name = mat_name;
        }
        material.e = self.e.unwrap_or(material.e);
        material.nu = self.nu.unwrap_or(material.nu);
        material.sigma_dam = self.sigma_dam.unwrap_or(material.sigma_dam);
        material.sigma_fa = self.sigma_fa.unwrap_or(material.sigma_fa);
        material
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn titanium() -> Material {
        Material {
            id: Uuid::nil(),
            mat_name: "Titanium".to_string(),
            e: 110_000.0,
            nu: 0.35,
            sigma_dam: 800.0,
            sigma_fa: 500.0,
        }
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let update: UpdateMaterial = serde_json::from_value(json!({ "nu": 0.3, "sigmaFa": 450.0 })).unwrap();
        let updated = update.apply(titanium());
        assert_eq!(updated.mat_name, "Titanium");
        assert_eq!(updated.e, 110_000.0);
        assert_eq!(updated.nu, 0.3);
        assert_eq!(updated.sigma_fa, 450.0);
    }

    #[test]
    fn test_empty_update_is_identity() {
        assert_eq!(UpdateMaterial::default().apply(titanium()), titanium());
    }

    #[test]
    fn test_name_length_code() {
        let input: CreateMaterial = serde_json::from_value(json!({
            "matName": "x".repeat(33),
            "e": 1.0, "nu": 0.3, "sigmaDam": 1.0, "sigmaFa": 1.0
        }))
        .unwrap();
        let err = crate::error::ApiError::from(input.validate().unwrap_err());
        assert_eq!(err.error_code(), "badRequest.matNameLength");
    }
}
