use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::has_at_most_two_decimals;

/// Longest accepted material name
pub const MAX_MAT_NAME_LENGTH: usize = 32;

/// Implant model from the catalogue, identified by its reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Implant {
    pub id: Uuid,
    pub reference: String,
    pub internal_diam: f32,
    pub abutment_contact_height: f32,
    pub diameter: f32,
    pub hneck: f32,
    pub length: f32,
    /// Name of the `Material` the implant is made of
    pub mat_name: String,
    pub up_center: Vec<f32>,
    pub center_z: Vec<f32>,
    pub up_index: Vec<f32>,
    /// 3D model document
    #[serde(rename = "modelID")]
    pub model_id: Uuid,
}

/// Body of `POST /api/implants`
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateImplant {
    pub reference: String,
    pub internal_diam: f32,
    pub abutment_contact_height: f32,
    pub diameter: f32,
    pub hneck: f32,
    pub length: f32,
    pub mat_name: String,
    pub up_center: Vec<f32>,
    pub center_z: Vec<f32>,
    pub up_index: Vec<f32>,
    #[serde(rename = "modelID")]
    pub model_id: Uuid,
}

/// Body of `PUT /api/implants/{reference}`; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImplant {
    pub reference: Option<String>,
    pub internal_diam: Option<f32>,
    pub abutment_contact_height: Option<f32>,
    pub diameter: Option<f32>,
    pub hneck: Option<f32>,
    pub length: Option<f32>,
    pub mat_name: Option<String>,
    pub up_center: Option<Vec<f32>>,
    pub center_z: Option<Vec<f32>>,
    pub up_index: Option<Vec<f32>>,
    #[serde(rename = "modelID")]
    pub model_id: Option<Uuid>,
}

/// Dimensions with at most two decimals, in checking order
fn check_dimensions(dimensions: [(&'static str, Option<f32>); 5]) -> Result<(), String> {
    for (field, value) in dimensions {
        if let Some(value) = value {
            if !has_at_most_two_decimals(value) {
                return Err(format!("{}HasTooMuchPrecision", field));
            }
        }
    }
    Ok(())
}

fn check_mat_name(mat_name: Option<&str>) -> Result<(), String> {
    match mat_name {
        Some(name) if name.chars().count() > MAX_MAT_NAME_LENGTH => Err("matNameLength".to_string()),
        _ => Ok(()),
    }
}

/// Axis vectors must be `[x, y, z]`
fn check_axis_lengths(axes: [(&'static str, Option<&[f32]>); 3]) -> Result<(), String> {
    for (code, axis) in axes {
        if let Some(axis) = axis {
            if axis.len() != 3 {
                return Err(code.to_string());
            }
        }
    }
    Ok(())
}

impl CreateImplant {
    /// Checks run before the model document lookup. Returns a `badRequest` code.
    pub fn check_measurements(&self) -> Result<(), String> {
        if self.reference.trim().is_empty() {
            return Err("reference".to_string());
        }
        check_dimensions([
            ("internalDiam", Some(self.internal_diam)),
            ("abutmentContactHeight", Some(self.abutment_contact_height)),
            ("diameter", Some(self.diameter)),
            ("hneck", Some(self.hneck)),
            ("length", Some(self.length)),
        ])?;
        check_mat_name(Some(self.mat_name.as_str()))
    }

    /// Checks run after the model document lookup
    pub fn check_axes(&self) -> Result<(), String> {
        check_axis_lengths([
            ("invalidUpCenterData", Some(self.up_center.as_slice())),
            ("invalidCenterZData", Some(self.center_z.as_slice())),
            ("invalidUpIndexData", Some(self.up_index.as_slice())),
        ])
    }
}

impl UpdateImplant {
    pub fn check_measurements(&self) -> Result<(), String> {
        if matches!(&self.reference, Some(reference) if reference.trim().is_empty()) {
            return Err("reference".to_string());
        }
        check_dimensions([
            ("internalDiam", self.internal_diam),
            ("abutmentContactHeight", self.abutment_contact_height),
            ("diameter", self.diameter),
            ("hneck", self.hneck),
            ("length", self.length),
        ])?;
        check_mat_name(self.mat_name.as_deref())
    }

    pub fn check_axes(&self) -> Result<(), String> {
        check_axis_lengths([
            ("invalidUpCenterData", self.up_center.as_deref()),
            ("invalidCenterZData", self.center_z.as_deref()),
            ("invalidUpIndexData", self.up_index.as_deref()),
        ])
    }

    pub fn apply(self, mut implant: Implant) -> Implant {
        if let Some(reference) = self.reference {
            implant.reference = reference;
        }
        implant.internal_diam = self.internal_diam.unwrap_or(implant.internal_diam);
        implant.abutment_contact_height = self.abutment_contact_height.unwrap_or(implant.abutment_contact_height);
        implant.diameter = self.diameter.unwrap_or(implant.diameter);
        implant.hneck = self.hneck.unwrap_or(implant.hneck);
        implant.length = self.length.unwrap_or(implant.length);
        if let Some(mat_name) = self.mat_name {
            implant.mat_name = mat_name;
        }
        if let Some(up_center) = self.up_center {
            implant.up_center = up_center;
        }
        if let Some(center_z) = self.center_z {
            implant.center_z = center_z;
        }
        if let Some(up_index) = self.up_index {
            implant.up_index = up_index;
        }
        implant.model_id = self.model_id.unwrap_or(implant.model_id);
        implant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> serde_json::Value {
        json!({
            "reference": "BL-4.1-10",
            "internalDiam": 2.5,
            "abutmentContactHeight": 1.2,
            "diameter": 4.1,
            "hneck": 0.75,
            "length": 10.0,
            "matName": "Titanium",
            "upCenter": [0.0, 0.0, 1.0],
            "centerZ": [0.0, 0.0, 5.0],
            "upIndex": [1.0, 0.0, 0.0],
            "modelID": Uuid::nil()
        })
    }

    fn create(value: serde_json::Value) -> CreateImplant {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_implant() {
        let input = create(body());
        assert_eq!(input.check_measurements(), Ok(()));
        assert_eq!(input.check_axes(), Ok(()));
    }

    #[test]
    fn test_precision_codes_in_field_order() {
        let mut value = body();
        value["diameter"] = json!(4.125);
        value["length"] = json!(10.333);
        assert_eq!(create(value).check_measurements(), Err("diameterHasTooMuchPrecision".to_string()));

        let mut value = body();
        value["hneck"] = json!(0.755);
        assert_eq!(create(value).check_measurements(), Err("hneckHasTooMuchPrecision".to_string()));
    }

    #[test]
    fn test_mat_name_and_axes() {
        let mut value = body();
        value["matName"] = json!("m".repeat(33));
        assert_eq!(create(value).check_measurements(), Err("matNameLength".to_string()));

        let mut value = body();
        value["centerZ"] = json!([0.0, 5.0]);
        assert_eq!(create(value).check_axes(), Err("invalidCenterZData".to_string()));
    }

    #[test]
    fn test_update_checks_only_supplied_fields() {
        let update: UpdateImplant = serde_json::from_value(json!({ "upIndex": [1.0, 0.0] })).unwrap();
        assert_eq!(update.check_measurements(), Ok(()));
        assert_eq!(update.check_axes(), Err("invalidUpIndexData".to_string()));

        let update: UpdateImplant = serde_json::from_value(json!({ "internalDiam": 2.555 })).unwrap();
        assert_eq!(update.check_measurements(), Err("internalDiamHasTooMuchPrecision".to_string()));
    }

    #[test]
    fn test_update_apply() {
        let input = create(body());
        let implant = Implant {
            id: Uuid::new_v4(),
            reference: input.reference,
            internal_diam: input.internal_diam,
            abutment_contact_height: input.abutment_contact_height,
            diameter: input.diameter,
            hneck: input.hneck,
            length: input.length,
            mat_name: input.mat_name,
            up_center: input.up_center,
            center_z: input.center_z,
            up_index: input.up_index,
            model_id: input.model_id,
        };
        let update: UpdateImplant =
            serde_json::from_value(json!({ "length": 12.0, "matName": "Zirconia" })).unwrap();
        let updated = update.apply(implant.clone());
        assert_eq!(updated.length, 12.0);
        assert_eq!(updated.mat_name, "Zirconia");
        assert_eq!(updated.reference, implant.reference);
        assert_eq!(updated.id, implant.id);
    }
}
