use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::has_at_most_two_decimals;

/// Prefix of every surgery plan Medscope ID
pub const PLAN_ID_PREFIX: &str = "PLAN";
/// Upper bound for per-tooth and per-implant arrays
pub const MAX_PLAN_ITEMS: usize = 32;
pub const MAX_SURGERY_REPORTS: usize = 2;
pub const MAX_DEPTHS: usize = 16;
pub const MAX_LOADING_PROTOCOL_LENGTH: usize = 32;

/// Surgical plan of a treatment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurgeryPlan {
    pub id: Uuid,
    #[serde(rename = "medscopeID")]
    pub medscope_id: String,
    #[serde(rename = "treatmentID")]
    pub treatment_id: Uuid,
    pub natural_teeth: Vec<i32>,
    pub artificial_teeth: Vec<i32>,
    pub position: Vec<i32>,
    /// One `[x, y, z]` point per implant
    #[schema(value_type = Vec<Vec<f32>>)]
    pub center: Json<Vec<Vec<f32>>>,
    #[schema(value_type = Vec<Vec<f32>>)]
    pub apex: Json<Vec<Vec<f32>>>,
    #[schema(value_type = Vec<Vec<f32>>)]
    pub up_index: Json<Vec<Vec<f32>>>,
    pub implants_reference: Vec<String>,
    pub surgery_report: Vec<Uuid>,
    pub is_treated: bool,
    pub depth: Vec<f32>,
    pub implants_models: Option<Uuid>,
    pub loading_protocol: Option<String>,
    pub images_bone_stress: Option<Vec<Uuid>>,
    pub images_implant_stress: Option<Vec<Uuid>>,
    pub images_density: Option<Vec<Uuid>>,
    pub final_report: Option<Uuid>,
    pub surgery_guide: Option<Uuid>,
    pub results_bone_stress: Option<Vec<Uuid>>,
    pub results_implant_stress: Option<Vec<Uuid>>,
    pub results_density: Option<Vec<Uuid>>,
    pub other_results: Option<Uuid>,
}

/// Body of `POST /api/surgeryPlans`; the Medscope ID is assigned by the server
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurgeryPlan {
    #[serde(rename = "treatmentID")]
    pub treatment_id: Uuid,
    pub natural_teeth: Vec<i32>,
    pub artificial_teeth: Vec<i32>,
    pub position: Vec<i32>,
    pub center: Vec<Vec<f32>>,
    pub apex: Vec<Vec<f32>>,
    pub up_index: Vec<Vec<f32>>,
    pub implants_reference: Vec<String>,
    pub surgery_report: Vec<Uuid>,
    pub is_treated: Option<bool>,
    pub depth: Option<Vec<f32>>,
    pub implants_models: Option<Uuid>,
    pub loading_protocol: Option<String>,
    pub images_bone_stress: Option<Vec<Uuid>>,
    pub images_implant_stress: Option<Vec<Uuid>>,
    pub images_density: Option<Vec<Uuid>>,
    pub final_report: Option<Uuid>,
    pub surgery_guide: Option<Uuid>,
    pub results_bone_stress: Option<Vec<Uuid>>,
    pub results_implant_stress: Option<Vec<Uuid>>,
    pub results_density: Option<Vec<Uuid>>,
    pub other_results: Option<Uuid>,
}

/// Body of `PUT /api/surgeryPlans/{id}`; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSurgeryPlan {
    pub natural_teeth: Option<Vec<i32>>,
    pub artificial_teeth: Option<Vec<i32>>,
    pub position: Option<Vec<i32>>,
    pub center: Option<Vec<Vec<f32>>>,
    pub apex: Option<Vec<Vec<f32>>>,
    pub up_index: Option<Vec<Vec<f32>>>,
    pub implants_reference: Option<Vec<String>>,
    pub surgery_report: Option<Vec<Uuid>>,
    pub is_treated: Option<bool>,
    pub depth: Option<Vec<f32>>,
    pub implants_models: Option<Uuid>,
    pub loading_protocol: Option<String>,
    pub images_bone_stress: Option<Vec<Uuid>>,
    pub images_implant_stress: Option<Vec<Uuid>>,
    pub images_density: Option<Vec<Uuid>>,
    pub final_report: Option<Uuid>,
    pub surgery_guide: Option<Uuid>,
    pub results_bone_stress: Option<Vec<Uuid>>,
    pub results_implant_stress: Option<Vec<Uuid>>,
    pub results_density: Option<Vec<Uuid>>,
    pub other_results: Option<Uuid>,
}

impl CreateSurgeryPlan {
    /// The plan as it will be stored, before an ID is assigned
    pub fn into_draft(self) -> SurgeryPlan {
        SurgeryPlan {
            id: Uuid::nil(),
            medscope_id: String::new(),
            treatment_id: self.treatment_id,
            natural_teeth: self.natural_teeth,
            artificial_teeth: self.artificial_teeth,
            position: self.position,
            center: Json(self.center),
            apex: Json(self.apex),
            up_index: Json(self.up_index),
            implants_reference: self.implants_reference,
            surgery_report: self.surgery_report,
            is_treated: self.is_treated.unwrap_or(false),
            depth: self.depth.unwrap_or_default(),
            implants_models: self.implants_models,
            loading_protocol: self.loading_protocol,
            images_bone_stress: self.images_bone_stress,
            images_implant_stress: self.images_implant_stress,
            images_density: self.images_density,
            final_report: self.final_report,
            surgery_guide: self.surgery_guide,
            results_bone_stress: self.results_bone_stress,
            results_implant_stress: self.results_implant_stress,
            results_density: self.results_density,
            other_results: self.other_results,
        }
    }
}

impl UpdateSurgeryPlan {
    pub fn apply(self, mut plan: SurgeryPlan) -> SurgeryPlan {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }
        fn set_some<T>(target: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *target = value;
            }
        }

        set(&mut plan.natural_teeth, self.natural_teeth);
        set(&mut plan.artificial_teeth, self.artificial_teeth);
        set(&mut plan.position, self.position);
        set(&mut plan.center, self.center.map(Json));
        set(&mut plan.apex, self.apex.map(Json));
        set(&mut plan.up_index, self.up_index.map(Json));
        set(&mut plan.implants_reference, self.implants_reference);
        set(&mut plan.surgery_report, self.surgery_report);
        set(&mut plan.is_treated, self.is_treated);
        set(&mut plan.depth, self.depth);
        set_some(&mut plan.implants_models, self.implants_models);
        set_some(&mut plan.loading_protocol, self.loading_protocol);
        set_some(&mut plan.images_bone_stress, self.images_bone_stress);
        set_some(&mut plan.images_implant_stress, self.images_implant_stress);
        set_some(&mut plan.images_density, self.images_density);
        set_some(&mut plan.final_report, self.final_report);
        set_some(&mut plan.surgery_guide, self.surgery_guide);
        set_some(&mut plan.results_bone_stress, self.results_bone_stress);
        set_some(&mut plan.results_implant_stress, self.results_implant_stress);
        set_some(&mut plan.results_density, self.results_density);
        set_some(&mut plan.other_results, self.other_results);
        plan
    }
}

fn optional_len<T>(items: &Option<Vec<T>>) -> usize {
    items.as_ref().map_or(0, Vec::len)
}

impl SurgeryPlan {
    /// Size and precision rules. Returns a `badRequest` code.
    pub fn check_shape(&self) -> Result<(), &'static str> {
        let counts = [
            (self.natural_teeth.len(), "naturalTeethArrayMaxCount"),
            (self.artificial_teeth.len(), "artificialTeethArrayMaxCount"),
            (self.position.len(), "positionArrayMaxCount"),
            (self.center.len(), "centerArrayMaxCount"),
            (self.apex.len(), "apexArrayMaxCount"),
            (self.up_index.len(), "upIndexArrayMaxCount"),
            (optional_len(&self.images_bone_stress), "imagesBoneStressArrayCount"),
            (optional_len(&self.images_implant_stress), "imagesImplantStressArrayCount"),
            (optional_len(&self.images_density), "imagesDensityArrayCount"),
            (self.implants_reference.len(), "tooManyImplants"),
        ];
        if let Some((_, code)) = counts.into_iter().find(|(len, _)| *len > MAX_PLAN_ITEMS) {
            return Err(code);
        }

        if matches!(&self.loading_protocol, Some(p) if p.chars().count() > MAX_LOADING_PROTOCOL_LENGTH) {
            return Err("loadingProtocolLength");
        }
        if self.surgery_report.len() > MAX_SURGERY_REPORTS {
            return Err("tooManyReportDocuments");
        }
        if self.depth.len() > MAX_DEPTHS {
            return Err("tooManyDepthData");
        }
        if !self.depth.iter().all(|depth| has_at_most_two_decimals(*depth)) {
            return Err("depthHasTooMuchPrecision");
        }
        Ok(())
    }

    /// Every referenced document with the `notFound` code reported when it is missing
    pub fn document_references(&self) -> Vec<(&'static str, Uuid)> {
        let single = |code: &'static str, id: Option<Uuid>| id.map(|id| (code, id)).into_iter();
        let many = |code: &'static str, ids: &Option<Vec<Uuid>>| {
            ids.iter().flatten().map(move |id| (code, *id)).collect::<Vec<_>>()
        };

        single("implantsModelsDocument", self.implants_models)
            .chain(self.surgery_report.iter().map(|id| ("surgeryReport", *id)))
            .chain(single("finalReport", self.final_report))
            .chain(single("surgeryGuide", self.surgery_guide))
            .chain(many("resultsBoneStress", &self.results_bone_stress))
            .chain(many("resultsImplantStress", &self.results_implant_stress))
            .chain(many("resultsDensity", &self.results_density))
            .chain(single("otherResults", self.other_results))
            .chain(many("imagesBoneStress", &self.images_bone_stress))
            .chain(many("imagesImplantStress", &self.images_implant_stress))
            .chain(many("imagesDensity", &self.images_density))
            .collect()
    }

    /// Distinct implant references, in plan order
    pub fn distinct_implant_references(&self) -> Vec<String> {
        let mut references: Vec<String> = Vec::new();
        for reference in &self.implants_reference {
            if !references.contains(reference) {
                references.push(reference.clone());
            }
        }
        references
    }
}

/// Medscope ID following `highest`, the largest plan ID in use.
/// `None` once the eight-digit range is exhausted.
pub fn next_plan_id(highest: Option<&str>) -> Option<String> {
    let current = highest
        .and_then(|id| id.strip_prefix(PLAN_ID_PREFIX))
        .and_then(|digits| digits.parse::<u32>().ok())
        .unwrap_or(0);
    let next = current + 1;
    (next <= 99_999_999).then(|| format!("{}{:08}", PLAN_ID_PREFIX, next))
}
