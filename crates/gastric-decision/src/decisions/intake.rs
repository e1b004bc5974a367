use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::{
    normalize_tag, CardiacFunction, ClinicalStage, HearingFunction, Her2Status, MsiStatus,
    PatientProfile, TreatmentIntent, TumorLocation, TumorProfile, Urgency,
};

/// Population defaults applied when optional patient fields are absent.
pub const DEFAULT_ASA_SCORE: u8 = 2;
pub const DEFAULT_ALBUMIN: f64 = 4.0;
pub const DEFAULT_CREATININE_CLEARANCE: f64 = 90.0;
pub const DEFAULT_BILIRUBIN: f64 = 0.8;

const UNKNOWN_TAG: &str = "unknown";

/// Raised before any scoring begins when the case cannot be trusted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    /// Every field the caller has to correct.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            ValidationError::MissingFields { fields } => fields.clone(),
            ValidationError::InvalidField { field, .. } => vec![*field],
        }
    }
}

/// Patient attributes as they arrive from the caller. Everything is optional so the
/// guard can name every absent mandatory field in one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientIntake {
    pub age: Option<i64>,
    pub performance_status: Option<i64>,
    pub comorbidities: Vec<String>,
    pub creatinine_clearance: Option<f64>,
    pub bilirubin: Option<f64>,
    pub cardiac_function: Option<CardiacFunction>,
    pub hearing_function: Option<HearingFunction>,
    pub neuropathy_grade: Option<i64>,
    #[serde(alias = "previous_chemotherapy")]
    pub prior_chemotherapy: bool,
    #[serde(alias = "allergies")]
    pub drug_allergies: Vec<String>,
    pub asa_score: Option<i64>,
    pub albumin: Option<f64>,
    pub bmi: Option<f64>,
    pub urgency: Option<Urgency>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TumorIntake {
    pub histology: Option<String>,
    pub grade: Option<String>,
    #[serde(alias = "tumor_stage")]
    pub clinical_stage: Option<String>,
    pub her2_status: Option<Her2Status>,
    pub msi_status: Option<MsiStatus>,
    pub resectable: Option<bool>,
    pub locally_advanced: Option<bool>,
    #[serde(alias = "tumor_location")]
    pub location: Option<TumorLocation>,
}

/// A full decision request: the two intake records, the optional intent and a free-form
/// context map that is carried through to the decision untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseIntake {
    pub patient: PatientIntake,
    pub tumor: TumorIntake,
    pub treatment_intent: Option<String>,
    pub context: Map<String, Value>,
}

/// Output of the intake guard.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCase {
    pub patient: PatientProfile,
    pub tumor: TumorProfile,
    pub intent: TreatmentIntent,
    pub context: Map<String, Value>,
}

impl CaseIntake {
    /// Convert the inbound case into immutable profiles, or explain what is wrong.
    pub fn validate(self) -> Result<ValidatedCase, ValidationError> {
        let mut missing = Vec::new();
        if self.patient.age.is_none() {
            missing.push("patient.age");
        }
        if self.patient.performance_status.is_none() {
            missing.push("patient.performance_status");
        }
        let stage_blank = self
            .tumor
            .clinical_stage
            .as_deref()
            .map(|raw| raw.trim().is_empty())
            .unwrap_or(true);
        if stage_blank {
            missing.push("tumor.clinical_stage");
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { fields: missing });
        }

        let intent = match self.treatment_intent.as_deref() {
            None => TreatmentIntent::default(),
            Some(raw) if raw.trim().is_empty() => TreatmentIntent::default(),
            Some(raw) => TreatmentIntent::parse(raw).ok_or_else(|| {
                ValidationError::InvalidField {
                    field: "treatment_intent",
                    reason: format!(
                        "'{raw}' is not one of curative, palliative, neoadjuvant, adjuvant"
                    ),
                }
            })?,
        };

        Ok(ValidatedCase {
            patient: self.patient.into_profile()?,
            tumor: self.tumor.into_profile()?,
            intent,
            context: self.context,
        })
    }
}

impl PatientIntake {
    pub fn into_profile(self) -> Result<PatientProfile, ValidationError> {
        let age = self
            .age
            .ok_or(ValidationError::MissingFields {
                fields: vec!["patient.age"],
            })
            .and_then(|age| bounded("patient.age", age, 0, 120))?;
        let performance_status = self
            .performance_status
            .ok_or(ValidationError::MissingFields {
                fields: vec!["patient.performance_status"],
            })
            .and_then(|ps| bounded("patient.performance_status", ps, 0, 4))?;

        let neuropathy_grade = match self.neuropathy_grade {
            Some(grade) => bounded("patient.neuropathy_grade", grade, 0, 4)?,
            None => 0,
        };
        let asa_score = match self.asa_score {
            Some(asa) => bounded("patient.asa_score", asa, 1, 6)?,
            None => DEFAULT_ASA_SCORE,
        };

        let creatinine_clearance = non_negative(
            "patient.creatinine_clearance",
            self.creatinine_clearance
                .unwrap_or(DEFAULT_CREATININE_CLEARANCE),
        )?;
        let bilirubin =
            non_negative("patient.bilirubin", self.bilirubin.unwrap_or(DEFAULT_BILIRUBIN))?;
        let albumin = positive("patient.albumin", self.albumin.unwrap_or(DEFAULT_ALBUMIN))?;
        let bmi = self.bmi.map(|bmi| positive("patient.bmi", bmi)).transpose()?;

        Ok(PatientProfile {
            age,
            performance_status,
            comorbidities: normalize_tags(&self.comorbidities),
            creatinine_clearance,
            bilirubin,
            cardiac_function: self.cardiac_function.unwrap_or_default(),
            hearing_function: self.hearing_function.unwrap_or_default(),
            neuropathy_grade,
            prior_chemotherapy: self.prior_chemotherapy,
            drug_allergies: normalize_tags(&self.drug_allergies),
            asa_score,
            albumin,
            bmi,
            urgency: self.urgency.unwrap_or_default(),
        })
    }
}

impl TumorIntake {
    pub fn into_profile(self) -> Result<TumorProfile, ValidationError> {
        let raw_stage = self.clinical_stage.unwrap_or_default();
        let clinical_stage =
            ClinicalStage::parse(&raw_stage).ok_or(ValidationError::MissingFields {
                fields: vec!["tumor.clinical_stage"],
            })?;

        let histology = self
            .histology
            .map(|raw| normalize_tag(&raw))
            .filter(|tag| !tag.is_empty())
            .unwrap_or_else(|| UNKNOWN_TAG.to_string());
        let grade = self
            .grade
            .map(|raw| normalize_tag(&raw))
            .filter(|tag| !tag.is_empty())
            .unwrap_or_else(|| UNKNOWN_TAG.to_string());

        Ok(TumorProfile {
            histology,
            grade,
            clinical_stage,
            her2_status: self.her2_status.unwrap_or_default(),
            msi_status: self.msi_status.unwrap_or_default(),
            resectable: self.resectable.unwrap_or(true),
            locally_advanced: self.locally_advanced.unwrap_or(false),
            location: self.location.unwrap_or_default(),
        })
    }
}

fn bounded(field: &'static str, value: i64, min: i64, max: i64) -> Result<u8, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::InvalidField {
            field,
            reason: format!("{value} is outside the accepted range {min}..={max}"),
        });
    }
    u8::try_from(value).map_err(|_| ValidationError::InvalidField {
        field,
        reason: format!("{value} does not fit the accepted range"),
    })
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::InvalidField {
            field,
            reason: format!("{value} must be a finite, non-negative number"),
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::InvalidField {
            field,
            reason: format!("{value} must be a finite, positive number"),
        })
    }
}

fn normalize_tags(raw: &[String]) -> BTreeSet<String> {
    raw.iter()
        .map(|tag| normalize_tag(tag))
        .filter(|tag| !tag.is_empty() && tag != "none")
        .collect()
}
