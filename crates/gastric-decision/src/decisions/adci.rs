//! Adaptive Decision Confidence Index: a prognostic score for the case and a confidence
//! figure for the surgical proceed/hold call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{ClinicalStage, Her2Status, MsiStatus, PatientProfile, TumorProfile};
use super::eligibility::{EligibilityResult, TreatmentPhase};

const GUIDELINE_ALIGNMENT: f64 = 0.85;

const REQUIRED_FACTORS: [AdciFactor; 3] = [
    AdciFactor::TumorStage,
    AdciFactor::Histology,
    AdciFactor::PerformanceStatus,
];
const SUPPORTING_FACTORS: [AdciFactor; 2] = [AdciFactor::Biomarkers, AdciFactor::Comorbidities];
/// Supporting inputs also include patient preferences, which intake does not capture.
const SUPPORTING_INPUTS: f64 = 3.0;

const COMORBIDITY_SEVERITY: [(&str, f64); 7] = [
    ("cardiovascular", 0.3),
    ("pulmonary", 0.25),
    ("hepatic", 0.35),
    ("renal", 0.3),
    ("diabetes", 0.2),
    ("previous_cancer", 0.25),
    ("immunocompromised", 0.4),
];

const COMORBIDITY_ALIASES: [(&str, &str); 8] = [
    ("heart_failure", "cardiovascular"),
    ("coronary", "cardiovascular"),
    ("hypertension", "cardiovascular"),
    ("copd", "pulmonary"),
    ("asthma", "pulmonary"),
    ("chronic_kidney_disease", "renal"),
    ("cirrhosis", "hepatic"),
    ("hiv", "immunocompromised"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdciFactor {
    TumorStage,
    Histology,
    Biomarkers,
    PerformanceStatus,
    Comorbidities,
}

impl AdciFactor {
    pub const fn weight(self) -> f64 {
        match self {
            AdciFactor::TumorStage => 0.25,
            AdciFactor::Histology => 0.15,
            AdciFactor::Biomarkers => 0.20,
            AdciFactor::PerformanceStatus => 0.15,
            AdciFactor::Comorbidities => 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        match confidence {
            c if c >= 0.85 => ConfidenceLevel::VeryHigh,
            c if c >= 0.7 => ConfidenceLevel::High,
            c if c >= 0.5 => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        }
    }
}

/// Kind of treatment the recommendation rests on, which sets the evidence strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceBasis {
    Surgery,
    Chemotherapy,
    SupportiveCare,
}

impl EvidenceBasis {
    pub const fn strength(self) -> f64 {
        match self {
            EvidenceBasis::Surgery => 0.9,
            EvidenceBasis::Chemotherapy => 0.8,
            EvidenceBasis::SupportiveCare => 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdciAssessment {
    pub score: f64,
    pub factor_scores: BTreeMap<AdciFactor, f64>,
    pub evidence_basis: EvidenceBasis,
    pub data_completeness: f64,
    pub evidence_strength: f64,
    pub guideline_alignment: f64,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub proceed: bool,
    pub critical_factors: Vec<String>,
}

pub struct AdciEngine {
    confidence_threshold: f64,
}

impl AdciEngine {
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
        }
    }

    pub fn assess(
        &self,
        patient: &PatientProfile,
        tumor: &TumorProfile,
        eligibility: &EligibilityResult,
    ) -> AdciAssessment {
        let mut factor_scores = BTreeMap::new();
        factor_scores.insert(AdciFactor::TumorStage, stage_score(&tumor.clinical_stage));
        if let Some(histology) = histology_score(&tumor.histology) {
            factor_scores.insert(AdciFactor::Histology, histology);
        }
        if let Some(biomarkers) = biomarker_score(tumor.her2_status, tumor.msi_status) {
            factor_scores.insert(AdciFactor::Biomarkers, biomarkers);
        }
        factor_scores.insert(
            AdciFactor::PerformanceStatus,
            performance_score(patient.performance_status),
        );
        factor_scores.insert(AdciFactor::Comorbidities, comorbidity_score(patient));

        let (weighted, total_weight) = factor_scores
            .iter()
            .fold((0.0_f64, 0.0_f64), |(sum, weights), (factor, score)| {
                (sum + score * factor.weight(), weights + factor.weight())
            });
        let score = if total_weight > 0.0 {
            (weighted / total_weight).clamp(0.0, 1.0)
        } else {
            0.5
        };

        let present = |factors: &[AdciFactor]| {
            factors
                .iter()
                .filter(|factor| factor_scores.contains_key(*factor))
                .count() as f64
        };
        let required_present = present(&REQUIRED_FACTORS);
        let supporting_present = present(&SUPPORTING_FACTORS);
        let data_completeness =
            ((required_present / REQUIRED_FACTORS.len() as f64) * 0.7
                + (supporting_present / SUPPORTING_INPUTS) * 0.3)
                .clamp(0.0, 1.0);

        let eligible = eligibility.category.is_eligible();
        let evidence_basis = match eligibility.recommended_phase {
            TreatmentPhase::Palliative if eligible => EvidenceBasis::Chemotherapy,
            TreatmentPhase::Palliative => EvidenceBasis::SupportiveCare,
            _ => EvidenceBasis::Surgery,
        };
        let evidence_strength = evidence_basis.strength();

        let confidence = (0.3 * data_completeness
            + 0.4 * evidence_strength
            + 0.3 * GUIDELINE_ALIGNMENT)
            .clamp(0.0, 1.0);

        AdciAssessment {
            score,
            factor_scores,
            evidence_basis,
            data_completeness,
            evidence_strength,
            guideline_alignment: GUIDELINE_ALIGNMENT,
            confidence,
            confidence_level: ConfidenceLevel::from_confidence(confidence),
            proceed: confidence >= self.confidence_threshold,
            critical_factors: critical_factors(patient, tumor),
        }
    }
}

fn stage_score(stage: &ClinicalStage) -> f64 {
    if stage.is_metastatic() {
        return 0.1;
    }
    match (stage.t_category(), stage.n_category()) {
        (Some(1), Some(0)) => 0.9,
        (Some(1), Some(1)) | (Some(2), Some(0)) => 0.8,
        (Some(2), Some(1)) | (Some(3), Some(0)) => 0.7,
        (Some(3), Some(1)) => 0.6,
        (Some(3), Some(2)) | (Some(4), Some(0)) => 0.5,
        (Some(4), Some(1)) => 0.4,
        (Some(4), Some(2)) => 0.3,
        (Some(4), Some(3)) => 0.2,
        _ => 0.5,
    }
}

fn histology_score(histology: &str) -> Option<f64> {
    match histology {
        "unknown" | "" => None,
        "papillary" => Some(0.8),
        "intestinal" | "tubular" => Some(0.7),
        "mucinous" => Some(0.6),
        "mixed" => Some(0.55),
        "diffuse" => Some(0.4),
        "signet_ring" => Some(0.3),
        _ => Some(0.5),
    }
}

fn biomarker_score(her2: Her2Status, msi: MsiStatus) -> Option<f64> {
    if her2 == Her2Status::Unknown && msi == MsiStatus::Unknown {
        return None;
    }
    let mut score: f64 = 0.5;
    score += match her2 {
        Her2Status::Positive => 0.2,
        Her2Status::Negative => -0.1,
        Her2Status::Unknown => 0.0,
    };
    score += match msi {
        MsiStatus::High => 0.3,
        MsiStatus::Stable => -0.1,
        MsiStatus::Unknown => 0.0,
    };
    Some(score.clamp(0.0, 1.0))
}

fn performance_score(performance_status: u8) -> f64 {
    match performance_status {
        0 => 0.9,
        1 => 0.7,
        2 => 0.5,
        3 => 0.3,
        _ => 0.1,
    }
}

fn comorbidity_score(patient: &PatientProfile) -> f64 {
    if patient.comorbidities.is_empty() {
        return 0.9;
    }
    let burden: f64 = patient
        .comorbidities
        .iter()
        .map(|tag| comorbidity_severity(tag))
        .sum();
    (1.0 - burden / 2.0).clamp(0.1, 1.0)
}

fn comorbidity_severity(tag: &str) -> f64 {
    let canonical = COMORBIDITY_ALIASES
        .iter()
        .find(|(alias, _)| tag.contains(alias))
        .map(|(_, canonical)| *canonical)
        .unwrap_or(tag);
    COMORBIDITY_SEVERITY
        .iter()
        .find(|(key, _)| canonical.contains(key))
        .map(|(_, weight)| *weight)
        .unwrap_or(0.15)
}

fn critical_factors(patient: &PatientProfile, tumor: &TumorProfile) -> Vec<String> {
    let mut factors = Vec::new();
    if patient.age > 75 {
        factors.push("advanced_age".to_string());
    }
    if patient.has_comorbidity("diabetes") {
        factors.push("diabetes_comorbidity".to_string());
    }
    if patient.performance_status >= 3 {
        factors.push("poor_performance_status".to_string());
    }
    if tumor.clinical_stage.is_metastatic() {
        factors.push("metastatic_disease".to_string());
    }
    factors
}
