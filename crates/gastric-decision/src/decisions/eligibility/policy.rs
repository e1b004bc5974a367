use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::super::domain::{
    CardiacFunction, FlotComponent, HearingFunction, PatientProfile, TreatmentIntent, TumorProfile,
};
use super::super::risk::RiskBand;
use super::config::EligibilityConfig;
use super::rules::{
    age_score, performance_score, resectability_score, tumor_suitability, EligibilitySignals,
};

pub(crate) const HIGH_RISK_MONITORING: [&str; 4] = [
    "Weekly renal function monitoring",
    "Liver function tests before each cycle",
    "Neuropathy assessment before each cycle",
    "Cardiac function monitoring",
];

const BASE_MONITORING: [&str; 4] = [
    "Complete blood count before each cycle",
    "Comprehensive metabolic panel before each cycle",
    "Performance status assessment",
    "Toxicity evaluation using CTCAE criteria",
];

/// FLOT eligibility, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityCategory {
    Eligible,
    RequiresModification,
    RelativeContraindication,
    NotEligible,
    AbsoluteContraindication,
}

impl EligibilityCategory {
    pub const fn label(self) -> &'static str {
        match self {
            EligibilityCategory::Eligible => "eligible",
            EligibilityCategory::RequiresModification => "requires modification",
            EligibilityCategory::RelativeContraindication => "relative contraindication",
            EligibilityCategory::NotEligible => "not eligible",
            EligibilityCategory::AbsoluteContraindication => "absolute contraindication",
        }
    }

    pub fn is_eligible(self) -> bool {
        self <= EligibilityCategory::RequiresModification
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentPhase {
    Preoperative,
    Postoperative,
    Perioperative,
    Palliative,
}

/// Dose reduction plan for a patient who can receive FLOT with adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseModification {
    pub reduction_percentage: u8,
    pub modified_drugs: Vec<FlotComponent>,
    pub reason: String,
    pub monitoring_requirements: Vec<String>,
}

pub(crate) fn decide_category(
    score: f64,
    signals: &EligibilitySignals,
    config: &EligibilityConfig,
    needs_modification: bool,
) -> EligibilityCategory {
    if !signals.allergies.is_empty() {
        return EligibilityCategory::AbsoluteContraindication;
    }

    let mut category = score_tier(score, config);
    let mut escalate = |candidate: EligibilityCategory| category = category.max(candidate);

    if signals.poor_performance {
        escalate(EligibilityCategory::NotEligible);
    }
    if signals.renal_floor_breached {
        escalate(EligibilityCategory::RelativeContraindication);
    } else if signals.renal_severe {
        escalate(EligibilityCategory::RequiresModification);
    }
    if signals.hepatic_ceiling_breached {
        escalate(EligibilityCategory::RelativeContraindication);
    } else if signals.hepatic_severe {
        escalate(EligibilityCategory::RequiresModification);
    }
    if signals.severe_cardiac {
        escalate(EligibilityCategory::RelativeContraindication);
    }
    if signals.high_risk {
        if score >= config.minimum_score {
            escalate(EligibilityCategory::RequiresModification);
        } else {
            escalate(EligibilityCategory::RelativeContraindication);
        }
    }
    if needs_modification {
        escalate(EligibilityCategory::RequiresModification);
    }

    category
}

/// Baseline category from the composite score alone.
pub(crate) fn score_tier(score: f64, config: &EligibilityConfig) -> EligibilityCategory {
    if score >= config.eligible_score {
        EligibilityCategory::Eligible
    } else if score >= config.minimum_score {
        EligibilityCategory::RequiresModification
    } else if score >= config.relative_score {
        EligibilityCategory::RelativeContraindication
    } else {
        EligibilityCategory::NotEligible
    }
}

pub(crate) fn assess_dose_modifications(
    patient: &PatientProfile,
    config: &EligibilityConfig,
) -> Option<DoseModification> {
    let mut reduction: u8 = 0;
    let mut drugs = BTreeSet::new();
    let mut reasons = Vec::new();

    if patient.age >= config.elderly_age {
        reduction = reduction.max(25);
        drugs.extend([FlotComponent::Docetaxel, FlotComponent::Oxaliplatin]);
        reasons.push(format!("Advanced age (≥{} years)", config.elderly_age));
    }
    if patient.creatinine_clearance < config.renal_mild {
        reduction = reduction.max(25);
        drugs.insert(FlotComponent::Oxaliplatin);
        reasons.push("Impaired renal function".to_string());
    }
    if patient.bilirubin > config.bilirubin_mild {
        reduction = reduction.max(25);
        drugs.insert(FlotComponent::Docetaxel);
        reasons.push("Elevated bilirubin".to_string());
    }
    if patient.neuropathy_grade >= config.neuropathy_grade {
        reduction = reduction.max(50);
        drugs.insert(FlotComponent::Oxaliplatin);
        reasons.push("Pre-existing neuropathy".to_string());
    }
    if patient.performance_status >= 2 && patient.comorbidity_count() >= 1 {
        reduction = reduction.max(25);
        drugs.extend([FlotComponent::Docetaxel, FlotComponent::Oxaliplatin]);
        reasons.push("Reduced performance status with comorbidities".to_string());
    }

    if reduction == 0 {
        return None;
    }

    let modified_drugs: Vec<FlotComponent> = drugs.into_iter().collect();
    Some(DoseModification {
        reduction_percentage: reduction,
        monitoring_requirements: modification_monitoring(&modified_drugs),
        modified_drugs,
        reason: reasons.join("; "),
    })
}

fn modification_monitoring(drugs: &[FlotComponent]) -> Vec<String> {
    let mut monitoring = Vec::new();
    if drugs.contains(&FlotComponent::Oxaliplatin) {
        monitoring.push("Neuropathy assessment before each cycle".to_string());
        monitoring.push("Audiology if hearing concerns".to_string());
    }
    if drugs.contains(&FlotComponent::Docetaxel) {
        monitoring.push("Liver function tests".to_string());
        monitoring.push("Fluid retention assessment".to_string());
    }
    monitoring
}

pub(crate) fn contraindications(signals: &EligibilitySignals) -> Vec<String> {
    let mut found = Vec::new();
    for (allergen, component) in &signals.allergies {
        found.push(format!("{allergen} allergy (FLOT component: {component})"));
    }
    if signals.poor_performance {
        found.push("Poor performance status (ECOG ≥3)".to_string());
    }
    if signals.renal_severe {
        found.push("Severe renal impairment".to_string());
    }
    if signals.hepatic_severe {
        found.push("Severe hepatic impairment".to_string());
    }
    if signals.severe_cardiac {
        found.push("Severe cardiac dysfunction".to_string());
    }
    found
}

pub(crate) fn recommended_phase(tumor: &TumorProfile, intent: TreatmentIntent) -> TreatmentPhase {
    let advanced_unresectable = !tumor.resectable && !tumor.locally_advanced;
    if intent == TreatmentIntent::Palliative
        || tumor.clinical_stage.is_metastatic()
        || advanced_unresectable
    {
        return TreatmentPhase::Palliative;
    }
    match intent {
        TreatmentIntent::Neoadjuvant => TreatmentPhase::Preoperative,
        TreatmentIntent::Adjuvant => TreatmentPhase::Postoperative,
        _ if tumor.resectable && tumor.locally_advanced => TreatmentPhase::Perioperative,
        _ => TreatmentPhase::Preoperative,
    }
}

pub(crate) fn eligibility_reasons(
    patient: &PatientProfile,
    tumor: &TumorProfile,
    intent: TreatmentIntent,
) -> Vec<String> {
    let mut reasons = Vec::new();

    reasons.push(
        match age_score(patient.age) {
            s if s >= 0.8 => "Appropriate age for intensive chemotherapy",
            s if s >= 0.6 => "Advanced age requires careful monitoring",
            _ => "Advanced age limits treatment intensity",
        }
        .to_string(),
    );
    reasons.push(
        match performance_score(patient.performance_status) {
            s if s >= 0.8 => "Good performance status",
            s if s >= 0.5 => "Fair performance status",
            _ => "Poor performance status limits treatment options",
        }
        .to_string(),
    );
    reasons.push(
        match patient.organ_function_score() {
            s if s >= 0.8 => "Adequate organ function",
            s if s >= 0.6 => "Mild organ dysfunction, dose modifications may be needed",
            _ => "Significant organ dysfunction limits treatment",
        }
        .to_string(),
    );
    reasons.push(
        match tumor_suitability(tumor) {
            s if s >= 0.8 => "Tumor characteristics favor FLOT protocol",
            s if s >= 0.6 => "Tumor characteristics moderately suitable for FLOT",
            _ => "Tumor characteristics less favorable for FLOT",
        }
        .to_string(),
    );
    reasons.push(
        if resectability_score(tumor) >= 0.8 {
            "Resectable disease, optimal for perioperative therapy"
        } else {
            "Resectability concerns affect treatment planning"
        }
        .to_string(),
    );

    if intent == TreatmentIntent::Palliative {
        reasons.push(
            "Palliative intent: treatment aims at symptom control and disease stabilisation"
                .to_string(),
        );
    }
    if tumor.clinical_stage.is_metastatic() {
        reasons.push(format!(
            "Metastatic disease ({}): systemic therapy with palliative intent",
            tumor.clinical_stage
        ));
    }
    if tumor.is_her2_positive() {
        reasons.push(
            "HER2-positive tumor: add trastuzumab to the chemotherapy backbone".to_string(),
        );
    }
    if tumor.is_msi_high() {
        reasons.push(
            "MSI-high tumor: limited benefit from perioperative chemotherapy, consider immunotherapy"
                .to_string(),
        );
    }
    if patient.prior_chemotherapy {
        reasons.push("Prior chemotherapy exposure: review cumulative toxicity".to_string());
    }

    reasons
}

pub(crate) fn suggest_alternatives(
    category: EligibilityCategory,
    tumor: &TumorProfile,
    phase: TreatmentPhase,
    has_allergy: bool,
) -> Vec<String> {
    let mut alternatives: Vec<&str> = Vec::new();

    match category {
        EligibilityCategory::NotEligible | EligibilityCategory::RelativeContraindication => {
            alternatives.extend([
                "ECF/ECX (Epirubicin, Cisplatin, 5-FU/Capecitabine)",
                "MAGIC protocol",
                "Single-agent chemotherapy",
                "Best supportive care",
            ]);
        }
        EligibilityCategory::RequiresModification => {
            alternatives.extend([
                "Modified FLOT with dose reductions",
                "Sequential rather than combination therapy",
                "Two-drug combinations (e.g., oxaliplatin + 5-FU)",
            ]);
        }
        EligibilityCategory::Eligible | EligibilityCategory::AbsoluteContraindication => {}
    }
    if has_allergy {
        alternatives.extend([
            "FLOT modification with alternative agents",
            "Carboplatin-based regimens",
            "Paclitaxel-based regimens",
        ]);
    }
    if tumor.is_her2_positive() {
        alternatives.push("Trastuzumab-containing regimen (FLOT plus trastuzumab)");
    }
    if tumor.is_msi_high() {
        alternatives.push("Immune checkpoint inhibitor (nivolumab or pembrolizumab)");
    }
    if phase == TreatmentPhase::Palliative {
        alternatives.push("FOLFOX doublet chemotherapy (palliative)");
    }

    dedup_in_order(alternatives.into_iter().map(str::to_string))
}

pub(crate) fn monitoring_plan(
    patient: &PatientProfile,
    high_risk: bool,
    dose_modifications: Option<&DoseModification>,
) -> Vec<String> {
    let mut plan: Vec<String> = BASE_MONITORING.iter().map(|item| item.to_string()).collect();

    if patient.age >= 65 {
        plan.push("Geriatric assessment".to_string());
    }
    if patient.creatinine_clearance < 60.0 {
        plan.push("Weekly renal function monitoring".to_string());
    }
    if patient.bilirubin > 1.5 {
        plan.push("Liver function tests before each cycle".to_string());
    }
    if patient.neuropathy_grade >= 1 {
        plan.push("Neuropathy assessment before each cycle".to_string());
    }
    if patient.cardiac_function != CardiacFunction::Normal {
        plan.push("Cardiac function monitoring".to_string());
    }
    if patient.hearing_function != HearingFunction::Normal {
        plan.push("Audiology assessment before each cycle".to_string());
    }
    if high_risk {
        plan.extend(HIGH_RISK_MONITORING.iter().map(|item| item.to_string()));
    }
    if let Some(modification) = dose_modifications {
        plan.extend(modification.monitoring_requirements.iter().cloned());
    }

    dedup_in_order(plan)
}

pub(crate) fn predicted_benefit(
    patient: &PatientProfile,
    tumor: &TumorProfile,
    score: f64,
    band: RiskBand,
) -> f64 {
    let age_factor = match patient.age {
        0..=65 => 1.0,
        66..=75 => 0.9,
        _ => 0.7,
    };
    let tumor_factor = match (tumor.resectable, tumor.locally_advanced) {
        (true, true) => 1.0,
        (true, false) => 0.8,
        (false, _) => 0.5,
    };
    let performance_factor = 1.0 - f64::from(patient.performance_status) * 0.1;

    let percent =
        (75.0 * age_factor * tumor_factor * performance_factor * score / 100.0).min(95.0);
    (percent / 100.0 * band.benefit_factor()).clamp(0.0, 0.95)
}

pub(crate) fn toxicity_risk(
    patient: &PatientProfile,
    dose_modifications: Option<&DoseModification>,
    band: RiskBand,
) -> f64 {
    let mut percent = 30.0;
    percent += match patient.age {
        age if age >= 75 => 20.0,
        age if age >= 65 => 10.0,
        _ => 0.0,
    };
    percent += f64::from(patient.performance_status) * 10.0;
    if patient.creatinine_clearance < 50.0 {
        percent += 15.0;
    }
    if patient.bilirubin > 1.5 {
        percent += 15.0;
    }
    if let Some(modification) = dose_modifications {
        percent -= f64::from(modification.reduction_percentage) * 0.3;
    }

    (percent.clamp(5.0, 90.0) / 100.0 * band.toxicity_factor()).clamp(0.05, 0.9)
}

/// Confidence in the eligibility call, from the composite score and the benefit/toxicity ratio.
pub(crate) fn eligibility_confidence(score: f64, benefit: f64, toxicity: f64) -> f64 {
    let ratio = (benefit * 100.0) / (toxicity * 100.0).max(1.0);
    let adjustment = match ratio {
        r if r > 2.0 => 10.0,
        r if r > 1.5 => 5.0,
        r if r > 1.0 => 0.0,
        _ => -10.0,
    };
    (score + adjustment).clamp(5.0, 95.0) / 100.0
}

fn dedup_in_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
