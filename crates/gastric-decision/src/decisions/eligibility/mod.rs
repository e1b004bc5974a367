mod config;
mod policy;
mod rules;

pub use config::{ComponentWeights, EligibilityConfig};
pub use policy::{DoseModification, EligibilityCategory, TreatmentPhase};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{PatientProfile, TreatmentIntent, TumorProfile};
use super::risk::{RiskBand, RiskFactorModel};

/// Classifies FLOT eligibility for a validated case.
pub struct EligibilityRuleEngine {
    config: EligibilityConfig,
    risk_model: RiskFactorModel,
}

impl EligibilityRuleEngine {
    pub fn new(config: EligibilityConfig, risk_model: RiskFactorModel) -> Self {
        Self { config, risk_model }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    pub fn evaluate(
        &self,
        patient: &PatientProfile,
        tumor: &TumorProfile,
        intent: TreatmentIntent,
    ) -> EligibilityResult {
        let (components, score, signals) = rules::score_components(patient, tumor, &self.config);

        let modification = policy::assess_dose_modifications(patient, &self.config);
        let category =
            policy::decide_category(score, &signals, &self.config, modification.is_some());
        let dose_modifications = match category {
            EligibilityCategory::RequiresModification
            | EligibilityCategory::RelativeContraindication => modification,
            _ => None,
        };

        let risk_band = RiskBand::from_adjustment(self.risk_model.risk_adjustment(patient, tumor));
        let predicted_benefit = policy::predicted_benefit(patient, tumor, score, risk_band);
        let toxicity_risk =
            policy::toxicity_risk(patient, dose_modifications.as_ref(), risk_band);
        let confidence = policy::eligibility_confidence(score, predicted_benefit, toxicity_risk);

        let recommended_phase = policy::recommended_phase(tumor, intent);
        let contraindications = policy::contraindications(&signals);
        let alternatives = policy::suggest_alternatives(
            category,
            tumor,
            recommended_phase,
            !signals.allergies.is_empty(),
        );
        let monitoring_plan =
            policy::monitoring_plan(patient, signals.high_risk, dose_modifications.as_ref());

        debug!(
            category = category.label(),
            score,
            high_risk = signals.high_risk,
            contraindications = contraindications.len(),
            "classified FLOT eligibility"
        );

        EligibilityResult {
            category,
            score,
            components,
            eligibility_reasons: policy::eligibility_reasons(patient, tumor, intent),
            contraindications,
            dose_modifications,
            predicted_benefit,
            toxicity_risk,
            recommended_phase,
            confidence,
            monitoring_plan,
            alternatives,
            high_risk: signals.high_risk,
            risk_band,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityFactor {
    Age,
    PerformanceStatus,
    OrganFunction,
    TumorSuitability,
    Resectability,
}

/// One weighted input to the composite eligibility score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityComponent {
    pub factor: EligibilityFactor,
    pub score: f64,
    pub weight: f64,
    pub notes: String,
}

/// Eligibility classification with the supporting trail.
///
/// `score` is on a 0-100 scale; `predicted_benefit`, `toxicity_risk` and `confidence`
/// are fractions in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub category: EligibilityCategory,
    pub score: f64,
    pub components: Vec<EligibilityComponent>,
    pub eligibility_reasons: Vec<String>,
    pub contraindications: Vec<String>,
    pub dose_modifications: Option<DoseModification>,
    pub predicted_benefit: f64,
    pub toxicity_risk: f64,
    pub recommended_phase: TreatmentPhase,
    pub confidence: f64,
    pub monitoring_plan: Vec<String>,
    pub alternatives: Vec<String>,
    pub high_risk: bool,
    pub risk_band: RiskBand,
}

impl EligibilityResult {
    pub fn summary(&self) -> String {
        match &self.dose_modifications {
            Some(modification) => format!(
                "{} (score {:.1}, {}% dose reduction of {})",
                self.category.label(),
                self.score,
                modification.reduction_percentage,
                modification
                    .modified_drugs
                    .iter()
                    .map(|drug| drug.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            None => format!("{} (score {:.1})", self.category.label(), self.score),
        }
    }
}
