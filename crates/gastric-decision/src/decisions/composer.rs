use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::adci::{AdciAssessment, AdciEngine};
use super::alternatives::{generate_alternatives, TreatmentAlternative};
use super::criteria::{
    CriteriaScorer, Criterion, CriterionScore, ScoringInputs, UnscorableAlternative,
};
use super::domain::{PatientProfile, TreatmentIntent, TumorProfile};
use super::eligibility::{EligibilityResult, EligibilityRuleEngine};
use super::intake::{CaseIntake, ValidatedCase, ValidationError};
use super::mcda::{self, AlternativeScores, OverallScore};
use super::risk::{
    expected_outcomes, ExpectedOutcomes, RiskContext, RiskFactorModel, RiskProfile,
};
use crate::config::EngineConfig;

const MAX_ALTERNATES: usize = 2;

/// Runs the full pipeline for one case: eligibility, alternative generation, criteria
/// scoring, aggregation and the final recommendation.
pub struct DecisionComposer {
    risk_model: RiskFactorModel,
    eligibility: EligibilityRuleEngine,
    scorer: CriteriaScorer,
    adci: AdciEngine,
}

impl DecisionComposer {
    pub fn new(config: EngineConfig) -> Self {
        let risk_model = RiskFactorModel::new(config.risk_adjustment_cap);
        Self {
            risk_model,
            eligibility: EligibilityRuleEngine::new(config.eligibility, risk_model),
            scorer: CriteriaScorer::new(risk_model),
            adci: AdciEngine::new(config.confidence_threshold),
        }
    }

    /// Validate the intake and compose a decision. Validation failures return before any
    /// alternative is generated.
    pub fn compose(&self, intake: CaseIntake) -> Result<Decision, DecisionError> {
        let case = intake.validate()?;
        self.compose_validated(case)
    }

    /// Eligibility classification alone, for callers that do not need the MCDA ranking.
    pub fn evaluate_eligibility(
        &self,
        intake: CaseIntake,
    ) -> Result<EligibilityResult, ValidationError> {
        let case = intake.validate()?;
        Ok(self.eligibility.evaluate(&case.patient, &case.tumor, case.intent))
    }

    pub fn compose_validated(&self, case: ValidatedCase) -> Result<Decision, DecisionError> {
        let ValidatedCase {
            patient,
            tumor,
            intent,
            context,
        } = case;

        let eligibility = self.eligibility.evaluate(&patient, &tumor, intent);
        let alternatives = generate_alternatives(&patient, &tumor);
        let inputs = ScoringInputs {
            patient: &patient,
            tumor: &tumor,
            eligibility: &eligibility,
        };

        let mut scored = Vec::with_capacity(alternatives.len());
        for alternative in &alternatives {
            let criteria = self.scorer.score_alternative(alternative, inputs)?;
            debug!(
                alternative = %alternative.id,
                overall = mcda::overall_score(&criteria),
                "scored treatment alternative"
            );
            scored.push(AlternativeScores {
                alternative_id: alternative.id.clone(),
                criteria,
            });
        }

        let overall = mcda::aggregate(&scored);
        let optimal = mcda::identify_optimal(&overall)
            .cloned()
            .ok_or(DecisionError::NoAlternatives)?;
        let chosen = alternatives
            .iter()
            .find(|alternative| alternative.id == optimal.alternative_id)
            .ok_or(DecisionError::NoAlternatives)?;

        let confidence = mcda::score_confidence(&overall);
        let uncertainty = mcda::estimate_uncertainty(&scored);
        let recommendation = Recommendation {
            primary: chosen.id.clone(),
            name: chosen.name.clone(),
            description: chosen.description.clone(),
            justification: justification(chosen, &patient, &tumor, &optimal, &eligibility),
            confidence,
            alternates: alternates(&overall, &alternatives, &optimal.alternative_id),
        };

        let operative = RiskContext::for_case(&patient, &tumor).with_approach(chosen.approach());
        let outcomes =
            expected_outcomes(self.risk_model.risk_adjustment_with(&patient, operative));
        let risk_profile = self.risk_model.risk_profile(&patient, &tumor);
        let adci = self.adci.assess(&patient, &tumor, &eligibility);

        info!(
            optimal = %optimal.alternative_id,
            score = optimal.score,
            confidence,
            uncertainty,
            eligibility = eligibility.category.label(),
            "composed treatment decision"
        );

        Ok(Decision {
            treatment_intent: intent,
            alternatives,
            criterion_scores: scored
                .into_iter()
                .map(|entry| (entry.alternative_id, entry.criteria))
                .collect(),
            overall_scores: overall
                .iter()
                .map(|entry| (entry.alternative_id.clone(), entry.score))
                .collect(),
            optimal_alternative: optimal,
            recommendation,
            uncertainty,
            eligibility,
            risk_profile,
            adci,
            expected_outcomes: outcomes,
            context,
        })
    }
}

impl Default for DecisionComposer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Composed decision for one case. Contains no clock-dependent field, so identical inputs
/// produce equal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub treatment_intent: TreatmentIntent,
    /// In generation order.
    pub alternatives: Vec<TreatmentAlternative>,
    pub criterion_scores: BTreeMap<String, BTreeMap<Criterion, CriterionScore>>,
    pub overall_scores: BTreeMap<String, f64>,
    pub optimal_alternative: OverallScore,
    pub recommendation: Recommendation,
    pub uncertainty: f64,
    pub eligibility: EligibilityResult,
    pub risk_profile: RiskProfile,
    pub adci: AdciAssessment,
    pub expected_outcomes: ExpectedOutcomes,
    pub context: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub primary: String,
    pub name: String,
    pub description: String,
    pub justification: String,
    pub confidence: f64,
    pub alternates: Vec<RankedAlternative>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAlternative {
    pub alternative_id: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Unscorable(#[from] UnscorableAlternative),
    #[error("no treatment alternatives were generated")]
    NoAlternatives,
}

fn justification(
    chosen: &TreatmentAlternative,
    patient: &PatientProfile,
    tumor: &TumorProfile,
    optimal: &OverallScore,
    eligibility: &EligibilityResult,
) -> String {
    let comorbidities = patient.comorbidity_count();
    let noun = if comorbidities == 1 {
        "comorbidity"
    } else {
        "comorbidities"
    };
    format!(
        "{name} ranks highest (score {score:.3}) for clinical stage {stage} in a {age}-year-old \
         patient with {comorbidities} {noun}. Selected for: {tags}. FLOT eligibility: {category}.",
        name = chosen.name,
        score = optimal.score,
        stage = tumor.clinical_stage.notation(),
        age = patient.age,
        tags = chosen.tag_summary(),
        category = eligibility.category.label(),
    )
}

fn alternates(
    overall: &[OverallScore],
    alternatives: &[TreatmentAlternative],
    optimal_id: &str,
) -> Vec<RankedAlternative> {
    mcda::rank(overall)
        .into_iter()
        .filter(|entry| entry.alternative_id != optimal_id)
        .take(MAX_ALTERNATES)
        .filter_map(|entry| {
            alternatives
                .iter()
                .find(|alternative| alternative.id == entry.alternative_id)
                .map(|alternative| RankedAlternative {
                    alternative_id: alternative.id.clone(),
                    name: alternative.name.clone(),
                    score: entry.score,
                })
        })
        .collect()
}
