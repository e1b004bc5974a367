mod rules;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::alternatives::TreatmentAlternative;
use super::domain::{PatientProfile, TumorProfile};
use super::eligibility::EligibilityResult;
use super::risk::RiskFactorModel;

/// Score assigned when no rule in a table matches.
pub const NEUTRAL_SCORE: f64 = 0.65;

/// Top-level MCDA criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Clinical,
    Surgical,
    Oncological,
    QualityOfLife,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::Clinical,
        Criterion::Surgical,
        Criterion::Oncological,
        Criterion::QualityOfLife,
    ];

    pub const fn weight(self) -> f64 {
        match self {
            Criterion::Clinical => 0.35,
            Criterion::Surgical => 0.30,
            Criterion::Oncological => 0.25,
            Criterion::QualityOfLife => 0.10,
        }
    }

    pub const fn sub_criteria(self) -> [SubCriterion; 3] {
        match self {
            Criterion::Clinical => [
                SubCriterion::PatientFitness,
                SubCriterion::TumorCharacteristics,
                SubCriterion::TreatmentTolerance,
            ],
            Criterion::Surgical => [
                SubCriterion::TechnicalFeasibility,
                SubCriterion::ComplicationRisk,
                SubCriterion::RecoveryTime,
            ],
            Criterion::Oncological => [
                SubCriterion::ResectionCompleteness,
                SubCriterion::LymphNodeClearance,
                SubCriterion::SystemicControl,
            ],
            Criterion::QualityOfLife => [
                SubCriterion::FunctionalRecovery,
                SubCriterion::TreatmentBurden,
                SubCriterion::LongTermWellbeing,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubCriterion {
    PatientFitness,
    TumorCharacteristics,
    TreatmentTolerance,
    TechnicalFeasibility,
    ComplicationRisk,
    RecoveryTime,
    ResectionCompleteness,
    LymphNodeClearance,
    SystemicControl,
    FunctionalRecovery,
    TreatmentBurden,
    LongTermWellbeing,
}

impl SubCriterion {
    /// Weight within the parent criterion.
    pub const fn weight(self) -> f64 {
        match self {
            SubCriterion::PatientFitness => 0.40,
            SubCriterion::TumorCharacteristics => 0.35,
            SubCriterion::TreatmentTolerance => 0.25,
            SubCriterion::TechnicalFeasibility => 0.40,
            SubCriterion::ComplicationRisk => 0.35,
            SubCriterion::RecoveryTime => 0.25,
            SubCriterion::ResectionCompleteness => 0.40,
            SubCriterion::LymphNodeClearance => 0.30,
            SubCriterion::SystemicControl => 0.30,
            SubCriterion::FunctionalRecovery => 0.40,
            SubCriterion::TreatmentBurden => 0.35,
            SubCriterion::LongTermWellbeing => 0.25,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SubCriterion::PatientFitness => "patient_fitness",
            SubCriterion::TumorCharacteristics => "tumor_characteristics",
            SubCriterion::TreatmentTolerance => "treatment_tolerance",
            SubCriterion::TechnicalFeasibility => "technical_feasibility",
            SubCriterion::ComplicationRisk => "complication_risk",
            SubCriterion::RecoveryTime => "recovery_time",
            SubCriterion::ResectionCompleteness => "resection_completeness",
            SubCriterion::LymphNodeClearance => "lymph_node_clearance",
            SubCriterion::SystemicControl => "systemic_control",
            SubCriterion::FunctionalRecovery => "functional_recovery",
            SubCriterion::TreatmentBurden => "treatment_burden",
            SubCriterion::LongTermWellbeing => "long_term_wellbeing",
        }
    }
}

impl fmt::Display for SubCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A rule produced a value outside the real numbers. Indicates a gap in a rule table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("alternative '{alternative_id}' has no defined score for {sub_criterion}")]
pub struct UnscorableAlternative {
    pub alternative_id: String,
    pub sub_criterion: SubCriterion,
}

/// One criterion's score for one alternative, with the sub-criterion breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub score: f64,
    pub sub_scores: BTreeMap<SubCriterion, f64>,
}

/// Everything a rule may look at besides the alternative itself.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInputs<'a> {
    pub patient: &'a PatientProfile,
    pub tumor: &'a TumorProfile,
    pub eligibility: &'a EligibilityResult,
}

/// Evaluates the fixed criteria tree against treatment alternatives.
pub struct CriteriaScorer {
    risk_model: RiskFactorModel,
}

impl CriteriaScorer {
    pub fn new(risk_model: RiskFactorModel) -> Self {
        Self { risk_model }
    }

    pub fn score(
        &self,
        criterion: Criterion,
        alternative: &TreatmentAlternative,
        inputs: ScoringInputs<'_>,
    ) -> Result<CriterionScore, UnscorableAlternative> {
        let mut sub_scores = BTreeMap::new();
        let mut score: f64 = 0.0;

        for sub_criterion in criterion.sub_criteria() {
            let raw = rules::evaluate(sub_criterion, alternative, inputs, &self.risk_model);
            if !raw.is_finite() {
                warn!(
                    alternative = %alternative.id,
                    sub_criterion = sub_criterion.name(),
                    "rule produced a non-finite score"
                );
                return Err(UnscorableAlternative {
                    alternative_id: alternative.id.clone(),
                    sub_criterion,
                });
            }
            let value = raw.clamp(0.0, 1.0);
            score += value * sub_criterion.weight();
            sub_scores.insert(sub_criterion, value);
        }

        Ok(CriterionScore {
            score: score.clamp(0.0, 1.0),
            sub_scores,
        })
    }

    /// Scores all four criteria for one alternative.
    pub fn score_alternative(
        &self,
        alternative: &TreatmentAlternative,
        inputs: ScoringInputs<'_>,
    ) -> Result<BTreeMap<Criterion, CriterionScore>, UnscorableAlternative> {
        Criterion::ALL
            .into_iter()
            .map(|criterion| Ok((criterion, self.score(criterion, alternative, inputs)?)))
            .collect()
    }
}
