//! Gastric cancer treatment decision pipeline.
//!
//! Intake records are validated into immutable profiles, then the risk model and the FLOT
//! eligibility engine feed a criteria scorer whose output is aggregated and ranked by the
//! [`DecisionComposer`].

pub mod adci;
pub mod alternatives;
pub(crate) mod composer;
pub mod criteria;
pub mod domain;
pub(crate) mod eligibility;
pub mod intake;
pub mod mcda;
pub mod risk;

#[cfg(test)]
mod tests;

pub use adci::{AdciAssessment, AdciEngine, AdciFactor, ConfidenceLevel, EvidenceBasis};
pub use alternatives::{generate_alternatives, AlternativeTag, TreatmentAlternative};
pub use composer::{Decision, DecisionComposer, DecisionError, RankedAlternative, Recommendation};
pub use criteria::{
    CriteriaScorer, Criterion, CriterionScore, ScoringInputs, SubCriterion, UnscorableAlternative,
    NEUTRAL_SCORE,
};
pub use domain::{
    CardiacFunction, ClinicalStage, FlotComponent, HearingFunction, Her2Status, MsiStatus,
    PatientProfile, TreatmentIntent, TumorLocation, TumorProfile, Urgency,
};
pub use eligibility::{
    ComponentWeights, DoseModification, EligibilityCategory, EligibilityComponent,
    EligibilityConfig, EligibilityFactor, EligibilityResult, EligibilityRuleEngine,
    TreatmentPhase,
};
pub use intake::{CaseIntake, PatientIntake, TumorIntake, ValidatedCase, ValidationError};
pub use mcda::{AlternativeScores, OverallScore};
pub use risk::{
    ExpectedOutcomes, ProcedureClass, RiskBand, RiskContext, RiskFactorModel, RiskFactors,
    RiskProfile, SurgicalApproach,
};
