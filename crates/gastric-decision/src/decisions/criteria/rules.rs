use super::super::alternatives::{AlternativeTag, TreatmentAlternative};
use super::super::domain::TumorLocation;
use super::super::eligibility::EligibilityCategory;
use super::super::risk::{estimate_length_of_stay, RiskContext, RiskFactorModel, SurgicalApproach};
use super::{ScoringInputs, SubCriterion, NEUTRAL_SCORE};

use AlternativeTag::{
    ExtendedFlot, ExtendedLymphadenectomy, MinimallyInvasive, ReducedFlot, StandardFlot,
};

pub(super) fn evaluate(
    sub_criterion: SubCriterion,
    alternative: &TreatmentAlternative,
    inputs: ScoringInputs<'_>,
    risk_model: &RiskFactorModel,
) -> f64 {
    match sub_criterion {
        SubCriterion::PatientFitness => patient_fitness(alternative, inputs),
        SubCriterion::TumorCharacteristics => tumor_characteristics(alternative, inputs),
        SubCriterion::TreatmentTolerance => treatment_tolerance(alternative, inputs),
        SubCriterion::TechnicalFeasibility => technical_feasibility(alternative, inputs),
        SubCriterion::ComplicationRisk => complication_risk(alternative, inputs, risk_model),
        SubCriterion::RecoveryTime => recovery_time(alternative, inputs),
        SubCriterion::ResectionCompleteness => resection_completeness(alternative, inputs),
        SubCriterion::LymphNodeClearance => lymph_node_clearance(alternative, inputs),
        SubCriterion::SystemicControl => systemic_control(alternative, inputs),
        SubCriterion::FunctionalRecovery => functional_recovery(alternative, inputs),
        SubCriterion::TreatmentBurden => treatment_burden(alternative),
        SubCriterion::LongTermWellbeing => long_term_wellbeing(inputs),
    }
}

fn operative_context(
    alternative: &TreatmentAlternative,
    inputs: ScoringInputs<'_>,
) -> RiskContext {
    RiskContext::for_case(inputs.patient, inputs.tumor).with_approach(alternative.approach())
}

fn patient_fitness(alternative: &TreatmentAlternative, inputs: ScoringInputs<'_>) -> f64 {
    let patient = inputs.patient;
    let mut score = match patient.performance_status {
        0 => 0.9,
        1 => 0.8,
        2 => 0.6,
        3 => 0.4,
        _ => 0.2,
    };
    let frail = patient.age > 75 || patient.comorbidity_count() >= 3;
    if patient.age > 75 {
        score -= 0.1;
    }
    if patient.comorbidity_count() >= 3 {
        score -= 0.1;
    }
    if frail && alternative.has(ReducedFlot) {
        score += 0.1;
    }
    if inputs.eligibility.high_risk && alternative.has(ExtendedFlot) {
        score -= 0.1;
    }
    score
}

fn tumor_characteristics(alternative: &TreatmentAlternative, inputs: ScoringInputs<'_>) -> f64 {
    let stage = &inputs.tumor.clinical_stage;
    if stage.is_metastatic() {
        return 0.3;
    }
    let Some(t) = stage.t_category() else {
        return NEUTRAL_SCORE;
    };
    let advanced = t >= 3;

    let mut score = if alternative.has(ExtendedFlot) {
        if advanced { 0.9 } else { 0.6 }
    } else if alternative.has(StandardFlot) {
        if advanced { 0.75 } else { 0.8 }
    } else if alternative.has(ReducedFlot) {
        if advanced { 0.6 } else { 0.7 }
    } else {
        NEUTRAL_SCORE
    };
    if stage.is_node_positive() && alternative.has(ExtendedLymphadenectomy) {
        score += 0.05;
    }
    score
}

fn treatment_tolerance(alternative: &TreatmentAlternative, inputs: ScoringInputs<'_>) -> f64 {
    let category = inputs.eligibility.category;
    let mut score = match category {
        EligibilityCategory::Eligible => 0.9,
        EligibilityCategory::RequiresModification => 0.7,
        EligibilityCategory::RelativeContraindication => 0.5,
        EligibilityCategory::NotEligible => 0.3,
        EligibilityCategory::AbsoluteContraindication => 0.1,
    };
    let needs_adjustment = matches!(
        category,
        EligibilityCategory::RequiresModification | EligibilityCategory::RelativeContraindication
    );
    if needs_adjustment && alternative.has(ReducedFlot) {
        score += 0.15;
    }
    if category != EligibilityCategory::Eligible && alternative.has(ExtendedFlot) {
        score -= 0.1;
    }
    score
}

fn technical_feasibility(alternative: &TreatmentAlternative, inputs: ScoringInputs<'_>) -> f64 {
    let tumor = inputs.tumor;
    let t4 = tumor.clinical_stage.t_category() == Some(4);

    match alternative.approach() {
        SurgicalApproach::MinimallyInvasive => {
            let mut score = match tumor.location {
                TumorLocation::Distal | TumorLocation::Body => 0.85,
                TumorLocation::Proximal | TumorLocation::Cardia | TumorLocation::Gej => 0.65,
                TumorLocation::Unknown => NEUTRAL_SCORE,
            };
            if t4 {
                score -= 0.15;
            }
            if inputs.patient.bmi.map(|bmi| bmi > 35.0).unwrap_or(false) {
                score -= 0.1;
            }
            score
        }
        SurgicalApproach::Open if alternative.has(ExtendedLymphadenectomy) => 0.75,
        SurgicalApproach::Open => 0.8,
    }
}

fn complication_risk(
    alternative: &TreatmentAlternative,
    inputs: ScoringInputs<'_>,
    risk_model: &RiskFactorModel,
) -> f64 {
    let adjustment =
        risk_model.risk_adjustment_with(inputs.patient, operative_context(alternative, inputs));
    let mut score = 1.0 / adjustment;
    if alternative.has(ExtendedLymphadenectomy) {
        score *= 0.9;
    }
    if alternative.has(MinimallyInvasive) {
        score *= 1.05;
    }
    score
}

fn recovery_time(alternative: &TreatmentAlternative, inputs: ScoringInputs<'_>) -> f64 {
    let mut days = estimate_length_of_stay(inputs.patient, operative_context(alternative, inputs));
    if alternative.has(ExtendedLymphadenectomy) {
        days += 1;
    }
    1.0 - (f64::from(days) - 5.0) / 10.0
}

fn resection_completeness(alternative: &TreatmentAlternative, inputs: ScoringInputs<'_>) -> f64 {
    let tumor = inputs.tumor;
    if tumor.clinical_stage.is_metastatic() {
        return 0.2;
    }
    let mut score = match (tumor.resectable, tumor.locally_advanced) {
        (true, _) if tumor.clinical_stage.t_category() == Some(4) => {
            if alternative.has(ExtendedFlot) { 0.85 } else { 0.7 }
        }
        (true, _) => 0.9,
        (false, true) => {
            if alternative.has(ExtendedFlot) { 0.6 } else { 0.5 }
        }
        (false, false) => 0.3,
    };
    if alternative.has(ExtendedLymphadenectomy) {
        score += 0.05;
    }
    score
}

fn lymph_node_clearance(alternative: &TreatmentAlternative, inputs: ScoringInputs<'_>) -> f64 {
    let stage = &inputs.tumor.clinical_stage;
    if alternative.has(ExtendedLymphadenectomy) {
        return if stage.is_node_positive() { 0.95 } else { 0.85 };
    }
    if stage.n_category().is_none() {
        return NEUTRAL_SCORE;
    }
    match (alternative.approach(), stage.is_node_positive()) {
        (SurgicalApproach::Open, _) => 0.8,
        (SurgicalApproach::MinimallyInvasive, true) => 0.7,
        (SurgicalApproach::MinimallyInvasive, false) => 0.75,
    }
}

fn systemic_control(alternative: &TreatmentAlternative, inputs: ScoringInputs<'_>) -> f64 {
    match inputs.eligibility.category {
        EligibilityCategory::AbsoluteContraindication => return 0.2,
        EligibilityCategory::NotEligible => return 0.3,
        _ => {}
    }
    let stage = &inputs.tumor.clinical_stage;
    let high_burden = stage.is_node_positive() || stage.is_locally_invasive();

    let mut score = if alternative.has(ExtendedFlot) {
        if high_burden { 0.9 } else { 0.75 }
    } else if alternative.has(StandardFlot) {
        0.8
    } else if alternative.has(ReducedFlot) {
        0.65
    } else {
        NEUTRAL_SCORE
    };
    if inputs.tumor.is_msi_high() {
        score -= 0.1;
    }
    score
}

fn functional_recovery(alternative: &TreatmentAlternative, inputs: ScoringInputs<'_>) -> f64 {
    let mut score = match alternative.approach() {
        SurgicalApproach::MinimallyInvasive => 0.85,
        SurgicalApproach::Open => 0.7,
    };
    if alternative.has(ExtendedLymphadenectomy) {
        score -= 0.1;
    }
    if inputs.tumor.location.requires_total_gastrectomy() {
        score -= 0.1;
    }
    if inputs.patient.age > 75 {
        score -= 0.05;
    }
    score
}

fn treatment_burden(alternative: &TreatmentAlternative) -> f64 {
    let mut score = if alternative.has(ReducedFlot) {
        0.8
    } else if alternative.has(StandardFlot) {
        0.7
    } else if alternative.has(ExtendedFlot) {
        0.55
    } else {
        NEUTRAL_SCORE
    };
    if alternative.has(ExtendedLymphadenectomy) {
        score -= 0.05;
    }
    if alternative.has(MinimallyInvasive) {
        score += 0.05;
    }
    score
}

fn long_term_wellbeing(inputs: ScoringInputs<'_>) -> f64 {
    0.4 + 0.5 * inputs.eligibility.predicted_benefit
}
