use super::common::*;
use crate::config::EngineConfig;
use crate::decisions::composer::{DecisionComposer, DecisionError};
use crate::decisions::domain::Her2Status;
use crate::decisions::eligibility::EligibilityCategory;
use crate::decisions::intake::{CaseIntake, ValidationError};

fn ids(case: CaseIntake) -> Vec<String> {
    composer()
        .compose(case)
        .expect("decision composes")
        .alternatives
        .into_iter()
        .map(|alternative| alternative.id)
        .collect()
}

#[test]
fn fit_patient_gets_only_the_base_alternatives() {
    assert_eq!(
        ids(scenario_a()),
        vec![
            "standard_flot_open",
            "standard_flot_mis",
            "extended_flot_open",
            "extended_flot_mis"
        ]
    );
}

#[test]
fn elderly_patient_gets_the_reduced_dose_variant() {
    let generated = ids(scenario_b());
    assert_eq!(generated.len(), 5);
    assert_eq!(generated[4], "reduced_flot_open");
}

#[test]
fn multimorbidity_alone_triggers_the_reduced_dose_variant() {
    let mut case = healthy_case();
    case.patient.comorbidities = vec![
        "diabetes".to_string(),
        "copd".to_string(),
        "hypertension".to_string(),
    ];
    assert!(ids(case).contains(&"reduced_flot_open".to_string()));
}

#[test]
fn t4_or_n2_disease_gets_the_lymphadenectomy_variant() {
    for stage in ["T4N0M0", "T2N2M0"] {
        let generated = ids(case(patient(60, 0), tumor(stage)));
        assert_eq!(generated.len(), 5, "{stage}");
        assert_eq!(generated[4], "extended_flot_extended_lymphadenectomy");
    }

    let generated = ids(case(patient(80, 1), tumor("T4N2M0")));
    assert_eq!(generated.len(), 6);
    assert_eq!(generated[4], "reduced_flot_open");
    assert_eq!(generated[5], "extended_flot_extended_lymphadenectomy");
}

#[test]
fn recommendation_follows_the_optimal_alternative() {
    let decision = composer().compose(scenario_a()).expect("decision composes");

    let best = decision
        .overall_scores
        .values()
        .cloned()
        .fold(f64::MIN, f64::max);
    assert_eq!(decision.optimal_alternative.score, best);
    assert_eq!(
        decision.recommendation.primary,
        decision.optimal_alternative.alternative_id
    );
    assert_eq!(decision.recommendation.alternates.len(), 2);
    assert!(decision
        .recommendation
        .alternates
        .iter()
        .all(|alternate| alternate.alternative_id != decision.recommendation.primary
            && alternate.score <= best));
    let alternates = &decision.recommendation.alternates;
    assert!(alternates[0].score >= alternates[1].score);
}

#[test]
fn justification_cites_stage_age_comorbidities_and_tags() {
    let decision = composer().compose(scenario_b()).expect("decision composes");
    let chosen = decision
        .alternatives
        .iter()
        .find(|alternative| alternative.id == decision.recommendation.primary)
        .expect("primary is generated");

    let text = &decision.recommendation.justification;
    assert!(text.contains("T3N1M0"));
    assert!(text.contains("78-year-old"));
    assert!(text.contains("2 comorbidities"));
    assert!(text.contains(&chosen.tag_summary()));
}

#[test]
fn composition_is_deterministic() {
    let composer = composer();
    let first = composer.compose(scenario_b()).expect("first");
    let second = composer.compose(scenario_b()).expect("second");
    assert_eq!(first, second);
}

#[test]
fn validation_failures_stop_before_scoring() {
    let mut case = scenario_a();
    case.patient.age = None;

    match composer().compose(case) {
        Err(DecisionError::Validation(ValidationError::MissingFields { fields })) => {
            assert_eq!(fields, vec!["patient.age"])
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn allergic_patient_still_receives_a_ranked_decision() {
    let decision = composer().compose(scenario_c()).expect("decision composes");

    assert_eq!(
        decision.eligibility.category,
        EligibilityCategory::AbsoluteContraindication
    );
    assert!(!decision.alternatives.is_empty());
    assert!(decision
        .recommendation
        .justification
        .contains("absolute contraindication"));
}

#[test]
fn scores_confidence_and_uncertainty_are_bounded() {
    let composer = composer();
    for case in [scenario_a(), scenario_b(), scenario_c(), scenario_d()] {
        let decision = composer.compose(case).expect("decision composes");

        assert!(decision
            .overall_scores
            .values()
            .all(|score| (0.0..=1.0).contains(score)));
        for criteria in decision.criterion_scores.values() {
            assert!(criteria
                .values()
                .all(|scored| (0.0..=1.0).contains(&scored.score)));
        }
        assert!((0.0..=1.0).contains(&decision.recommendation.confidence));
        assert!((0.0..=1.0).contains(&decision.uncertainty));
        assert!((0.0..=1.0).contains(&decision.adci.confidence));
    }
}

#[test]
fn context_is_carried_through() {
    let mut case = scenario_a();
    case.context
        .insert("mrn".to_string(), serde_json::Value::from("A-100"));

    let decision = composer().compose(case).expect("decision composes");
    assert_eq!(decision.context["mrn"], "A-100");
}

#[test]
fn configured_risk_cap_bounds_expected_outcomes() {
    let mut case = healthy_case();
    case.patient.age = Some(80);
    case.patient.asa_score = Some(4);
    case.patient.albumin = Some(2.5);
    case.patient.comorbidities = vec!["heart_failure".to_string()];

    let uncapped = composer().compose(case.clone()).expect("uncapped");
    let capped = DecisionComposer::new(EngineConfig {
        risk_adjustment_cap: Some(1.5),
        ..EngineConfig::default()
    })
    .compose(case)
    .expect("capped");

    assert!(uncapped.risk_profile.risk_adjustment > 1.5);
    assert_eq!(capped.risk_profile.risk_adjustment, 1.5);
    assert!(
        capped.expected_outcomes.mortality_30_day < uncapped.expected_outcomes.mortality_30_day
    );
}

#[test]
fn eligibility_can_be_evaluated_on_its_own() {
    let result = composer()
        .evaluate_eligibility(scenario_c())
        .expect("eligibility evaluates");
    assert_eq!(result.category, EligibilityCategory::AbsoluteContraindication);

    match composer().evaluate_eligibility(CaseIntake::default()) {
        Err(ValidationError::MissingFields { fields }) => assert_eq!(fields.len(), 3),
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn risk_profile_normalises_each_dimension() {
    let decision = composer().compose(scenario_b()).expect("decision composes");
    let profile = &decision.risk_profile;

    assert!((profile.age - 8.0 / 30.0).abs() < 1e-9);
    assert!((profile.comorbidities - 1.0 / 3.0).abs() < 1e-9);
    assert!((profile.tumor_stage - 0.7).abs() < 1e-9);
    assert!((profile.base_risk - (0.2 * 8.0 / 30.0 + 0.1 + 0.35)).abs() < 1e-9);
    assert!((0.0..=1.0).contains(&profile.organ_function));
    assert!(profile.risk_adjustment >= 1.3);
}

#[test]
fn adci_completeness_counts_the_recorded_factors() {
    let sparse = composer().compose(healthy_case()).expect("decision composes");
    let expected = (2.0 / 3.0) * 0.7 + (1.0 / 3.0) * 0.3;
    assert!(
        (sparse.adci.data_completeness - expected).abs() < 1e-9,
        "got {}",
        sparse.adci.data_completeness
    );

    let mut documented = healthy_case();
    documented.tumor.histology = Some("Intestinal".to_string());
    documented.tumor.her2_status = Some(Her2Status::Positive);
    let full = composer().compose(documented).expect("decision composes");
    let expected = 0.7 + (2.0 / 3.0) * 0.3;
    assert!(
        (full.adci.data_completeness - expected).abs() < 1e-9,
        "got {}",
        full.adci.data_completeness
    );
}
