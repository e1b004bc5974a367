use gastric_decision::config::EngineConfig;
use gastric_decision::decisions::{
    CaseIntake, Criterion, DecisionComposer, DecisionError, EligibilityCategory, FlotComponent,
    PatientIntake, RiskFactorModel, TreatmentPhase, TumorIntake, ValidationError,
};
use serde_json::{json, Value};

fn intake(body: Value) -> CaseIntake {
    serde_json::from_value(body).expect("case deserialises")
}

fn composer() -> DecisionComposer {
    DecisionComposer::new(EngineConfig::default())
}

fn scenario_a() -> CaseIntake {
    intake(json!({
        "patient": {
            "age": 65,
            "performance_status": 1,
            "creatinine_clearance": 60,
            "bilirubin": 1.0,
            "comorbidities": [],
            "drug_allergies": []
        },
        "tumor": { "clinical_stage": "T2N0M0", "resectable": true }
    }))
}

fn scenario_b() -> CaseIntake {
    intake(json!({
        "patient": {
            "age": 78,
            "performance_status": 2,
            "creatinine_clearance": 45,
            "comorbidities": ["diabetes", "hypertension"]
        },
        "tumor": { "clinical_stage": "T3N1M0", "resectable": true }
    }))
}

fn scenario_c() -> CaseIntake {
    intake(json!({
        "patient": {
            "age": 55,
            "performance_status": 0,
            "allergies": ["docetaxel"]
        },
        "tumor": { "clinical_stage": "T3N0M0", "resectable": true }
    }))
}

fn scenario_d() -> CaseIntake {
    intake(json!({
        "patient": { "age": 64, "performance_status": 1 },
        "tumor": { "clinical_stage": "T4N2M1", "resectable": false },
        "treatment_intent": "palliative"
    }))
}

#[test]
fn scenario_a_fit_patient_is_eligible_with_base_alternatives() {
    let decision = composer().compose(scenario_a()).expect("decision composes");

    assert_eq!(decision.eligibility.category, EligibilityCategory::Eligible);
    assert!(decision.eligibility.dose_modifications.is_none());
    assert_eq!(decision.alternatives.len(), 4);
    assert!(decision
        .alternatives
        .iter()
        .all(|alternative| !alternative.id.starts_with("reduced")
            && !alternative.id.contains("lymphadenectomy")));
}

#[test]
fn scenario_b_elderly_patient_requires_modified_dosing() {
    let decision = composer().compose(scenario_b()).expect("decision composes");
    let eligibility = &decision.eligibility;

    assert_eq!(decision.alternatives.len(), 5);
    assert!(matches!(
        eligibility.category,
        EligibilityCategory::RequiresModification | EligibilityCategory::RelativeContraindication
    ));
    let modification = eligibility
        .dose_modifications
        .as_ref()
        .expect("dose modification recommended");
    assert!(modification.reduction_percentage >= 25);

    let plan = eligibility.monitoring_plan.join("\n").to_lowercase();
    assert!(eligibility.monitoring_plan.len() >= 5);
    assert!(plan.contains("renal"));
    assert!(plan.contains("liver") || plan.contains("hepatic"));
    assert!(plan.contains("neuro"));
}

#[test]
fn scenario_c_allergy_excludes_flot() {
    let decision = composer().compose(scenario_c()).expect("decision composes");
    let eligibility = &decision.eligibility;

    assert_ne!(eligibility.category, EligibilityCategory::Eligible);
    assert!(eligibility
        .contraindications
        .iter()
        .any(|entry| entry.contains("docetaxel")));
    assert!(!eligibility.alternatives.is_empty());
    assert!(!decision.alternatives.is_empty());
}

#[test]
fn scenario_d_metastatic_palliative_case() {
    let decision = composer().compose(scenario_d()).expect("decision composes");
    let eligibility = &decision.eligibility;

    assert_eq!(eligibility.category, EligibilityCategory::RequiresModification);
    assert!((eligibility.score - 68.0).abs() < 1e-6, "got {}", eligibility.score);
    assert!(eligibility.dose_modifications.is_none());
    assert!(eligibility
        .eligibility_reasons
        .iter()
        .any(|reason| reason.to_lowercase().contains("palliative")));
    assert_ne!(eligibility.recommended_phase, TreatmentPhase::Preoperative);
    assert!(decision
        .adci
        .critical_factors
        .contains(&"metastatic_disease".to_string()));
}

#[test]
fn allergy_to_any_flot_component_is_never_eligible() {
    let composer = composer();
    for component in FlotComponent::ALL {
        let mut case = scenario_a();
        case.patient.drug_allergies = vec![component.name().to_uppercase()];

        let eligibility = composer
            .evaluate_eligibility(case)
            .expect("eligibility evaluates");

        assert_ne!(eligibility.category, EligibilityCategory::Eligible);
        assert!(eligibility
            .contraindications
            .iter()
            .any(|entry| entry.contains(component.name())));
    }
}

#[test]
fn identical_inputs_produce_identical_decisions() {
    let composer = composer();
    for case in [scenario_a(), scenario_b(), scenario_c(), scenario_d()] {
        let first = composer.compose(case.clone()).expect("first");
        let second = composer.compose(case).expect("second");
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).expect("serialises"),
            serde_json::to_string(&second).expect("serialises")
        );
    }
}

#[test]
fn all_scores_stay_within_unit_interval() {
    let composer = composer();
    for age in [30, 60, 76, 90] {
        for performance_status in 0..=4 {
            for stage in ["T1N0M0", "T3N2M0", "T4N3M1", "TX"] {
                let case = CaseIntake {
                    patient: PatientIntake {
                        age: Some(age),
                        performance_status: Some(performance_status),
                        comorbidities: vec!["copd".to_string()],
                        ..PatientIntake::default()
                    },
                    tumor: TumorIntake {
                        clinical_stage: Some(stage.to_string()),
                        ..TumorIntake::default()
                    },
                    ..CaseIntake::default()
                };

                let decision = composer.compose(case).expect("decision composes");

                for criteria in decision.criterion_scores.values() {
                    assert_eq!(criteria.len(), Criterion::ALL.len());
                    assert!(criteria
                        .values()
                        .all(|scored| (0.0..=1.0).contains(&scored.score)));
                }
                assert!(decision
                    .overall_scores
                    .values()
                    .all(|score| (0.0..=1.0).contains(score)));
                assert!((0.0..=1.0).contains(&decision.recommendation.confidence));
                assert!((0.0..=1.0).contains(&decision.uncertainty));
            }
        }
    }
}

#[test]
fn risk_adjustment_never_decreases_with_age() {
    let model = RiskFactorModel::default();
    let mut previous = 0.0;
    for age in 60..=80 {
        let case = CaseIntake {
            patient: PatientIntake {
                age: Some(age),
                performance_status: Some(1),
                ..PatientIntake::default()
            },
            tumor: TumorIntake {
                clinical_stage: Some("T2N0M0".to_string()),
                ..TumorIntake::default()
            },
            ..CaseIntake::default()
        }
        .validate()
        .expect("case validates");

        let adjustment = model.risk_adjustment(&case.patient, &case.tumor);
        assert!(adjustment >= previous, "age {age}: {adjustment} < {previous}");
        previous = adjustment;
    }
}

#[test]
fn her2_positive_tumors_mention_trastuzumab() {
    let mut case = scenario_a();
    case.tumor.her2_status = serde_json::from_value(json!("positive")).expect("status");

    let decision = composer().compose(case).expect("decision composes");

    assert!(decision
        .eligibility
        .alternatives
        .iter()
        .any(|alternative| alternative.contains("Trastuzumab")));
}

#[test]
fn missing_mandatory_fields_fail_before_scoring() {
    let case = intake(json!({
        "patient": { "performance_status": 1 },
        "tumor": {}
    }));

    match composer().compose(case) {
        Err(DecisionError::Validation(ValidationError::MissingFields { fields })) => {
            assert_eq!(fields, vec!["patient.age", "tumor.clinical_stage"]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn decision_serialises_with_documented_field_names() {
    let decision = composer().compose(scenario_b()).expect("decision composes");
    let body = serde_json::to_value(&decision).expect("serialises");

    for field in [
        "alternatives",
        "criterion_scores",
        "overall_scores",
        "optimal_alternative",
        "recommendation",
        "uncertainty",
        "eligibility",
        "risk_profile",
        "adci",
        "expected_outcomes",
    ] {
        assert!(body.get(field).is_some(), "missing {field}");
    }
    assert_eq!(body["eligibility"]["category"], "requires_modification");
    assert!(body["eligibility"]["eligibility_reasons"]
        .as_array()
        .map(|reasons| !reasons.is_empty())
        .unwrap_or(false));
    assert!(body["eligibility"].get("reasons").is_none());
    assert!(body["criterion_scores"]["reduced_flot_open"]["quality_of_life"]["sub_scores"]
        .get("treatment_burden")
        .is_some());
    assert!(body["recommendation"]["alternates"]
        .as_array()
        .map(|alternates| alternates.len() == 2)
        .unwrap_or(false));
}
