use crate::config::EngineConfig;
use crate::decisions::eligibility::{EligibilityConfig, EligibilityResult, EligibilityRuleEngine};
use crate::decisions::intake::{CaseIntake, PatientIntake, TumorIntake, ValidatedCase};
use crate::decisions::risk::RiskFactorModel;
use crate::decisions::DecisionComposer;

pub(super) fn patient(age: i64, performance_status: i64) -> PatientIntake {
    PatientIntake {
        age: Some(age),
        performance_status: Some(performance_status),
        creatinine_clearance: Some(90.0),
        bilirubin: Some(0.8),
        ..PatientIntake::default()
    }
}

pub(super) fn tumor(stage: &str) -> TumorIntake {
    TumorIntake {
        clinical_stage: Some(stage.to_string()),
        resectable: Some(true),
        ..TumorIntake::default()
    }
}

pub(super) fn case(patient: PatientIntake, tumor: TumorIntake) -> CaseIntake {
    CaseIntake {
        patient,
        tumor,
        ..CaseIntake::default()
    }
}

pub(super) fn healthy_case() -> CaseIntake {
    case(patient(58, 0), tumor("T2N0M0"))
}

/// Fit 65-year-old, T2N0M0, no comorbidities.
pub(super) fn scenario_a() -> CaseIntake {
    let mut patient = patient(65, 1);
    patient.creatinine_clearance = Some(60.0);
    patient.bilirubin = Some(1.0);
    case(patient, tumor("T2N0M0"))
}

/// Elderly patient with impaired renal clearance and two comorbidities.
pub(super) fn scenario_b() -> CaseIntake {
    let mut patient = patient(78, 2);
    patient.creatinine_clearance = Some(45.0);
    patient.comorbidities = vec!["diabetes".to_string(), "hypertension".to_string()];
    case(patient, tumor("T3N1M0"))
}

/// Otherwise healthy patient allergic to docetaxel.
pub(super) fn scenario_c() -> CaseIntake {
    let mut patient = patient(60, 0);
    patient.drug_allergies = vec!["Docetaxel".to_string()];
    case(patient, tumor("T3N0M0"))
}

/// Metastatic disease treated with palliative intent.
pub(super) fn scenario_d() -> CaseIntake {
    let mut tumor = tumor("T4N2M1");
    tumor.resectable = Some(false);
    let mut case = case(patient(62, 1), tumor);
    case.treatment_intent = Some("palliative".to_string());
    case
}

pub(super) fn validated(case: CaseIntake) -> ValidatedCase {
    case.validate().expect("fixture case validates")
}

pub(super) fn eligibility_engine() -> EligibilityRuleEngine {
    EligibilityRuleEngine::new(EligibilityConfig::default(), RiskFactorModel::default())
}

pub(super) fn evaluate(case: CaseIntake) -> EligibilityResult {
    let case = validated(case);
    eligibility_engine().evaluate(&case.patient, &case.tumor, case.intent)
}

pub(super) fn composer() -> DecisionComposer {
    DecisionComposer::new(EngineConfig::default())
}
