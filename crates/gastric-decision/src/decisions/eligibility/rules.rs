use super::super::domain::{CardiacFunction, FlotComponent, PatientProfile, TumorProfile};
use super::config::EligibilityConfig;
use super::{EligibilityComponent, EligibilityFactor};

/// Facts the policy needs beyond the component scores.
pub(crate) struct EligibilitySignals {
    pub allergies: Vec<(String, FlotComponent)>,
    pub poor_performance: bool,
    pub renal_floor_breached: bool,
    pub renal_severe: bool,
    pub hepatic_ceiling_breached: bool,
    pub hepatic_severe: bool,
    pub severe_cardiac: bool,
    pub high_risk: bool,
}

pub(crate) fn score_components(
    patient: &PatientProfile,
    tumor: &TumorProfile,
    config: &EligibilityConfig,
) -> (Vec<EligibilityComponent>, f64, EligibilitySignals) {
    let weights = &config.weights;
    let components = vec![
        component(
            EligibilityFactor::Age,
            age_score(patient.age),
            weights.age,
            format!("age {}", patient.age),
        ),
        component(
            EligibilityFactor::PerformanceStatus,
            performance_score(patient.performance_status),
            weights.performance_status,
            format!("ECOG {}", patient.performance_status),
        ),
        component(
            EligibilityFactor::OrganFunction,
            patient.organ_function_score(),
            weights.organ_function,
            format!(
                "creatinine clearance {:.0} mL/min, bilirubin {:.1} mg/dL, cardiac {:?}",
                patient.creatinine_clearance, patient.bilirubin, patient.cardiac_function
            ),
        ),
        component(
            EligibilityFactor::TumorSuitability,
            tumor_suitability(tumor),
            weights.tumor_suitability,
            format!("{} histology, stage {}", tumor.histology, tumor.clinical_stage),
        ),
        component(
            EligibilityFactor::Resectability,
            resectability_score(tumor),
            weights.resectability,
            if tumor.resectable {
                "resectable".to_string()
            } else if tumor.locally_advanced {
                "locally advanced, may become resectable".to_string()
            } else {
                "unresectable".to_string()
            },
        ),
    ];

    let total: f64 = components
        .iter()
        .map(|component| component.score * component.weight)
        .sum();
    let score = (total * 100.0).clamp(0.0, 100.0);

    let allergies = patient
        .drug_allergies
        .iter()
        .filter_map(|allergen| {
            FlotComponent::from_tag(allergen).map(|component| (allergen.clone(), component))
        })
        .collect();

    let signals = EligibilitySignals {
        allergies,
        poor_performance: patient.performance_status >= 3,
        renal_floor_breached: patient.creatinine_clearance < config.renal_floor,
        renal_severe: patient.creatinine_clearance < config.renal_moderate,
        hepatic_ceiling_breached: patient.bilirubin > config.bilirubin_ceiling,
        hepatic_severe: patient.bilirubin > config.bilirubin_moderate,
        severe_cardiac: patient.cardiac_function == CardiacFunction::SevereImpairment,
        high_risk: patient.age >= config.elderly_age
            || (patient.performance_status >= 2 && patient.comorbidity_count() >= 1),
    };

    (components, score, signals)
}

fn component(
    factor: EligibilityFactor,
    score: f64,
    weight: f64,
    notes: String,
) -> EligibilityComponent {
    EligibilityComponent {
        factor,
        score,
        weight,
        notes,
    }
}

pub(crate) fn age_score(age: u8) -> f64 {
    match age {
        0..=17 => 0.0,
        18..=65 => 1.0,
        66..=75 => 0.8,
        76..=80 => 0.6,
        _ => 0.3,
    }
}

pub(crate) fn performance_score(performance_status: u8) -> f64 {
    match performance_status {
        0 => 1.0,
        1 => 0.9,
        2 => 0.5,
        3 => 0.2,
        _ => 0.0,
    }
}

pub(crate) fn tumor_suitability(tumor: &TumorProfile) -> f64 {
    let histology = match tumor.histology.as_str() {
        "adenocarcinoma" => 1.0,
        "signet_ring" => 0.8,
        _ => 0.6,
    };
    let setting = match (tumor.resectable, tumor.locally_advanced) {
        (true, true) => 1.0,
        (true, false) => 0.7,
        (false, _) => 0.5,
    };
    histology * setting
}

pub(crate) fn resectability_score(tumor: &TumorProfile) -> f64 {
    if tumor.resectable {
        1.0
    } else if tumor.locally_advanced {
        0.6
    } else {
        0.2
    }
}
