use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{ClinicalStage, PatientProfile, TumorProfile, Urgency};
use super::intake::{DEFAULT_ALBUMIN, DEFAULT_ASA_SCORE};

const DEFAULT_AGE: u8 = 65;

/// Per-comorbidity increments applied to the surgical risk multiplier.
const COMORBIDITY_INCREMENTS: [(&str, f64); 4] = [
    ("diabetes", 0.1),
    ("copd", 0.2),
    ("heart_failure", 0.3),
    ("chronic_kidney_disease", 0.2),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurgicalApproach {
    Open,
    MinimallyInvasive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureClass {
    #[default]
    SubtotalGastrectomy,
    TotalGastrectomy,
}

/// Operative circumstances that modify the patient's baseline risk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskContext {
    pub approach: Option<SurgicalApproach>,
    pub procedure: ProcedureClass,
    pub urgency: Urgency,
}

impl RiskContext {
    /// Context implied by the case itself, before any alternative picks an approach.
    pub fn for_case(patient: &PatientProfile, tumor: &TumorProfile) -> Self {
        let procedure = if tumor.location.requires_total_gastrectomy() {
            ProcedureClass::TotalGastrectomy
        } else {
            ProcedureClass::SubtotalGastrectomy
        };
        Self {
            approach: None,
            procedure,
            urgency: patient.urgency,
        }
    }

    pub fn with_approach(mut self, approach: SurgicalApproach) -> Self {
        self.approach = Some(approach);
        self
    }
}

/// Risk inputs with population defaults, so partial records still produce an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskFactors {
    pub age: u8,
    pub asa_score: u8,
    pub comorbidities: BTreeSet<String>,
    pub albumin: f64,
    #[serde(flatten)]
    pub context: RiskContext,
}

impl Default for RiskFactors {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            asa_score: DEFAULT_ASA_SCORE,
            comorbidities: BTreeSet::new(),
            albumin: DEFAULT_ALBUMIN,
            context: RiskContext::default(),
        }
    }
}

impl RiskFactors {
    pub fn from_profile(patient: &PatientProfile, context: RiskContext) -> Self {
        Self {
            age: patient.age,
            asa_score: patient.asa_score,
            comorbidities: patient.comorbidities.clone(),
            albumin: patient.albumin,
            context,
        }
    }
}

/// Coarse bucket of the risk multiplier, used to scale eligibility estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskBand {
    pub fn from_adjustment(adjustment: f64) -> Self {
        match adjustment {
            r if r < 1.2 => RiskBand::Low,
            r if r < 1.6 => RiskBand::Moderate,
            r if r < 2.0 => RiskBand::High,
            _ => RiskBand::VeryHigh,
        }
    }

    pub const fn benefit_factor(self) -> f64 {
        match self {
            RiskBand::Low => 1.0,
            RiskBand::Moderate => 0.9,
            RiskBand::High => 0.8,
            RiskBand::VeryHigh => 0.65,
        }
    }

    pub const fn toxicity_factor(self) -> f64 {
        match self {
            RiskBand::Low => 1.0,
            RiskBand::Moderate => 1.1,
            RiskBand::High => 1.25,
            RiskBand::VeryHigh => 1.4,
        }
    }
}

/// Normalised sub-scores per risk dimension, each in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub age: f64,
    pub comorbidities: f64,
    pub tumor_stage: f64,
    pub organ_function: f64,
    pub base_risk: f64,
    pub risk_adjustment: f64,
    pub band: RiskBand,
}

/// Maps patient and tumor attributes to risk sub-scores and the surgical risk multiplier.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskFactorModel {
    cap: Option<f64>,
}

impl RiskFactorModel {
    /// `cap` bounds the multiplier from above; `None` leaves it unbounded.
    pub fn new(cap: Option<f64>) -> Self {
        Self { cap }
    }

    pub fn risk_adjustment(&self, patient: &PatientProfile, tumor: &TumorProfile) -> f64 {
        self.risk_adjustment_with(patient, RiskContext::for_case(patient, tumor))
    }

    pub fn risk_adjustment_with(&self, patient: &PatientProfile, context: RiskContext) -> f64 {
        self.adjust(&RiskFactors::from_profile(patient, context))
    }

    /// Multiplicative factor starting at 1.0 and growing with each present risk factor.
    pub fn adjust(&self, factors: &RiskFactors) -> f64 {
        let mut factor = 1.0;

        factor += match factors.age {
            age if age > 75 => 0.3,
            age if age > 65 => 0.1,
            _ => 0.0,
        };

        factor += match factors.asa_score {
            asa if asa >= 4 => 0.5,
            3 => 0.2,
            _ => 0.0,
        };

        factor += COMORBIDITY_INCREMENTS
            .iter()
            .filter(|(tag, _)| factors.comorbidities.contains(*tag))
            .map(|(_, increment)| increment)
            .sum::<f64>();

        factor += match factors.albumin {
            albumin if albumin < 3.0 => 0.3,
            albumin if albumin < 3.5 => 0.1,
            _ => 0.0,
        };

        if factors.context.approach == Some(SurgicalApproach::Open) {
            factor += 0.1;
        }
        if factors.context.procedure == ProcedureClass::TotalGastrectomy {
            factor += 0.2;
        }
        if factors.context.urgency == Urgency::Emergency {
            factor += 0.5;
        }

        match self.cap {
            Some(cap) => factor.min(cap),
            None => factor,
        }
    }

    pub fn risk_profile(&self, patient: &PatientProfile, tumor: &TumorProfile) -> RiskProfile {
        let age = ((f64::from(patient.age) - 70.0) / 30.0).clamp(0.0, 1.0);
        let comorbidity_burden = (0.05 * patient.comorbidity_count() as f64).min(0.3);
        let tumor_stage = stage_risk(&tumor.clinical_stage);
        let organ_function = (1.0 - patient.organ_function_score()).clamp(0.0, 1.0);
        let base_risk = (0.2 * age + comorbidity_burden + 0.5 * tumor_stage).min(1.0);
        let risk_adjustment = self.risk_adjustment(patient, tumor);

        RiskProfile {
            age,
            comorbidities: comorbidity_burden / 0.3,
            tumor_stage,
            organ_function,
            base_risk,
            risk_adjustment,
            band: RiskBand::from_adjustment(risk_adjustment),
        }
    }
}

/// Stage risk table; anything outside it, metastatic disease included, scores 1.0.
fn stage_risk(stage: &ClinicalStage) -> f64 {
    if stage.is_metastatic() {
        return 1.0;
    }
    match (stage.t_category(), stage.n_category()) {
        (Some(1), Some(0)) => 0.1,
        (Some(2), Some(0)) => 0.3,
        (Some(1), Some(1)) => 0.4,
        (Some(3), Some(0)) => 0.5,
        (Some(2), Some(1)) => 0.6,
        (Some(3), Some(1)) => 0.7,
        (Some(4), Some(0)) => 0.8,
        (Some(4), Some(1)) => 0.9,
        _ => 1.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplicationRisks {
    pub anastomotic_leak: f64,
    pub pneumonia: f64,
    pub surgical_site_infection: f64,
    pub ileus: f64,
}

/// Baseline gastrectomy outcomes scaled by the risk multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedOutcomes {
    pub mortality_30_day: f64,
    pub mortality_90_day: f64,
    pub major_morbidity: f64,
    pub readmission: f64,
    pub expected_length_of_stay: f64,
    pub complications: ComplicationRisks,
}

pub fn expected_outcomes(risk_adjustment: f64) -> ExpectedOutcomes {
    let scaled = |baseline: f64, ceiling: f64| (baseline * risk_adjustment).min(ceiling);

    ExpectedOutcomes {
        mortality_30_day: scaled(0.02, 0.15),
        mortality_90_day: scaled(0.04, 0.20),
        major_morbidity: scaled(0.15, 0.40),
        readmission: scaled(0.10, 0.30),
        expected_length_of_stay: (7.0 + (risk_adjustment - 1.0) * 3.0).max(5.0),
        complications: ComplicationRisks {
            anastomotic_leak: scaled(0.05, 0.25),
            pneumonia: scaled(0.08, 0.25),
            surgical_site_infection: scaled(0.10, 0.25),
            ileus: scaled(0.12, 0.25),
        },
    }
}

/// Length of stay in days under an enhanced recovery pathway.
pub fn estimate_length_of_stay(patient: &PatientProfile, context: RiskContext) -> u32 {
    let mut days: u32 = 7;

    days += match patient.age {
        age if age > 75 => 2,
        age if age > 65 => 1,
        _ => 0,
    };
    if patient.has_comorbidity("diabetes") {
        days += 1;
    }
    if patient.has_comorbidity("copd") || patient.has_comorbidity("heart_failure") {
        days += 2;
    }
    if context.approach == Some(SurgicalApproach::Open) {
        days += 1;
    }
    if context.procedure == ProcedureClass::TotalGastrectomy {
        days += 2;
    }
    if patient.asa_score >= 3 {
        days += 2;
    }
    if context.urgency == Urgency::Emergency {
        days += 3;
    }
    if context.approach == Some(SurgicalApproach::MinimallyInvasive) {
        days = days.saturating_sub(2).max(5);
    }

    days.saturating_sub(1).max(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors(age: u8) -> RiskFactors {
        RiskFactors {
            age,
            ..RiskFactors::default()
        }
    }

    #[test]
    fn baseline_factors_leave_multiplier_at_one() {
        let model = RiskFactorModel::default();
        assert_eq!(model.adjust(&RiskFactors::default()), 1.0);
    }

    #[test]
    fn increments_accumulate_without_a_cap() {
        let model = RiskFactorModel::default();
        let worst = RiskFactors {
            age: 82,
            asa_score: 4,
            comorbidities: ["diabetes", "copd", "heart_failure", "chronic_kidney_disease"]
                .into_iter()
                .map(String::from)
                .collect(),
            albumin: 2.5,
            context: RiskContext {
                approach: Some(SurgicalApproach::Open),
                procedure: ProcedureClass::TotalGastrectomy,
                urgency: Urgency::Emergency,
            },
        };
        let adjustment = model.adjust(&worst);
        assert!((adjustment - 3.7).abs() < 1e-9, "got {adjustment}");

        let capped = RiskFactorModel::new(Some(3.0)).adjust(&worst);
        assert_eq!(capped, 3.0);
    }

    #[test]
    fn age_bands_match_thresholds() {
        let model = RiskFactorModel::default();
        assert_eq!(model.adjust(&factors(65)), 1.0);
        assert!((model.adjust(&factors(66)) - 1.1).abs() < 1e-9);
        assert!((model.adjust(&factors(75)) - 1.1).abs() < 1e-9);
        assert!((model.adjust(&factors(76)) - 1.3).abs() < 1e-9);
    }

    #[test]
    fn older_patients_never_carry_less_risk() {
        let model = RiskFactorModel::default();
        let mut previous = model.adjust(&factors(60));
        for age in 61..=80 {
            let current = model.adjust(&factors(age));
            assert!(current >= previous, "risk dropped at age {age}");
            previous = current;
        }
    }

    #[test]
    fn bands_scale_benefit_down_and_toxicity_up() {
        assert_eq!(RiskBand::from_adjustment(1.0), RiskBand::Low);
        assert_eq!(RiskBand::from_adjustment(1.2), RiskBand::Moderate);
        assert_eq!(RiskBand::from_adjustment(1.9), RiskBand::High);
        assert_eq!(RiskBand::from_adjustment(2.4), RiskBand::VeryHigh);
        assert!(RiskBand::VeryHigh.benefit_factor() < RiskBand::Low.benefit_factor());
        assert!(RiskBand::VeryHigh.toxicity_factor() > RiskBand::Low.toxicity_factor());
    }

    #[test]
    fn stage_table_falls_back_to_highest_risk() {
        let lookup = |raw: &str| stage_risk(&ClinicalStage::parse(raw).expect("stage parses"));
        assert_eq!(lookup("T1N0M0"), 0.1);
        assert_eq!(lookup("T3N1M0"), 0.7);
        assert_eq!(lookup("T4N2M0"), 1.0);
        assert_eq!(lookup("T2N0M1"), 1.0);
        assert_eq!(lookup("TX"), 1.0);
    }

    #[test]
    fn outcomes_respect_ceilings() {
        let outcomes = expected_outcomes(10.0);
        assert_eq!(outcomes.mortality_30_day, 0.15);
        assert_eq!(outcomes.major_morbidity, 0.40);
        assert_eq!(outcomes.complications.ileus, 0.25);

        let baseline = expected_outcomes(1.0);
        assert_eq!(baseline.expected_length_of_stay, 7.0);
        assert!((baseline.readmission - 0.10).abs() < 1e-12);
    }
}
