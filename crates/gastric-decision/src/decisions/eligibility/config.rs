use serde::{Deserialize, Serialize};

/// Weights of the five eligibility components. They sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentWeights {
    pub age: f64,
    pub performance_status: f64,
    pub organ_function: f64,
    pub tumor_suitability: f64,
    pub resectability: f64,
}

impl ComponentWeights {
    pub fn total(&self) -> f64 {
        self.age
            + self.performance_status
            + self.organ_function
            + self.tumor_suitability
            + self.resectability
    }
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            age: 0.15,
            performance_status: 0.20,
            organ_function: 0.25,
            tumor_suitability: 0.20,
            resectability: 0.20,
        }
    }
}

/// Rule-table constants for FLOT eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub weights: ComponentWeights,
    /// Creatinine clearance (mL/min) below which oxaliplatin is reduced.
    pub renal_mild: f64,
    pub renal_moderate: f64,
    pub renal_floor: f64,
    /// Bilirubin (mg/dL) above which docetaxel is reduced.
    pub bilirubin_mild: f64,
    pub bilirubin_moderate: f64,
    pub bilirubin_ceiling: f64,
    pub neuropathy_grade: u8,
    pub elderly_age: u8,
    /// Composite score (0-100) at or above which FLOT is given at full dose.
    pub eligible_score: f64,
    /// Below this score FLOT is at best a relative contraindication.
    pub minimum_score: f64,
    /// Below this score the patient is not eligible.
    pub relative_score: f64,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            weights: ComponentWeights::default(),
            renal_mild: 50.0,
            renal_moderate: 30.0,
            renal_floor: 15.0,
            bilirubin_mild: 1.5,
            bilirubin_moderate: 3.0,
            bilirubin_ceiling: 5.0,
            neuropathy_grade: 2,
            elderly_age: 75,
            eligible_score: 80.0,
            minimum_score: 60.0,
            relative_score: 40.0,
        }
    }
}
