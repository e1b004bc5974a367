use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Cardiac reserve as reported by the referring team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardiacFunction {
    #[default]
    Normal,
    MildImpairment,
    ModerateImpairment,
    SevereImpairment,
}

impl CardiacFunction {
    pub const fn organ_score(self) -> f64 {
        match self {
            CardiacFunction::Normal => 1.0,
            CardiacFunction::MildImpairment => 0.8,
            CardiacFunction::ModerateImpairment => 0.5,
            CardiacFunction::SevereImpairment => 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HearingFunction {
    #[default]
    Normal,
    MildLoss,
    ModerateLoss,
    SevereLoss,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Her2Status {
    Positive,
    Negative,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsiStatus {
    High,
    Stable,
    #[default]
    Unknown,
}

/// Primary tumor site, used to infer the extent of gastrectomy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TumorLocation {
    Distal,
    Body,
    Proximal,
    Cardia,
    #[serde(alias = "GEJ", alias = "gastroesophageal_junction")]
    Gej,
    #[default]
    Unknown,
}

impl TumorLocation {
    pub const fn requires_total_gastrectomy(self) -> bool {
        matches!(
            self,
            TumorLocation::Proximal | TumorLocation::Cardia | TumorLocation::Gej
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Elective,
    Emergency,
}

/// Why the treatment is being planned. Drives the recommended FLOT phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentIntent {
    #[default]
    Curative,
    Palliative,
    Neoadjuvant,
    Adjuvant,
}

impl TreatmentIntent {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_tag(raw).as_str() {
            "curative" => Some(Self::Curative),
            "palliative" => Some(Self::Palliative),
            "neoadjuvant" => Some(Self::Neoadjuvant),
            "adjuvant" => Some(Self::Adjuvant),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TreatmentIntent::Curative => "curative",
            TreatmentIntent::Palliative => "palliative",
            TreatmentIntent::Neoadjuvant => "neoadjuvant",
            TreatmentIntent::Adjuvant => "adjuvant",
        }
    }
}

/// The four agents of the FLOT regimen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlotComponent {
    Fluorouracil,
    Leucovorin,
    Oxaliplatin,
    Docetaxel,
}

impl FlotComponent {
    pub const ALL: [FlotComponent; 4] = [
        FlotComponent::Fluorouracil,
        FlotComponent::Leucovorin,
        FlotComponent::Oxaliplatin,
        FlotComponent::Docetaxel,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            FlotComponent::Fluorouracil => "fluorouracil",
            FlotComponent::Leucovorin => "leucovorin",
            FlotComponent::Oxaliplatin => "oxaliplatin",
            FlotComponent::Docetaxel => "docetaxel",
        }
    }

    /// Normalised spellings that refer to the same agent.
    const fn aliases(self) -> &'static [&'static str] {
        match self {
            FlotComponent::Fluorouracil => &["fluorouracil", "5_fu", "5fu", "5_fluorouracil"],
            FlotComponent::Leucovorin => &["leucovorin", "folinic_acid", "calcium_folinate"],
            FlotComponent::Oxaliplatin => &["oxaliplatin", "eloxatin"],
            FlotComponent::Docetaxel => &["docetaxel", "taxotere"],
        }
    }

    /// Resolve a normalised allergy tag to the protocol component it names.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|component| component.aliases().contains(&tag))
    }
}

impl fmt::Display for FlotComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Clinical TNM stage. The raw notation is kept for display and for prefix rules, the
/// parsed categories feed the scoring tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClinicalStage {
    notation: String,
    t: Option<u8>,
    n: Option<u8>,
    m: Option<u8>,
}

impl ClinicalStage {
    /// Parse a TNM string such as `T3N1M0`, `cT4a N2 M1` or `T2N0`. Components that are
    /// absent or written as `X` stay unknown rather than failing.
    pub fn parse(raw: &str) -> Option<Self> {
        let notation: String = raw
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        if notation.is_empty() {
            return None;
        }

        let chars: Vec<char> = notation.chars().collect();
        let mut t = None;
        let mut n = None;
        let mut m = None;
        for (idx, ch) in chars.iter().enumerate() {
            let Some(digit) = chars.get(idx + 1).and_then(|next| next.to_digit(10)) else {
                continue;
            };
            let slot = match *ch {
                'T' => &mut t,
                'N' => &mut n,
                'M' => &mut m,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(digit as u8);
            }
        }

        Some(Self { notation, t, n, m })
    }

    pub fn notation(&self) -> &str {
        &self.notation
    }

    pub fn t_category(&self) -> Option<u8> {
        self.t
    }

    pub fn n_category(&self) -> Option<u8> {
        self.n
    }

    pub fn m_category(&self) -> Option<u8> {
        self.m
    }

    pub fn is_metastatic(&self) -> bool {
        self.m.map(|m| m >= 1).unwrap_or(false)
    }

    pub fn is_locally_invasive(&self) -> bool {
        matches!(self.t, Some(3) | Some(4))
    }

    pub fn is_node_positive(&self) -> bool {
        self.n.map(|n| n >= 1).unwrap_or(false)
    }

    /// `T4` prefix on the normalised notation.
    pub fn starts_with_t4(&self) -> bool {
        self.notation.starts_with("T4")
    }

    /// `N2` anywhere in the normalised notation.
    pub fn mentions_n2(&self) -> bool {
        self.notation.contains("N2")
    }
}

impl fmt::Display for ClinicalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation)
    }
}

impl TryFrom<String> for ClinicalStage {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| "clinical stage must not be blank".to_string())
    }
}

impl From<ClinicalStage> for String {
    fn from(value: ClinicalStage) -> Self {
        value.notation
    }
}

/// Validated patient attributes. Built once per request by the intake guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub age: u8,
    /// ECOG performance status, 0 (fully active) to 4 (bedbound).
    pub performance_status: u8,
    pub comorbidities: BTreeSet<String>,
    /// mL/min
    pub creatinine_clearance: f64,
    /// mg/dL
    pub bilirubin: f64,
    pub cardiac_function: CardiacFunction,
    pub hearing_function: HearingFunction,
    pub neuropathy_grade: u8,
    pub prior_chemotherapy: bool,
    pub drug_allergies: BTreeSet<String>,
    pub asa_score: u8,
    /// g/dL
    pub albumin: f64,
    pub bmi: Option<f64>,
    pub urgency: Urgency,
}

impl PatientProfile {
    pub fn comorbidity_count(&self) -> usize {
        self.comorbidities.len()
    }

    pub fn has_comorbidity(&self, tag: &str) -> bool {
        self.comorbidities.contains(tag)
    }

    pub fn renal_score(&self) -> f64 {
        match self.creatinine_clearance {
            crcl if crcl >= 60.0 => 1.0,
            crcl if crcl >= 30.0 => 0.7,
            crcl if crcl >= 15.0 => 0.4,
            _ => 0.1,
        }
    }

    pub fn hepatic_score(&self) -> f64 {
        match self.bilirubin {
            bili if bili <= 1.5 => 1.0,
            bili if bili <= 3.0 => 0.6,
            bili if bili <= 5.0 => 0.3,
            _ => 0.1,
        }
    }

    /// Mean of the renal, hepatic and cardiac reserve scores, in [0, 1].
    pub fn organ_function_score(&self) -> f64 {
        (self.renal_score() + self.hepatic_score() + self.cardiac_function.organ_score()) / 3.0
    }
}

/// Validated tumor attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TumorProfile {
    pub histology: String,
    pub grade: String,
    pub clinical_stage: ClinicalStage,
    pub her2_status: Her2Status,
    pub msi_status: MsiStatus,
    pub resectable: bool,
    pub locally_advanced: bool,
    pub location: TumorLocation,
}

impl TumorProfile {
    pub fn is_her2_positive(&self) -> bool {
        self.her2_status == Her2Status::Positive
    }

    pub fn is_msi_high(&self) -> bool {
        self.msi_status == MsiStatus::High
    }
}

/// Lowercase snake_case form used for comorbidity, allergy and histology tags.
pub fn normalize_tag(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            normalized.extend(ch.to_lowercase());
        } else if !normalized.ends_with('_') && !normalized.is_empty() {
            normalized.push('_');
        }
    }
    while normalized.ends_with('_') {
        normalized.pop();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compact_and_spaced_stage_notation() {
        let stage = ClinicalStage::parse("cT4a N2 M1").expect("stage parses");
        assert_eq!(stage.notation(), "CT4AN2M1");
        assert_eq!(stage.t_category(), Some(4));
        assert_eq!(stage.n_category(), Some(2));
        assert!(stage.is_metastatic());
        assert!(stage.mentions_n2());
        assert!(!stage.starts_with_t4());

        let stage = ClinicalStage::parse("T4N0M0").expect("stage parses");
        assert!(stage.starts_with_t4());
        assert!(!stage.is_node_positive());
    }

    #[test]
    fn unknown_stage_components_stay_unknown() {
        let stage = ClinicalStage::parse("TXN1").expect("stage parses");
        assert_eq!(stage.t_category(), None);
        assert_eq!(stage.n_category(), Some(1));
        assert_eq!(stage.m_category(), None);
        assert!(ClinicalStage::parse("   ").is_none());
    }

    #[test]
    fn normalizes_tags_to_snake_case() {
        assert_eq!(normalize_tag(" Heart Failure "), "heart_failure");
        assert_eq!(normalize_tag("5-FU"), "5_fu");
        assert_eq!(normalize_tag("COPD"), "copd");
        assert_eq!(FlotComponent::from_tag("5_fu"), Some(FlotComponent::Fluorouracil));
        assert_eq!(FlotComponent::from_tag("taxotere"), Some(FlotComponent::Docetaxel));
        assert_eq!(FlotComponent::from_tag("penicillin"), None);
    }

    #[test]
    fn stage_serializes_as_notation() {
        let stage = ClinicalStage::parse("T3N1M0").expect("stage parses");
        let json = serde_json::to_string(&stage).expect("serializes");
        assert_eq!(json, "\"T3N1M0\"");
        let back: ClinicalStage = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, stage);
    }
}
