use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{PatientProfile, TumorProfile};
use super::risk::SurgicalApproach;

/// Capability tags the criteria rules match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeTag {
    StandardFlot,
    ExtendedFlot,
    ReducedFlot,
    OpenApproach,
    MinimallyInvasive,
    ExtendedLymphadenectomy,
}

impl AlternativeTag {
    pub const fn label(self) -> &'static str {
        match self {
            AlternativeTag::StandardFlot => "standard FLOT",
            AlternativeTag::ExtendedFlot => "extended FLOT",
            AlternativeTag::ReducedFlot => "reduced-dose FLOT",
            AlternativeTag::OpenApproach => "open approach",
            AlternativeTag::MinimallyInvasive => "minimally invasive approach",
            AlternativeTag::ExtendedLymphadenectomy => "extended lymphadenectomy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentAlternative {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: BTreeSet<AlternativeTag>,
}

impl TreatmentAlternative {
    pub fn new(id: &str, name: &str, description: &str, tags: &[AlternativeTag]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            tags: tags.iter().copied().collect(),
        }
    }

    pub fn has(&self, tag: AlternativeTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn approach(&self) -> SurgicalApproach {
        if self.has(AlternativeTag::MinimallyInvasive) {
            SurgicalApproach::MinimallyInvasive
        } else {
            SurgicalApproach::Open
        }
    }

    /// Comma-separated tag labels, in tag order.
    pub fn tag_summary(&self) -> String {
        self.tags
            .iter()
            .map(|tag| tag.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Candidate treatments for a case, in generation order: four base combinations, then
/// the reduced-dose variant for elderly or multimorbid patients, then the extended
/// lymphadenectomy variant for T4 or N2 disease.
pub fn generate_alternatives(
    patient: &PatientProfile,
    tumor: &TumorProfile,
) -> Vec<TreatmentAlternative> {
    use AlternativeTag::*;

    let mut alternatives = vec![
        TreatmentAlternative::new(
            "standard_flot_open",
            "Standard FLOT + Open Gastrectomy",
            "Four perioperative FLOT cycles around an open D2 gastrectomy",
            &[StandardFlot, OpenApproach],
        ),
        TreatmentAlternative::new(
            "standard_flot_mis",
            "Standard FLOT + Minimally Invasive Gastrectomy",
            "Four perioperative FLOT cycles around a laparoscopic or robotic gastrectomy",
            &[StandardFlot, MinimallyInvasive],
        ),
        TreatmentAlternative::new(
            "extended_flot_open",
            "Extended FLOT + Open Gastrectomy",
            "Intensified FLOT course with open D2 gastrectomy",
            &[ExtendedFlot, OpenApproach],
        ),
        TreatmentAlternative::new(
            "extended_flot_mis",
            "Extended FLOT + Minimally Invasive Gastrectomy",
            "Intensified FLOT course with laparoscopic or robotic gastrectomy",
            &[ExtendedFlot, MinimallyInvasive],
        ),
    ];

    if patient.age > 75 || patient.comorbidity_count() >= 3 {
        alternatives.push(TreatmentAlternative::new(
            "reduced_flot_open",
            "Reduced FLOT + Open Gastrectomy",
            "Dose-reduced FLOT for elderly or multimorbid patients with open gastrectomy",
            &[ReducedFlot, OpenApproach],
        ));
    }

    if tumor.clinical_stage.starts_with_t4() || tumor.clinical_stage.mentions_n2() {
        alternatives.push(TreatmentAlternative::new(
            "extended_flot_extended_lymphadenectomy",
            "Extended FLOT + Extended Lymphadenectomy",
            "Intensified FLOT with open gastrectomy and D2+ lymph node dissection",
            &[ExtendedFlot, OpenApproach, ExtendedLymphadenectomy],
        ));
    }

    alternatives
}
