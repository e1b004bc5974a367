use crate::error::AppError;
use gastric_decision::config::EngineConfig;
use gastric_decision::decisions::{CaseIntake, Decision, DecisionComposer};
use serde_json::json;

pub(crate) fn run_demo() -> Result<(), AppError> {
    let composer = DecisionComposer::new(EngineConfig::default());

    println!("Gastric cancer decision demo");
    for (label, case) in demo_cases()? {
        println!("\n{label}");
        match composer.compose(case) {
            Ok(decision) => render_decision(&decision),
            Err(err) => println!("  Decision unavailable: {err}"),
        }
    }

    Ok(())
}

fn demo_cases() -> Result<Vec<(&'static str, CaseIntake)>, AppError> {
    let cases = [
        (
            "A. Fit 65-year-old, T2N0M0",
            json!({
                "patient": {
                    "age": 65,
                    "performance_status": 1,
                    "creatinine_clearance": 60,
                    "bilirubin": 1.0
                },
                "tumor": { "clinical_stage": "T2N0M0", "resectable": true }
            }),
        ),
        (
            "B. Elderly patient with renal impairment",
            json!({
                "patient": {
                    "age": 78,
                    "performance_status": 2,
                    "creatinine_clearance": 45,
                    "comorbidities": ["diabetes", "hypertension"]
                },
                "tumor": { "clinical_stage": "T3N1M0", "resectable": true }
            }),
        ),
        (
            "C. Docetaxel allergy",
            json!({
                "patient": {
                    "age": 58,
                    "performance_status": 0,
                    "drug_allergies": ["docetaxel"]
                },
                "tumor": { "clinical_stage": "T3N0M0", "resectable": true }
            }),
        ),
        (
            "D. Metastatic disease, palliative intent",
            json!({
                "patient": { "age": 64, "performance_status": 1 },
                "tumor": { "clinical_stage": "T4N2M1", "resectable": false },
                "treatment_intent": "palliative"
            }),
        ),
    ];

    cases
        .into_iter()
        .map(|(label, body)| -> Result<_, AppError> {
            Ok((label, serde_json::from_value::<CaseIntake>(body)?))
        })
        .collect()
}

fn render_decision(decision: &Decision) {
    let eligibility = &decision.eligibility;
    println!(
        "- FLOT eligibility: {}, phase {:?}",
        eligibility.summary(),
        eligibility.recommended_phase
    );
    if let Some(modification) = &eligibility.dose_modifications {
        println!("  Reduction reason: {}", modification.reason);
    }
    for contraindication in &eligibility.contraindications {
        println!("  Contraindication: {contraindication}");
    }

    println!("- Alternatives ({})", decision.alternatives.len());
    for alternative in &decision.alternatives {
        let score = decision
            .overall_scores
            .get(&alternative.id)
            .copied()
            .unwrap_or_default();
        println!("  - {:<48} {:.3}", alternative.name, score);
    }

    let recommendation = &decision.recommendation;
    println!(
        "- Recommended: {} (confidence {:.2}, uncertainty {:.2})",
        recommendation.name, recommendation.confidence, decision.uncertainty
    );
    println!("  {}", recommendation.justification);
    for alternate in &recommendation.alternates {
        println!("  Alternate: {} ({:.3})", alternate.name, alternate.score);
    }
    println!(
        "- ADCI confidence {:.2} ({:?}), proceed: {}",
        decision.adci.confidence, decision.adci.confidence_level, decision.adci.proceed
    );
    println!(
        "- Expected 30-day mortality {:.1}%, length of stay {:.1} days",
        decision.expected_outcomes.mortality_30_day * 100.0,
        decision.expected_outcomes.expected_length_of_stay
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_cases_all_compose() {
        let composer = DecisionComposer::new(EngineConfig::default());
        let cases = demo_cases().expect("demo cases deserialise");
        assert_eq!(cases.len(), 4);
        for (label, case) in cases {
            assert!(composer.compose(case).is_ok(), "{label}");
        }
    }
}
