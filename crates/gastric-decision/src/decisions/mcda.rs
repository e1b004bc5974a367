//! Weighted aggregation of criterion scores into one overall score per alternative.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::criteria::{Criterion, CriterionScore};

const NEUTRAL_UNCERTAINTY: f64 = 0.5;
const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Criterion scores for one alternative, kept in generation order by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeScores {
    pub alternative_id: String,
    pub criteria: BTreeMap<Criterion, CriterionScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallScore {
    pub alternative_id: String,
    pub score: f64,
}

/// Weighted sum of the criterion scores. Missing criteria contribute nothing.
pub fn overall_score(criteria: &BTreeMap<Criterion, CriterionScore>) -> f64 {
    Criterion::ALL
        .iter()
        .filter_map(|criterion| {
            criteria
                .get(criterion)
                .map(|scored| scored.score * criterion.weight())
        })
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Overall score per alternative, preserving input order.
pub fn aggregate(scores: &[AlternativeScores]) -> Vec<OverallScore> {
    scores
        .iter()
        .map(|alternative| OverallScore {
            alternative_id: alternative.alternative_id.clone(),
            score: overall_score(&alternative.criteria),
        })
        .collect()
}

/// Highest overall score. On a tie the earlier alternative wins.
pub fn identify_optimal(overall: &[OverallScore]) -> Option<&OverallScore> {
    overall.iter().fold(None, |best: Option<&OverallScore>, candidate| match best {
        Some(current) if candidate.score <= current.score => Some(current),
        _ => Some(candidate),
    })
}

/// Alternatives ordered best first; equal scores keep generation order.
pub fn rank(overall: &[OverallScore]) -> Vec<&OverallScore> {
    let mut ranked: Vec<&OverallScore> = overall.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Twice the mean dispersion of sub-criterion scores, capped at 1.0.
///
/// Every criterion breakdown of every alternative contributes the population standard
/// deviation of its own sub-scores; the result averages those deviations.
pub fn estimate_uncertainty(scores: &[AlternativeScores]) -> f64 {
    let deviations: Vec<f64> = scores
        .iter()
        .flat_map(|alternative| alternative.criteria.values())
        .filter_map(|criterion| {
            let values: Vec<f64> = criterion.sub_scores.values().copied().collect();
            std_dev(&values)
        })
        .collect();

    if deviations.is_empty() {
        return NEUTRAL_UNCERTAINTY;
    }
    let mean = deviations.iter().sum::<f64>() / deviations.len() as f64;
    (2.0 * mean).clamp(0.0, 1.0)
}

/// One minus the coefficient of variation of the overall scores, within [0, 1].
pub fn score_confidence(overall: &[OverallScore]) -> f64 {
    if overall.len() == 1 {
        return 1.0;
    }
    let values: Vec<f64> = overall.iter().map(|entry| entry.score).collect();
    let Some(deviation) = std_dev(&values) else {
        return NEUTRAL_CONFIDENCE;
    };
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= 0.0 {
        return NEUTRAL_CONFIDENCE;
    }
    (1.0 - deviation / mean).clamp(0.0, 1.0)
}

pub(crate) fn std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overall(entries: &[(&str, f64)]) -> Vec<OverallScore> {
        entries
            .iter()
            .map(|(id, score)| OverallScore {
                alternative_id: id.to_string(),
                score: *score,
            })
            .collect()
    }

    fn scores_with(id: &str, sub_values: impl Fn(Criterion) -> [f64; 3]) -> AlternativeScores {
        let criteria = Criterion::ALL
            .into_iter()
            .map(|criterion| {
                let values = sub_values(criterion);
                let sub_scores = criterion.sub_criteria().into_iter().zip(values).collect();
                let score = criterion
                    .sub_criteria()
                    .into_iter()
                    .zip(values)
                    .map(|(sub, value)| sub.weight() * value)
                    .sum();
                (criterion, CriterionScore { score, sub_scores })
            })
            .collect();
        AlternativeScores {
            alternative_id: id.to_string(),
            criteria,
        }
    }

    fn uniform_scores(id: &str, value: f64) -> AlternativeScores {
        scores_with(id, |_| [value; 3])
    }

    #[test]
    fn ties_resolve_to_first_generated() {
        let scores = overall(&[("a", 0.7), ("b", 0.8), ("c", 0.8)]);
        let best = identify_optimal(&scores).expect("non-empty");
        assert_eq!(best.alternative_id, "b");

        let ranked: Vec<&str> = rank(&scores)
            .into_iter()
            .map(|entry| entry.alternative_id.as_str())
            .collect();
        assert_eq!(ranked, vec!["b", "c", "a"]);
    }

    #[test]
    fn empty_inputs_have_no_optimum_and_neutral_uncertainty() {
        assert!(identify_optimal(&[]).is_none());
        assert_eq!(estimate_uncertainty(&[]), 0.5);
    }

    #[test]
    fn uniform_sub_scores_carry_no_uncertainty() {
        let scores = vec![uniform_scores("a", 0.6), uniform_scores("b", 0.9)];
        assert_eq!(estimate_uncertainty(&scores), 0.0);
        let aggregated = aggregate(&scores);
        assert!((aggregated[0].score - 0.6).abs() < 1e-9);
        assert!((aggregated[1].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn spread_between_criteria_is_not_uncertainty() {
        let stepped = scores_with("a", |criterion| match criterion {
            Criterion::Clinical => [0.2; 3],
            Criterion::Surgical => [0.4; 3],
            Criterion::Oncological => [0.6; 3],
            Criterion::QualityOfLife => [0.8; 3],
        });
        assert_eq!(estimate_uncertainty(&[stepped]), 0.0);
    }

    #[test]
    fn uncertainty_averages_over_each_criterion_breakdown() {
        let mixed = scores_with("a", |criterion| match criterion {
            Criterion::Clinical => [0.2, 0.5, 0.8],
            _ => [0.7; 3],
        });
        let expected = 2.0 * 0.06_f64.sqrt() / 8.0;

        let uncertainty = estimate_uncertainty(&[mixed, uniform_scores("b", 0.5)]);

        assert!((uncertainty - expected).abs() < 1e-9, "got {uncertainty}");
    }

    #[test]
    fn identical_overall_scores_give_full_confidence() {
        assert_eq!(score_confidence(&overall(&[("a", 0.7), ("b", 0.7)])), 1.0);
        assert_eq!(score_confidence(&overall(&[("a", 0.4)])), 1.0);
        assert_eq!(score_confidence(&overall(&[("a", 0.0), ("b", 0.0)])), 0.5);

        let spread = score_confidence(&overall(&[("a", 0.2), ("b", 0.8)]));
        assert!((spread - 0.4).abs() < 1e-9, "got {spread}");
    }
}
