use super::domain::{EvaluationCriterion, RubricEntry};

/// Upper bound of the published overall score.
pub const SCORE_SCALE: f64 = 100.0;

/// Compute the 0-100 overall score of a normalized rubric.
///
/// Each entry's score is clamped to `[0, max_score]`, normalized by its
/// `max_score`, and weighted by the owning criterion's weight. Entries with
/// a non-positive or non-finite `max_score`, or a non-finite weight, are
/// skipped. When the surviving weight sum is not positive the rubric is
/// degenerate and the result falls back to the unweighted raw ratio
/// `Σscore / Σmax` over all entries, or 0 when `Σmax` is itself 0 - the
/// calculator never divides by zero. Results are rounded to two decimals.
pub fn overall_score(entries: &[RubricEntry], criteria: &[EvaluationCriterion]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;

    for entry in entries {
        if !entry.max_score.is_finite() || entry.max_score <= 0.0 {
            continue;
        }

        let weight = criteria
            .iter()
            .find(|criterion| criterion.criterion_id == entry.criterion_id)
            .map(|criterion| criterion.weight)
            .unwrap_or(0.0);
        if !weight.is_finite() {
            continue;
        }

        let normalized = entry.score.clamp(0.0, entry.max_score) / entry.max_score;
        weighted_sum += normalized * weight;
        weight_sum += weight;
    }

    if weight_sum > 0.0 {
        return round2(SCORE_SCALE * weighted_sum / weight_sum);
    }

    raw_ratio(entries)
}

/// Unweighted fallback used when every weight is zero or misconfigured.
fn raw_ratio(entries: &[RubricEntry]) -> f64 {
    let score_sum: f64 = entries.iter().map(|entry| entry.score).sum();
    let max_sum: f64 = entries.iter().map(|entry| entry.max_score).sum();

    if max_sum > 0.0 {
        round2(SCORE_SCALE * score_sum / max_sum)
    } else {
        0.0
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
