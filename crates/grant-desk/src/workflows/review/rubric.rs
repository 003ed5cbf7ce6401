use super::domain::{CriterionId, EvaluationCriterion, RubricEntry, ScoreInput};

/// Target for the weight sum of a complete rubric, in percentage points.
pub const WEIGHT_SUM_TARGET: f64 = 100.0;

/// Slack tolerated around [`WEIGHT_SUM_TARGET`] before a rubric is rejected.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.5;

/// Canonical rubric produced from a possibly incomplete submission.
///
/// Contains exactly one entry per criterion of the call, in the call's
/// criterion order. `missing_scores` is the authoritative completeness
/// signal: draft saves tolerate a non-empty list (those entries are
/// zero-filled), final submission does not.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRubric {
    pub entries: Vec<RubricEntry>,
    pub missing_scores: Vec<CriterionId>,
}

impl NormalizedRubric {
    pub fn is_complete(&self) -> bool {
        self.missing_scores.is_empty()
    }
}

/// Normalize caller-submitted scores against the call's criterion list.
///
/// Criteria the caller omitted are zero-filled and recorded as missing;
/// extraneous inputs that match no criterion are dropped. `max_score`
/// always comes from the criterion definition, never from caller input,
/// and free text is trimmed with empty strings discarded.
pub fn normalize_entries(
    criteria: &[EvaluationCriterion],
    inputs: &[ScoreInput],
) -> NormalizedRubric {
    let mut entries = Vec::with_capacity(criteria.len());
    let mut missing_scores = Vec::new();

    for criterion in criteria {
        let input = inputs
            .iter()
            .find(|input| input.criterion_id == criterion.criterion_id);

        let submitted = input.and_then(|input| input.score).filter(|s| s.is_finite());
        let score = match submitted {
            Some(score) => score,
            None => {
                missing_scores.push(criterion.criterion_id.clone());
                0.0
            }
        };

        entries.push(RubricEntry {
            criterion_id: criterion.criterion_id.clone(),
            score,
            max_score: criterion.max_score,
            comments: input.and_then(|input| sanitize_text(input.comments.as_deref())),
            strengths: input.and_then(|input| sanitize_text(input.strengths.as_deref())),
            weaknesses: input.and_then(|input| sanitize_text(input.weaknesses.as_deref())),
        });
    }

    NormalizedRubric {
        entries,
        missing_scores,
    }
}

fn sanitize_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Misconfigured rubric weights, reported at template-authoring time.
#[derive(Debug, thiserror::Error)]
pub enum WeightConfigError {
    #[error("criterion '{name}' carries a non-finite or negative weight")]
    InvalidWeight { name: String },
    #[error("criterion weights must sum to {WEIGHT_SUM_TARGET} (found {found:.2})")]
    SumOutOfTolerance { found: f64 },
}

/// Check that the criterion weights of one call or template sum to 100
/// within tolerance.
///
/// Scoring itself never calls this: a degenerate weight configuration falls
/// back to the raw score ratio instead of failing (see the score
/// calculator). Authoring paths are expected to reject rubrics here so that
/// the fallback stays a safety net rather than a silent default.
pub fn validate_weights(criteria: &[EvaluationCriterion]) -> Result<(), WeightConfigError> {
    let mut sum = 0.0;
    for criterion in criteria {
        if !criterion.weight.is_finite() || criterion.weight < 0.0 {
            return Err(WeightConfigError::InvalidWeight {
                name: criterion.name.clone(),
            });
        }
        sum += criterion.weight;
    }

    if (sum - WEIGHT_SUM_TARGET).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(WeightConfigError::SumOutOfTolerance { found: sum });
    }

    Ok(())
}
