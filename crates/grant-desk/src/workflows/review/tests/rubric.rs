use super::common::{criteria, criterion, score};
use crate::workflows::review::domain::{CriterionId, ScoreInput};
use crate::workflows::review::rubric::{normalize_entries, validate_weights, WeightConfigError};

#[test]
fn entries_follow_criterion_order_and_zero_fill_missing() {
    let criteria = criteria();
    let inputs = vec![score("crit-feasibility", 4.0)];

    let normalized = normalize_entries(&criteria, &inputs);

    assert_eq!(normalized.entries.len(), 2);
    assert_eq!(normalized.entries[0].criterion_id.0, "crit-merit");
    assert_eq!(normalized.entries[0].score, 0.0);
    assert_eq!(normalized.entries[1].criterion_id.0, "crit-feasibility");
    assert_eq!(normalized.entries[1].score, 4.0);
    assert_eq!(
        normalized.missing_scores,
        vec![CriterionId("crit-merit".to_string())]
    );
    assert!(!normalized.is_complete());
}

#[test]
fn max_score_always_comes_from_the_criterion() {
    let criteria = criteria();
    let inputs = vec![score("crit-merit", 8.0), score("crit-feasibility", 4.0)];

    let normalized = normalize_entries(&criteria, &inputs);

    assert_eq!(normalized.entries[0].max_score, 10.0);
    assert_eq!(normalized.entries[1].max_score, 5.0);
}

#[test]
fn extraneous_inputs_are_dropped() {
    let criteria = criteria();
    let inputs = vec![
        score("crit-merit", 8.0),
        score("crit-feasibility", 4.0),
        score("crit-unknown", 3.0),
    ];

    let normalized = normalize_entries(&criteria, &inputs);

    assert_eq!(normalized.entries.len(), 2);
    assert!(normalized
        .entries
        .iter()
        .all(|entry| entry.criterion_id.0 != "crit-unknown"));
    assert!(normalized.is_complete());
}

#[test]
fn non_finite_scores_count_as_missing() {
    let criteria = criteria();
    let inputs = vec![score("crit-merit", f64::NAN), score("crit-feasibility", 4.0)];

    let normalized = normalize_entries(&criteria, &inputs);

    assert_eq!(normalized.entries[0].score, 0.0);
    assert_eq!(
        normalized.missing_scores,
        vec![CriterionId("crit-merit".to_string())]
    );
}

#[test]
fn free_text_is_trimmed_and_blank_text_discarded() {
    let criteria = criteria();
    let inputs = vec![
        ScoreInput {
            comments: Some("  strong methodology  ".to_string()),
            strengths: Some("   ".to_string()),
            weaknesses: None,
            ..score("crit-merit", 8.0)
        },
        score("crit-feasibility", 4.0),
    ];

    let normalized = normalize_entries(&criteria, &inputs);

    assert_eq!(
        normalized.entries[0].comments.as_deref(),
        Some("strong methodology")
    );
    assert_eq!(normalized.entries[0].strengths, None);
    assert_eq!(normalized.entries[0].weaknesses, None);
}

#[test]
fn weights_within_tolerance_pass() {
    assert!(validate_weights(&criteria()).is_ok());

    let slightly_off = vec![
        criterion("crit-merit", 60.0, 10.0),
        criterion("crit-feasibility", 40.4, 5.0),
    ];
    assert!(validate_weights(&slightly_off).is_ok());
}

#[test]
fn weight_sum_out_of_tolerance_is_rejected() {
    let overweight = vec![
        criterion("crit-merit", 60.0, 10.0),
        criterion("crit-feasibility", 41.0, 5.0),
    ];

    let err = validate_weights(&overweight).expect_err("sum 101 must fail");
    assert!(matches!(
        err,
        WeightConfigError::SumOutOfTolerance { found } if (found - 101.0).abs() < 1e-9
    ));
}

#[test]
fn negative_weight_is_rejected() {
    let negative = vec![
        criterion("crit-merit", 110.0, 10.0),
        criterion("crit-feasibility", -10.0, 5.0),
    ];

    let err = validate_weights(&negative).expect_err("negative weight must fail");
    assert!(matches!(err, WeightConfigError::InvalidWeight { .. }));
}
