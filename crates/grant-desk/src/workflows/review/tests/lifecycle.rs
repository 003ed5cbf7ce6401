use super::common::{assignment, call_with, criteria, criterion, date, proposal};
use crate::workflows::review::domain::{
    AssignmentStatus, CallStatus, ProposalStatus, ReviewDecision,
};
use crate::workflows::review::lifecycle::{
    ensure_budget_in_range, ensure_decision_ready, ensure_submission_window,
    on_first_review_touch, respond_to_assignment, validate_call_configuration, ReviewError,
};

#[test]
fn first_review_touch_advances_submitted_exactly_once() {
    let mut proposal = proposal("prop-1", "pi-1", ProposalStatus::Submitted);

    assert!(on_first_review_touch(&mut proposal));
    assert_eq!(proposal.status, ProposalStatus::UnderReview);

    assert!(!on_first_review_touch(&mut proposal));
    assert_eq!(proposal.status, ProposalStatus::UnderReview);
}

#[test]
fn first_review_touch_leaves_other_statuses_alone() {
    for status in [
        ProposalStatus::Draft,
        ProposalStatus::Approved,
        ProposalStatus::Completed,
    ] {
        let mut proposal = proposal("prop-1", "pi-1", status);
        assert!(!on_first_review_touch(&mut proposal));
        assert_eq!(proposal.status, status);
    }
}

#[test]
fn approve_and_reject_demand_quorum() {
    let call = call_with(criteria(), 3);
    let proposal = proposal("prop-1", "pi-1", ProposalStatus::UnderReview);

    for decision in [ReviewDecision::Approved, ReviewDecision::Rejected] {
        let err = ensure_decision_ready(&proposal, decision, &call.evaluation, 2)
            .expect_err("two of three evaluations is short of quorum");
        assert!(matches!(
            err,
            ReviewError::QuorumShort {
                completed: 2,
                required: 3,
                ..
            }
        ));
    }

    assert!(ensure_decision_ready(
        &proposal,
        ReviewDecision::Approved,
        &call.evaluation,
        3
    )
    .is_ok());
}

#[test]
fn revise_and_resubmit_is_quorum_exempt() {
    let call = call_with(criteria(), 3);
    let proposal = proposal("prop-1", "pi-1", ProposalStatus::UnderReview);

    assert!(ensure_decision_ready(
        &proposal,
        ReviewDecision::ReviseAndResubmit,
        &call.evaluation,
        0
    )
    .is_ok());
}

#[test]
fn decisions_only_land_on_proposals_in_review() {
    let call = call_with(criteria(), 1);
    let proposal = proposal("prop-1", "pi-1", ProposalStatus::Approved);

    let err = ensure_decision_ready(&proposal, ReviewDecision::Rejected, &call.evaluation, 5)
        .expect_err("an approved proposal cannot be re-decided");
    assert!(matches!(err, ReviewError::InvalidTransition { .. }));
}

#[test]
fn only_pending_assignments_take_a_response() {
    let pending = assignment("prop-1", "eva-1", AssignmentStatus::Pending);
    assert_eq!(
        respond_to_assignment(&pending, true).expect("pending accepts"),
        AssignmentStatus::Accepted
    );
    assert_eq!(
        respond_to_assignment(&pending, false).expect("pending declines"),
        AssignmentStatus::Declined
    );

    let declined = assignment("prop-1", "eva-1", AssignmentStatus::Declined);
    let err = respond_to_assignment(&declined, true).expect_err("declined is terminal");
    assert!(matches!(err, ReviewError::AssignmentNotPending { .. }));
}

#[test]
fn submission_window_requires_an_open_call_before_the_deadline() {
    let mut call = call_with(criteria(), 2);

    assert!(ensure_submission_window(&call, date(2026, 6, 1)).is_ok());

    let err = ensure_submission_window(&call, date(2100, 1, 1))
        .expect_err("past the closing date");
    assert!(matches!(err, ReviewError::DeadlinePassed { .. }));

    call.status = CallStatus::Closed;
    let err = ensure_submission_window(&call, date(2026, 6, 1)).expect_err("call is closed");
    assert!(matches!(err, ReviewError::CallNotOpen { status: "closed" }));
}

#[test]
fn budget_bounds_are_inclusive() {
    let call = call_with(criteria(), 2);

    assert!(ensure_budget_in_range(&call.budget, 10_000).is_ok());
    assert!(ensure_budget_in_range(&call.budget, 50_000).is_ok());
    assert!(matches!(
        ensure_budget_in_range(&call.budget, 9_999),
        Err(ReviewError::BudgetOutOfRange { .. })
    ));
    assert!(matches!(
        ensure_budget_in_range(&call.budget, 50_001),
        Err(ReviewError::BudgetOutOfRange { .. })
    ));
}

#[test]
fn call_configuration_guards_window_budget_and_panel() {
    let mut inverted = call_with(criteria(), 2);
    inverted.window.opens_on = date(2027, 1, 1);
    inverted.window.closes_on = date(2026, 1, 1);
    assert!(matches!(
        validate_call_configuration(&inverted),
        Err(ReviewError::CallWindowInverted { .. })
    ));

    let mut ceiling = call_with(criteria(), 2);
    ceiling.budget.per_project_max = ceiling.budget.total + 1;
    assert!(matches!(
        validate_call_configuration(&ceiling),
        Err(ReviewError::PerProjectCeilingTooHigh { .. })
    ));

    let no_panel = call_with(criteria(), 0);
    assert!(matches!(
        validate_call_configuration(&no_panel),
        Err(ReviewError::EvaluatorsRequiredZero)
    ));

    let bad_weights = call_with(
        vec![
            criterion("crit-merit", 60.0, 10.0),
            criterion("crit-feasibility", 20.0, 5.0),
        ],
        2,
    );
    assert!(matches!(
        validate_call_configuration(&bad_weights),
        Err(ReviewError::Weights(_))
    ));

    // An empty rubric is a valid configuration; weights are only checked
    // once criteria are attached.
    assert!(validate_call_configuration(&call_with(Vec::new(), 2)).is_ok());
}
