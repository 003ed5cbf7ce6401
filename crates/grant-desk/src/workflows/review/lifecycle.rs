use chrono::NaiveDate;

use super::domain::{
    Actor, AssignmentStatus, Call, CallBudget, CallStatus, ClarificationStatus, EvaluationSettings,
    EvaluatorAssignment, Proposal, ProposalStatus, ReviewDecision,
};
use super::repository::StoreError;
use super::rubric::WeightConfigError;

/// Failure taxonomy of the review engine.
///
/// Every variant is a synchronous rejection surfaced verbatim to the caller;
/// nothing here is retried. Authorization failures name the acting user,
/// validation failures name the offending value, and quorum failures carry
/// both counts so the remediation ("wait for more evaluations") is obvious.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    // --- authorization ---
    #[error("only administrators may {action}")]
    AdminOnly { action: &'static str },
    #[error("user {user} is neither an administrator nor assigned to evaluate this proposal")]
    NotAssigned { user: String },
    #[error("user {user} is not the principal investigator or a team member of this proposal")]
    NotProposalOwner { user: String },
    #[error("user {user} is not a party to this proposal")]
    NotProposalParty { user: String },
    #[error("only the evaluator who opened the clarification may {action} it")]
    NotClarificationOwner { action: &'static str },

    // --- validation ---
    #[error("no rubric is configured for this call")]
    NoRubricConfigured,
    #[error("score every criterion before submitting the evaluation ({missing} unscored)")]
    IncompleteScores { missing: usize },
    #[error("call is {status}; proposals are only accepted while it is open")]
    CallNotOpen { status: &'static str },
    #[error("the submission window for this call closed on {closed_on}")]
    DeadlinePassed { closed_on: NaiveDate },
    #[error("requested budget {requested} is outside the call's per-project range {min}..={max}")]
    BudgetOutOfRange { requested: u64, min: u64, max: u64 },
    #[error("cannot {action} while the proposal is {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },
    #[error("evaluator {evaluator} already has an active assignment for this proposal")]
    AlreadyAssigned { evaluator: String },
    #[error("assignment is {status}; only a pending assignment can be accepted or declined")]
    AssignmentNotPending { status: &'static str },
    #[error("a clarification question cannot be empty")]
    EmptyClarificationQuestion,
    #[error("a clarification response cannot be empty")]
    EmptyClarificationResponse,
    #[error("cannot {action} a clarification that is {status}")]
    ClarificationState {
        action: &'static str,
        status: &'static str,
    },
    #[error("call opens on {opens} but closes earlier on {closes}")]
    CallWindowInverted { opens: NaiveDate, closes: NaiveDate },
    #[error("per-project ceiling {ceiling} exceeds the call's total budget {total}")]
    PerProjectCeilingTooHigh { ceiling: u64, total: u64 },
    #[error("a call must require at least one evaluator")]
    EvaluatorsRequiredZero,
    #[error(transparent)]
    Weights(#[from] WeightConfigError),

    // --- quorum ---
    #[error("cannot finalize {decision}: only {completed} of {required} required evaluations are complete")]
    QuorumShort {
        decision: &'static str,
        completed: usize,
        required: u32,
    },

    // --- referential ---
    #[error("proposal {0} not found")]
    ProposalNotFound(String),
    #[error("call {0} not found")]
    CallNotFound(String),
    #[error("no evaluator profile found for {0}")]
    EvaluatorNotFound(String),
    #[error("no assignment exists for evaluator {evaluator} on proposal {proposal}")]
    AssignmentNotFound { proposal: String, evaluator: String },
    #[error("clarification {0} not found")]
    ClarificationNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Require the privileged admin class (sysadmin or admin).
pub fn ensure_admin(actor: &Actor, action: &'static str) -> Result<(), ReviewError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ReviewError::AdminOnly { action })
    }
}

/// Scoring authority: admin class, or listed in the proposal's assigned
/// evaluators.
pub fn ensure_scoring_party(actor: &Actor, proposal: &Proposal) -> Result<(), ReviewError> {
    if actor.is_admin() || proposal.is_assigned_evaluator(&actor.user_id) {
        Ok(())
    } else {
        Err(ReviewError::NotAssigned {
            user: actor.user_id.0.clone(),
        })
    }
}

/// Authoring authority: the principal investigator, a team member, or admin.
pub fn ensure_proposal_owner(actor: &Actor, proposal: &Proposal) -> Result<(), ReviewError> {
    if actor.is_admin() || proposal.is_owner(&actor.user_id) {
        Ok(())
    } else {
        Err(ReviewError::NotProposalOwner {
            user: actor.user_id.0.clone(),
        })
    }
}

/// Proposal-access authority shared with the clarification side channel:
/// owners, assigned evaluators, and admins.
pub fn ensure_proposal_party(actor: &Actor, proposal: &Proposal) -> Result<(), ReviewError> {
    if actor.is_admin()
        || proposal.is_owner(&actor.user_id)
        || proposal.is_assigned_evaluator(&actor.user_id)
    {
        Ok(())
    } else {
        Err(ReviewError::NotProposalParty {
            user: actor.user_id.0.clone(),
        })
    }
}

/// First-touch transition: the first evaluator activity on a `submitted`
/// proposal moves it to `under_review`.
///
/// Deliberate, idempotent side effect of every draft save and submission;
/// proposals in any other status are left untouched. Returns whether the
/// status changed so callers know to persist the proposal.
pub fn on_first_review_touch(proposal: &mut Proposal) -> bool {
    if proposal.status == ProposalStatus::Submitted {
        proposal.status = ProposalStatus::UnderReview;
        true
    } else {
        false
    }
}

/// Gate a decision in fixed order: entry state first, then quorum.
///
/// Approve/reject demand `completed >= evaluators_required` when the call
/// requires evaluators; revise-and-resubmit is exempt so an admin can always
/// bounce a proposal back without waiting for full review. `completed` must
/// be counted from live evaluation records at decision time, never from a
/// cached figure.
pub fn ensure_decision_ready(
    proposal: &Proposal,
    decision: ReviewDecision,
    settings: &EvaluationSettings,
    completed: usize,
) -> Result<(), ReviewError> {
    match proposal.status {
        ProposalStatus::Submitted | ProposalStatus::UnderReview => {}
        other => {
            return Err(ReviewError::InvalidTransition {
                action: "record a decision",
                status: other.label(),
            })
        }
    }

    let required = settings.evaluators_required;
    if decision.requires_quorum() && required > 0 && completed < required as usize {
        return Err(ReviewError::QuorumShort {
            decision: decision.label(),
            completed,
            required,
        });
    }

    Ok(())
}

/// Evaluator response to their own assignment: `pending` to `accepted` or
/// `declined`, nothing else.
pub fn respond_to_assignment(
    assignment: &EvaluatorAssignment,
    accept: bool,
) -> Result<AssignmentStatus, ReviewError> {
    if assignment.status != AssignmentStatus::Pending {
        return Err(ReviewError::AssignmentNotPending {
            status: assignment.status.label(),
        });
    }

    Ok(if accept {
        AssignmentStatus::Accepted
    } else {
        AssignmentStatus::Declined
    })
}

/// Proposal may (re-)enter authoring only from `draft` or
/// `revise_and_resubmit`.
pub fn ensure_authoring_state(proposal: &Proposal) -> Result<(), ReviewError> {
    if proposal.status.accepts_authoring() {
        Ok(())
    } else {
        Err(ReviewError::InvalidTransition {
            action: "submit the proposal",
            status: proposal.status.label(),
        })
    }
}

/// The call must be open and its closing date not yet passed.
pub fn ensure_submission_window(call: &Call, today: NaiveDate) -> Result<(), ReviewError> {
    if call.status != CallStatus::Open {
        return Err(ReviewError::CallNotOpen {
            status: call.status.label(),
        });
    }
    if today > call.window.closes_on {
        return Err(ReviewError::DeadlinePassed {
            closed_on: call.window.closes_on,
        });
    }
    Ok(())
}

/// The requested budget must sit inside the call's per-project envelope.
pub fn ensure_budget_in_range(budget: &CallBudget, requested: u64) -> Result<(), ReviewError> {
    if requested < budget.per_project_min || requested > budget.per_project_max {
        return Err(ReviewError::BudgetOutOfRange {
            requested,
            min: budget.per_project_min,
            max: budget.per_project_max,
        });
    }
    Ok(())
}

/// Guard an execution-phase transition that only fires from one status.
pub fn ensure_status(
    proposal: &Proposal,
    expected: ProposalStatus,
    action: &'static str,
) -> Result<(), ReviewError> {
    if proposal.status == expected {
        Ok(())
    } else {
        Err(ReviewError::InvalidTransition {
            action,
            status: proposal.status.label(),
        })
    }
}

/// Structural invariants of a call, checked when one is authored or seeded:
/// a coherent window, a per-project ceiling inside the total envelope, at
/// least one required evaluator, and weights summing to 100 when criteria
/// are attached.
pub fn validate_call_configuration(call: &Call) -> Result<(), ReviewError> {
    if call.window.opens_on > call.window.closes_on {
        return Err(ReviewError::CallWindowInverted {
            opens: call.window.opens_on,
            closes: call.window.closes_on,
        });
    }
    if call.budget.per_project_max > call.budget.total {
        return Err(ReviewError::PerProjectCeilingTooHigh {
            ceiling: call.budget.per_project_max,
            total: call.budget.total,
        });
    }
    if call.evaluation.evaluators_required == 0 {
        return Err(ReviewError::EvaluatorsRequiredZero);
    }
    if !call.criteria.is_empty() {
        super::rubric::validate_weights(&call.criteria)?;
    }
    Ok(())
}

/// Clarification state gates: respond from `pending`, resolve from
/// `responded`, withdraw from `pending`.
pub fn ensure_clarification_state(
    current: ClarificationStatus,
    expected: ClarificationStatus,
    action: &'static str,
) -> Result<(), ReviewError> {
    if current == expected {
        Ok(())
    } else {
        Err(ReviewError::ClarificationState {
            action,
            status: current.label(),
        })
    }
}
