use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::config::ReviewConfig;
use super::domain::{
    Actor, AssignmentMethod, AssignmentStatus, BudgetExecution, Call, CallId, ClarificationId,
    ClarificationRequest, ClarificationStatus, DecisionRecord, Evaluation, EvaluationCriterion,
    EvaluatorAssignment, ExecutionTracking, MilestoneExecution, Proposal, ProposalId,
    ProposalStatus, Recommendation, ReviewDecision, RubricTemplate, ScoreInput, TemplateId, UserId,
};
use super::lifecycle::{self, ReviewError};
use super::matrix::{build_matrix, AssignmentMatrix, MatrixFilters, MatrixSources};
use super::repository::{ActivityAction, ActivityPublisher, ActivityRecord, ReviewStore};
use super::rubric::{normalize_entries, validate_weights};
use super::scoring::{overall_score, round2};
use super::workload::{self, CapacityReport, EvaluatorWorkload};

/// Service composing the store, the activity collaborator, and the review
/// configuration. Every operation takes the acting user explicitly and
/// re-validates invariants from stored records before writing.
pub struct ReviewService<S, P> {
    store: Arc<S>,
    activity: Arc<P>,
    config: ReviewConfig,
}

static CLARIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static TEMPLATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_clarification_id() -> ClarificationId {
    let id = CLARIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ClarificationId(format!("clr-{id:06}"))
}

fn next_template_id() -> TemplateId {
    let id = TEMPLATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    TemplateId(format!("tpl-{id:06}"))
}

impl<S, P> ReviewService<S, P>
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    pub fn new(store: Arc<S>, activity: Arc<P>, config: ReviewConfig) -> Self {
        Self {
            store,
            activity,
            config,
        }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    fn proposal(&self, id: &ProposalId) -> Result<Proposal, ReviewError> {
        self.store
            .fetch_proposal(id)?
            .ok_or_else(|| ReviewError::ProposalNotFound(id.0.clone()))
    }

    fn call(&self, id: &CallId) -> Result<Call, ReviewError> {
        self.store
            .fetch_call(id)?
            .ok_or_else(|| ReviewError::CallNotFound(id.0.clone()))
    }

    fn clarification(&self, id: &ClarificationId) -> Result<ClarificationRequest, ReviewError> {
        self.store
            .fetch_clarification(id)?
            .ok_or_else(|| ReviewError::ClarificationNotFound(id.0.clone()))
    }

    /// Audit emission is fire-and-forget; a publisher failure never aborts
    /// the transition it describes.
    fn record_activity(&self, record: ActivityRecord) {
        if let Err(err) = self.activity.publish(record) {
            warn!(%err, "activity publish failed");
        }
    }

    // --- call and template administration ---

    /// Register a funding call after validating its window, budget envelope,
    /// and rubric weights.
    pub fn create_call(&self, actor: &Actor, call: Call) -> Result<Call, ReviewError> {
        lifecycle::ensure_admin(actor, "create calls")?;
        lifecycle::validate_call_configuration(&call)?;
        self.store.insert_call(call.clone())?;
        Ok(call)
    }

    /// Replace a call's rubric criteria, re-validating the configuration.
    pub fn configure_call_rubric(
        &self,
        actor: &Actor,
        call_id: &CallId,
        criteria: Vec<EvaluationCriterion>,
    ) -> Result<Call, ReviewError> {
        lifecycle::ensure_admin(actor, "configure call rubrics")?;
        let mut call = self.call(call_id)?;
        call.criteria = criteria;
        lifecycle::validate_call_configuration(&call)?;
        self.store.update_call(call.clone())?;
        Ok(call)
    }

    /// Clone a rubric template as its next version under a fresh identifier,
    /// re-checking the weight sum at authoring time.
    pub fn version_template(
        &self,
        actor: &Actor,
        template: &RubricTemplate,
    ) -> Result<RubricTemplate, ReviewError> {
        lifecycle::ensure_admin(actor, "author rubric templates")?;
        validate_weights(&template.criteria)?;
        Ok(template.next_version(next_template_id()))
    }

    // --- proposal intake ---

    /// Submit a proposal for review. Accepted from `draft` or
    /// `revise_and_resubmit`; the call must be open with its deadline not
    /// passed and the requested budget inside the per-project range.
    pub fn submit_proposal(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
    ) -> Result<Proposal, ReviewError> {
        let mut proposal = self.proposal(proposal_id)?;
        lifecycle::ensure_proposal_owner(actor, &proposal)?;
        lifecycle::ensure_authoring_state(&proposal)?;

        let call = self.call(&proposal.call_id)?;
        let now = Utc::now();
        lifecycle::ensure_submission_window(&call, now.date_naive())?;
        lifecycle::ensure_budget_in_range(&call.budget, proposal.content.requested_budget)?;

        proposal.status = ProposalStatus::Submitted;
        proposal.submitted_at = Some(now);
        // Resubmission starts a fresh decision cycle.
        proposal.decision = None;
        self.store.update_proposal(proposal.clone())?;
        info!(proposal = %proposal.proposal_id.0, "proposal submitted");
        Ok(proposal)
    }

    // --- evaluation lifecycle ---

    /// Save or refresh an evaluator's draft scores. Missing criteria are
    /// zero-filled; a prior completion stamp is never cleared by a draft
    /// save. First scoring touch advances the proposal to `under_review`.
    pub fn save_draft(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
        inputs: &[ScoreInput],
        recommendation: Option<Recommendation>,
    ) -> Result<Evaluation, ReviewError> {
        let mut proposal = self.proposal(proposal_id)?;
        lifecycle::ensure_scoring_party(actor, &proposal)?;
        let call = self.call(&proposal.call_id)?;

        let normalized = normalize_entries(&call.criteria, inputs);
        let score = overall_score(&normalized.entries, &call.criteria);

        let existing = self.store.fetch_evaluation(proposal_id, &actor.user_id)?;
        let action = if existing.is_some() {
            ActivityAction::EvaluationDraftUpdated
        } else {
            ActivityAction::EvaluationDraftCreated
        };
        let completed_at = existing.and_then(|evaluation| evaluation.completed_at);

        let evaluation = Evaluation {
            proposal_id: proposal_id.clone(),
            evaluator_id: actor.user_id.clone(),
            entries: normalized.entries,
            overall_score: score,
            recommendation,
            completed_at,
            updated_at: Utc::now(),
        };
        self.store.upsert_evaluation(evaluation.clone())?;

        if lifecycle::on_first_review_touch(&mut proposal) {
            self.store.update_proposal(proposal)?;
        }

        self.record_activity(
            ActivityRecord::new(&actor.user_id, action, "evaluation", &proposal_id.0)
                .with_detail("evaluator", actor.user_id.0.clone())
                .with_detail("overall_score", format!("{score:.2}")),
        );
        Ok(evaluation)
    }

    /// Submit a completed evaluation. Fails without touching any record when
    /// the call has no rubric or any criterion is unscored.
    pub fn submit_evaluation(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
        inputs: &[ScoreInput],
        recommendation: Option<Recommendation>,
    ) -> Result<Evaluation, ReviewError> {
        let mut proposal = self.proposal(proposal_id)?;
        lifecycle::ensure_scoring_party(actor, &proposal)?;
        let call = self.call(&proposal.call_id)?;
        if call.criteria.is_empty() {
            return Err(ReviewError::NoRubricConfigured);
        }

        let normalized = normalize_entries(&call.criteria, inputs);
        if !normalized.is_complete() {
            return Err(ReviewError::IncompleteScores {
                missing: normalized.missing_scores.len(),
            });
        }

        let score = overall_score(&normalized.entries, &call.criteria);
        let now = Utc::now();
        let evaluation = Evaluation {
            proposal_id: proposal_id.clone(),
            evaluator_id: actor.user_id.clone(),
            entries: normalized.entries,
            overall_score: score,
            recommendation,
            completed_at: Some(now),
            updated_at: now,
        };
        self.store.upsert_evaluation(evaluation.clone())?;

        if lifecycle::on_first_review_touch(&mut proposal) {
            self.store.update_proposal(proposal)?;
        }

        self.record_activity(
            ActivityRecord::new(
                &actor.user_id,
                ActivityAction::EvaluationSubmitted,
                "evaluation",
                &proposal_id.0,
            )
            .with_detail("evaluator", actor.user_id.0.clone())
            .with_detail("overall_score", format!("{score:.2}")),
        );
        Ok(evaluation)
    }

    /// Fetch the acting evaluator's own evaluation record for a proposal.
    pub fn evaluation_for(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
    ) -> Result<Option<Evaluation>, ReviewError> {
        let proposal = self.proposal(proposal_id)?;
        lifecycle::ensure_scoring_party(actor, &proposal)?;
        Ok(self.store.fetch_evaluation(proposal_id, &actor.user_id)?)
    }

    // --- decision and execution ---

    /// Finalize a proposal decision. Approve/reject require the quorum of
    /// completed evaluations, recomputed from live records here, never from
    /// caller-supplied counts.
    pub fn finalize_decision(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
        decision: ReviewDecision,
        note: Option<String>,
    ) -> Result<Proposal, ReviewError> {
        lifecycle::ensure_admin(actor, "finalize proposal decisions")?;
        let mut proposal = self.proposal(proposal_id)?;
        let call = self.call(&proposal.call_id)?;

        let completed = self
            .store
            .evaluations_for_proposal(proposal_id)?
            .iter()
            .filter(|evaluation| evaluation.is_completed())
            .count();
        lifecycle::ensure_decision_ready(&proposal, decision, &call.evaluation, completed)?;

        proposal.status = decision.as_status();
        proposal.decision = Some(DecisionRecord {
            decision,
            decided_by: actor.user_id.clone(),
            decided_at: Utc::now(),
            note,
        });
        self.store.update_proposal(proposal.clone())?;

        self.record_activity(
            ActivityRecord::new(
                &actor.user_id,
                ActivityAction::ProposalDecisionFinalized,
                "proposal",
                &proposal_id.0,
            )
            .with_detail("decision", decision.label()),
        );
        Ok(proposal)
    }

    /// Move an approved proposal into execution with its initial milestone
    /// plan and awarded budget.
    pub fn begin_execution(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
        milestones: Vec<MilestoneExecution>,
        awarded: u64,
    ) -> Result<Proposal, ReviewError> {
        lifecycle::ensure_admin(actor, "move proposals into execution")?;
        let mut proposal = self.proposal(proposal_id)?;
        lifecycle::ensure_status(&proposal, ProposalStatus::Approved, "begin execution")?;

        proposal.status = ProposalStatus::InExecution;
        proposal.execution = Some(ExecutionTracking {
            milestones,
            budget: BudgetExecution { awarded, spent: 0 },
            active_alerts: Vec::new(),
        });
        self.store.update_proposal(proposal.clone())?;
        info!(proposal = %proposal.proposal_id.0, "proposal entered execution");
        Ok(proposal)
    }

    /// Close out an executing project.
    pub fn complete_project(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
    ) -> Result<Proposal, ReviewError> {
        lifecycle::ensure_admin(actor, "complete projects")?;
        let mut proposal = self.proposal(proposal_id)?;
        lifecycle::ensure_status(&proposal, ProposalStatus::InExecution, "complete the project")?;

        proposal.status = ProposalStatus::Completed;
        self.store.update_proposal(proposal.clone())?;
        info!(proposal = %proposal.proposal_id.0, "project completed");
        Ok(proposal)
    }

    // --- assignment management ---

    /// Attach an evaluator to a proposal as a pending assignment. A removed
    /// record for the pair is resurrected rather than duplicated; any other
    /// existing record rejects the request.
    pub fn quick_assign(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
        evaluator_id: &UserId,
    ) -> Result<EvaluatorAssignment, ReviewError> {
        lifecycle::ensure_admin(actor, "assign evaluators")?;
        let mut proposal = self.proposal(proposal_id)?;
        if self.store.fetch_profile(evaluator_id)?.is_none() {
            return Err(ReviewError::EvaluatorNotFound(evaluator_id.0.clone()));
        }

        let now = Utc::now();
        let assignment = match self.store.fetch_assignment(proposal_id, evaluator_id)? {
            Some(existing) if existing.status != AssignmentStatus::Removed => {
                return Err(ReviewError::AlreadyAssigned {
                    evaluator: evaluator_id.0.clone(),
                });
            }
            Some(mut removed) => {
                removed.status = AssignmentStatus::Pending;
                removed.method = AssignmentMethod::Manual;
                removed.updated_at = now;
                removed
            }
            None => EvaluatorAssignment {
                proposal_id: proposal_id.clone(),
                evaluator_id: evaluator_id.clone(),
                status: AssignmentStatus::Pending,
                method: AssignmentMethod::Manual,
                conflict_declared: false,
                conflict_note: None,
                assigned_at: now,
                updated_at: now,
            },
        };
        self.store.upsert_assignment(assignment.clone())?;
        self.record_activity(
            ActivityRecord::new(
                &actor.user_id,
                ActivityAction::ProposalAssignmentUpdated,
                "proposal",
                &proposal_id.0,
            )
            .with_detail("evaluator", evaluator_id.0.clone())
            .with_detail("status", assignment.status.label()),
        );

        if !proposal.assigned_evaluators.contains(evaluator_id) {
            proposal.assigned_evaluators.push(evaluator_id.clone());
            let count = proposal.assigned_evaluators.len();
            self.store.update_proposal(proposal)?;
            self.record_activity(
                ActivityRecord::new(
                    &actor.user_id,
                    ActivityAction::ProposalEvaluatorsUpdated,
                    "proposal",
                    &proposal_id.0,
                )
                .with_detail("count", count.to_string()),
            );
        }
        Ok(assignment)
    }

    /// Force-remove an evaluator from a proposal. The assignment record and
    /// any evaluation they produced are retained for audit.
    pub fn unassign(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
        evaluator_id: &UserId,
    ) -> Result<EvaluatorAssignment, ReviewError> {
        lifecycle::ensure_admin(actor, "remove evaluator assignments")?;
        let mut proposal = self.proposal(proposal_id)?;
        let mut assignment = self
            .store
            .fetch_assignment(proposal_id, evaluator_id)?
            .filter(|assignment| assignment.status != AssignmentStatus::Removed)
            .ok_or_else(|| ReviewError::AssignmentNotFound {
                proposal: proposal_id.0.clone(),
                evaluator: evaluator_id.0.clone(),
            })?;

        assignment.status = AssignmentStatus::Removed;
        assignment.updated_at = Utc::now();
        self.store.upsert_assignment(assignment.clone())?;
        self.record_activity(
            ActivityRecord::new(
                &actor.user_id,
                ActivityAction::ProposalAssignmentUpdated,
                "proposal",
                &proposal_id.0,
            )
            .with_detail("evaluator", evaluator_id.0.clone())
            .with_detail("status", assignment.status.label()),
        );

        let before = proposal.assigned_evaluators.len();
        proposal.assigned_evaluators.retain(|id| id != evaluator_id);
        if proposal.assigned_evaluators.len() != before {
            let count = proposal.assigned_evaluators.len();
            self.store.update_proposal(proposal)?;
            self.record_activity(
                ActivityRecord::new(
                    &actor.user_id,
                    ActivityAction::ProposalEvaluatorsUpdated,
                    "proposal",
                    &proposal_id.0,
                )
                .with_detail("count", count.to_string()),
            );
        }
        Ok(assignment)
    }

    /// Admin-forced reset of an assignment back to `pending` from any state.
    pub fn reset_assignment(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
        evaluator_id: &UserId,
    ) -> Result<EvaluatorAssignment, ReviewError> {
        lifecycle::ensure_admin(actor, "reset evaluator assignments")?;
        let mut proposal = self.proposal(proposal_id)?;
        let mut assignment = self
            .store
            .fetch_assignment(proposal_id, evaluator_id)?
            .ok_or_else(|| ReviewError::AssignmentNotFound {
                proposal: proposal_id.0.clone(),
                evaluator: evaluator_id.0.clone(),
            })?;

        assignment.status = AssignmentStatus::Pending;
        assignment.updated_at = Utc::now();
        self.store.upsert_assignment(assignment.clone())?;
        self.record_activity(
            ActivityRecord::new(
                &actor.user_id,
                ActivityAction::ProposalAssignmentUpdated,
                "proposal",
                &proposal_id.0,
            )
            .with_detail("evaluator", evaluator_id.0.clone())
            .with_detail("status", assignment.status.label()),
        );

        if !proposal.assigned_evaluators.contains(evaluator_id) {
            proposal.assigned_evaluators.push(evaluator_id.clone());
            let count = proposal.assigned_evaluators.len();
            self.store.update_proposal(proposal)?;
            self.record_activity(
                ActivityRecord::new(
                    &actor.user_id,
                    ActivityAction::ProposalEvaluatorsUpdated,
                    "proposal",
                    &proposal_id.0,
                )
                .with_detail("count", count.to_string()),
            );
        }
        Ok(assignment)
    }

    /// Evaluator accepts or declines their own pending assignment, optionally
    /// declaring a conflict of interest.
    pub fn respond_assignment(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
        accept: bool,
        conflict_note: Option<String>,
    ) -> Result<EvaluatorAssignment, ReviewError> {
        self.proposal(proposal_id)?;
        let mut assignment = self
            .store
            .fetch_assignment(proposal_id, &actor.user_id)?
            .ok_or_else(|| ReviewError::AssignmentNotFound {
                proposal: proposal_id.0.clone(),
                evaluator: actor.user_id.0.clone(),
            })?;

        assignment.status = lifecycle::respond_to_assignment(&assignment, accept)?;
        assignment.updated_at = Utc::now();
        let note = conflict_note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty());
        if let Some(note) = note {
            assignment.conflict_declared = true;
            assignment.conflict_note = Some(note.to_string());
        }
        self.store.upsert_assignment(assignment.clone())?;

        self.record_activity(
            ActivityRecord::new(
                &actor.user_id,
                ActivityAction::ProposalAssignmentUpdated,
                "proposal",
                &proposal_id.0,
            )
            .with_detail("evaluator", actor.user_id.0.clone())
            .with_detail("status", assignment.status.label()),
        );
        Ok(assignment)
    }

    // --- clarifications ---

    /// Open a clarification question against a proposal.
    pub fn open_clarification(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
        question: &str,
    ) -> Result<ClarificationRequest, ReviewError> {
        let proposal = self.proposal(proposal_id)?;
        lifecycle::ensure_scoring_party(actor, &proposal)?;
        let question = question.trim();
        if question.is_empty() {
            return Err(ReviewError::EmptyClarificationQuestion);
        }

        let now = Utc::now();
        let request = ClarificationRequest {
            clarification_id: next_clarification_id(),
            proposal_id: proposal_id.clone(),
            evaluator_id: actor.user_id.clone(),
            question: question.to_string(),
            response: None,
            attachment_key: None,
            status: ClarificationStatus::Pending,
            opened_at: now,
            updated_at: now,
        };
        self.store.insert_clarification(request.clone())?;
        Ok(request)
    }

    /// Answer a pending clarification as the proposal's owner. The optional
    /// attachment key is an opaque storage reference.
    pub fn respond_clarification(
        &self,
        actor: &Actor,
        clarification_id: &ClarificationId,
        response: &str,
        attachment_key: Option<String>,
    ) -> Result<ClarificationRequest, ReviewError> {
        let mut request = self.clarification(clarification_id)?;
        let proposal = self.proposal(&request.proposal_id)?;
        lifecycle::ensure_proposal_owner(actor, &proposal)?;
        lifecycle::ensure_clarification_state(
            request.status,
            ClarificationStatus::Pending,
            "respond to",
        )?;
        let response = response.trim();
        if response.is_empty() {
            return Err(ReviewError::EmptyClarificationResponse);
        }

        request.response = Some(response.to_string());
        request.attachment_key = attachment_key;
        request.status = ClarificationStatus::Responded;
        request.updated_at = Utc::now();
        self.store.update_clarification(request.clone())?;
        Ok(request)
    }

    /// Mark an answered clarification resolved; the opener or an admin.
    pub fn resolve_clarification(
        &self,
        actor: &Actor,
        clarification_id: &ClarificationId,
    ) -> Result<ClarificationRequest, ReviewError> {
        let mut request = self.clarification(clarification_id)?;
        if !actor.is_admin() && request.evaluator_id != actor.user_id {
            return Err(ReviewError::NotClarificationOwner { action: "resolve" });
        }
        lifecycle::ensure_clarification_state(
            request.status,
            ClarificationStatus::Responded,
            "resolve",
        )?;

        request.status = ClarificationStatus::Resolved;
        request.updated_at = Utc::now();
        self.store.update_clarification(request.clone())?;
        Ok(request)
    }

    /// Withdraw an unanswered clarification; only its opener may do so.
    pub fn withdraw_clarification(
        &self,
        actor: &Actor,
        clarification_id: &ClarificationId,
    ) -> Result<ClarificationRequest, ReviewError> {
        let mut request = self.clarification(clarification_id)?;
        if request.evaluator_id != actor.user_id {
            return Err(ReviewError::NotClarificationOwner { action: "withdraw" });
        }
        lifecycle::ensure_clarification_state(
            request.status,
            ClarificationStatus::Pending,
            "withdraw",
        )?;

        request.status = ClarificationStatus::Withdrawn;
        request.updated_at = Utc::now();
        self.store.update_clarification(request.clone())?;
        Ok(request)
    }

    /// All clarifications attached to a proposal, visible to its parties.
    pub fn proposal_clarifications(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
    ) -> Result<Vec<ClarificationRequest>, ReviewError> {
        let proposal = self.proposal(proposal_id)?;
        lifecycle::ensure_proposal_party(actor, &proposal)?;
        Ok(self.store.clarifications_for_proposal(proposal_id)?)
    }

    // --- queries ---

    /// Assemble the assignment matrix for the requested filters.
    pub fn assignment_matrix(
        &self,
        actor: &Actor,
        filters: &MatrixFilters,
    ) -> Result<AssignmentMatrix, ReviewError> {
        lifecycle::ensure_admin(actor, "view the assignment matrix")?;
        let calls = self.store.list_calls()?;
        let proposals = self.store.list_proposals()?;
        let profiles = self.store.list_profiles()?;
        let assignments = self.store.list_assignments()?;
        let matches = self.store.list_matches()?;
        let evaluations = self.store.list_evaluations()?;
        let sources = MatrixSources {
            calls: &calls,
            proposals: &proposals,
            profiles: &profiles,
            assignments: &assignments,
            matches: &matches,
            evaluations: &evaluations,
        };
        Ok(build_matrix(
            &sources,
            filters,
            self.config.evaluator_capacity,
        ))
    }

    /// Current workload for one evaluator; visible to that evaluator and to
    /// admins.
    pub fn evaluator_workload(
        &self,
        actor: &Actor,
        evaluator_id: &UserId,
    ) -> Result<EvaluatorWorkload, ReviewError> {
        if !actor.is_admin() && actor.user_id != *evaluator_id {
            return Err(ReviewError::AdminOnly {
                action: "view another evaluator's workload",
            });
        }
        if self.store.fetch_profile(evaluator_id)?.is_none() {
            return Err(ReviewError::EvaluatorNotFound(evaluator_id.0.clone()));
        }
        let assignments = self.store.assignments_for_evaluator(evaluator_id)?;
        let evaluations = self.store.evaluations_for_evaluator(evaluator_id)?;
        Ok(workload::evaluator_workload(
            evaluator_id,
            &assignments,
            &evaluations,
            self.config.evaluator_capacity,
        ))
    }

    /// Capacity-planning report across the whole evaluator pool.
    pub fn capacity_report(&self, actor: &Actor) -> Result<CapacityReport, ReviewError> {
        lifecycle::ensure_admin(actor, "view the capacity report")?;
        let profiles = self.store.list_profiles()?;
        let assignments = self.store.list_assignments()?;
        let evaluations = self.store.list_evaluations()?;
        Ok(workload::capacity_report(
            &profiles,
            &assignments,
            &evaluations,
            self.config.evaluator_capacity,
        ))
    }

    /// Review progress for one proposal: panel coverage, quorum state, and
    /// the running average of completed scores.
    pub fn review_progress(
        &self,
        actor: &Actor,
        proposal_id: &ProposalId,
    ) -> Result<ReviewProgressView, ReviewError> {
        let proposal = self.proposal(proposal_id)?;
        lifecycle::ensure_proposal_party(actor, &proposal)?;
        let call = self.call(&proposal.call_id)?;

        let assignments = self.store.assignments_for_proposal(proposal_id)?;
        let active = assignments
            .iter()
            .filter(|assignment| assignment.status.is_active())
            .count() as u32;

        let evaluations = self.store.evaluations_for_proposal(proposal_id)?;
        let completed: Vec<&Evaluation> = evaluations
            .iter()
            .filter(|evaluation| evaluation.is_completed())
            .collect();
        let average_score = if completed.is_empty() {
            None
        } else {
            let sum: f64 = completed
                .iter()
                .map(|evaluation| evaluation.overall_score)
                .sum();
            Some(round2(sum / completed.len() as f64))
        };

        let required = call.evaluation.evaluators_required;
        Ok(ReviewProgressView {
            proposal_id: proposal_id.clone(),
            status: proposal.status,
            evaluators_required: required,
            active_assignments: active,
            completed_evaluations: completed.len(),
            quorum_met: completed.len() >= required as usize,
            average_score,
            decision: proposal.decision,
        })
    }
}

/// Panel coverage and scoring progress for one proposal.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewProgressView {
    pub proposal_id: ProposalId,
    pub status: ProposalStatus,
    pub evaluators_required: u32,
    pub active_assignments: u32,
    pub completed_evaluations: usize,
    pub quorum_met: bool,
    pub average_score: Option<f64>,
    pub decision: Option<DecisionRecord>,
}
