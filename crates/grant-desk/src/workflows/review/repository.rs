use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    Call, CallId, ClarificationId, ClarificationRequest, Evaluation, EvaluatorAssignment,
    EvaluatorMatch, EvaluatorProfile, Proposal, ProposalId, UserId,
};

/// Storage abstraction over the platform's document store.
///
/// The engine treats every service mutation as one read-validate-write unit:
/// implementations are expected to apply each call atomically and to give
/// reads within a request a consistent snapshot, which is what the backing
/// transactional store guarantees. Invariants (quorum counts, active
/// assignment uniqueness) are re-validated from these records on every
/// write, never trusted from caller-supplied state.
///
/// Evaluations and assignments are keyed by (proposal, evaluator); `upsert`
/// replaces the record for that pair or creates it, so exactly one record
/// ever exists per pair.
pub trait ReviewStore: Send + Sync {
    fn insert_call(&self, call: Call) -> Result<(), StoreError>;
    fn fetch_call(&self, id: &CallId) -> Result<Option<Call>, StoreError>;
    fn update_call(&self, call: Call) -> Result<(), StoreError>;
    fn list_calls(&self) -> Result<Vec<Call>, StoreError>;

    fn insert_proposal(&self, proposal: Proposal) -> Result<(), StoreError>;
    fn fetch_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, StoreError>;
    fn update_proposal(&self, proposal: Proposal) -> Result<(), StoreError>;
    fn list_proposals(&self) -> Result<Vec<Proposal>, StoreError>;

    fn insert_profile(&self, profile: EvaluatorProfile) -> Result<(), StoreError>;
    fn fetch_profile(&self, id: &UserId) -> Result<Option<EvaluatorProfile>, StoreError>;
    fn list_profiles(&self) -> Result<Vec<EvaluatorProfile>, StoreError>;

    fn upsert_assignment(&self, assignment: EvaluatorAssignment) -> Result<(), StoreError>;
    fn fetch_assignment(
        &self,
        proposal: &ProposalId,
        evaluator: &UserId,
    ) -> Result<Option<EvaluatorAssignment>, StoreError>;
    fn assignments_for_proposal(
        &self,
        proposal: &ProposalId,
    ) -> Result<Vec<EvaluatorAssignment>, StoreError>;
    fn assignments_for_evaluator(
        &self,
        evaluator: &UserId,
    ) -> Result<Vec<EvaluatorAssignment>, StoreError>;
    fn list_assignments(&self) -> Result<Vec<EvaluatorAssignment>, StoreError>;

    fn upsert_evaluation(&self, evaluation: Evaluation) -> Result<(), StoreError>;
    fn fetch_evaluation(
        &self,
        proposal: &ProposalId,
        evaluator: &UserId,
    ) -> Result<Option<Evaluation>, StoreError>;
    fn evaluations_for_proposal(
        &self,
        proposal: &ProposalId,
    ) -> Result<Vec<Evaluation>, StoreError>;
    fn evaluations_for_evaluator(
        &self,
        evaluator: &UserId,
    ) -> Result<Vec<Evaluation>, StoreError>;
    fn list_evaluations(&self) -> Result<Vec<Evaluation>, StoreError>;

    /// Match rows are produced by the external matching collaborator; the
    /// engine only ever reads them.
    fn upsert_match(&self, fitness: EvaluatorMatch) -> Result<(), StoreError>;
    fn list_matches(&self) -> Result<Vec<EvaluatorMatch>, StoreError>;

    fn insert_clarification(&self, request: ClarificationRequest) -> Result<(), StoreError>;
    fn fetch_clarification(
        &self,
        id: &ClarificationId,
    ) -> Result<Option<ClarificationRequest>, StoreError>;
    fn update_clarification(&self, request: ClarificationRequest) -> Result<(), StoreError>;
    fn clarifications_for_proposal(
        &self,
        proposal: &ProposalId,
    ) -> Result<Vec<ClarificationRequest>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Audit actions emitted by the engine, one per mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityAction {
    #[serde(rename = "evaluation.draft_created")]
    EvaluationDraftCreated,
    #[serde(rename = "evaluation.draft_updated")]
    EvaluationDraftUpdated,
    #[serde(rename = "evaluation.submitted")]
    EvaluationSubmitted,
    #[serde(rename = "proposal.decision_finalized")]
    ProposalDecisionFinalized,
    #[serde(rename = "proposal.assignment_updated")]
    ProposalAssignmentUpdated,
    #[serde(rename = "proposal.evaluators_updated")]
    ProposalEvaluatorsUpdated,
}

impl ActivityAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            ActivityAction::EvaluationDraftCreated => "evaluation.draft_created",
            ActivityAction::EvaluationDraftUpdated => "evaluation.draft_updated",
            ActivityAction::EvaluationSubmitted => "evaluation.submitted",
            ActivityAction::ProposalDecisionFinalized => "proposal.decision_finalized",
            ActivityAction::ProposalAssignmentUpdated => "proposal.assignment_updated",
            ActivityAction::ProposalEvaluatorsUpdated => "proposal.evaluators_updated",
        }
    }
}

/// One audit record handed to the activity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub actor: UserId,
    pub action: ActivityAction,
    pub entity_type: String,
    pub entity_id: String,
    pub details: BTreeMap<String, String>,
}

impl ActivityRecord {
    pub fn new(actor: &UserId, action: ActivityAction, entity_type: &str, entity_id: &str) -> Self {
        Self {
            actor: actor.clone(),
            action,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Outbound hook for the audit/activity collaborator.
///
/// Fire-and-forget: publish failures are logged by the service and never
/// abort the transition that produced the record.
pub trait ActivityPublisher: Send + Sync {
    fn publish(&self, record: ActivityRecord) -> Result<(), ActivityError>;
}

/// Activity dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    #[error("activity transport unavailable: {0}")]
    Transport(String),
}
