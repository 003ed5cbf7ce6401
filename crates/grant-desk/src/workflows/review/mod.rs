//! Grant review scoring and assignment engine.
//!
//! Funding calls carry a weighted rubric; evaluators score proposals against
//! it, admins balance reviewer load through the assignment matrix, and
//! decisions are gated on a quorum of completed evaluations. Every operation
//! takes an explicit [`domain::Actor`]; the engine never reads ambient
//! session state and re-validates its invariants from stored records on each
//! mutation.

pub(crate) mod config;
pub mod domain;
pub(crate) mod lifecycle;
pub mod matrix;
pub mod repository;
pub mod router;
pub(crate) mod rubric;
pub(crate) mod scoring;
pub mod service;
pub mod workload;

#[cfg(test)]
mod tests;

pub use config::ReviewConfig;
pub use domain::{
    Actor, AssignmentMethod, AssignmentStatus, Call, CallBudget, CallId, CallStatus, CallWindow,
    ClarificationId, ClarificationRequest, ClarificationStatus, ConflictSeverity, CriterionId,
    DecisionRecord, Evaluation, EvaluationCriterion, EvaluationSettings, EvaluatorAssignment,
    EvaluatorMatch, EvaluatorProfile, ExecutionTracking, Proposal, ProposalContent, ProposalId,
    ProposalStatus, Recommendation, ReviewDecision, Role, RubricEntry, RubricTemplate, ScoreInput,
    UserId,
};
pub use lifecycle::ReviewError;
pub use matrix::{
    AssignmentCompleteness, AssignmentMatrix, CompletenessFilter, EvaluatorColumn, FilterOptions,
    MatchSnapshot, MatrixCell, MatrixFilters, MatrixSummary, ProposalMatrixRow,
};
pub use repository::{
    ActivityAction, ActivityError, ActivityPublisher, ActivityRecord, ReviewStore, StoreError,
};
pub use router::review_router;
pub use rubric::{normalize_entries, validate_weights, NormalizedRubric, WeightConfigError};
pub use scoring::overall_score;
pub use service::{ReviewProgressView, ReviewService};
pub use workload::{CapacityReport, CapacityRow, EvaluatorWorkload};
