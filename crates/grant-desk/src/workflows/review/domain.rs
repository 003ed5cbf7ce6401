use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for funding calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallId(pub String);

/// Identifier wrapper for submitted proposals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProposalId(pub String);

/// Identifier wrapper for platform users (investigators, evaluators, admins).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for rubric criteria.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CriterionId(pub String);

/// Identifier wrapper for rubric templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub String);

/// Identifier wrapper for clarification requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClarificationId(pub String);

/// Platform roles supplied by the identity collaborator alongside every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sysadmin,
    Admin,
    Evaluator,
    Faculty,
    Finance,
    Observer,
}

impl Role {
    /// Roles with assignment and decision authority.
    pub const fn is_admin_class(self) -> bool {
        matches!(self, Role::Sysadmin | Role::Admin)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Sysadmin => "sysadmin",
            Role::Admin => "admin",
            Role::Evaluator => "evaluator",
            Role::Faculty => "faculty",
            Role::Finance => "finance",
            Role::Observer => "observer",
        }
    }
}

/// Explicit caller context threaded through every core operation.
///
/// The engine never reads ambient session state; whoever invokes a mutation
/// supplies the acting user and their role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin_class()
    }
}

/// Admin-controlled lifecycle of a funding round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Draft,
    Open,
    Closed,
    Archived,
}

impl CallStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CallStatus::Draft => "draft",
            CallStatus::Open => "open",
            CallStatus::Closed => "closed",
            CallStatus::Archived => "archived",
        }
    }
}

/// How evaluators get attached to proposals under a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMethod {
    Manual,
    AutoBalanced,
    AiMatched,
}

impl AssignmentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentMethod::Manual => "manual",
            AssignmentMethod::AutoBalanced => "auto_balanced",
            AssignmentMethod::AiMatched => "ai_matched",
        }
    }
}

/// Key dates of a funding round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallWindow {
    pub opens_on: NaiveDate,
    pub closes_on: NaiveDate,
    pub evaluation_due: Option<NaiveDate>,
    pub decision_due: Option<NaiveDate>,
    pub project_start: Option<NaiveDate>,
}

/// Budget envelope of a funding round, in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallBudget {
    pub total: u64,
    pub per_project_min: u64,
    pub per_project_max: u64,
}

/// Review configuration attached to a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSettings {
    pub evaluators_required: u32,
    pub assignment_method: AssignmentMethod,
    pub blind_review: bool,
    pub require_conflict_declaration: bool,
}

/// A funding round applicants submit proposals against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub call_id: CallId,
    pub title: String,
    pub status: CallStatus,
    pub window: CallWindow,
    pub budget: CallBudget,
    pub evaluation: EvaluationSettings,
    /// Rubric criteria in canonical scoring order.
    pub criteria: Vec<EvaluationCriterion>,
}

/// What a rubric dimension measures; carried for reporting, inert to scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    Merit,
    Feasibility,
    Impact,
    Budget,
    Team,
    Other,
}

/// One step of a criterion's discrete descriptor scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDescriptor {
    pub score: u32,
    pub text: String,
}

/// One rubric dimension with its weight in percentage points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCriterion {
    pub criterion_id: CriterionId,
    pub name: String,
    pub description: String,
    pub weight: f64,
    pub max_score: f64,
    pub scale: Vec<ScoreDescriptor>,
    pub kind: CriterionKind,
    pub comment_required: bool,
}

/// Versioned, cloneable set of criteria reusable across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricTemplate {
    pub template_id: TemplateId,
    pub name: String,
    pub version: u32,
    pub criteria: Vec<EvaluationCriterion>,
}

impl RubricTemplate {
    /// Clone the template as the next version under a fresh identifier.
    pub fn next_version(&self, template_id: TemplateId) -> Self {
        Self {
            template_id,
            name: self.name.clone(),
            version: self.version + 1,
            criteria: self.criteria.clone(),
        }
    }
}

/// Proposal lifecycle; transitions are monotonic along this graph except for
/// the revise-and-resubmit loop back into authoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    ReviseAndResubmit,
    InExecution,
    Completed,
}

impl ProposalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Submitted => "submitted",
            ProposalStatus::UnderReview => "under_review",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::ReviseAndResubmit => "revise_and_resubmit",
            ProposalStatus::InExecution => "in_execution",
            ProposalStatus::Completed => "completed",
        }
    }

    /// Statuses in which the proposal is editable by its authors.
    pub const fn accepts_authoring(self) -> bool {
        matches!(self, ProposalStatus::Draft | ProposalStatus::ReviseAndResubmit)
    }
}

/// Narrative and financial content of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalContent {
    pub summary: String,
    pub narrative: String,
    pub requested_budget: u64,
    pub timeline_months: u32,
}

/// Terminal review decisions an admin can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
    ReviseAndResubmit,
}

impl ReviewDecision {
    pub const fn as_status(self) -> ProposalStatus {
        match self {
            ReviewDecision::Approved => ProposalStatus::Approved,
            ReviewDecision::Rejected => ProposalStatus::Rejected,
            ReviewDecision::ReviseAndResubmit => ProposalStatus::ReviseAndResubmit,
        }
    }

    pub const fn label(self) -> &'static str {
        self.as_status().label()
    }

    /// Approve/reject require quorum; revise-and-resubmit is exempt.
    pub const fn requires_quorum(self) -> bool {
        matches!(self, ReviewDecision::Approved | ReviewDecision::Rejected)
    }
}

/// Who finalized a proposal, when, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision: ReviewDecision,
    pub decided_by: UserId,
    pub decided_at: DateTime<Utc>,
    pub note: Option<String>,
}

/// Milestone progress captured once a proposal enters execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneExecution {
    pub name: String,
    pub due_on: NaiveDate,
    pub completed_on: Option<NaiveDate>,
}

/// Spend snapshot for an executing project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetExecution {
    pub awarded: u64,
    pub spent: u64,
}

/// Execution-tracking fields attached to approved proposals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionTracking {
    pub milestones: Vec<MilestoneExecution>,
    pub budget: BudgetExecution,
    pub active_alerts: Vec<String>,
}

/// One applicant's submission to a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub proposal_id: ProposalId,
    pub call_id: CallId,
    pub principal_investigator: UserId,
    pub team_members: Vec<UserId>,
    pub content: ProposalContent,
    pub status: ProposalStatus,
    /// Evaluators attached to this proposal; kept in sync by assignment
    /// mutations (removal evicts, a declined invitation does not).
    pub assigned_evaluators: Vec<UserId>,
    pub decision: Option<DecisionRecord>,
    pub execution: Option<ExecutionTracking>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Proposal {
    /// Whether a user belongs to the proposal's authoring party.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        self.principal_investigator == *user_id || self.team_members.contains(user_id)
    }

    /// Whether a user is currently attached as an evaluator.
    pub fn is_assigned_evaluator(&self, user_id: &UserId) -> bool {
        self.assigned_evaluators.contains(user_id)
    }
}

/// Relationship between one proposal and one candidate evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Declined,
    Removed,
}

impl AssignmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Accepted => "accepted",
            AssignmentStatus::Declined => "declined",
            AssignmentStatus::Removed => "removed",
        }
    }

    /// Active assignments count toward workload and quorum coverage.
    pub const fn is_active(self) -> bool {
        matches!(self, AssignmentStatus::Pending | AssignmentStatus::Accepted)
    }
}

/// One evaluator's standing invitation to review one proposal. Unique per
/// (proposal, evaluator); re-assignment resurrects a removed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorAssignment {
    pub proposal_id: ProposalId,
    pub evaluator_id: UserId,
    pub status: AssignmentStatus,
    pub method: AssignmentMethod,
    pub conflict_declared: bool,
    pub conflict_note: Option<String>,
    pub assigned_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Evaluator's bottom-line recommendation for a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Approve,
    ApproveWithModifications,
    Reject,
    ReviseAndResubmit,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::Approve => "approve",
            Recommendation::ApproveWithModifications => "approve_with_modifications",
            Recommendation::Reject => "reject",
            Recommendation::ReviseAndResubmit => "revise_and_resubmit",
        }
    }
}

/// Caller-submitted score for one criterion, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreInput {
    pub criterion_id: CriterionId,
    pub score: Option<f64>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub strengths: Option<String>,
    #[serde(default)]
    pub weaknesses: Option<String>,
}

/// Canonical scored entry stored on an evaluation. `max_score` always comes
/// from the criterion definition, never from caller input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricEntry {
    pub criterion_id: CriterionId,
    pub score: f64,
    pub max_score: f64,
    pub comments: Option<String>,
    pub strengths: Option<String>,
    pub weaknesses: Option<String>,
}

/// One evaluator's scoring work product for one proposal. Exactly one exists
/// per (proposal, evaluator); drafts are upserted in place and the record is
/// never deleted, even after unassignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub proposal_id: ProposalId,
    pub evaluator_id: UserId,
    pub entries: Vec<RubricEntry>,
    pub overall_score: f64,
    pub recommendation: Option<Recommendation>,
    /// Set on submission; `None` while the evaluation is a draft.
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Severity attached to a detected conflict of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

/// Precomputed evaluator-fitness estimate produced by the external matching
/// collaborator. Read-only input to the assignment matrix; the matrix
/// tolerates a fully absent match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorMatch {
    pub proposal_id: ProposalId,
    pub evaluator_id: UserId,
    pub match_score: f64,
    pub expertise_score: f64,
    pub availability_score: f64,
    pub performance_score: f64,
    pub conflict: bool,
    pub conflict_severity: Option<ConflictSeverity>,
    /// Signals a recomputation is due; stale rows still render.
    pub stale: bool,
}

/// Reviewer profile used when building the assignment pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub role: Role,
    pub campus: String,
    pub department: String,
    pub research_areas: Vec<String>,
}

/// Lifecycle of an evaluator's side-channel question to a proposal's owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationStatus {
    Pending,
    Responded,
    Resolved,
    Withdrawn,
}

impl ClarificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ClarificationStatus::Pending => "pending",
            ClarificationStatus::Responded => "responded",
            ClarificationStatus::Resolved => "resolved",
            ClarificationStatus::Withdrawn => "withdrawn",
        }
    }
}

/// Side-channel message between an evaluator and a proposal's owners. Not
/// scored and gates nothing; shares proposal-access authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationRequest {
    pub clarification_id: ClarificationId,
    pub proposal_id: ProposalId,
    pub evaluator_id: UserId,
    pub question: String,
    pub response: Option<String>,
    /// Opaque storage reference for a response attachment; bytes are never
    /// interpreted here.
    pub attachment_key: Option<String>,
    pub status: ClarificationStatus,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
