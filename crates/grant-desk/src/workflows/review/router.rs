use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    Actor, Call, CallId, ClarificationId, EvaluationCriterion, MilestoneExecution, ProposalId,
    Recommendation, ReviewDecision, Role, RubricTemplate, ScoreInput, UserId,
};
use super::lifecycle::ReviewError;
use super::matrix::MatrixFilters;
use super::repository::{ActivityPublisher, ReviewStore, StoreError};
use super::service::ReviewService;

/// Router builder exposing the review engine's queries and mutations.
///
/// Mutations carry the acting user in the JSON body; view endpoints carry it
/// in `user_id`/`role` query parameters. The engine re-checks authorization
/// on every call, so the router adds no auth of its own.
pub fn review_router<S, P>(service: Arc<ReviewService<S, P>>) -> Router
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    Router::new()
        .route("/api/v1/review/calls", post(create_call_handler::<S, P>))
        .route(
            "/api/v1/review/calls/:call_id/rubric",
            post(configure_rubric_handler::<S, P>),
        )
        .route(
            "/api/v1/review/templates/version",
            post(version_template_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/submit",
            post(submit_proposal_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/evaluation",
            get(evaluation_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/evaluation/draft",
            post(save_draft_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/evaluation/submit",
            post(submit_evaluation_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/decision",
            post(decision_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/execution",
            post(begin_execution_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/execution/complete",
            post(complete_project_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/assignments",
            post(quick_assign_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/assignments/respond",
            post(respond_assignment_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/assignments/:evaluator_id/remove",
            post(unassign_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/assignments/:evaluator_id/reset",
            post(reset_assignment_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/progress",
            get(progress_handler::<S, P>),
        )
        .route(
            "/api/v1/review/proposals/:proposal_id/clarifications",
            get(list_clarifications_handler::<S, P>).post(open_clarification_handler::<S, P>),
        )
        .route(
            "/api/v1/review/clarifications/:clarification_id/respond",
            post(respond_clarification_handler::<S, P>),
        )
        .route(
            "/api/v1/review/clarifications/:clarification_id/resolve",
            post(resolve_clarification_handler::<S, P>),
        )
        .route(
            "/api/v1/review/clarifications/:clarification_id/withdraw",
            post(withdraw_clarification_handler::<S, P>),
        )
        .route("/api/v1/review/matrix", post(matrix_handler::<S, P>))
        .route(
            "/api/v1/review/workload/report",
            get(capacity_report_handler::<S, P>),
        )
        .route(
            "/api/v1/review/evaluators/:evaluator_id/workload",
            get(workload_handler::<S, P>),
        )
        .with_state(service)
}

pub(crate) fn status_for(error: &ReviewError) -> StatusCode {
    match error {
        ReviewError::AdminOnly { .. }
        | ReviewError::NotAssigned { .. }
        | ReviewError::NotProposalOwner { .. }
        | ReviewError::NotProposalParty { .. }
        | ReviewError::NotClarificationOwner { .. } => StatusCode::FORBIDDEN,
        ReviewError::ProposalNotFound(_)
        | ReviewError::CallNotFound(_)
        | ReviewError::EvaluatorNotFound(_)
        | ReviewError::AssignmentNotFound { .. }
        | ReviewError::ClarificationNotFound(_)
        | ReviewError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        ReviewError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        ReviewError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn error_response(error: ReviewError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(&error), axum::Json(payload)).into_response()
}

/// Acting user for view endpoints, supplied as query parameters.
#[derive(Debug, Deserialize)]
pub(crate) struct ActorQuery {
    user_id: String,
    role: Role,
}

impl ActorQuery {
    fn actor(self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActorBody {
    actor: Actor,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CallBody {
    actor: Actor,
    call: Call,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RubricBody {
    actor: Actor,
    criteria: Vec<EvaluationCriterion>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateBody {
    actor: Actor,
    template: RubricTemplate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluationBody {
    actor: Actor,
    #[serde(default)]
    scores: Vec<ScoreInput>,
    #[serde(default)]
    recommendation: Option<Recommendation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionBody {
    actor: Actor,
    decision: ReviewDecision,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExecutionBody {
    actor: Actor,
    #[serde(default)]
    milestones: Vec<MilestoneExecution>,
    awarded: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignBody {
    actor: Actor,
    evaluator_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RespondAssignmentBody {
    actor: Actor,
    accept: bool,
    #[serde(default)]
    conflict_note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionBody {
    actor: Actor,
    question: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClarificationResponseBody {
    actor: Actor,
    response: String,
    #[serde(default)]
    attachment_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatrixBody {
    actor: Actor,
    #[serde(default)]
    filters: MatrixFilters,
}

pub(crate) async fn create_call_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    axum::Json(body): axum::Json<CallBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    match service.create_call(&body.actor, body.call) {
        Ok(call) => (StatusCode::CREATED, axum::Json(call)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn configure_rubric_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(call_id): Path<String>,
    axum::Json(body): axum::Json<RubricBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = CallId(call_id);
    match service.configure_call_rubric(&body.actor, &id, body.criteria) {
        Ok(call) => (StatusCode::OK, axum::Json(call)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn version_template_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    axum::Json(body): axum::Json<TemplateBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    match service.version_template(&body.actor, &body.template) {
        Ok(template) => (StatusCode::CREATED, axum::Json(template)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_proposal_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    axum::Json(body): axum::Json<ActorBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    match service.submit_proposal(&body.actor, &id) {
        Ok(proposal) => (StatusCode::OK, axum::Json(proposal)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evaluation_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    match service.evaluation_for(&query.actor(), &id) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_draft_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    axum::Json(body): axum::Json<EvaluationBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    match service.save_draft(&body.actor, &id, &body.scores, body.recommendation) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_evaluation_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    axum::Json(body): axum::Json<EvaluationBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    match service.submit_evaluation(&body.actor, &id, &body.scores, body.recommendation) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decision_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    axum::Json(body): axum::Json<DecisionBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    match service.finalize_decision(&body.actor, &id, body.decision, body.note) {
        Ok(proposal) => (StatusCode::OK, axum::Json(proposal)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn begin_execution_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    axum::Json(body): axum::Json<ExecutionBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    match service.begin_execution(&body.actor, &id, body.milestones, body.awarded) {
        Ok(proposal) => (StatusCode::OK, axum::Json(proposal)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_project_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    axum::Json(body): axum::Json<ActorBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    match service.complete_project(&body.actor, &id) {
        Ok(proposal) => (StatusCode::OK, axum::Json(proposal)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn quick_assign_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    axum::Json(body): axum::Json<AssignBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    let evaluator = UserId(body.evaluator_id);
    match service.quick_assign(&body.actor, &id, &evaluator) {
        Ok(assignment) => (StatusCode::CREATED, axum::Json(assignment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn respond_assignment_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    axum::Json(body): axum::Json<RespondAssignmentBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    match service.respond_assignment(&body.actor, &id, body.accept, body.conflict_note) {
        Ok(assignment) => (StatusCode::OK, axum::Json(assignment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn unassign_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path((proposal_id, evaluator_id)): Path<(String, String)>,
    axum::Json(body): axum::Json<ActorBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    let evaluator = UserId(evaluator_id);
    match service.unassign(&body.actor, &id, &evaluator) {
        Ok(assignment) => (StatusCode::OK, axum::Json(assignment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reset_assignment_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path((proposal_id, evaluator_id)): Path<(String, String)>,
    axum::Json(body): axum::Json<ActorBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    let evaluator = UserId(evaluator_id);
    match service.reset_assignment(&body.actor, &id, &evaluator) {
        Ok(assignment) => (StatusCode::OK, axum::Json(assignment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn progress_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    match service.review_progress(&query.actor(), &id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn open_clarification_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    axum::Json(body): axum::Json<QuestionBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    match service.open_clarification(&body.actor, &id, &body.question) {
        Ok(request) => (StatusCode::CREATED, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_clarifications_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(proposal_id): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ProposalId(proposal_id);
    match service.proposal_clarifications(&query.actor(), &id) {
        Ok(requests) => (StatusCode::OK, axum::Json(requests)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn respond_clarification_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(clarification_id): Path<String>,
    axum::Json(body): axum::Json<ClarificationResponseBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ClarificationId(clarification_id);
    match service.respond_clarification(&body.actor, &id, &body.response, body.attachment_key) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resolve_clarification_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(clarification_id): Path<String>,
    axum::Json(body): axum::Json<ActorBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ClarificationId(clarification_id);
    match service.resolve_clarification(&body.actor, &id) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn withdraw_clarification_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(clarification_id): Path<String>,
    axum::Json(body): axum::Json<ActorBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let id = ClarificationId(clarification_id);
    match service.withdraw_clarification(&body.actor, &id) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn matrix_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    axum::Json(body): axum::Json<MatrixBody>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    match service.assignment_matrix(&body.actor, &body.filters) {
        Ok(matrix) => (StatusCode::OK, axum::Json(matrix)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn capacity_report_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Query(query): Query<ActorQuery>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    match service.capacity_report(&query.actor()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn workload_handler<S, P>(
    State(service): State<Arc<ReviewService<S, P>>>,
    Path(evaluator_id): Path<String>,
    Query(query): Query<ActorQuery>,
) -> Response
where
    S: ReviewStore + 'static,
    P: ActivityPublisher + 'static,
{
    let evaluator = UserId(evaluator_id);
    match service.evaluator_workload(&query.actor(), &evaluator) {
        Ok(workload) => (StatusCode::OK, axum::Json(workload)).into_response(),
        Err(error) => error_response(error),
    }
}
