use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::review::config::ReviewConfig;
use crate::workflows::review::domain::{
    Actor, AssignmentMethod, AssignmentStatus, Call, CallBudget, CallId, CallStatus, CallWindow,
    ClarificationId, ClarificationRequest, CriterionId, CriterionKind, Evaluation,
    EvaluationCriterion, EvaluationSettings, EvaluatorAssignment, EvaluatorMatch,
    EvaluatorProfile, Proposal, ProposalContent, ProposalId, ProposalStatus, Role, ScoreInput,
    UserId,
};
use crate::workflows::review::repository::{
    ActivityError, ActivityPublisher, ActivityRecord, ReviewStore, StoreError,
};
use crate::workflows::review::service::ReviewService;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn admin() -> Actor {
    Actor::new("admin-1", Role::Admin)
}

pub(super) fn evaluator(id: &str) -> Actor {
    Actor::new(id, Role::Evaluator)
}

pub(super) fn criterion(id: &str, weight: f64, max_score: f64) -> EvaluationCriterion {
    EvaluationCriterion {
        criterion_id: CriterionId(id.to_string()),
        name: id.to_string(),
        description: format!("{id} dimension"),
        weight,
        max_score,
        scale: Vec::new(),
        kind: CriterionKind::Merit,
        comment_required: false,
    }
}

pub(super) fn criteria() -> Vec<EvaluationCriterion> {
    vec![
        criterion("crit-merit", 60.0, 10.0),
        criterion("crit-feasibility", 40.0, 5.0),
    ]
}

pub(super) fn call_with(criteria: Vec<EvaluationCriterion>, evaluators_required: u32) -> Call {
    Call {
        call_id: CallId("call-alpha".to_string()),
        title: "Alpha Grants".to_string(),
        status: CallStatus::Open,
        window: CallWindow {
            opens_on: date(2020, 1, 1),
            closes_on: date(2099, 12, 31),
            evaluation_due: None,
            decision_due: None,
            project_start: None,
        },
        budget: CallBudget {
            total: 500_000,
            per_project_min: 10_000,
            per_project_max: 50_000,
        },
        evaluation: EvaluationSettings {
            evaluators_required,
            assignment_method: AssignmentMethod::Manual,
            blind_review: false,
            require_conflict_declaration: false,
        },
        criteria,
    }
}

pub(super) fn proposal(id: &str, pi: &str, status: ProposalStatus) -> Proposal {
    Proposal {
        proposal_id: ProposalId(id.to_string()),
        call_id: CallId("call-alpha".to_string()),
        principal_investigator: UserId(pi.to_string()),
        team_members: vec![UserId(format!("{pi}-assistant"))],
        content: ProposalContent {
            summary: format!("{id} summary"),
            narrative: "narrative".to_string(),
            requested_budget: 30_000,
            timeline_months: 12,
        },
        status,
        assigned_evaluators: Vec::new(),
        decision: None,
        execution: None,
        submitted_at: None,
    }
}

pub(super) fn profile(id: &str, campus: &str, department: &str, areas: &[&str]) -> EvaluatorProfile {
    EvaluatorProfile {
        user_id: UserId(id.to_string()),
        display_name: format!("Dr. {id}"),
        role: Role::Evaluator,
        campus: campus.to_string(),
        department: department.to_string(),
        research_areas: areas.iter().map(|area| area.to_string()).collect(),
    }
}

pub(super) fn score(id: &str, value: f64) -> ScoreInput {
    ScoreInput {
        criterion_id: CriterionId(id.to_string()),
        score: Some(value),
        comments: None,
        strengths: None,
        weaknesses: None,
    }
}

pub(super) fn full_scores() -> Vec<ScoreInput> {
    vec![score("crit-merit", 8.0), score("crit-feasibility", 4.0)]
}

pub(super) fn assignment(
    proposal_id: &str,
    evaluator_id: &str,
    status: AssignmentStatus,
) -> EvaluatorAssignment {
    let now = chrono::Utc::now();
    EvaluatorAssignment {
        proposal_id: ProposalId(proposal_id.to_string()),
        evaluator_id: UserId(evaluator_id.to_string()),
        status,
        method: AssignmentMethod::Manual,
        conflict_declared: false,
        conflict_note: None,
        assigned_at: now,
        updated_at: now,
    }
}

pub(super) fn evaluation(proposal_id: &str, evaluator_id: &str, completed: bool) -> Evaluation {
    let now = chrono::Utc::now();
    Evaluation {
        proposal_id: ProposalId(proposal_id.to_string()),
        evaluator_id: UserId(evaluator_id.to_string()),
        entries: Vec::new(),
        overall_score: 0.0,
        recommendation: None,
        completed_at: completed.then_some(now),
        updated_at: now,
    }
}

pub(super) fn fitness(proposal_id: &str, evaluator_id: &str, match_score: f64) -> EvaluatorMatch {
    EvaluatorMatch {
        proposal_id: ProposalId(proposal_id.to_string()),
        evaluator_id: UserId(evaluator_id.to_string()),
        match_score,
        expertise_score: match_score,
        availability_score: match_score,
        performance_score: match_score,
        conflict: false,
        conflict_severity: None,
        stale: false,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    calls: Arc<Mutex<HashMap<CallId, Call>>>,
    proposals: Arc<Mutex<HashMap<ProposalId, Proposal>>>,
    profiles: Arc<Mutex<HashMap<UserId, EvaluatorProfile>>>,
    assignments: Arc<Mutex<HashMap<(ProposalId, UserId), EvaluatorAssignment>>>,
    evaluations: Arc<Mutex<HashMap<(ProposalId, UserId), Evaluation>>>,
    matches: Arc<Mutex<HashMap<(ProposalId, UserId), EvaluatorMatch>>>,
    clarifications: Arc<Mutex<HashMap<ClarificationId, ClarificationRequest>>>,
}

impl ReviewStore for MemoryStore {
    fn insert_call(&self, call: Call) -> Result<(), StoreError> {
        let mut guard = self.calls.lock().expect("store mutex poisoned");
        if guard.contains_key(&call.call_id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(call.call_id.clone(), call);
        Ok(())
    }

    fn fetch_call(&self, id: &CallId) -> Result<Option<Call>, StoreError> {
        Ok(self
            .calls
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned())
    }

    fn update_call(&self, call: Call) -> Result<(), StoreError> {
        self.calls
            .lock()
            .expect("store mutex poisoned")
            .insert(call.call_id.clone(), call);
        Ok(())
    }

    fn list_calls(&self) -> Result<Vec<Call>, StoreError> {
        Ok(self
            .calls
            .lock()
            .expect("store mutex poisoned")
            .values()
            .cloned()
            .collect())
    }

    fn insert_proposal(&self, proposal: Proposal) -> Result<(), StoreError> {
        let mut guard = self.proposals.lock().expect("store mutex poisoned");
        if guard.contains_key(&proposal.proposal_id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(proposal.proposal_id.clone(), proposal);
        Ok(())
    }

    fn fetch_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, StoreError> {
        Ok(self
            .proposals
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned())
    }

    fn update_proposal(&self, proposal: Proposal) -> Result<(), StoreError> {
        self.proposals
            .lock()
            .expect("store mutex poisoned")
            .insert(proposal.proposal_id.clone(), proposal);
        Ok(())
    }

    fn list_proposals(&self) -> Result<Vec<Proposal>, StoreError> {
        Ok(self
            .proposals
            .lock()
            .expect("store mutex poisoned")
            .values()
            .cloned()
            .collect())
    }

    fn insert_profile(&self, profile: EvaluatorProfile) -> Result<(), StoreError> {
        self.profiles
            .lock()
            .expect("store mutex poisoned")
            .insert(profile.user_id.clone(), profile);
        Ok(())
    }

    fn fetch_profile(&self, id: &UserId) -> Result<Option<EvaluatorProfile>, StoreError> {
        Ok(self
            .profiles
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned())
    }

    fn list_profiles(&self) -> Result<Vec<EvaluatorProfile>, StoreError> {
        Ok(self
            .profiles
            .lock()
            .expect("store mutex poisoned")
            .values()
            .cloned()
            .collect())
    }

    fn upsert_assignment(&self, assignment: EvaluatorAssignment) -> Result<(), StoreError> {
        let key = (
            assignment.proposal_id.clone(),
            assignment.evaluator_id.clone(),
        );
        self.assignments
            .lock()
            .expect("store mutex poisoned")
            .insert(key, assignment);
        Ok(())
    }

    fn fetch_assignment(
        &self,
        proposal: &ProposalId,
        evaluator: &UserId,
    ) -> Result<Option<EvaluatorAssignment>, StoreError> {
        let key = (proposal.clone(), evaluator.clone());
        Ok(self
            .assignments
            .lock()
            .expect("store mutex poisoned")
            .get(&key)
            .cloned())
    }

    fn assignments_for_proposal(
        &self,
        proposal: &ProposalId,
    ) -> Result<Vec<EvaluatorAssignment>, StoreError> {
        Ok(self
            .assignments
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|assignment| assignment.proposal_id == *proposal)
            .cloned()
            .collect())
    }

    fn assignments_for_evaluator(
        &self,
        evaluator: &UserId,
    ) -> Result<Vec<EvaluatorAssignment>, StoreError> {
        Ok(self
            .assignments
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|assignment| assignment.evaluator_id == *evaluator)
            .cloned()
            .collect())
    }

    fn list_assignments(&self) -> Result<Vec<EvaluatorAssignment>, StoreError> {
        Ok(self
            .assignments
            .lock()
            .expect("store mutex poisoned")
            .values()
            .cloned()
            .collect())
    }

    fn upsert_evaluation(&self, evaluation: Evaluation) -> Result<(), StoreError> {
        let key = (
            evaluation.proposal_id.clone(),
            evaluation.evaluator_id.clone(),
        );
        self.evaluations
            .lock()
            .expect("store mutex poisoned")
            .insert(key, evaluation);
        Ok(())
    }

    fn fetch_evaluation(
        &self,
        proposal: &ProposalId,
        evaluator: &UserId,
    ) -> Result<Option<Evaluation>, StoreError> {
        let key = (proposal.clone(), evaluator.clone());
        Ok(self
            .evaluations
            .lock()
            .expect("store mutex poisoned")
            .get(&key)
            .cloned())
    }

    fn evaluations_for_proposal(
        &self,
        proposal: &ProposalId,
    ) -> Result<Vec<Evaluation>, StoreError> {
        Ok(self
            .evaluations
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|evaluation| evaluation.proposal_id == *proposal)
            .cloned()
            .collect())
    }

    fn evaluations_for_evaluator(
        &self,
        evaluator: &UserId,
    ) -> Result<Vec<Evaluation>, StoreError> {
        Ok(self
            .evaluations
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|evaluation| evaluation.evaluator_id == *evaluator)
            .cloned()
            .collect())
    }

    fn list_evaluations(&self) -> Result<Vec<Evaluation>, StoreError> {
        Ok(self
            .evaluations
            .lock()
            .expect("store mutex poisoned")
            .values()
            .cloned()
            .collect())
    }

    fn upsert_match(&self, fitness: EvaluatorMatch) -> Result<(), StoreError> {
        let key = (fitness.proposal_id.clone(), fitness.evaluator_id.clone());
        self.matches
            .lock()
            .expect("store mutex poisoned")
            .insert(key, fitness);
        Ok(())
    }

    fn list_matches(&self) -> Result<Vec<EvaluatorMatch>, StoreError> {
        Ok(self
            .matches
            .lock()
            .expect("store mutex poisoned")
            .values()
            .cloned()
            .collect())
    }

    fn insert_clarification(&self, request: ClarificationRequest) -> Result<(), StoreError> {
        self.clarifications
            .lock()
            .expect("store mutex poisoned")
            .insert(request.clarification_id.clone(), request);
        Ok(())
    }

    fn fetch_clarification(
        &self,
        id: &ClarificationId,
    ) -> Result<Option<ClarificationRequest>, StoreError> {
        Ok(self
            .clarifications
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned())
    }

    fn update_clarification(&self, request: ClarificationRequest) -> Result<(), StoreError> {
        self.clarifications
            .lock()
            .expect("store mutex poisoned")
            .insert(request.clarification_id.clone(), request);
        Ok(())
    }

    fn clarifications_for_proposal(
        &self,
        proposal: &ProposalId,
    ) -> Result<Vec<ClarificationRequest>, StoreError> {
        Ok(self
            .clarifications
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|request| request.proposal_id == *proposal)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryActivity {
    records: Arc<Mutex<Vec<ActivityRecord>>>,
}

impl MemoryActivity {
    pub(super) fn records(&self) -> Vec<ActivityRecord> {
        self.records
            .lock()
            .expect("activity mutex poisoned")
            .clone()
    }
}

impl ActivityPublisher for MemoryActivity {
    fn publish(&self, record: ActivityRecord) -> Result<(), ActivityError> {
        self.records
            .lock()
            .expect("activity mutex poisoned")
            .push(record);
        Ok(())
    }
}

/// Service over a store seeded with one call (two criteria, quorum 2), one
/// submitted proposal `prop-1`, and three evaluator profiles `eva-1..eva-3`.
pub(super) fn build_service() -> (
    ReviewService<MemoryStore, MemoryActivity>,
    Arc<MemoryStore>,
    Arc<MemoryActivity>,
) {
    let store = Arc::new(MemoryStore::default());
    let activity = Arc::new(MemoryActivity::default());

    store
        .insert_call(call_with(criteria(), 2))
        .expect("seed call");
    store
        .insert_proposal(proposal("prop-1", "pi-1", ProposalStatus::Submitted))
        .expect("seed proposal");
    store
        .insert_profile(profile("eva-1", "North", "Biology", &["genomics"]))
        .expect("seed profile");
    store
        .insert_profile(profile("eva-2", "North", "Physics", &["optics"]))
        .expect("seed profile");
    store
        .insert_profile(profile("eva-3", "South", "Chemistry", &["catalysis"]))
        .expect("seed profile");

    let service = ReviewService::new(store.clone(), activity.clone(), ReviewConfig::default());
    (service, store, activity)
}

/// Quick-assign an evaluator as the admin and accept the invitation so the
/// pair is active and the evaluator may score.
pub(super) fn assign_and_accept(
    service: &ReviewService<MemoryStore, MemoryActivity>,
    proposal_id: &ProposalId,
    evaluator_id: &str,
) {
    service
        .quick_assign(&admin(), proposal_id, &UserId(evaluator_id.to_string()))
        .expect("assignment succeeds");
    service
        .respond_assignment(&evaluator(evaluator_id), proposal_id, true, None)
        .expect("acceptance succeeds");
}

pub(super) fn assert_forbidden(response: Response) {
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
