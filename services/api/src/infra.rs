use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use grant_desk::workflows::review::{
    ActivityError, ActivityPublisher, ActivityRecord, Call, CallId, ClarificationId,
    ClarificationRequest, Evaluation, EvaluatorAssignment, EvaluatorMatch, EvaluatorProfile,
    Proposal, ProposalId, ReviewStore, StoreError, UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory document store standing in for the platform's transactional
/// database. Each method takes the mutex once, so a call is atomic the way
/// one store patch is.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewStore {
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    calls: HashMap<CallId, Call>,
    proposals: HashMap<ProposalId, Proposal>,
    profiles: HashMap<UserId, EvaluatorProfile>,
    assignments: HashMap<(ProposalId, UserId), EvaluatorAssignment>,
    evaluations: HashMap<(ProposalId, UserId), Evaluation>,
    matches: HashMap<(ProposalId, UserId), EvaluatorMatch>,
    clarifications: HashMap<ClarificationId, ClarificationRequest>,
}

impl InMemoryReviewStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().expect("store mutex poisoned")
    }
}

impl ReviewStore for InMemoryReviewStore {
    fn insert_call(&self, call: Call) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if guard.calls.contains_key(&call.call_id) {
            return Err(StoreError::Conflict);
        }
        guard.calls.insert(call.call_id.clone(), call);
        Ok(())
    }

    fn fetch_call(&self, id: &CallId) -> Result<Option<Call>, StoreError> {
        Ok(self.lock().calls.get(id).cloned())
    }

    fn update_call(&self, call: Call) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if !guard.calls.contains_key(&call.call_id) {
            return Err(StoreError::NotFound);
        }
        guard.calls.insert(call.call_id.clone(), call);
        Ok(())
    }

    fn list_calls(&self) -> Result<Vec<Call>, StoreError> {
        Ok(self.lock().calls.values().cloned().collect())
    }

    fn insert_proposal(&self, proposal: Proposal) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if guard.proposals.contains_key(&proposal.proposal_id) {
            return Err(StoreError::Conflict);
        }
        guard.proposals.insert(proposal.proposal_id.clone(), proposal);
        Ok(())
    }

    fn fetch_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, StoreError> {
        Ok(self.lock().proposals.get(id).cloned())
    }

    fn update_proposal(&self, proposal: Proposal) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if !guard.proposals.contains_key(&proposal.proposal_id) {
            return Err(StoreError::NotFound);
        }
        guard.proposals.insert(proposal.proposal_id.clone(), proposal);
        Ok(())
    }

    fn list_proposals(&self) -> Result<Vec<Proposal>, StoreError> {
        Ok(self.lock().proposals.values().cloned().collect())
    }

    fn insert_profile(&self, profile: EvaluatorProfile) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if guard.profiles.contains_key(&profile.user_id) {
            return Err(StoreError::Conflict);
        }
        guard.profiles.insert(profile.user_id.clone(), profile);
        Ok(())
    }

    fn fetch_profile(&self, id: &UserId) -> Result<Option<EvaluatorProfile>, StoreError> {
        Ok(self.lock().profiles.get(id).cloned())
    }

    fn list_profiles(&self) -> Result<Vec<EvaluatorProfile>, StoreError> {
        Ok(self.lock().profiles.values().cloned().collect())
    }

    fn upsert_assignment(&self, assignment: EvaluatorAssignment) -> Result<(), StoreError> {
        let key = (
            assignment.proposal_id.clone(),
            assignment.evaluator_id.clone(),
        );
        self.lock().assignments.insert(key, assignment);
        Ok(())
    }

    fn fetch_assignment(
        &self,
        proposal: &ProposalId,
        evaluator: &UserId,
    ) -> Result<Option<EvaluatorAssignment>, StoreError> {
        let key = (proposal.clone(), evaluator.clone());
        Ok(self.lock().assignments.get(&key).cloned())
    }

    fn assignments_for_proposal(
        &self,
        proposal: &ProposalId,
    ) -> Result<Vec<EvaluatorAssignment>, StoreError> {
        Ok(self
            .lock()
            .assignments
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
            .lock()
            .assignments
            .values()
            .filter(|assignment| assignment.evaluator_id == *evaluator)
            .cloned()
            .collect())
    }

    fn list_assignments(&self) -> Result<Vec<EvaluatorAssignment>, StoreError> {
        Ok(self.lock().assignments.values().cloned().collect())
    }

    fn upsert_evaluation(&self, evaluation: Evaluation) -> Result<(), StoreError> {
        let key = (
            evaluation.proposal_id.clone(),
            evaluation.evaluator_id.clone(),
        );
        self.lock().evaluations.insert(key, evaluation);
        Ok(())
    }

    fn fetch_evaluation(
        &self,
        proposal: &ProposalId,
        evaluator: &UserId,
    ) -> Result<Option<Evaluation>, StoreError> {
        let key = (proposal.clone(), evaluator.clone());
        Ok(self.lock().evaluations.get(&key).cloned())
    }

    fn evaluations_for_proposal(
        &self,
        proposal: &ProposalId,
    ) -> Result<Vec<Evaluation>, StoreError> {
        Ok(self
            .lock()
            .evaluations
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
            .lock()
            .evaluations
            .values()
            .filter(|evaluation| evaluation.evaluator_id == *evaluator)
            .cloned()
            .collect())
    }

    fn list_evaluations(&self) -> Result<Vec<Evaluation>, StoreError> {
        Ok(self.lock().evaluations.values().cloned().collect())
    }

    fn upsert_match(&self, fitness: EvaluatorMatch) -> Result<(), StoreError> {
        let key = (fitness.proposal_id.clone(), fitness.evaluator_id.clone());
        self.lock().matches.insert(key, fitness);
        Ok(())
    }

    fn list_matches(&self) -> Result<Vec<EvaluatorMatch>, StoreError> {
        Ok(self.lock().matches.values().cloned().collect())
    }

    fn insert_clarification(&self, request: ClarificationRequest) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if guard.clarifications.contains_key(&request.clarification_id) {
            return Err(StoreError::Conflict);
        }
        guard
            .clarifications
            .insert(request.clarification_id.clone(), request);
        Ok(())
    }

    fn fetch_clarification(
        &self,
        id: &ClarificationId,
    ) -> Result<Option<ClarificationRequest>, StoreError> {
        Ok(self.lock().clarifications.get(id).cloned())
    }

    fn update_clarification(&self, request: ClarificationRequest) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if !guard.clarifications.contains_key(&request.clarification_id) {
            return Err(StoreError::NotFound);
        }
        guard
            .clarifications
            .insert(request.clarification_id.clone(), request);
        Ok(())
    }

    fn clarifications_for_proposal(
        &self,
        proposal: &ProposalId,
    ) -> Result<Vec<ClarificationRequest>, StoreError> {
        Ok(self
            .lock()
            .clarifications
            .values()
            .filter(|request| request.proposal_id == *proposal)
            .cloned()
            .collect())
    }
}

/// Collects audit records in memory; the demo prints them at the end.
#[derive(Default, Clone)]
pub(crate) struct InMemoryActivityLog {
    records: Arc<Mutex<Vec<ActivityRecord>>>,
}

impl InMemoryActivityLog {
    pub(crate) fn records(&self) -> Vec<ActivityRecord> {
        self.records.lock().expect("activity mutex poisoned").clone()
    }
}

impl ActivityPublisher for InMemoryActivityLog {
    fn publish(&self, record: ActivityRecord) -> Result<(), ActivityError> {
        self.records
            .lock()
            .expect("activity mutex poisoned")
            .push(record);
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
