//! Assignment matrix: the proposal-by-evaluator grid admins use for bulk
//! assignment management.
//!
//! The matrix joins proposal, assignment, and match records against the
//! evaluator pool. Filter vocabularies are always drawn from the unfiltered
//! pool so a narrowed view never shrinks its own filter choices.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::domain::{
    AssignmentStatus, Call, CallId, ConflictSeverity, Evaluation, EvaluatorAssignment,
    EvaluatorMatch, EvaluatorProfile, Proposal, ProposalId, ProposalStatus, Role, UserId,
};
use super::workload::{evaluator_workload, EvaluatorWorkload};

/// How fully staffed a proposal's review panel is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentCompleteness {
    NeedsAssignment,
    Partial,
    Complete,
}

impl AssignmentCompleteness {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentCompleteness::NeedsAssignment => "needs_assignment",
            AssignmentCompleteness::Partial => "partial",
            AssignmentCompleteness::Complete => "complete",
        }
    }
}

/// Completeness facet of [`MatrixFilters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessFilter {
    #[default]
    All,
    NeedsAssignment,
    Partial,
    Complete,
}

impl CompletenessFilter {
    const fn admits(self, completeness: AssignmentCompleteness) -> bool {
        match self {
            CompletenessFilter::All => true,
            CompletenessFilter::NeedsAssignment => {
                matches!(completeness, AssignmentCompleteness::NeedsAssignment)
            }
            CompletenessFilter::Partial => matches!(completeness, AssignmentCompleteness::Partial),
            CompletenessFilter::Complete => {
                matches!(completeness, AssignmentCompleteness::Complete)
            }
        }
    }
}

/// Caller-selected matrix scope. Empty vectors mean "no restriction" for
/// their facet; expertise matches on any shared research area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixFilters {
    pub calls: Vec<CallId>,
    pub proposal_statuses: Vec<ProposalStatus>,
    pub campuses: Vec<String>,
    pub departments: Vec<String>,
    pub expertise: Vec<String>,
    pub only_available: bool,
    pub completeness: CompletenessFilter,
}

/// Read-only slice of a precomputed evaluator match carried on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchSnapshot {
    pub match_score: f64,
    pub conflict: bool,
    pub conflict_severity: Option<ConflictSeverity>,
    pub stale: bool,
}

impl MatchSnapshot {
    fn from_record(record: &EvaluatorMatch) -> Self {
        MatchSnapshot {
            match_score: record.match_score,
            conflict: record.conflict,
            conflict_severity: record.conflict_severity,
            stale: record.stale,
        }
    }
}

/// One (proposal, evaluator) intersection. Both payloads serialize as
/// explicit nulls when absent so the grid stays rectangular for the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixCell {
    pub evaluator_id: UserId,
    pub assignment: Option<AssignmentStatus>,
    #[serde(rename = "match")]
    pub match_snapshot: Option<MatchSnapshot>,
}

/// One matrix row: a proposal with its panel state and per-evaluator cells.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalMatrixRow {
    pub proposal_id: ProposalId,
    pub call_id: CallId,
    pub summary: String,
    pub status: ProposalStatus,
    pub evaluators_required: u32,
    pub active_assignments: u32,
    pub completeness: AssignmentCompleteness,
    pub cells: Vec<MatrixCell>,
}

/// One matrix column: an evaluator with their current workload.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluatorColumn {
    pub evaluator_id: UserId,
    pub display_name: String,
    pub campus: String,
    pub department: String,
    pub research_areas: Vec<String>,
    pub active_assignments: u32,
    pub remaining_capacity: u32,
    pub available: bool,
    pub utilization_pct: f64,
}

impl EvaluatorColumn {
    fn new(profile: &EvaluatorProfile, workload: &EvaluatorWorkload) -> Self {
        EvaluatorColumn {
            evaluator_id: profile.user_id.clone(),
            display_name: profile.display_name.clone(),
            campus: profile.campus.clone(),
            department: profile.department.clone(),
            research_areas: profile.research_areas.clone(),
            active_assignments: workload.active_assignments,
            remaining_capacity: workload.remaining_capacity(),
            available: workload.is_available(),
            utilization_pct: workload.utilization_pct,
        }
    }
}

/// Headline counts for the matrix view.
///
/// Completeness buckets are tallied before the completeness filter is
/// applied, and availability before the only-available filter, so the
/// summary always describes the in-scope population rather than the
/// narrowed slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixSummary {
    pub total_proposals: usize,
    pub needs_assignment: usize,
    pub partial: usize,
    pub complete: usize,
    pub evaluators_total: usize,
    pub evaluators_available: usize,
}

/// Distinct filter vocabularies, sorted, drawn from the unfiltered pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub calls: Vec<CallId>,
    pub campuses: Vec<String>,
    pub departments: Vec<String>,
    pub expertise: Vec<String>,
}

/// The assembled grid.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentMatrix {
    pub rows: Vec<ProposalMatrixRow>,
    pub columns: Vec<EvaluatorColumn>,
    pub summary: MatrixSummary,
    pub options: FilterOptions,
}

/// Borrowed record sets the matrix is computed from.
#[derive(Debug, Clone, Copy)]
pub struct MatrixSources<'a> {
    pub calls: &'a [Call],
    pub proposals: &'a [Proposal],
    pub profiles: &'a [EvaluatorProfile],
    pub assignments: &'a [EvaluatorAssignment],
    pub matches: &'a [EvaluatorMatch],
    pub evaluations: &'a [Evaluation],
}

/// Bucket a proposal by its active assignment count against the call's
/// required panel size. Zero active always classifies as needing
/// assignment, even when the call requires none.
pub const fn classify_completeness(active: u32, required: u32) -> AssignmentCompleteness {
    if active == 0 {
        AssignmentCompleteness::NeedsAssignment
    } else if active < required {
        AssignmentCompleteness::Partial
    } else {
        AssignmentCompleteness::Complete
    }
}

/// Build the proposal-by-evaluator grid for the requested scope.
pub fn build_matrix(
    sources: &MatrixSources<'_>,
    filters: &MatrixFilters,
    capacity: u32,
) -> AssignmentMatrix {
    let proposals: Vec<&Proposal> = sources
        .proposals
        .iter()
        .filter(|proposal| filters.calls.is_empty() || filters.calls.contains(&proposal.call_id))
        .filter(|proposal| {
            filters.proposal_statuses.is_empty()
                || filters.proposal_statuses.contains(&proposal.status)
        })
        .collect();

    let pool: Vec<&EvaluatorProfile> = sources
        .profiles
        .iter()
        .filter(|profile| profile.role == Role::Evaluator)
        .collect();

    let options = filter_options(sources.calls, &pool);

    let mut columns: Vec<EvaluatorColumn> = pool
        .iter()
        .filter(|profile| filters.campuses.is_empty() || filters.campuses.contains(&profile.campus))
        .filter(|profile| {
            filters.departments.is_empty() || filters.departments.contains(&profile.department)
        })
        .filter(|profile| {
            filters.expertise.is_empty()
                || profile
                    .research_areas
                    .iter()
                    .any(|area| filters.expertise.contains(area))
        })
        .map(|profile| {
            let workload = evaluator_workload(
                &profile.user_id,
                sources.assignments,
                sources.evaluations,
                capacity,
            );
            EvaluatorColumn::new(profile, &workload)
        })
        .collect();

    let evaluators_total = columns.len();
    let evaluators_available = columns.iter().filter(|column| column.available).count();
    if filters.only_available {
        columns.retain(|column| column.available);
    }

    let assignment_index: HashMap<(&ProposalId, &UserId), &EvaluatorAssignment> = sources
        .assignments
        .iter()
        .map(|assignment| ((&assignment.proposal_id, &assignment.evaluator_id), assignment))
        .collect();
    let match_index: HashMap<(&ProposalId, &UserId), &EvaluatorMatch> = sources
        .matches
        .iter()
        .map(|record| ((&record.proposal_id, &record.evaluator_id), record))
        .collect();
    let required_by_call: HashMap<&CallId, u32> = sources
        .calls
        .iter()
        .map(|call| (&call.call_id, call.evaluation.evaluators_required))
        .collect();

    let mut summary = MatrixSummary {
        total_proposals: proposals.len(),
        needs_assignment: 0,
        partial: 0,
        complete: 0,
        evaluators_total,
        evaluators_available,
    };

    let mut rows = Vec::new();
    for proposal in proposals {
        let required = required_by_call
            .get(&proposal.call_id)
            .copied()
            .unwrap_or(0);
        // Completeness counts every active assignment on record, not just
        // those against evaluators surviving the column filters.
        let active = sources
            .assignments
            .iter()
            .filter(|assignment| {
                assignment.proposal_id == proposal.proposal_id && assignment.status.is_active()
            })
            .count() as u32;
        let completeness = classify_completeness(active, required);
        match completeness {
            AssignmentCompleteness::NeedsAssignment => summary.needs_assignment += 1,
            AssignmentCompleteness::Partial => summary.partial += 1,
            AssignmentCompleteness::Complete => summary.complete += 1,
        }
        if !filters.completeness.admits(completeness) {
            continue;
        }

        let cells = columns
            .iter()
            .map(|column| {
                let key = (&proposal.proposal_id, &column.evaluator_id);
                MatrixCell {
                    evaluator_id: column.evaluator_id.clone(),
                    assignment: assignment_index.get(&key).map(|record| record.status),
                    match_snapshot: match_index.get(&key).map(|record| {
                        MatchSnapshot::from_record(record)
                    }),
                }
            })
            .collect();

        rows.push(ProposalMatrixRow {
            proposal_id: proposal.proposal_id.clone(),
            call_id: proposal.call_id.clone(),
            summary: proposal.content.summary.clone(),
            status: proposal.status,
            evaluators_required: required,
            active_assignments: active,
            completeness,
            cells,
        });
    }

    AssignmentMatrix {
        rows,
        columns,
        summary,
        options,
    }
}

fn filter_options(calls: &[Call], pool: &[&EvaluatorProfile]) -> FilterOptions {
    let mut call_ids: Vec<CallId> = calls.iter().map(|call| call.call_id.clone()).collect();
    call_ids.sort();
    call_ids.dedup();

    let mut campuses = BTreeSet::new();
    let mut departments = BTreeSet::new();
    let mut expertise = BTreeSet::new();
    for profile in pool {
        if !profile.campus.is_empty() {
            campuses.insert(profile.campus.clone());
        }
        if !profile.department.is_empty() {
            departments.insert(profile.department.clone());
        }
        for area in &profile.research_areas {
            if !area.is_empty() {
                expertise.insert(area.clone());
            }
        }
    }

    FilterOptions {
        calls: call_ids,
        campuses: campuses.into_iter().collect(),
        departments: departments.into_iter().collect(),
        expertise: expertise.into_iter().collect(),
    }
}
