use serde::Serialize;

use super::domain::{Evaluation, EvaluatorAssignment, EvaluatorProfile, Role, UserId};
use super::scoring::round2;

/// Per-evaluator load snapshot derived from assignment and evaluation
/// records.
///
/// Load counts assignments with status pending or accepted; declined and
/// removed assignments do not occupy capacity. Utilization is the share of
/// that load already covered by a completed evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatorWorkload {
    pub evaluator_id: UserId,
    pub active_assignments: u32,
    pub completed_evaluations: u32,
    pub capacity: u32,
    pub utilization_pct: f64,
}

impl EvaluatorWorkload {
    pub fn remaining_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.active_assignments)
    }

    /// An evaluator is available while any capacity remains.
    pub fn is_available(&self) -> bool {
        self.remaining_capacity() > 0
    }
}

/// Derive one evaluator's workload from their assignment and evaluation
/// records. Both slices may contain records for other evaluators; only the
/// matching ones are counted.
pub fn evaluator_workload(
    evaluator_id: &UserId,
    assignments: &[EvaluatorAssignment],
    evaluations: &[Evaluation],
    capacity: u32,
) -> EvaluatorWorkload {
    let active = assignments
        .iter()
        .filter(|assignment| {
            assignment.evaluator_id == *evaluator_id && assignment.status.is_active()
        })
        .count() as u32;

    let completed = evaluations
        .iter()
        .filter(|evaluation| {
            evaluation.evaluator_id == *evaluator_id && evaluation.is_completed()
        })
        .count() as u32;

    let utilization_pct = if active == 0 {
        0.0
    } else {
        round2(f64::from(completed) / f64::from(active) * 100.0)
    };

    EvaluatorWorkload {
        evaluator_id: evaluator_id.clone(),
        active_assignments: active,
        completed_evaluations: completed,
        capacity,
        utilization_pct,
    }
}

/// One line of the capacity-planning report.
#[derive(Debug, Clone, Serialize)]
pub struct CapacityRow {
    pub evaluator_id: UserId,
    pub display_name: String,
    pub campus: String,
    pub department: String,
    pub active_assignments: u32,
    pub completed_evaluations: u32,
    pub capacity: u32,
    pub remaining_capacity: u32,
    pub available: bool,
    pub utilization_pct: f64,
}

/// Capacity-planning view over the whole evaluator pool, ranked by load
/// descending.
#[derive(Debug, Clone, Serialize)]
pub struct CapacityReport {
    pub rows: Vec<CapacityRow>,
    pub min_load: u32,
    pub max_load: u32,
    pub average_load: f64,
}

/// Build the capacity report across every evaluator-role profile.
pub fn capacity_report(
    profiles: &[EvaluatorProfile],
    assignments: &[EvaluatorAssignment],
    evaluations: &[Evaluation],
    capacity: u32,
) -> CapacityReport {
    let mut rows: Vec<CapacityRow> = profiles
        .iter()
        .filter(|profile| profile.role == Role::Evaluator)
        .map(|profile| {
            let workload = evaluator_workload(&profile.user_id, assignments, evaluations, capacity);
            CapacityRow {
                evaluator_id: profile.user_id.clone(),
                display_name: profile.display_name.clone(),
                campus: profile.campus.clone(),
                department: profile.department.clone(),
                active_assignments: workload.active_assignments,
                completed_evaluations: workload.completed_evaluations,
                capacity: workload.capacity,
                remaining_capacity: workload.remaining_capacity(),
                available: workload.is_available(),
                utilization_pct: workload.utilization_pct,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.active_assignments
            .cmp(&a.active_assignments)
            .then_with(|| a.evaluator_id.cmp(&b.evaluator_id))
    });

    let loads: Vec<u32> = rows.iter().map(|row| row.active_assignments).collect();
    let min_load = loads.iter().copied().min().unwrap_or(0);
    let max_load = loads.iter().copied().max().unwrap_or(0);
    let average_load = if loads.is_empty() {
        0.0
    } else {
        round2(loads.iter().map(|load| f64::from(*load)).sum::<f64>() / loads.len() as f64)
    };

    CapacityReport {
        rows,
        min_load,
        max_load,
        average_load,
    }
}
