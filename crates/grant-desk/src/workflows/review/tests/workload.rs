use super::common::{assignment, evaluation, profile};
use crate::workflows::review::domain::{AssignmentStatus, Role, UserId};
use crate::workflows::review::workload::{capacity_report, evaluator_workload};

#[test]
fn load_counts_only_pending_and_accepted_assignments() {
    let assignments = vec![
        assignment("prop-1", "eva-1", AssignmentStatus::Pending),
        assignment("prop-2", "eva-1", AssignmentStatus::Accepted),
        assignment("prop-3", "eva-1", AssignmentStatus::Declined),
        assignment("prop-4", "eva-1", AssignmentStatus::Removed),
        assignment("prop-1", "eva-2", AssignmentStatus::Accepted),
    ];

    let workload = evaluator_workload(&UserId("eva-1".to_string()), &assignments, &[], 5);

    assert_eq!(workload.active_assignments, 2);
    assert_eq!(workload.remaining_capacity(), 3);
    assert!(workload.is_available());
}

#[test]
fn utilization_is_the_completed_share_of_active_load() {
    let assignments = vec![
        assignment("prop-1", "eva-1", AssignmentStatus::Accepted),
        assignment("prop-2", "eva-1", AssignmentStatus::Accepted),
    ];
    let evaluations = vec![
        evaluation("prop-1", "eva-1", true),
        evaluation("prop-2", "eva-1", false),
        evaluation("prop-1", "eva-2", true),
    ];

    let workload =
        evaluator_workload(&UserId("eva-1".to_string()), &assignments, &evaluations, 5);

    assert_eq!(workload.completed_evaluations, 1);
    assert_eq!(workload.utilization_pct, 50.0);
}

#[test]
fn idle_evaluator_reports_zero_utilization() {
    let workload = evaluator_workload(&UserId("eva-1".to_string()), &[], &[], 5);

    assert_eq!(workload.active_assignments, 0);
    assert_eq!(workload.utilization_pct, 0.0);
}

#[test]
fn overloaded_evaluator_saturates_at_zero_remaining_capacity() {
    let assignments: Vec<_> = (0..7)
        .map(|n| assignment(&format!("prop-{n}"), "eva-1", AssignmentStatus::Accepted))
        .collect();

    let workload = evaluator_workload(&UserId("eva-1".to_string()), &assignments, &[], 5);

    assert_eq!(workload.active_assignments, 7);
    assert_eq!(workload.remaining_capacity(), 0);
    assert!(!workload.is_available());
}

#[test]
fn capacity_report_ranks_by_load_descending_then_id() {
    let profiles = vec![
        profile("eva-1", "North", "Biology", &["genomics"]),
        profile("eva-2", "North", "Physics", &["optics"]),
        profile("eva-3", "South", "Chemistry", &["catalysis"]),
    ];
    let assignments = vec![
        assignment("prop-1", "eva-2", AssignmentStatus::Accepted),
        assignment("prop-2", "eva-2", AssignmentStatus::Pending),
        assignment("prop-1", "eva-1", AssignmentStatus::Accepted),
    ];

    let report = capacity_report(&profiles, &assignments, &[], 5);

    let order: Vec<&str> = report
        .rows
        .iter()
        .map(|row| row.evaluator_id.0.as_str())
        .collect();
    assert_eq!(order, vec!["eva-2", "eva-1", "eva-3"]);
    assert_eq!(report.min_load, 0);
    assert_eq!(report.max_load, 2);
    assert_eq!(report.average_load, 1.0);
}

#[test]
fn capacity_report_skips_non_evaluator_profiles() {
    let mut admin = profile("adm-1", "North", "Administration", &[]);
    admin.role = Role::Admin;
    let profiles = vec![admin, profile("eva-1", "North", "Biology", &["genomics"])];

    let report = capacity_report(&profiles, &[], &[], 5);

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].evaluator_id.0, "eva-1");
}
