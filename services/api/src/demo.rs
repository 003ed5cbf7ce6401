use crate::infra::{InMemoryActivityLog, InMemoryReviewStore};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

use grant_desk::error::AppError;
use grant_desk::workflows::review::{
    Actor, AssignmentMethod, Call, CallBudget, CallId, CallStatus, CallWindow, CompletenessFilter,
    ConflictSeverity, CriterionId, EvaluationCriterion, EvaluationSettings, EvaluatorMatch,
    EvaluatorProfile, MatrixFilters, Proposal, ProposalContent, ProposalId, ProposalStatus,
    Recommendation, ReviewConfig, ReviewDecision, ReviewError, ReviewService, ReviewStore, Role,
    ScoreInput, StoreError, UserId,
};
use grant_desk::workflows::review::domain::{CriterionKind, ScoreDescriptor};

fn store_err(err: StoreError) -> AppError {
    AppError::from(ReviewError::from(err))
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Override the per-evaluator capacity used by the seeded pool.
    #[arg(long)]
    pub(crate) evaluator_capacity: Option<u32>,
    /// Skip the assignment matrix portion of the demo output.
    #[arg(long)]
    pub(crate) skip_matrix: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CapacityReportArgs {
    /// Override the per-evaluator capacity used by the seeded pool.
    #[arg(long)]
    pub(crate) evaluator_capacity: Option<u32>,
}

fn review_config(capacity: Option<u32>) -> ReviewConfig {
    match capacity {
        Some(evaluator_capacity) => ReviewConfig { evaluator_capacity },
        None => ReviewConfig::default(),
    }
}

type DemoService = ReviewService<InMemoryReviewStore, InMemoryActivityLog>;

fn build_service(
    config: ReviewConfig,
) -> (Arc<DemoService>, Arc<InMemoryReviewStore>, Arc<InMemoryActivityLog>) {
    let store = Arc::new(InMemoryReviewStore::default());
    let activity = Arc::new(InMemoryActivityLog::default());
    let service = Arc::new(ReviewService::new(store.clone(), activity.clone(), config));
    (service, store, activity)
}

fn demo_criteria() -> Vec<EvaluationCriterion> {
    vec![
        EvaluationCriterion {
            criterion_id: CriterionId("crit-merit".to_string()),
            name: "Scientific merit".to_string(),
            description: "Originality and rigor of the proposed research".to_string(),
            weight: 60.0,
            max_score: 10.0,
            scale: vec![
                ScoreDescriptor {
                    score: 3,
                    text: "Incremental".to_string(),
                },
                ScoreDescriptor {
                    score: 7,
                    text: "Strong contribution".to_string(),
                },
                ScoreDescriptor {
                    score: 10,
                    text: "Field-defining".to_string(),
                },
            ],
            kind: CriterionKind::Merit,
            comment_required: true,
        },
        EvaluationCriterion {
            criterion_id: CriterionId("crit-feasibility".to_string()),
            name: "Feasibility".to_string(),
            description: "Realism of the plan, timeline, and budget".to_string(),
            weight: 40.0,
            max_score: 5.0,
            scale: Vec::new(),
            kind: CriterionKind::Feasibility,
            comment_required: false,
        },
    ]
}

fn demo_call(today: NaiveDate) -> Call {
    Call {
        call_id: CallId("call-2026-seed".to_string()),
        title: "Seed Grants 2026".to_string(),
        status: CallStatus::Open,
        window: CallWindow {
            opens_on: today - Duration::days(30),
            closes_on: today + Duration::days(30),
            evaluation_due: Some(today + Duration::days(60)),
            decision_due: Some(today + Duration::days(75)),
            project_start: Some(today + Duration::days(120)),
        },
        budget: CallBudget {
            total: 500_000,
            per_project_min: 10_000,
            per_project_max: 50_000,
        },
        evaluation: EvaluationSettings {
            evaluators_required: 2,
            assignment_method: AssignmentMethod::Manual,
            blind_review: false,
            require_conflict_declaration: true,
        },
        criteria: demo_criteria(),
    }
}

fn demo_profiles() -> Vec<EvaluatorProfile> {
    vec![
        EvaluatorProfile {
            user_id: UserId("eva-ramos".to_string()),
            display_name: "Dr. Ramos".to_string(),
            role: Role::Evaluator,
            campus: "North".to_string(),
            department: "Biology".to_string(),
            research_areas: vec!["genomics".to_string(), "microbiology".to_string()],
        },
        EvaluatorProfile {
            user_id: UserId("eva-chen".to_string()),
            display_name: "Dr. Chen".to_string(),
            role: Role::Evaluator,
            campus: "North".to_string(),
            department: "Computer Science".to_string(),
            research_areas: vec!["machine learning".to_string()],
        },
        EvaluatorProfile {
            user_id: UserId("eva-okafor".to_string()),
            display_name: "Dr. Okafor".to_string(),
            role: Role::Evaluator,
            campus: "South".to_string(),
            department: "Chemistry".to_string(),
            research_areas: vec!["materials".to_string(), "catalysis".to_string()],
        },
    ]
}

fn demo_proposal(id: &str, pi: &str, summary: &str, budget: u64) -> Proposal {
    Proposal {
        proposal_id: ProposalId(id.to_string()),
        call_id: CallId("call-2026-seed".to_string()),
        principal_investigator: UserId(pi.to_string()),
        team_members: Vec::new(),
        content: ProposalContent {
            summary: summary.to_string(),
            narrative: "Full narrative omitted in the demo seed.".to_string(),
            requested_budget: budget,
            timeline_months: 18,
        },
        status: ProposalStatus::Draft,
        assigned_evaluators: Vec::new(),
        decision: None,
        execution: None,
        submitted_at: None,
    }
}

fn seed(
    service: &DemoService,
    store: &InMemoryReviewStore,
    admin: &Actor,
    today: NaiveDate,
) -> Result<(), AppError> {
    service
        .create_call(admin, demo_call(today))
        .map_err(AppError::from)?;
    for profile in demo_profiles() {
        store.insert_profile(profile).map_err(store_err)?;
    }
    for proposal in [
        demo_proposal(
            "prop-soil",
            "pi-alvarez",
            "Soil microbiome resilience",
            42_000,
        ),
        demo_proposal(
            "prop-vision",
            "pi-bakker",
            "Low-power vision models for field robotics",
            35_000,
        ),
        demo_proposal("prop-solar", "pi-costa", "Perovskite cell stability", 48_000),
    ] {
        store.insert_proposal(proposal).map_err(store_err)?;
    }
    // Match rows come from the external matching collaborator; the demo
    // seeds a few directly, leaving some pairs without one.
    for (proposal, evaluator, score, conflict) in [
        ("prop-soil", "eva-ramos", 0.92, false),
        ("prop-soil", "eva-chen", 0.41, false),
        ("prop-vision", "eva-chen", 0.88, false),
        ("prop-solar", "eva-okafor", 0.83, true),
    ] {
        store
            .upsert_match(EvaluatorMatch {
                proposal_id: ProposalId(proposal.to_string()),
                evaluator_id: UserId(evaluator.to_string()),
                match_score: score,
                expertise_score: score,
                availability_score: 0.8,
                performance_score: 0.75,
                conflict,
                conflict_severity: conflict.then_some(ConflictSeverity::Medium),
                stale: false,
            })
            .map_err(store_err)?;
    }
    Ok(())
}

fn scores(merit: f64, feasibility: f64) -> Vec<ScoreInput> {
    vec![
        ScoreInput {
            criterion_id: CriterionId("crit-merit".to_string()),
            score: Some(merit),
            comments: Some("Well grounded in prior work.".to_string()),
            strengths: Some("Clear hypotheses".to_string()),
            weaknesses: None,
        },
        ScoreInput {
            criterion_id: CriterionId("crit-feasibility".to_string()),
            score: Some(feasibility),
            comments: None,
            strengths: None,
            weaknesses: Some("Timeline is ambitious".to_string()),
        },
    ]
}

pub(crate) fn run_capacity_report(args: CapacityReportArgs) -> Result<(), AppError> {
    let today = Local::now().date_naive();
    let config = review_config(args.evaluator_capacity);
    let (service, store, _) = build_service(config);
    let admin = Actor::new("admin-demo", Role::Admin);

    seed(&service, &store, &admin, today)?;
    for (proposal, evaluator) in [
        ("prop-soil", "eva-ramos"),
        ("prop-soil", "eva-chen"),
        ("prop-vision", "eva-chen"),
    ] {
        service.quick_assign(
            &admin,
            &ProposalId(proposal.to_string()),
            &UserId(evaluator.to_string()),
        )?;
    }

    let report = service.capacity_report(&admin)?;
    render_capacity_report(&report);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        evaluator_capacity,
        skip_matrix,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    println!("Grant review desk demo (evaluated {today})");
    let config = review_config(evaluator_capacity);
    let (service, store, activity) = build_service(config);
    let admin = Actor::new("admin-demo", Role::Admin);
    seed(&service, &store, &admin, today)?;

    println!("\nProposal intake");
    let pi = Actor::new("pi-alvarez", Role::Faculty);
    let proposal_id = ProposalId("prop-soil".to_string());
    let proposal = service.submit_proposal(&pi, &proposal_id)?;
    println!(
        "- {} submitted by {} -> status {}",
        proposal.proposal_id.0,
        proposal.principal_investigator.0,
        proposal.status.label()
    );
    for other in ["prop-vision", "prop-solar"] {
        let owner = if other == "prop-vision" {
            Actor::new("pi-bakker", Role::Faculty)
        } else {
            Actor::new("pi-costa", Role::Faculty)
        };
        service.submit_proposal(&owner, &ProposalId(other.to_string()))?;
    }

    println!("\nPanel assembly");
    for evaluator in ["eva-ramos", "eva-chen"] {
        let assignment =
            service.quick_assign(&admin, &proposal_id, &UserId(evaluator.to_string()))?;
        println!(
            "- {} assigned to {} ({})",
            assignment.evaluator_id.0,
            assignment.proposal_id.0,
            assignment.status.label()
        );
    }
    let ramos = Actor::new("eva-ramos", Role::Evaluator);
    let chen = Actor::new("eva-chen", Role::Evaluator);
    service.respond_assignment(&ramos, &proposal_id, true, None)?;
    service.respond_assignment(&chen, &proposal_id, true, None)?;

    println!("\nScoring");
    let draft = service.save_draft(&ramos, &proposal_id, &scores(8.0, 4.0), None)?;
    println!(
        "- {} draft saved, running overall {:.2} (proposal now under review)",
        draft.evaluator_id.0, draft.overall_score
    );
    let first = service.submit_evaluation(
        &ramos,
        &proposal_id,
        &scores(8.0, 4.0),
        Some(Recommendation::Approve),
    )?;
    println!(
        "- {} submitted: overall {:.2}",
        first.evaluator_id.0, first.overall_score
    );

    println!("\nQuorum gate");
    match service.finalize_decision(&admin, &proposal_id, ReviewDecision::Approved, None) {
        Err(err) => println!("- early approval rejected: {err}"),
        Ok(_) => println!("- unexpected: approval passed with one evaluation"),
    }

    let second = service.submit_evaluation(
        &chen,
        &proposal_id,
        &scores(9.0, 5.0),
        Some(Recommendation::ApproveWithModifications),
    )?;
    println!(
        "- {} submitted: overall {:.2}",
        second.evaluator_id.0, second.overall_score
    );

    let decided = service.finalize_decision(
        &admin,
        &proposal_id,
        ReviewDecision::Approved,
        Some("Fund at requested level.".to_string()),
    )?;
    println!(
        "- decision recorded: {} -> {}",
        decided.proposal_id.0,
        decided.status.label()
    );

    let progress = service.review_progress(&admin, &proposal_id)?;
    println!(
        "- panel {}/{} complete, average score {}",
        progress.completed_evaluations,
        progress.evaluators_required,
        progress
            .average_score
            .map(|score| format!("{score:.2}"))
            .unwrap_or_else(|| "n/a".to_string())
    );

    if !skip_matrix {
        println!("\nAssignment matrix");
        let matrix = service.assignment_matrix(
            &admin,
            &MatrixFilters {
                completeness: CompletenessFilter::All,
                ..MatrixFilters::default()
            },
        )?;
        println!(
            "- {} proposals: {} need assignment, {} partial, {} complete | {}/{} evaluators available",
            matrix.summary.total_proposals,
            matrix.summary.needs_assignment,
            matrix.summary.partial,
            matrix.summary.complete,
            matrix.summary.evaluators_available,
            matrix.summary.evaluators_total
        );
        for row in &matrix.rows {
            println!(
                "- {} [{}] active {}/{}",
                row.proposal_id.0,
                row.completeness.label(),
                row.active_assignments,
                row.evaluators_required
            );
            for cell in &row.cells {
                let assignment = cell
                    .assignment
                    .map(|status| status.label())
                    .unwrap_or("-");
                let fitness = cell
                    .match_snapshot
                    .map(|snapshot| format!("{:.2}", snapshot.match_score))
                    .unwrap_or_else(|| "none".to_string());
                println!(
                    "    {} | assignment {} | match {}",
                    cell.evaluator_id.0, assignment, fitness
                );
            }
        }
    }

    println!("\nCapacity planning");
    let report = service.capacity_report(&admin)?;
    render_capacity_report(&report);

    let records = activity.records();
    println!("\nAudit trail ({} records)", records.len());
    for record in records {
        println!(
            "- {} {} {}:{}",
            record.actor.0,
            record.action.as_str(),
            record.entity_type,
            record.entity_id
        );
    }

    Ok(())
}

fn render_capacity_report(report: &grant_desk::workflows::review::CapacityReport) {
    println!(
        "- pool load min {} / max {} / avg {:.2}",
        report.min_load, report.max_load, report.average_load
    );
    for row in &report.rows {
        println!(
            "- {} ({}, {}): {} active, {} completed, {} slots free, {:.0}% utilized{}",
            row.display_name,
            row.campus,
            row.department,
            row.active_assignments,
            row.completed_evaluations,
            row.remaining_capacity,
            row.utilization_pct,
            if row.available { "" } else { " [at capacity]" }
        );
    }
}
