//! Workflow execution tests.
//!
//! Steps run strictly in order; a failing step halts the run unless it is
//! marked `continue_on_error`.

use aide::workflow::{Workflow, WorkflowStatus, WorkflowStep};
use aide::ErrorKind;
use serde_json::json;

use crate::fixtures::{abc_orchestrator, CallJournal};

fn abc_steps(continue_b: bool) -> Vec<WorkflowStep> {
    let b = WorkflowStep::new("b", "b-step");
    vec![
        WorkflowStep::new("a", "a-step").param("n", 1),
        if continue_b { b.continue_on_error() } else { b },
        WorkflowStep::new("c", "c-step"),
    ]
}

/// Test: Halt on failure
/// Given workflow [A ok, B fails, C ok] with B not continuing
/// When it runs
/// Then two results are returned and C never runs
#[test]
fn test_failure_halts_workflow() {
    let journal = CallJournal::default();
    let (mut orchestrator, [a, b, c]) = abc_orchestrator(&journal);

    let results = orchestrator.execute_workflow(&abc_steps(false));

    assert_eq!(results.len(), 2);
    assert!(results[0].success);
    assert!(!results[1].success);
    assert_eq!((a.get(), b.get(), c.get()), (1, 1, 0));
    assert_eq!(journal.names(), vec!["a-step", "b-step"]);
}

/// Test: Continue past failure
/// Given the same workflow with B marked continue_on_error
/// When it runs
/// Then all three steps run in order
#[test]
fn test_continue_on_error_runs_all_steps() {
    let journal = CallJournal::default();
    let (mut orchestrator, [a, b, c]) = abc_orchestrator(&journal);

    let results = orchestrator.execute_workflow(&abc_steps(true));

    assert_eq!(results.len(), 3);
    assert_eq!(
        results.iter().map(|r| r.success).collect::<Vec<_>>(),
        vec![true, false, true]
    );
    assert_eq!((a.get(), b.get(), c.get()), (1, 1, 1));
    assert_eq!(journal.names(), vec!["a-step", "b-step", "c-step"]);
    assert_eq!(journal.params(0).unwrap()["n"], json!(1));
}

/// Test: Unknown agent is a failed step
#[test]
fn test_unknown_agent_step() {
    let journal = CallJournal::default();
    let (mut orchestrator, [a, _, _]) = abc_orchestrator(&journal);

    let results = orchestrator.execute_workflow(&[
        WorkflowStep::new("nobody", "a-step"),
        WorkflowStep::new("a", "a-step"),
    ]);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].error_kind, Some(ErrorKind::AgentNotFound));
    assert_eq!(a.get(), 0);
}

/// Test: Unknown capability on a known agent
#[test]
fn test_unknown_capability_step() {
    let journal = CallJournal::default();
    let (mut orchestrator, _) = abc_orchestrator(&journal);

    let results = orchestrator.execute_workflow(&[
        WorkflowStep::new("a", "c-step").continue_on_error(),
        WorkflowStep::new("c", "c-step"),
    ]);

    assert_eq!(results[0].error_kind, Some(ErrorKind::CapabilityNotFound));
    assert!(results[1].success);
}

/// Test: Workflow authored as TOML
/// Given a TOML workflow file
/// When it is run
/// Then the run reports where it halted
#[test]
fn test_run_toml_workflow() {
    let journal = CallJournal::default();
    let (mut orchestrator, [_, _, c]) = abc_orchestrator(&journal);

    let workflow = Workflow::from_toml(
        r#"
        name = "abc"

        [[steps]]
        agent = "a"
        capability = "a-step"
        params = { city = "Paris" }

        [[steps]]
        agent = "b"
        capability = "b-step"

        [[steps]]
        agent = "c"
        capability = "c-step"
        "#,
    )
    .unwrap();

    let run = orchestrator.run_workflow(&workflow);

    assert_eq!(run.status, WorkflowStatus::Halted { at_step: 1 });
    assert_eq!(run.results.len(), 2);
    assert_eq!(c.get(), 0);
    assert_eq!(journal.params(0).unwrap()["city"], json!("Paris"));
}
