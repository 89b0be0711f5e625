//! Workflow definitions: ordered capability invocations across agents.
//!
//! Execution lives on `Orchestrator`, which owns the agents the steps name.

mod types;

pub use types::{Workflow, WorkflowId, WorkflowRun, WorkflowStatus, WorkflowStep};
