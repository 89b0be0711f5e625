pub mod agent;
pub mod assistant;
pub mod capability;
pub mod config;
pub mod decision;
pub mod error;
pub mod log;
pub mod orchestration;
pub mod workflow;

pub use agent::{Agent, AgentStatus, Message, MessageKind};
pub use assistant::{Assistant, Command, Reply};
pub use capability::{Capability, Outcome, Params};
pub use decision::{make_contextual_decision, Decision};
pub use error::{Error, ErrorKind, Result};
pub use orchestration::Orchestrator;
pub use workflow::{Workflow, WorkflowStep};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::json;
}
