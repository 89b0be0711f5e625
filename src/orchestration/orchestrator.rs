//! Agent registry, message router, and workflow runner.

use std::collections::HashMap;

use crate::agent::{Agent, Message, MessageKind};
use crate::capability::Outcome;
use crate::error::{Error, Result};
use crate::workflow::{Workflow, WorkflowRun, WorkflowStatus, WorkflowStep};
use crate::{alog, alog_debug, alog_warn};

/// Owns a set of uniquely named agents.
///
/// Agents keep their registration order; re-registering a name replaces
/// the agent in place.
pub struct Orchestrator {
    name: String,
    agents: HashMap<String, Agent>,
    order: Vec<String>,
}

impl Orchestrator {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        alog!("Orchestrator '{}' initialized", name);
        Self {
            name,
            agents: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an agent, returning the one it replaced, if any.
    pub fn register_agent(&mut self, agent: Agent) -> Option<Agent> {
        let name = agent.name().to_string();
        let previous = self.agents.insert(name.clone(), agent);
        if previous.is_none() {
            self.order.push(name.clone());
            alog!("Registered agent '{}' with orchestrator '{}'", name, self.name);
        } else {
            alog!("Replaced agent '{}' in orchestrator '{}'", name, self.name);
        }
        previous
    }

    pub fn unregister_agent(&mut self, name: &str) -> Option<Agent> {
        let removed = self.agents.remove(name);
        if removed.is_some() {
            self.order.retain(|n| n != name);
            alog!("Unregistered agent '{}' from orchestrator '{}'", name, self.name);
        }
        removed
    }

    pub fn get_agent(&self, name: &str) -> Option<&Agent> {
        self.agents.get(name)
    }

    pub fn get_agent_mut(&mut self, name: &str) -> Option<&mut Agent> {
        self.agents.get_mut(name)
    }

    /// Agent names in registration order.
    pub fn list_agents(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Deliver a message to its recipient. Unknown recipients drop the
    /// message and report `RecipientNotFound`.
    pub fn route_message(&mut self, message: Message) -> Result<()> {
        match self.agents.get_mut(message.recipient()) {
            Some(agent) => {
                agent.receive_message(message);
                Ok(())
            }
            None => {
                alog_warn!(
                    "Agent '{}' not found for message from '{}', dropped",
                    message.recipient(),
                    message.sender()
                );
                Err(Error::RecipientNotFound(message.recipient().to_string()))
            }
        }
    }

    /// Have `sender` compose a text message and route it.
    pub fn send(&mut self, sender: &str, recipient: &str, content: &str) -> Result<Message> {
        let message = self
            .agents
            .get_mut(sender)
            .ok_or_else(|| Error::AgentNotFound(sender.to_string()))?
            .send_message(recipient, content, MessageKind::Text);
        self.route_message(message.clone())?;
        Ok(message)
    }

    /// Deliver one broadcast message to every agent except `sender`.
    /// Returns the number of deliveries.
    pub fn broadcast_message(&mut self, sender: &str, content: &str) -> usize {
        let mut delivered = 0;
        for name in &self.order {
            if name == sender {
                continue;
            }
            if let Some(agent) = self.agents.get_mut(name) {
                agent.receive_message(Message::new(sender, name.clone(), content, MessageKind::Broadcast));
                delivered += 1;
            }
        }
        alog!("Broadcast from '{}' delivered to {} agent(s)", sender, delivered);
        delivered
    }

    /// Run steps strictly in order.
    ///
    /// A failing step halts the run unless it has `continue_on_error`; the
    /// returned list then ends with that step's outcome.
    pub fn execute_workflow(&mut self, steps: &[WorkflowStep]) -> Vec<Outcome> {
        self.run_steps(steps).0
    }

    pub fn run_workflow(&mut self, workflow: &Workflow) -> WorkflowRun {
        alog!(
            "Running workflow '{}' ({}) with {} step(s)",
            workflow.name,
            workflow.id.short(),
            workflow.steps.len()
        );
        let (results, status) = self.run_steps(&workflow.steps);
        WorkflowRun {
            workflow_id: workflow.id,
            results,
            status,
        }
    }

    fn run_steps(&mut self, steps: &[WorkflowStep]) -> (Vec<Outcome>, WorkflowStatus) {
        let mut results = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            let outcome = match self.agents.get_mut(&step.agent) {
                Some(agent) => agent.execute_capability(&step.capability, &step.params),
                None => Outcome::from_error(&Error::AgentNotFound(step.agent.clone())),
            };
            alog_debug!(
                "Workflow step {} {}.{}: success={}",
                index,
                step.agent,
                step.capability,
                outcome.success
            );

            let halt = !outcome.success && !step.continue_on_error;
            if halt {
                alog_warn!("Workflow stopped at step {}: {}", index, outcome.message);
            }
            results.push(outcome);
            if halt {
                return (results, WorkflowStatus::Halted { at_step: index });
            }
        }

        (results, WorkflowStatus::Completed)
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("name", &self.name)
            .field("agents", &self.order)
            .finish()
    }
}
