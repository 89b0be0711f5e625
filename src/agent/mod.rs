//! Agents: owners of capabilities, status, memory, and a message log.
//!
//! An `Agent` is one concrete type. Behaviour that differs between agents
//! comes from what is injected: the capability set and a `Reasoner`
//! strategy that answers free text and reacts to incoming messages.

mod memory;
mod message;

pub use memory::{Memory, MemoryEntry};
pub use message::{Message, MessageKind};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::capability::{Capability, CapabilityInfo, Outcome, Params};
use crate::error::{Error, Result};
use crate::{alog, alog_debug, alog_error, alog_trace};

/// Lifecycle status of an agent.
///
/// Only `Agent::execute_capability` moves an agent between states:
/// `Idle -> Executing -> {Idle, Error}`, and `Error -> Executing` on the
/// next call, which lands back on `Idle` if it completes without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    /// Reserved for reasoning strategies that report progress; the core
    /// never enters it.
    Thinking,
    Executing,
    Error,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Idle => write!(f, "idle"),
            AgentStatus::Thinking => write!(f, "thinking"),
            AgentStatus::Executing => write!(f, "executing"),
            AgentStatus::Error => write!(f, "error"),
        }
    }
}

/// Read-only view of an agent handed to its reasoner.
#[derive(Debug, Clone)]
pub struct AgentProfile<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub capabilities: Vec<&'a str>,
}

/// Injected reasoning strategy.
pub trait Reasoner {
    /// Answer free-form input.
    fn think(&self, profile: &AgentProfile<'_>, input: &str) -> String;

    /// Hook run after a received message is logged.
    fn on_message(&mut self, _memory: &mut Memory, _message: &Message) {}
}

/// Reasoner used when nothing smarter is injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackReasoner;

impl Reasoner for FallbackReasoner {
    fn think(&self, profile: &AgentProfile<'_>, input: &str) -> String {
        if profile.capabilities.is_empty() {
            format!("I received: '{}'. I have no capabilities yet.", input)
        } else {
            format!(
                "I received: '{}'. I can help with: {}.",
                input,
                profile.capabilities.join(", ")
            )
        }
    }
}

struct Slot {
    enabled: bool,
    capability: Box<dyn Capability>,
}

pub struct Agent {
    name: String,
    description: String,
    status: AgentStatus,
    capabilities: Vec<Slot>,
    memory: Memory,
    message_log: Vec<Message>,
    reasoner: Box<dyn Reasoner>,
    created_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        alog!("Agent '{}' initialized", name);
        Self {
            name,
            description: description.into(),
            status: AgentStatus::Idle,
            capabilities: Vec::new(),
            memory: Memory::new(),
            message_log: Vec::new(),
            reasoner: Box::new(FallbackReasoner),
            created_at: Utc::now(),
        }
    }

    pub fn with_reasoner(mut self, reasoner: Box<dyn Reasoner>) -> Self {
        self.reasoner = reasoner;
        self
    }

    pub fn with_capability(mut self, capability: Box<dyn Capability>) -> Self {
        self.add_capability(capability);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Register a capability, replacing one with the same name.
    pub fn add_capability(&mut self, capability: Box<dyn Capability>) {
        let name = capability.name().to_string();
        match self.slot_mut(&name) {
            Some(slot) => slot.capability = capability,
            None => self.capabilities.push(Slot {
                enabled: true,
                capability,
            }),
        }
        alog!("Added capability '{}' to agent '{}'", name, self.name);
    }

    /// Returns whether a capability was removed.
    pub fn remove_capability(&mut self, name: &str) -> bool {
        let before = self.capabilities.len();
        self.capabilities.retain(|s| s.capability.name() != name);
        let removed = self.capabilities.len() != before;
        if removed {
            alog!("Removed capability '{}' from agent '{}'", name, self.name);
        }
        removed
    }

    /// Capability names in registration order.
    pub fn list_capabilities(&self) -> Vec<&str> {
        self.capabilities.iter().map(|s| s.capability.name()).collect()
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    pub fn capability_info(&self, name: &str) -> Option<CapabilityInfo> {
        self.slot(name).map(Slot::info)
    }

    pub fn describe_capabilities(&self) -> Vec<CapabilityInfo> {
        self.capabilities.iter().map(Slot::info).collect()
    }

    pub fn set_capability_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        let agent = self.name.clone();
        let slot = self
            .slot_mut(name)
            .ok_or_else(|| Error::CapabilityNotFound(name.to_string()))?;
        slot.enabled = enabled;
        alog!(
            "Capability '{}' on agent '{}' {}",
            name,
            agent,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    /// Run a registered capability. Never panics and never leaves the
    /// agent in `Executing`.
    pub fn execute_capability(&mut self, name: &str, params: &Params) -> Outcome {
        let Some(slot) = self
            .capabilities
            .iter_mut()
            .find(|s| s.capability.name() == name)
        else {
            return Outcome::from_error(&Error::CapabilityNotFound(name.to_string()));
        };
        if !slot.enabled {
            return Outcome::from_error(&Error::CapabilityDisabled(name.to_string()));
        }

        self.status = AgentStatus::Executing;
        alog_debug!("Executing capability '{}' for agent '{}'", name, self.name);
        alog_trace!("params: {}", Value::Object(params.clone()));

        let result = panic::catch_unwind(AssertUnwindSafe(|| slot.capability.execute(params)));

        match result {
            Ok(outcome) => {
                self.status = AgentStatus::Idle;
                alog_debug!(
                    "Capability '{}' finished: success={}",
                    name,
                    outcome.success
                );
                outcome
            }
            Err(payload) => {
                self.status = AgentStatus::Error;
                let err = Error::Execution(format!(
                    "capability '{}' faulted: {}",
                    name,
                    panic_text(payload.as_ref())
                ));
                alog_error!("Agent '{}': {}", self.name, err);
                Outcome::from_error(&err)
            }
        }
    }

    /// Ask the injected reasoner to answer free text.
    pub fn think(&self, input: &str) -> String {
        let profile = AgentProfile {
            name: &self.name,
            description: &self.description,
            capabilities: self.list_capabilities(),
        };
        self.reasoner.think(&profile, input)
    }

    /// Build a message from this agent and log it. Delivery is the
    /// orchestrator's job.
    pub fn send_message(
        &mut self,
        recipient: impl Into<String>,
        content: impl Into<String>,
        kind: MessageKind,
    ) -> Message {
        let message = Message::new(self.name.clone(), recipient, content, kind);
        alog_debug!("Message sent from '{}' to '{}'", self.name, message.recipient());
        self.message_log.push(message.clone());
        message
    }

    /// Log an incoming message, then hand it to the reasoner.
    pub fn receive_message(&mut self, message: Message) {
        alog_debug!("Message received by '{}' from '{}'", self.name, message.sender());
        self.message_log.push(message);
        if let Some(message) = self.message_log.last() {
            self.reasoner.on_message(&mut self.memory, message);
        }
    }

    pub fn message_log(&self) -> &[Message] {
        &self.message_log
    }

    pub fn store_memory(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        alog_debug!("Stored memory '{}' for agent '{}'", key, self.name);
        self.memory.store(key, value);
    }

    pub fn retrieve_memory(&self, key: &str) -> Option<&Value> {
        self.memory.retrieve(key)
    }

    /// Remove one entry, or all of them when `key` is `None`.
    pub fn clear_memory(&mut self, key: Option<&str>) {
        self.memory.clear(key);
        match key {
            Some(k) => alog_debug!("Cleared memory '{}' for agent '{}'", k, self.name),
            None => alog_debug!("Cleared all memory for agent '{}'", self.name),
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    fn slot(&self, name: &str) -> Option<&Slot> {
        self.capabilities.iter().find(|s| s.capability.name() == name)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.capabilities.iter_mut().find(|s| s.capability.name() == name)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("capabilities", &self.list_capabilities())
            .field("memory_keys", &self.memory.keys())
            .field("messages", &self.message_log.len())
            .finish()
    }
}

impl Slot {
    fn info(&self) -> CapabilityInfo {
        CapabilityInfo {
            name: self.capability.name().to_string(),
            description: self.capability.description().to_string(),
            enabled: self.enabled,
        }
    }
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown fault".to_string()
    }
}
