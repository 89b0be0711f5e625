//! Integration test suite for aide.
//!
//! These tests drive the public API the way a front end would: agents and
//! capabilities wired into an orchestrator, workflows run across them, and
//! the decision pipeline fed from real capability output.
//!
//! # Test Categories
//!
//! - `agent_execution`: Capability registry, status machine, fault isolation
//! - `workflows`: Stop/continue semantics across agents
//! - `messaging`: Routing, broadcast, and the message hook
//! - `decisions`: Weather, schedule, and synthesis scenarios
//! - `assistant`: Command dispatch and planning end to end
//!
//! All collaborators are in-memory; nothing touches the network.

mod fixtures;

mod agent_execution;
mod assistant;
mod decisions;
mod messaging;
mod workflows;
