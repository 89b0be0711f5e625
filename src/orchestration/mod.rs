//! Orchestration layer for multi-agent coordination.
//!
//! The `Orchestrator` owns agents by name, routes point-to-point and
//! broadcast messages between them, and runs workflows step by step.

mod orchestrator;

pub use orchestrator::Orchestrator;
