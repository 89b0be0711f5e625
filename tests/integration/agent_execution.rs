//! Agent capability execution tests.
//!
//! Verify the failure-as-data contract: nothing a capability does can
//! escape the agent, and status always settles out of `Executing`.

use aide::agent::{AgentProfile, AgentStatus, Memory, Message, Reasoner};
use aide::{params, Agent, ErrorKind};
use serde_json::json;

use crate::fixtures::SpyCapability;

/// Test: Unknown capability
/// Given an agent without capability "ghost"
/// When "ghost" is executed
/// Then CAPABILITY_NOT_FOUND is returned and status stays Idle
#[test]
fn test_unregistered_capability_not_found() {
    let mut agent = Agent::new("solo", "").with_capability(Box::new(SpyCapability::succeeding("real")));

    for name in ["ghost", "", "REAL", "real "] {
        let outcome = agent.execute_capability(name, &params!());
        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, Some(ErrorKind::CapabilityNotFound), "{:?}", name);
        assert_eq!(agent.status(), AgentStatus::Idle);
    }
}

/// Test: Disabled capability has no side effects
/// Given a spy capability that has been disabled
/// When it is executed
/// Then CAPABILITY_DISABLED is returned and the spy was never invoked
#[test]
fn test_disabled_capability_never_invoked() {
    let spy = SpyCapability::succeeding("spy");
    let calls = spy.counter();
    let mut agent = Agent::new("solo", "").with_capability(Box::new(spy));

    agent.set_capability_enabled("spy", false).unwrap();
    let outcome = agent.execute_capability("spy", &params!());

    assert_eq!(outcome.error_kind, Some(ErrorKind::CapabilityDisabled));
    assert_eq!(calls.get(), 0);
    assert_eq!(agent.status(), AgentStatus::Idle);
    assert!(!agent.capability_info("spy").unwrap().enabled);

    agent.set_capability_enabled("spy", true).unwrap();
    assert!(agent.execute_capability("spy", &params!()).success);
    assert_eq!(calls.get(), 1);
}

/// Test: Fault isolation
/// Given a capability that panics
/// When it is executed
/// Then EXECUTION_ERROR carries the panic text and status is Error
/// And the next successful call resets status to Idle
#[test]
fn test_panic_becomes_execution_error() {
    let mut agent = Agent::new("solo", "")
        .with_capability(Box::new(SpyCapability::panicking("boom", "disk on fire")))
        .with_capability(Box::new(SpyCapability::succeeding("fine")));

    let outcome = agent.execute_capability("boom", &params!());
    assert!(!outcome.success);
    assert_eq!(outcome.error_kind, Some(ErrorKind::ExecutionError));
    assert!(outcome.message.contains("disk on fire"), "{}", outcome.message);
    assert_eq!(agent.status(), AgentStatus::Error);

    let outcome = agent.execute_capability("ghost", &params!());
    assert_eq!(outcome.error_kind, Some(ErrorKind::CapabilityNotFound));
    assert_eq!(agent.status(), AgentStatus::Error);

    assert!(agent.execute_capability("fine", &params!()).success);
    assert_eq!(agent.status(), AgentStatus::Idle);
}

/// Test: Reported failures are not faults
/// Given a capability that returns a failed outcome
/// When it is executed
/// Then the outcome passes through unchanged and status returns to Idle
#[test]
fn test_reported_failure_leaves_agent_idle() {
    let mut agent = Agent::new("solo", "")
        .with_capability(Box::new(SpyCapability::failing("flaky", ErrorKind::ExternalServiceError)));

    let outcome = agent.execute_capability("flaky", &params!());
    assert_eq!(outcome.error_kind, Some(ErrorKind::ExternalServiceError));
    assert_eq!(agent.status(), AgentStatus::Idle);
}

/// Test: Registry bookkeeping
#[test]
fn test_add_remove_list() {
    let mut agent = Agent::new("solo", "");
    agent.add_capability(Box::new(SpyCapability::succeeding("one")));
    agent.add_capability(Box::new(SpyCapability::succeeding("two")));
    agent.add_capability(Box::new(SpyCapability::succeeding("one")));
    assert_eq!(agent.list_capabilities(), vec!["one", "two"]);

    assert!(agent.remove_capability("one"));
    assert!(!agent.remove_capability("one"));
    assert_eq!(agent.list_capabilities(), vec!["two"]);
    assert!(agent.set_capability_enabled("one", false).is_err());
}

/// Test: Memory round trip
#[test]
fn test_memory_round_trip() {
    let mut agent = Agent::new("solo", "");
    let value = json!({"score": 35, "issues": ["rain expected"]});

    agent.store_memory("k", value.clone());
    assert_eq!(agent.retrieve_memory("k"), Some(&value));

    agent.store_memory("k", json!(1));
    assert_eq!(agent.retrieve_memory("k"), Some(&json!(1)));

    agent.clear_memory(Some("k"));
    assert_eq!(agent.retrieve_memory("k"), None);

    agent.store_memory("a", json!(1));
    agent.store_memory("b", json!(2));
    agent.clear_memory(None);
    assert!(agent.memory().is_empty());
}

struct Remembering;

impl Reasoner for Remembering {
    fn think(&self, profile: &AgentProfile<'_>, input: &str) -> String {
        format!("{} heard {}", profile.name, input)
    }

    fn on_message(&mut self, memory: &mut Memory, message: &Message) {
        memory.store("last_sender", json!(message.sender()));
    }
}

/// Test: Injected reasoner
/// Given an agent with a custom reasoner
/// When it thinks and receives a message
/// Then the strategy answers and its hook sees the logged message
#[test]
fn test_injected_reasoner() {
    let mut agent = Agent::new("helper", "").with_reasoner(Box::new(Remembering));
    assert_eq!(agent.think("hi"), "helper heard hi");

    agent.receive_message(Message::new("boss", "helper", "go", Default::default()));
    assert_eq!(agent.message_log().len(), 1);
    assert_eq!(agent.retrieve_memory("last_sender"), Some(&json!("boss")));
    assert_eq!(agent.status(), AgentStatus::Idle);
}
