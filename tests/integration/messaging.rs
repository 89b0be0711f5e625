//! Message routing and broadcast tests.

use aide::{Agent, Error, Message, MessageKind, Orchestrator};

fn abc() -> Orchestrator {
    let mut orchestrator = Orchestrator::new("chat");
    for name in ["A", "B", "C"] {
        orchestrator.register_agent(Agent::new(name, ""));
    }
    orchestrator
}

fn log_len(orchestrator: &Orchestrator, name: &str) -> usize {
    orchestrator.get_agent(name).unwrap().message_log().len()
}

/// Test: Broadcast excludes the sender
/// Given agents A, B, C
/// When A broadcasts
/// Then B and C each log exactly one broadcast message and A logs none
#[test]
fn test_broadcast_reaches_everyone_but_sender() {
    let mut orchestrator = abc();

    let delivered = orchestrator.broadcast_message("A", "standup in 5");

    assert_eq!(delivered, 2);
    assert_eq!(log_len(&orchestrator, "A"), 0);
    for name in ["B", "C"] {
        let log = orchestrator.get_agent(name).unwrap().message_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].sender(), "A");
        assert_eq!(log[0].recipient(), name);
        assert_eq!(log[0].kind(), MessageKind::Broadcast);
        assert_eq!(log[0].content(), "standup in 5");
    }
}

/// Test: Broadcast from outside the registry reaches everyone
#[test]
fn test_broadcast_from_unregistered_sender() {
    let mut orchestrator = abc();
    assert_eq!(orchestrator.broadcast_message("system", "hello"), 3);
}

/// Test: Point-to-point send
/// Given agents A and B
/// When A sends to B through the orchestrator
/// Then both logs hold the same message
#[test]
fn test_send_appends_to_both_logs() {
    let mut orchestrator = abc();

    let sent = orchestrator.send("A", "B", "lunch?").unwrap();

    let a_log = orchestrator.get_agent("A").unwrap().message_log();
    let b_log = orchestrator.get_agent("B").unwrap().message_log();
    assert_eq!(a_log, std::slice::from_ref(&sent));
    assert_eq!(b_log, std::slice::from_ref(&sent));
    assert_eq!(sent.kind(), MessageKind::Text);
    assert_eq!(log_len(&orchestrator, "C"), 0);
}

/// Test: Unknown recipient is dropped with a diagnostic
#[test]
fn test_route_to_unknown_recipient() {
    let mut orchestrator = abc();

    let message = Message::new("A", "Z", "anyone?", MessageKind::Text);
    let err = orchestrator.route_message(message).unwrap_err();

    assert!(matches!(err, Error::RecipientNotFound(ref name) if name == "Z"));
    assert!(err.to_string().contains("dropped"));
    for name in ["A", "B", "C"] {
        assert_eq!(log_len(&orchestrator, name), 0);
    }
}

/// Test: Re-registration replaces in place
#[test]
fn test_reregister_keeps_position() {
    let mut orchestrator = abc();
    orchestrator.route_message(Message::new("A", "B", "x", MessageKind::Text)).unwrap();

    let old = orchestrator.register_agent(Agent::new("B", "fresh")).unwrap();

    assert_eq!(old.message_log().len(), 1);
    assert_eq!(orchestrator.list_agents(), vec!["A", "B", "C"]);
    assert_eq!(log_len(&orchestrator, "B"), 0);

    orchestrator.unregister_agent("A");
    assert_eq!(orchestrator.broadcast_message("C", "bye"), 1);
}
