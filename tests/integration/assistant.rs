//! Assistant end-to-end tests.
//!
//! Commands go through `dispatch` exactly as the binary sends them.

use aide::capability::{Condition, WeatherReading};
use aide::config::{Config, EmailConfig, SocialConfig};
use aide::decision::ConfidenceModel;
use aide::{Assistant, Command, Decision, ErrorKind};

use crate::fixtures::at;

fn config() -> Config {
    let mut config = Config::default();
    config.assistant_name = "Pal".to_string();
    config.default_city = "Leeds".to_string();
    config.email = EmailConfig {
        address: Some("me@example.com".into()),
        app_password: Some("secret".into()),
    };
    config.social = SocialConfig {
        handle: Some("@pal".into()),
    };
    config.weather.readings.insert(
        "leeds".into(),
        WeatherReading::new("Leeds", 5.0, Condition::Rainy),
    );
    config.weather.readings.insert(
        "nice".into(),
        WeatherReading::new("Nice", 24.0, Condition::Sunny).live(),
    );
    config
}

fn add_event(assistant: &mut Assistant, title: &str, hour: u32) {
    let reply = assistant.dispatch(Command::CreateEvent {
        title: title.into(),
        start: at(hour, 0),
        end: None,
        location: None,
    });
    assert!(reply.success, "{}", reply.text);
}

/// Test: Configured collaborators work end to end
#[test]
fn test_dispatch_email_and_social() {
    let mut assistant = Assistant::from_config(&config()).unwrap();

    let reply = assistant.dispatch(Command::SendEmail {
        to: "friend@example.com".into(),
        subject: Some("Picnic".into()),
        body: "Moved indoors".into(),
    });
    assert!(reply.success, "{}", reply.text);

    let reply = assistant.dispatch(Command::SendEmail {
        to: "nobody".into(),
        subject: None,
        body: String::new(),
    });
    assert_eq!(reply.error_kind, Some(ErrorKind::ValidationError));

    let reply = assistant.dispatch(Command::Post {
        text: "Rain again".into(),
    });
    assert!(reply.success, "{}", reply.text);

    let reply = assistant.dispatch(Command::Post { text: "x".repeat(281) });
    assert_eq!(reply.error_kind, Some(ErrorKind::ValidationError));
}

/// Test: Plan a rainy picnic day
/// Given a rainy, cold city and a picnic that overlaps a lunch
/// When the user asks for a plan
/// Then the assistant recommends rescheduling and remembers the context
#[test]
fn test_plan_rainy_picnic_with_overlap() {
    let mut assistant = Assistant::from_config(&config()).unwrap();
    add_event(&mut assistant, "Team Picnic", 12);
    add_event(&mut assistant, "Client lunch", 12);

    let reply = assistant.dispatch(Command::Plan {
        request: "should I go?".into(),
        city: None,
    });
    assert!(reply.success, "{}", reply.text);
    assert!(reply.text.contains("reschedule_due_to_weather_and_conflicts"));

    let decision: Decision = serde_json::from_value(reply.data.unwrap()).unwrap();
    assert_eq!(decision.confidence(), 0.85);
    assert_eq!(decision.trigger(), "should I go?");
    assert!(decision.context_keys_used().contains("request_text"));

    let coordinator = assistant.coordinator().unwrap();
    assert_eq!(coordinator.name(), "Pal");
    assert!(coordinator.retrieve_memory("weather_assessment").is_some());
    assert!(coordinator.retrieve_memory("schedule_assessment").is_some());
    assert_eq!(
        coordinator.retrieve_memory("last_decision").unwrap()["decision_label"],
        "reschedule_due_to_weather_and_conflicts"
    );
    assert_eq!(assistant.decision_history().len(), 1);
}

/// Test: Additive model from config
/// Given a live sunny reading and a clear calendar
/// When the additive model is configured
/// Then confidence is capped at 1.0
#[test]
fn test_plan_with_additive_model() {
    let mut config = config();
    config.confidence_model = ConfidenceModel::Additive;
    let mut assistant = Assistant::from_config(&config).unwrap();

    let decision = assistant.plan(Some("Nice"), "check the weather").unwrap();

    assert_eq!(decision.decision_label(), "proceed_as_planned");
    assert!(decision.confidence() <= 1.0);
    assert!(decision.confidence() > 0.95);
}

/// Test: Planning survives a missing calendar agent
/// Given the calendar agent has been unregistered
/// When a plan is requested
/// Then a failed reply is returned and nothing is recorded
#[test]
fn test_plan_without_calendar_agent() {
    let mut assistant = Assistant::from_config(&config()).unwrap();
    assistant.orchestrator_mut().unregister_agent("calendar");

    let reply = assistant.dispatch(Command::Plan {
        request: String::new(),
        city: None,
    });

    assert!(!reply.success);
    assert!(reply.text.contains("step 1"), "{}", reply.text);
    assert!(assistant.decision_history().is_empty());

    let reply = assistant.dispatch(Command::ListEvents);
    assert_eq!(reply.error_kind, Some(ErrorKind::AgentNotFound));
}

/// Test: Events outlive the process
/// Given a calendar file configured
/// When one assistant creates an event and a fresh one lists events
/// Then the fresh assistant sees the event
#[test]
fn test_calendar_file_shared_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.calendar.path = Some(dir.path().join("calendar.json"));

    add_event(&mut Assistant::from_config(&config).unwrap(), "Team Picnic", 12);

    let mut next_run = Assistant::from_config(&config).unwrap();
    let reply = next_run.dispatch(Command::ListEvents);
    assert!(reply.success);
    assert!(reply.text.contains("Team Picnic"), "{}", reply.text);
}

/// Test: Coordinator cannot shadow a domain agent
/// Given assistant_name set to "weather"
/// When the assistant is built
/// Then a validation error is returned instead of dropping the weather agent
#[test]
fn test_coordinator_named_after_domain_agent() {
    let mut config = config();
    config.assistant_name = "weather".into();

    let err = Assistant::from_config(&config).unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::ValidationError));
    assert!(err.to_string().contains("weather"));
}
