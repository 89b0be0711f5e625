//! Decision pipeline scenarios.
//!
//! Each stage is pure, so the scenarios feed readings and events straight
//! in and check the assessments and the final decision.

use aide::capability::{Condition, Event, WeatherReading};
use aide::decision::{
    assess_schedule, assess_weather, bounded_confidence, make_contextual_decision,
    make_contextual_decision_with, ConfidenceModel, ImpactLevel, Severity, TimeOverlap,
};

use crate::fixtures::{at, event, pleasant, rainy_and_cold};

/// Test: Rainy and cold scores 35
#[test]
fn test_rainy_five_degrees_scores_35() {
    let assessment = assess_weather(rainy_and_cold("Leeds"), &[]);
    assert_eq!(assessment.outdoor_suitability_score, 35);
}

/// Test: Score never goes negative
#[test]
fn test_score_is_clamped() {
    for (temp, condition) in [
        (-40.0, Condition::Stormy),
        (60.0, Condition::Snowy),
        (-0.5, Condition::Rainy),
    ] {
        let assessment = assess_weather(WeatherReading::new("X", temp, condition), &[]);
        assert!(assessment.outdoor_suitability_score <= 100);
        assert_eq!(assessment.outdoor_suitability_score, 20);
    }
}

/// Test: Picnic in the rain
/// Given a score of 35 and an event titled "Team Picnic"
/// When the weather and schedule are assessed
/// Then the event impact is medium and a medium weather conflict is flagged
#[test]
fn test_team_picnic_in_rain() {
    let events = vec![event("p", "Team Picnic", 12), event("s", "Standup", 9)];

    let weather = assess_weather(rainy_and_cold("Leeds"), &events);
    assert_eq!(weather.impact_for("p"), Some(ImpactLevel::Medium));
    assert_eq!(weather.impact_for("s"), Some(ImpactLevel::Low));

    let schedule = assess_schedule(&events, &weather, &TimeOverlap);
    assert_eq!(schedule.weather_conflicts.len(), 1);
    assert_eq!(schedule.weather_conflicts[0].event.title, "Team Picnic");
    assert_eq!(schedule.weather_conflicts[0].severity, Severity::Medium);
    assert!(schedule.time_conflicts.is_empty());
}

/// Test: Weather-only impact
/// Given weather impact high (score 35) and no conflicts
/// When a decision is made
/// Then the label is recommend_schedule_adjustments at 0.85
#[test]
fn test_weather_high_schedule_low() {
    let events = vec![event("s", "Standup", 9)];
    let weather = assess_weather(rainy_and_cold("Leeds"), &events);
    let schedule = assess_schedule(&events, &weather, &TimeOverlap);
    assert!(!schedule.has_conflicts());

    let decision = make_contextual_decision(&weather, &schedule, "");

    assert_eq!(decision.decision_label(), "recommend_schedule_adjustments");
    assert_eq!(decision.confidence(), 0.85);
    assert!(decision
        .alternatives()
        .contains(&"move activity indoors".to_string()));
}

/// Test: Additive confidence is capped
/// Given every additive bonus satisfied
/// When a decision is made under the additive model
/// Then confidence does not exceed 1.0
#[test]
fn test_additive_confidence_never_exceeds_one() {
    let weather = assess_weather(pleasant("Nice").live(), &[]);
    let schedule = assess_schedule(&[], &weather, &TimeOverlap);

    for request in ["urgent!", "whenever", "check my calendar", "weather?", ""] {
        let decision =
            make_contextual_decision_with(ConfidenceModel::Additive, &weather, &schedule, request);
        assert!(decision.confidence() <= 1.0, "{}", decision.confidence());
        assert!(decision.confidence() >= 0.0);
    }
    assert_eq!(bounded_confidence(0.7 + 0.1 * 5.0), 1.0);
}

/// Test: Overlapping meetings with an injected rule
/// Given two events that only touch end to start
/// When assessed with the default rule and with an inclusive rule
/// Then only the inclusive rule reports a conflict
#[test]
fn test_overlap_rule_is_injectable() {
    let first = Event::new("1", "Review", at(10, 0));
    let second = Event::new("2", "Interview", at(11, 0));
    let events = vec![first, second];
    let weather = assess_weather(pleasant("Nice"), &events);

    let strict = assess_schedule(&events, &weather, &TimeOverlap);
    assert!(strict.time_conflicts.is_empty());

    let inclusive = |a: &Event, b: &Event| a.start <= b.end && b.start <= a.end;
    let touching = assess_schedule(&events, &weather, &inclusive);
    assert_eq!(touching.time_conflicts.len(), 1);

    let decision = make_contextual_decision(&weather, &touching, "");
    assert_eq!(decision.decision_label(), "resolve_schedule_conflicts_first");
    assert_eq!(decision.confidence(), 0.75);
}
