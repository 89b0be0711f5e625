//! Decision synthesis: combine the weather and schedule assessments with the
//! request's intent into one labelled, scored decision.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::intent::RequestIntent;
use super::schedule::ScheduleAssessment;
use super::weather::WeatherAssessment;
use super::Decision;
use crate::capability::WeatherSource;
use crate::alog;

pub const LABEL_WEATHER_AND_CONFLICTS: &str = "reschedule_due_to_weather_and_conflicts";
pub const LABEL_WEATHER: &str = "recommend_schedule_adjustments";
pub const LABEL_CONFLICTS: &str = "resolve_schedule_conflicts_first";
pub const LABEL_URGENT: &str = "proceed_with_caution_prioritize_urgency";
pub const LABEL_DEFAULT: &str = "proceed_as_planned";

/// Context memory keys a decision is built from.
pub const WEATHER_CONTEXT_KEY: &str = "weather_assessment";
pub const SCHEDULE_CONTEXT_KEY: &str = "schedule_assessment";
pub const REQUEST_CONTEXT_KEY: &str = "request_text";

/// Trigger recorded when no request text was given.
pub const DEFAULT_TRIGGER: &str = "assessment_completed";

const ADDITIVE_BASE: f64 = 0.70;
const ADDITIVE_BONUS: f64 = 0.10;

/// How confidence is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceModel {
    /// Fixed baseline per matched rule.
    #[default]
    RuleTable,
    /// 0.70 plus 0.10 for each of: live weather data, no conflicts, a
    /// specific intent.
    Additive,
}

impl std::fmt::Display for ConfidenceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceModel::RuleTable => write!(f, "rule_table"),
            ConfidenceModel::Additive => write!(f, "additive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    High,
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Impact::Low => write!(f, "low"),
            Impact::High => write!(f, "high"),
        }
    }
}

/// Inputs to the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionFactors {
    pub weather_impact: Impact,
    pub schedule_impact: Impact,
    pub intent: RequestIntent,
}

impl DecisionFactors {
    pub fn extract(weather: &WeatherAssessment, schedule: &ScheduleAssessment, request: &str) -> Self {
        Self {
            weather_impact: if weather.is_high_impact() { Impact::High } else { Impact::Low },
            schedule_impact: if schedule.has_conflicts() { Impact::High } else { Impact::Low },
            intent: RequestIntent::classify(request),
        }
    }
}

/// Clamp any raw score into [0, 1]. Every confidence passes through here.
pub fn bounded_confidence(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}

/// Label and baseline confidence; first matching rule wins.
fn match_rule(factors: &DecisionFactors) -> (&'static str, f64) {
    use Impact::High;
    match (factors.weather_impact, factors.schedule_impact, factors.intent) {
        (High, High, _) => (LABEL_WEATHER_AND_CONFLICTS, 0.85),
        (High, _, _) => (LABEL_WEATHER, 0.85),
        (_, High, _) => (LABEL_CONFLICTS, 0.75),
        (_, _, RequestIntent::Urgent) => (LABEL_URGENT, 0.70),
        _ => (LABEL_DEFAULT, 0.90),
    }
}

fn additive_confidence(
    weather: &WeatherAssessment,
    schedule: &ScheduleAssessment,
    factors: &DecisionFactors,
) -> f64 {
    let bonuses = [
        weather.raw_weather.source == WeatherSource::Live,
        !schedule.has_conflicts(),
        !factors.intent.is_general(),
    ];
    let earned = bonuses.iter().filter(|b| **b).count() as f64;
    ADDITIVE_BASE + ADDITIVE_BONUS * earned
}

fn actions(label: &str, schedule: &ScheduleAssessment) -> Vec<String> {
    let mut actions: Vec<&str> = match label {
        LABEL_WEATHER_AND_CONFLICTS => vec!["suggest_rescheduling", "compose_notification_email"],
        LABEL_WEATHER => vec!["suggest_indoor_alternatives", "monitor_weather_updates"],
        LABEL_CONFLICTS => vec!["resolve_time_conflicts", "review_calendar"],
        LABEL_URGENT => vec!["prioritize_urgent_tasks", "monitor_conditions"],
        _ => vec!["confirm_schedule"],
    };
    if label == LABEL_WEATHER_AND_CONFLICTS && schedule.has_severe_weather_conflict() {
        actions.push("send_urgent_notification");
    }
    actions.into_iter().map(String::from).collect()
}

fn alternatives(factors: &DecisionFactors) -> Vec<String> {
    let mut alternatives = Vec::new();
    if factors.weather_impact == Impact::High {
        alternatives.push("move activity indoors");
        alternatives.push("reschedule for better weather");
    }
    if factors.schedule_impact == Impact::High {
        alternatives.push("reschedule conflicting events");
        alternatives.push("shorten durations");
    }
    if factors.intent == RequestIntent::Flexible {
        alternatives.push("postpone to a more convenient time");
    }
    alternatives.into_iter().map(String::from).collect()
}

fn reasoning(
    weather: &WeatherAssessment,
    schedule: &ScheduleAssessment,
    factors: &DecisionFactors,
    label: &str,
) -> Vec<String> {
    let reading = &weather.raw_weather;
    let mut reasons = vec![format!(
        "Outdoor suitability in {} is {}/100, {} ({}, {:.1}°C)",
        reading.city,
        weather.outdoor_suitability_score,
        weather.rating,
        reading.condition,
        reading.temperature
    )];
    if !weather.issues.is_empty() {
        reasons.push(format!("Weather issues: {}", weather.issues.join(", ")));
    }
    reasons.push(format!("Weather impact is {}", factors.weather_impact));
    reasons.push(format!(
        "Schedule impact is {} ({} time conflict(s), {} weather conflict(s))",
        factors.schedule_impact,
        schedule.time_conflicts.len(),
        schedule.weather_conflicts.len()
    ));
    if schedule.has_travel_hazards() {
        reasons.push(format!(
            "Travel is hazardous for {} event(s): {}",
            schedule.travel_conflicts.len(),
            weather.travel_impact.warnings.join(", ")
        ));
    }
    reasons.push(format!("Request intent is {}", factors.intent));
    reasons.push(format!("Matched rule {}", label));
    reasons
}

/// Synthesize a decision with the canonical rule-table confidence.
pub fn make_contextual_decision(
    weather: &WeatherAssessment,
    schedule: &ScheduleAssessment,
    request: &str,
) -> Decision {
    make_contextual_decision_with(ConfidenceModel::RuleTable, weather, schedule, request)
}

pub fn make_contextual_decision_with(
    model: ConfidenceModel,
    weather: &WeatherAssessment,
    schedule: &ScheduleAssessment,
    request: &str,
) -> Decision {
    let factors = DecisionFactors::extract(weather, schedule, request);
    let (label, baseline) = match_rule(&factors);

    let raw = match model {
        ConfidenceModel::RuleTable => baseline,
        ConfidenceModel::Additive => additive_confidence(weather, schedule, &factors),
    };
    let confidence = bounded_confidence(raw);

    let request = request.trim();
    let trigger = if request.is_empty() { DEFAULT_TRIGGER } else { request };

    let mut context_keys_used: BTreeSet<String> = [WEATHER_CONTEXT_KEY, SCHEDULE_CONTEXT_KEY]
        .into_iter()
        .map(String::from)
        .collect();
    if !request.is_empty() {
        context_keys_used.insert(REQUEST_CONTEXT_KEY.to_string());
    }

    let mut reasoning = reasoning(weather, schedule, &factors, label);
    reasoning.push(format!("Confidence {:.2} ({})", confidence, model));

    alog!("Decision '{}' at confidence {:.2} for '{}'", label, confidence, trigger);

    Decision::new(
        trigger,
        context_keys_used,
        label,
        confidence,
        actions(label, schedule),
        alternatives(&factors),
        reasoning,
    )
}
