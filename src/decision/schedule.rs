//! Schedule assessment: time overlaps and weather-exposed events.

use serde::{Deserialize, Serialize};

use super::weather::{ImpactLevel, WeatherAssessment, SEVERE_BELOW};
use crate::capability::{Event, EventRef};

/// Decides whether two events collide in time.
pub trait OverlapRule {
    fn overlaps(&self, a: &Event, b: &Event) -> bool;
}

/// Half-open interval overlap: touching end-to-start is not a conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOverlap;

impl OverlapRule for TimeOverlap {
    fn overlaps(&self, a: &Event, b: &Event) -> bool {
        a.start < b.end && b.start < a.end
    }
}

impl<F> OverlapRule for F
where
    F: Fn(&Event, &Event) -> bool,
{
    fn overlaps(&self, a: &Event, b: &Event) -> bool {
        self(a, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeConflict {
    pub first: EventRef,
    pub second: EventRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherConflict {
    pub event: EventRef,
    pub severity: Severity,
    pub reasons: Vec<String>,
}

/// Getting to the event is risky, whether or not it is outdoors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelConflict {
    pub event: EventRef,
    pub warnings: Vec<String>,
    pub advice: String,
}

/// Conflicts found in a day's events.
///
/// `travel_conflicts` is kept apart from `weather_conflicts`: it does not
/// count towards `conflict_count` and adds nothing to `recommendations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAssessment {
    pub events: Vec<EventRef>,
    pub time_conflicts: Vec<TimeConflict>,
    pub weather_conflicts: Vec<WeatherConflict>,
    #[serde(default)]
    pub travel_conflicts: Vec<TravelConflict>,
    pub recommendations: Vec<String>,
}

impl ScheduleAssessment {
    pub fn conflict_count(&self) -> usize {
        self.time_conflicts.len() + self.weather_conflicts.len()
    }

    pub fn has_conflicts(&self) -> bool {
        self.conflict_count() > 0
    }

    pub fn has_severe_weather_conflict(&self) -> bool {
        self.weather_conflicts
            .iter()
            .any(|c| c.severity == Severity::High)
    }

    pub fn has_travel_hazards(&self) -> bool {
        !self.travel_conflicts.is_empty()
    }
}

/// Find overlapping pairs and events the weather puts at risk.
///
/// Each unordered pair is reported once, in input order.
pub fn assess_schedule(
    events: &[Event],
    weather: &WeatherAssessment,
    rule: &dyn OverlapRule,
) -> ScheduleAssessment {
    let mut time_conflicts = Vec::new();
    for (i, a) in events.iter().enumerate() {
        for b in &events[i + 1..] {
            if rule.overlaps(a, b) {
                time_conflicts.push(TimeConflict {
                    first: a.event_ref(),
                    second: b.event_ref(),
                });
            }
        }
    }

    let severity = if weather.outdoor_suitability_score < SEVERE_BELOW {
        Severity::High
    } else {
        Severity::Medium
    };
    let weather_conflicts: Vec<WeatherConflict> = events
        .iter()
        .filter(|e| {
            matches!(
                weather.impact_for(&e.id),
                Some(ImpactLevel::Medium | ImpactLevel::High)
            )
        })
        .map(|e| WeatherConflict {
            event: e.event_ref(),
            severity,
            reasons: weather.issues.clone(),
        })
        .collect();

    let travel_conflicts: Vec<TravelConflict> = if weather.travel_impact.is_hazardous() {
        events
            .iter()
            .map(|e| TravelConflict {
                event: e.event_ref(),
                warnings: weather.travel_impact.warnings.clone(),
                advice: format!(
                    "Travel to {} may be hazardous. Consider a virtual meeting or rescheduling.",
                    e.event_ref()
                ),
            })
            .collect()
    } else {
        Vec::new()
    };

    let mut recommendations = Vec::new();
    for conflict in &weather_conflicts {
        recommendations.push(format!(
            "Consider moving {} indoors or rescheduling due to {}",
            conflict.event,
            conflict.reasons.join(", ")
        ));
    }
    for conflict in &time_conflicts {
        recommendations.push(format!(
            "Resolve overlapping events {} and {}",
            conflict.first, conflict.second
        ));
    }

    ScheduleAssessment {
        events: events.iter().map(Event::event_ref).collect(),
        time_conflicts,
        weather_conflicts,
        travel_conflicts,
        recommendations,
    }
}
