//! Cross-domain decision pipeline.
//!
//! Three pure stages: `assess_weather` scores the day and each event,
//! `assess_schedule` finds overlaps and weather-exposed events, and
//! `make_contextual_decision` turns both into a `Decision`.

pub mod intent;
pub mod schedule;
pub mod synthesis;
pub mod weather;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub use intent::RequestIntent;
pub use schedule::{
    assess_schedule, OverlapRule, ScheduleAssessment, Severity, TimeConflict, TimeOverlap,
    TravelConflict, WeatherConflict,
};
pub use synthesis::{
    bounded_confidence, make_contextual_decision, make_contextual_decision_with, ConfidenceModel,
    DecisionFactors, Impact,
};
pub use weather::{
    assess_travel, assess_weather, outdoor_suitability_score, EventImpact, ImpactLevel,
    SuitabilityRating, TravelImpact, TravelLevel, WeatherAssessment,
};

/// A synthesized recommendation. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    id: Uuid,
    trigger: String,
    context_keys_used: BTreeSet<String>,
    decision_label: String,
    /// In [0, 1].
    confidence: f64,
    actions: Vec<String>,
    alternatives: Vec<String>,
    reasoning: Vec<String>,
    timestamp: DateTime<Utc>,
}

impl Decision {
    pub(crate) fn new(
        trigger: impl Into<String>,
        context_keys_used: BTreeSet<String>,
        decision_label: impl Into<String>,
        confidence: f64,
        actions: Vec<String>,
        alternatives: Vec<String>,
        reasoning: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trigger: trigger.into(),
            context_keys_used,
            decision_label: decision_label.into(),
            confidence: bounded_confidence(confidence),
            actions,
            alternatives,
            reasoning,
            timestamp: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn context_keys_used(&self) -> &BTreeSet<String> {
        &self.context_keys_used
    }

    pub fn decision_label(&self) -> &str {
        &self.decision_label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn reasoning(&self) -> &[String] {
        &self.reasoning
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Decision: {} (confidence {:.0}%)", self.decision_label, self.confidence * 100.0)?;
        for reason in &self.reasoning {
            writeln!(f, "  - {}", reason)?;
        }
        if !self.actions.is_empty() {
            writeln!(f, "Actions: {}", self.actions.join(", "))?;
        }
        if !self.alternatives.is_empty() {
            writeln!(f, "Alternatives: {}", self.alternatives.join(", "))?;
        }
        Ok(())
    }
}
