//! Coarse intent of a free-text request.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static URGENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(urgent|urgently|asap|immediately|emergency|critical|right now)\b").unwrap()
});

static FLEXIBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(flexible|whenever|anytime|later|postpone|no rush)\b").unwrap()
});

static SCHEDULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(schedule|calendar|meetings?|events?|appointments?|plans?)\b").unwrap()
});

static WEATHER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(weather|forecast|rain|rainy|sunny|temperature|outside)\b").unwrap()
});

/// Checked in declaration order; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestIntent {
    Urgent,
    Flexible,
    Schedule,
    Weather,
    #[default]
    General,
}

impl RequestIntent {
    pub fn classify(text: &str) -> Self {
        let table: [(&Regex, RequestIntent); 4] = [
            (&*URGENT_RE, RequestIntent::Urgent),
            (&*FLEXIBLE_RE, RequestIntent::Flexible),
            (&*SCHEDULE_RE, RequestIntent::Schedule),
            (&*WEATHER_RE, RequestIntent::Weather),
        ];
        table
            .into_iter()
            .find(|(re, _)| re.is_match(text))
            .map(|(_, intent)| intent)
            .unwrap_or_default()
    }

    pub fn is_general(&self) -> bool {
        *self == RequestIntent::General
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestIntent::Urgent => "urgent",
            RequestIntent::Flexible => "flexible",
            RequestIntent::Schedule => "schedule",
            RequestIntent::Weather => "weather",
            RequestIntent::General => "general",
        }
    }
}

impl std::fmt::Display for RequestIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
