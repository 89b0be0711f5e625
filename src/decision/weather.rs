//! Weather assessment: how today's weather bears on outdoor plans.

use serde::{Deserialize, Serialize};

use crate::capability::{Condition, Event, EventRef, WeatherReading};

/// Words in an event's title or description that mark it as outdoor.
pub const OUTDOOR_KEYWORDS: &[&str] = &[
    "picnic", "park", "hike", "hiking", "outdoor", "beach", "sports", "festival", "walk", "garden",
];

/// Score below which the weather as a whole counts as high impact.
pub const HIGH_IMPACT_BELOW: u8 = 50;
/// Score below which an outdoor event is severely affected.
pub const SEVERE_BELOW: u8 = 30;
/// Score below which outdoor events are affected at all.
pub const MEDIUM_IMPACT_BELOW: u8 = 75;

/// Wind (m/s) above which loose items and umbrellas become a problem.
pub const WINDY_ABOVE: f64 = 10.0;
/// Wind (m/s) above which walking is difficult.
pub const GALE_ABOVE: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImpactLevel::Low => write!(f, "low"),
            ImpactLevel::Medium => write!(f, "medium"),
            ImpactLevel::High => write!(f, "high"),
        }
    }
}

/// Coarse label for the outdoor suitability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuitabilityRating {
    Excellent,
    Good,
    Fair,
    Poor,
    Unsuitable,
}

impl SuitabilityRating {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => SuitabilityRating::Excellent,
            60..=79 => SuitabilityRating::Good,
            40..=59 => SuitabilityRating::Fair,
            20..=39 => SuitabilityRating::Poor,
            _ => SuitabilityRating::Unsuitable,
        }
    }
}

impl std::fmt::Display for SuitabilityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuitabilityRating::Excellent => write!(f, "excellent"),
            SuitabilityRating::Good => write!(f, "good"),
            SuitabilityRating::Fair => write!(f, "fair"),
            SuitabilityRating::Poor => write!(f, "poor"),
            SuitabilityRating::Unsuitable => write!(f, "unsuitable"),
        }
    }
}

/// How safe one way of getting around is. Ordered from best to worst.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TravelLevel {
    #[default]
    Good,
    Caution,
    Difficult,
    Poor,
    Dangerous,
}

impl TravelLevel {
    pub fn is_hazardous(&self) -> bool {
        matches!(self, TravelLevel::Poor | TravelLevel::Dangerous)
    }

    fn worsen(&mut self, to: TravelLevel) {
        *self = (*self).max(to);
    }
}

impl std::fmt::Display for TravelLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelLevel::Good => write!(f, "good"),
            TravelLevel::Caution => write!(f, "caution"),
            TravelLevel::Difficult => write!(f, "difficult"),
            TravelLevel::Poor => write!(f, "poor"),
            TravelLevel::Dangerous => write!(f, "dangerous"),
        }
    }
}

/// Travel conditions by mode, with the warnings that set them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TravelImpact {
    pub driving: TravelLevel,
    pub walking: TravelLevel,
    pub public_transport: TravelLevel,
    pub warnings: Vec<String>,
}

impl TravelImpact {
    /// Any mode rated poor or dangerous.
    pub fn is_hazardous(&self) -> bool {
        [self.driving, self.walking, self.public_transport]
            .iter()
            .any(TravelLevel::is_hazardous)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventImpact {
    pub event: EventRef,
    pub outdoor: bool,
    pub impact_level: ImpactLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAssessment {
    pub raw_weather: WeatherReading,
    /// 0 (stay in) to 100 (ideal).
    pub outdoor_suitability_score: u8,
    pub rating: SuitabilityRating,
    pub issues: Vec<String>,
    pub travel_impact: TravelImpact,
    pub per_event_impact: Vec<EventImpact>,
    pub recommendations: Vec<String>,
}

impl WeatherAssessment {
    pub fn impact_for(&self, event_id: &str) -> Option<ImpactLevel> {
        self.per_event_impact
            .iter()
            .find(|i| i.event.id == event_id)
            .map(|i| i.impact_level)
    }

    pub fn is_high_impact(&self) -> bool {
        self.outdoor_suitability_score < HIGH_IMPACT_BELOW
    }
}

/// Start at 100, then apply one condition penalty and one temperature
/// penalty. Never below zero.
pub fn outdoor_suitability_score(reading: &WeatherReading) -> u8 {
    let mut score: i32 = 100;

    if reading.condition.is_wet() {
        score -= 50;
    } else if reading.condition.is_dull() {
        score -= 20;
    }

    let t = reading.temperature;
    if !(0.0..=35.0).contains(&t) {
        score -= 30;
    } else if !(10.0..=30.0).contains(&t) {
        score -= 15;
    }

    score.clamp(0, 100) as u8
}

/// Case-insensitive keyword match on title and description.
pub fn is_outdoor(event: &Event) -> bool {
    let text = format!("{} {}", event.title, event.description).to_lowercase();
    OUTDOOR_KEYWORDS.iter().any(|k| text.contains(k))
}

fn impact_level(outdoor: bool, score: u8) -> ImpactLevel {
    match (outdoor, score) {
        (true, s) if s < SEVERE_BELOW => ImpactLevel::High,
        (true, s) if s < MEDIUM_IMPACT_BELOW => ImpactLevel::Medium,
        _ => ImpactLevel::Low,
    }
}

fn issues(reading: &WeatherReading) -> Vec<String> {
    let mut issues = Vec::new();
    match reading.condition {
        Condition::Rainy => issues.push("rain expected"),
        Condition::Snowy => issues.push("snow expected"),
        Condition::Stormy => issues.push("storms expected"),
        Condition::Foggy => issues.push("fog and poor visibility"),
        Condition::Cloudy => issues.push("overcast skies"),
        _ => {}
    }
    let t = reading.temperature;
    if t < 0.0 {
        issues.push("freezing temperatures");
    } else if t > 35.0 {
        issues.push("extremely hot temperatures");
    } else if t < 10.0 {
        issues.push("cold temperatures");
    } else if t > 30.0 {
        issues.push("very hot temperatures");
    }
    if reading.wind_speed > WINDY_ABOVE {
        issues.push("strong winds");
    }
    issues.into_iter().map(String::from).collect()
}

fn recommendations(reading: &WeatherReading, score: u8) -> Vec<String> {
    let mut recs = Vec::new();
    if score < HIGH_IMPACT_BELOW {
        recs.push("Consider indoor activities");
    }
    match reading.condition {
        Condition::Rainy => {
            recs.push("Bring an umbrella");
            recs.push("Consider rescheduling outdoor events");
        }
        Condition::Snowy => {
            recs.push("Wear warm, waterproof footwear");
            recs.push("Allow extra travel time");
        }
        Condition::Stormy => recs.push("Stay indoors until the storm passes"),
        Condition::Foggy => recs.push("Drive carefully in low visibility"),
        _ => {}
    }
    if reading.temperature > 30.0 {
        recs.push("Stay hydrated and seek shade");
    } else if reading.temperature < 5.0 {
        recs.push("Dress warmly with layers");
    }
    if reading.wind_speed > WINDY_ABOVE {
        recs.push("Secure loose items if outdoors");
        recs.push("Be cautious with umbrellas");
    }
    recs.into_iter().map(String::from).collect()
}

/// Driving, walking and public transport conditions for a reading.
///
/// Levels only ever get worse as rules apply.
pub fn assess_travel(reading: &WeatherReading) -> TravelImpact {
    let mut travel = TravelImpact::default();
    let icy = reading.condition == Condition::Snowy
        || (reading.condition.is_wet() && reading.temperature < 0.0);

    if matches!(reading.condition, Condition::Rainy | Condition::Stormy) {
        travel.driving.worsen(TravelLevel::Caution);
        travel.walking.worsen(TravelLevel::Poor);
        travel.warnings.push("Wet roads and sidewalks".to_string());
    }
    if icy {
        travel.driving.worsen(TravelLevel::Dangerous);
        travel.walking.worsen(TravelLevel::Dangerous);
        travel.public_transport.worsen(TravelLevel::Caution);
        travel.warnings.push("Icy conditions - high risk".to_string());
    }
    if reading.condition == Condition::Stormy {
        travel.public_transport.worsen(TravelLevel::Caution);
    }
    if reading.wind_speed > GALE_ABOVE {
        travel.walking.worsen(TravelLevel::Difficult);
        travel.warnings.push("Strong winds".to_string());
    }
    if reading.condition == Condition::Foggy {
        travel.driving.worsen(TravelLevel::Dangerous);
        travel.warnings.push("Very poor visibility".to_string());
    }
    travel
}

/// Assess a reading against the day's events.
pub fn assess_weather(reading: WeatherReading, events: &[Event]) -> WeatherAssessment {
    let score = outdoor_suitability_score(&reading);
    let per_event_impact = events
        .iter()
        .map(|event| {
            let outdoor = is_outdoor(event);
            EventImpact {
                event: event.event_ref(),
                outdoor,
                impact_level: impact_level(outdoor, score),
            }
        })
        .collect();

    WeatherAssessment {
        rating: SuitabilityRating::from_score(score),
        travel_impact: assess_travel(&reading),
        issues: issues(&reading),
        recommendations: recommendations(&reading, score),
        outdoor_suitability_score: score,
        per_event_impact,
        raw_weather: reading,
    }
}
