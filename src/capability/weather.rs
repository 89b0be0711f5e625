//! Weather capability over a pluggable provider.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{optional_str, outcome_of, Capability, Outcome, Params};
use crate::config::WeatherConfig;
use crate::error::{Error, Result};
use crate::alog_debug;

/// Coarse sky condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Sunny,
    Clear,
    Cloudy,
    Foggy,
    Rainy,
    Snowy,
    Stormy,
    #[serde(other)]
    Unknown,
}

impl Condition {
    /// Map free provider text ("light rain", "Overcast clouds") to a condition.
    pub fn from_description(text: &str) -> Self {
        let text = text.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| text.contains(w));
        if has(&["thunder", "storm"]) {
            Condition::Stormy
        } else if has(&["snow", "sleet", "blizzard"]) {
            Condition::Snowy
        } else if has(&["rain", "drizzle", "shower"]) {
            Condition::Rainy
        } else if has(&["fog", "mist", "haze"]) {
            Condition::Foggy
        } else if has(&["cloud", "overcast"]) {
            Condition::Cloudy
        } else if has(&["sun"]) {
            Condition::Sunny
        } else if has(&["clear"]) {
            Condition::Clear
        } else {
            Condition::Unknown
        }
    }

    /// Precipitation or storms.
    pub fn is_wet(&self) -> bool {
        matches!(self, Condition::Rainy | Condition::Snowy | Condition::Stormy)
    }

    /// Reduced visibility or sun.
    pub fn is_dull(&self) -> bool {
        matches!(self, Condition::Foggy | Condition::Cloudy)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Sunny => write!(f, "sunny"),
            Condition::Clear => write!(f, "clear"),
            Condition::Cloudy => write!(f, "cloudy"),
            Condition::Foggy => write!(f, "foggy"),
            Condition::Rainy => write!(f, "rainy"),
            Condition::Snowy => write!(f, "snowy"),
            Condition::Stormy => write!(f, "stormy"),
            Condition::Unknown => write!(f, "unknown"),
        }
    }
}

/// Where a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    /// Fetched from a live weather service.
    Live,
    /// Canned or generated data.
    #[default]
    Simulated,
}

/// Current conditions for one city. Temperature in °C, wind in m/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub city: String,
    pub temperature: f64,
    pub condition: Condition,
    pub humidity: u8,
    pub wind_speed: f64,
    #[serde(default)]
    pub source: WeatherSource,
}

impl WeatherReading {
    pub fn new(city: impl Into<String>, temperature: f64, condition: Condition) -> Self {
        Self {
            city: city.into(),
            temperature,
            condition,
            humidity: 50,
            wind_speed: 0.0,
            source: WeatherSource::Simulated,
        }
    }

    pub fn live(mut self) -> Self {
        self.source = WeatherSource::Live;
        self
    }
}

/// Source of current weather for a city.
pub trait WeatherProvider {
    fn current(&self, city: &str) -> Result<WeatherReading>;
}

const SIMULATED_CONDITIONS: [Condition; 5] = [
    Condition::Sunny,
    Condition::Cloudy,
    Condition::Rainy,
    Condition::Snowy,
    Condition::Foggy,
];

/// Plausible readings generated from the city name.
///
/// The same city always gets the same reading, so plans are repeatable.
/// Readings are tagged `Simulated`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedWeather;

impl SimulatedWeather {
    /// FNV-1a over the normalized name.
    fn seed(city: &str) -> u64 {
        city.trim()
            .to_lowercase()
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
            })
    }
}

impl WeatherProvider for SimulatedWeather {
    fn current(&self, city: &str) -> Result<WeatherReading> {
        let city = city.trim();
        if city.is_empty() {
            return Err(Error::Validation("'city' must not be empty".to_string()));
        }
        let seed = Self::seed(city);
        Ok(WeatherReading {
            city: city.to_string(),
            temperature: -5.0 + (seed % 41) as f64,
            condition: SIMULATED_CONDITIONS[((seed >> 8) % 5) as usize],
            humidity: 30 + ((seed >> 16) % 61) as u8,
            wind_speed: ((seed >> 24) % 21) as f64,
            source: WeatherSource::Simulated,
        })
    }
}

/// Serves fixed readings, keyed case-insensitively by city.
///
/// Cities without a reading fail unless a simulated fallback is enabled.
#[derive(Debug, Clone, Default)]
pub struct StaticWeather {
    readings: BTreeMap<String, WeatherReading>,
    fallback: Option<SimulatedWeather>,
}

impl StaticWeather {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &WeatherConfig) -> Self {
        let mut weather = Self::new();
        for (city, reading) in &config.readings {
            weather.readings.insert(city.to_lowercase(), reading.clone());
        }
        if config.simulate_unknown {
            weather = weather.with_simulated_fallback();
        }
        weather
    }

    pub fn with_simulated_fallback(mut self) -> Self {
        self.fallback = Some(SimulatedWeather);
        self
    }

    pub fn with_reading(mut self, reading: WeatherReading) -> Self {
        self.readings.insert(reading.city.to_lowercase(), reading);
        self
    }
}

impl WeatherProvider for StaticWeather {
    fn current(&self, city: &str) -> Result<WeatherReading> {
        if let Some(reading) = self.readings.get(&city.to_lowercase()) {
            return Ok(reading.clone());
        }
        match &self.fallback {
            Some(simulated) => {
                alog_debug!("StaticWeather: no reading for {}, simulating", city);
                simulated.current(city)
            }
            None => Err(Error::ExternalService(format!("no weather data for '{}'", city))),
        }
    }
}

pub struct WeatherCapability {
    provider: Box<dyn WeatherProvider>,
    default_city: String,
}

impl WeatherCapability {
    pub const NAME: &'static str = "weather";

    pub fn new(provider: Box<dyn WeatherProvider>, default_city: impl Into<String>) -> Self {
        Self {
            provider,
            default_city: default_city.into(),
        }
    }

    fn fetch(&self, params: &Params) -> Result<Outcome> {
        let city = match optional_str(params, "city")? {
            Some(c) if c.trim().is_empty() => {
                return Err(Error::Validation("'city' must not be empty".to_string()))
            }
            Some(c) => c.trim(),
            None => self.default_city.as_str(),
        };
        alog_debug!("WeatherCapability: fetching {}", city);
        let reading = self.provider.current(city)?;
        let message = format!(
            "Weather in {}: {:.1}°C, {}, humidity {}%, wind {:.1} m/s",
            reading.city, reading.temperature, reading.condition, reading.humidity, reading.wind_speed
        );
        Ok(Outcome::ok(message).with_data(&reading))
    }
}

impl Capability for WeatherCapability {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get current weather for a city"
    }

    fn execute(&mut self, params: &Params) -> Outcome {
        outcome_of(self.fetch(params))
    }
}
