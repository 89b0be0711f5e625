use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::capability::weather::WeatherReading;
use crate::decision::ConfidenceModel;
use crate::{alog_debug, Error, Result};

pub const DEFAULT_ASSISTANT_NAME: &str = "Buddy";
pub const DEFAULT_CITY: &str = "New York";

/// Assistant configuration.
///
/// Built once at the edge (file or code) and handed to constructors; no
/// component reads the process environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
    #[serde(default = "default_city")]
    pub default_city: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub confidence_model: ConfidenceModel,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub social: SocialConfig,
}

fn default_assistant_name() -> String {
    DEFAULT_ASSISTANT_NAME.to_string()
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            default_city: default_city(),
            debug: false,
            confidence_model: ConfidenceModel::default(),
            email: EmailConfig::default(),
            weather: WeatherConfig::default(),
            calendar: CalendarConfig::default(),
            social: SocialConfig::default(),
        }
    }
}

/// Mail account credentials. Both halves must be present to send.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailConfig {
    pub address: Option<String>,
    pub app_password: Option<String>,
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        matches!((&self.address, &self.app_password), (Some(a), Some(p)) if !a.is_empty() && !p.is_empty())
    }
}

/// Fixed readings served by the static weather provider, keyed by city.
///
/// Cities without a reading get simulated weather unless
/// `simulate_unknown` is off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub readings: BTreeMap<String, WeatherReading>,
    #[serde(default = "default_true")]
    pub simulate_unknown: bool,
}

fn default_true() -> bool {
    true
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            readings: BTreeMap::new(),
            simulate_unknown: true,
        }
    }
}

/// Where calendar events are kept. No path means in memory only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialConfig {
    pub handle: Option<String>,
}

impl Config {
    pub fn aide_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".aide"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::aide_dir()?.join("aide.toml"))
    }

    pub fn calendar_path() -> Result<PathBuf> {
        Ok(Self::aide_dir()?.join("calendar.json"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        alog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            alog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        alog_debug!(
            "Config loaded: assistant={}, default_city={}, readings={}",
            config.assistant_name,
            config.default_city,
            config.weather.readings.len()
        );
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        alog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}
