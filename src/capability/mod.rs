//! The capability contract.
//!
//! A capability is a named unit of work with a single entry point,
//! `execute(params) -> Outcome`. Every failure a capability can detect is
//! reported as an `Outcome` with `success == false`; the owning agent
//! additionally wraps faults (panics) so nothing escapes past it.

pub mod calendar;
pub mod email;
pub mod social;
pub mod weather;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, Result};

pub use calendar::{
    CalendarCapability, CalendarStore, Event, EventRef, InMemoryCalendar, JsonFileCalendar, Reminder,
};
pub use email::{EmailCapability, Mail, MailTransport, Outbox};
pub use social::{FeedProvider, InMemoryFeed, PostReceipt, SocialCapability, Trend};
pub use weather::{
    Condition, SimulatedWeather, StaticWeather, WeatherCapability, WeatherProvider, WeatherReading,
    WeatherSource,
};

/// Untyped key-value inputs handed to a capability.
pub type Params = Map<String, Value>;

/// A unit of work an agent can run.
pub trait Capability {
    /// Unique name within the owning agent.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Run the capability. Side effects happen only here.
    fn execute(&mut self, params: &Params) -> Outcome;
}

/// Public identity of a registered capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityInfo {
    pub name: String,
    pub description: String,
    pub enabled: bool,
}

/// Result of one capability invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub timestamp: DateTime<Utc>,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error_kind: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error_kind: Some(kind),
            timestamp: Utc::now(),
        }
    }

    /// Convert an error raised inside a capability. Errors without a
    /// dedicated kind report as `EXECUTION_ERROR`.
    pub fn from_error(err: &Error) -> Self {
        Self::failure(err.kind().unwrap_or(ErrorKind::ExecutionError), err.to_string())
    }

    pub fn with_data(mut self, data: impl Serialize) -> Self {
        // Serializing plain data structs cannot fail; a failure leaves data empty.
        self.data = serde_json::to_value(data).ok();
        self
    }

    /// Decode `data` into a typed value.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let data = self
            .data
            .clone()
            .ok_or_else(|| Error::Validation("outcome carries no data".to_string()))?;
        Ok(serde_json::from_value(data)?)
    }
}

/// Build an `Outcome` from a fallible body, the usual shape of `execute`.
pub fn outcome_of(result: Result<Outcome>) -> Outcome {
    result.unwrap_or_else(|err| Outcome::from_error(&err))
}

/// Required non-empty string param.
pub fn require_str<'a>(params: &'a Params, key: &str) -> Result<&'a str> {
    match params.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        Some(Value::String(_)) => Err(Error::Validation(format!("'{}' must not be empty", key))),
        Some(other) => Err(Error::Validation(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
        None => Err(Error::Validation(format!("'{}' is required", key))),
    }
}

/// Optional string param; present-but-not-a-string is still an error.
pub fn optional_str<'a>(params: &'a Params, key: &str) -> Result<Option<&'a str>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(Error::Validation(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
    }
}

/// Convenience for building params in code and tests.
#[macro_export]
macro_rules! params {
    () => { $crate::capability::Params::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::capability::Params::new();
        $( map.insert($key.to_string(), $crate::__private::json!($value)); )+
        map
    }};
}
