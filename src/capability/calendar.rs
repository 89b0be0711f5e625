//! Calendar capability: events and reminders over a pluggable store.
//!
//! Requests are decoded once from params into a closed `CalendarAction`;
//! an absent `action` means `list`.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::{outcome_of, Capability, Outcome, Params};
use crate::error::{Error, Result};
use crate::alog_debug;

/// Default event length when no end time is given.
pub const DEFAULT_EVENT_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Event {
    pub fn new(id: impl Into<String>, title: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            location: None,
            start,
            end: start + Duration::minutes(DEFAULT_EVENT_MINUTES),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = end;
        self
    }

    pub fn event_ref(&self) -> EventRef {
        EventRef {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }
}

/// Lightweight pointer to an event, carried in assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRef {
    pub id: String,
    pub title: String,
}

impl std::fmt::Display for EventRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}'", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub text: String,
    pub when: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence for events and reminders.
pub trait CalendarStore {
    fn create_event(&mut self, event: Event) -> Result<Event>;
    fn list_events(&self) -> Result<Vec<Event>>;
    fn delete_event(&mut self, id: &str) -> Result<Option<Event>>;
    fn add_reminder(&mut self, text: &str, when: &str) -> Result<Reminder>;
    fn list_reminders(&self) -> Result<Vec<Reminder>>;
}

#[derive(Debug, Default)]
pub struct InMemoryCalendar {
    events: Vec<Event>,
    reminders: Vec<Reminder>,
    next_id: u64,
}

/// Largest `N` among ids shaped `<prefix>-N`.
fn highest_suffix<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> u64 {
    ids.filter_map(|id| id.strip_prefix(prefix)?.strip_prefix('-')?.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing events, keeping their ids.
    pub fn with_events(events: Vec<Event>) -> Self {
        Self::from_parts(events, Vec::new())
    }

    /// Seed with events and reminders. Generated ids continue after the
    /// highest `event-N` / `reminder-N` already present.
    pub fn from_parts(events: Vec<Event>, reminders: Vec<Reminder>) -> Self {
        let next_id = highest_suffix(events.iter().map(|e| e.id.as_str()), "event")
            .max(highest_suffix(reminders.iter().map(|r| r.id.as_str()), "reminder"));
        Self {
            events,
            reminders,
            next_id,
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

impl CalendarStore for InMemoryCalendar {
    fn create_event(&mut self, mut event: Event) -> Result<Event> {
        if event.id.is_empty() {
            event.id = self.next_id("event");
        }
        self.events.push(event.clone());
        Ok(event)
    }

    fn list_events(&self) -> Result<Vec<Event>> {
        let mut events = self.events.clone();
        events.sort_by_key(|e| e.start);
        Ok(events)
    }

    fn delete_event(&mut self, id: &str) -> Result<Option<Event>> {
        Ok(self
            .events
            .iter()
            .position(|e| e.id == id)
            .map(|idx| self.events.remove(idx)))
    }

    fn add_reminder(&mut self, text: &str, when: &str) -> Result<Reminder> {
        let reminder = Reminder {
            id: self.next_id("reminder"),
            text: text.to_string(),
            when: when.to_string(),
            created_at: Utc::now(),
        };
        self.reminders.push(reminder.clone());
        Ok(reminder)
    }

    fn list_reminders(&self) -> Result<Vec<Reminder>> {
        Ok(self.reminders.clone())
    }
}

/// On-disk layout of `calendar.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CalendarFile {
    #[serde(default)]
    events: Vec<Event>,
    #[serde(default)]
    reminders: Vec<Reminder>,
}

/// Calendar kept in a JSON file so events survive between runs.
///
/// Every change rewrites the whole file through a temp file and rename.
#[derive(Debug)]
pub struct JsonFileCalendar {
    path: PathBuf,
    inner: InMemoryCalendar,
}

impl JsonFileCalendar {
    /// Open the calendar at `path`. A missing file is an empty calendar;
    /// nothing is written until the first change.
    pub fn open(path: &Path) -> Result<Self> {
        alog_debug!("JsonFileCalendar::open path={}", path.display());
        let file = if path.exists() {
            let contents = fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        } else {
            alog_debug!("Calendar file not found, starting empty");
            CalendarFile::default()
        };
        alog_debug!(
            "Calendar loaded: {} events, {} reminders",
            file.events.len(),
            file.reminders.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            inner: InMemoryCalendar::from_parts(file.events, file.reminders),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = CalendarFile {
            events: self.inner.events.clone(),
            reminders: self.inner.reminders.clone(),
        };
        let contents = serde_json::to_string_pretty(&file)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &contents)?;
        fs::rename(&temp_path, &self.path)?;
        alog_debug!("Calendar saved: {}", self.path.display());
        Ok(())
    }
}

impl CalendarStore for JsonFileCalendar {
    fn create_event(&mut self, event: Event) -> Result<Event> {
        let event = self.inner.create_event(event)?;
        self.save()?;
        Ok(event)
    }

    fn list_events(&self) -> Result<Vec<Event>> {
        self.inner.list_events()
    }

    fn delete_event(&mut self, id: &str) -> Result<Option<Event>> {
        let deleted = self.inner.delete_event(id)?;
        if deleted.is_some() {
            self.save()?;
        }
        Ok(deleted)
    }

    fn add_reminder(&mut self, text: &str, when: &str) -> Result<Reminder> {
        let reminder = self.inner.add_reminder(text, when)?;
        self.save()?;
        Ok(reminder)
    }

    fn list_reminders(&self) -> Result<Vec<Reminder>> {
        self.inner.list_reminders()
    }
}

fn default_when() -> String {
    "later".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum CalendarAction {
    Create {
        title: String,
        start: NaiveDateTime,
        #[serde(default)]
        end: Option<NaiveDateTime>,
        #[serde(default)]
        description: String,
        #[serde(default)]
        location: Option<String>,
    },
    List,
    Delete {
        id: String,
    },
    Remind {
        text: String,
        #[serde(default = "default_when")]
        when: String,
    },
    Reminders,
}

impl CalendarAction {
    fn decode(params: &Params) -> Result<Self> {
        let mut params = params.clone();
        params
            .entry("action")
            .or_insert_with(|| Value::String("list".to_string()));
        serde_json::from_value(Value::Object(params))
            .map_err(|e| Error::Validation(format!("invalid calendar request: {}", e)))
    }
}

pub struct CalendarCapability {
    store: Box<dyn CalendarStore>,
}

impl CalendarCapability {
    pub const NAME: &'static str = "calendar";

    pub fn new(store: Box<dyn CalendarStore>) -> Self {
        Self { store }
    }

    fn run(&mut self, params: &Params) -> Result<Outcome> {
        let action = CalendarAction::decode(params)?;
        alog_debug!("CalendarCapability: {:?}", action);
        match action {
            CalendarAction::Create {
                title,
                start,
                end,
                description,
                location,
            } => {
                if title.trim().is_empty() {
                    return Err(Error::Validation("'title' must not be empty".to_string()));
                }
                let end = end.unwrap_or(start + Duration::minutes(DEFAULT_EVENT_MINUTES));
                if end <= start {
                    return Err(Error::Validation("event must end after it starts".to_string()));
                }
                let event = self.store.create_event(Event {
                    id: String::new(),
                    title,
                    description,
                    location,
                    start,
                    end,
                })?;
                let mut message = format!(
                    "Event created: '{}' on {}",
                    event.title,
                    event.start.format("%Y-%m-%d at %H:%M")
                );
                if let Some(location) = &event.location {
                    message.push_str(&format!(" at {}", location));
                }
                Ok(Outcome::ok(message).with_data(&event))
            }
            CalendarAction::List => {
                let events = self.store.list_events()?;
                let message = if events.is_empty() {
                    "No events scheduled".to_string()
                } else {
                    let lines: Vec<String> = events
                        .iter()
                        .map(|e| format!("{} - {}", e.title, e.start.format("%Y-%m-%d %H:%M")))
                        .collect();
                    format!("Your events:\n{}", lines.join("\n"))
                };
                Ok(Outcome::ok(message).with_data(&events))
            }
            CalendarAction::Delete { id } => match self.store.delete_event(&id)? {
                Some(event) => Ok(Outcome::ok(format!("Event deleted: '{}'", event.title)).with_data(&event)),
                None => Err(Error::Validation(format!("no event with id '{}'", id))),
            },
            CalendarAction::Remind { text, when } => {
                if text.trim().is_empty() {
                    return Err(Error::Validation("'text' must not be empty".to_string()));
                }
                let reminder = self.store.add_reminder(&text, &when)?;
                Ok(Outcome::ok(format!("Reminder created: '{}' for {}", reminder.text, reminder.when))
                    .with_data(&reminder))
            }
            CalendarAction::Reminders => {
                let reminders = self.store.list_reminders()?;
                let message = if reminders.is_empty() {
                    "No reminders set".to_string()
                } else {
                    format!("{} reminder(s)", reminders.len())
                };
                Ok(Outcome::ok(message).with_data(&reminders))
            }
        }
    }
}

impl Capability for CalendarCapability {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Manage calendar events and reminders"
    }

    fn execute(&mut self, params: &Params) -> Outcome {
        outcome_of(self.run(params))
    }
}
