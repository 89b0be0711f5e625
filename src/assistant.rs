//! Top-level assistant: a closed command set dispatched onto the agents.
//!
//! `Command` is decoded once at the edge (the binary derives it from CLI
//! arguments). `Assistant::dispatch` maps each variant to exactly one
//! handler. The `Plan` command runs the decision pipeline and keeps an
//! append-only history of every decision it made.

use chrono::NaiveDateTime;
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::agent::Agent;
use crate::capability::{
    CalendarCapability, CalendarStore, EmailCapability, Event, InMemoryCalendar, InMemoryFeed,
    JsonFileCalendar, Outbox, Outcome, Params, SocialCapability, StaticWeather, WeatherCapability,
    WeatherReading,
};
use crate::config::Config;
use crate::decision::synthesis::{REQUEST_CONTEXT_KEY, SCHEDULE_CONTEXT_KEY, WEATHER_CONTEXT_KEY};
use crate::decision::{
    assess_schedule, assess_weather, make_contextual_decision_with, ConfidenceModel, Decision,
    OverlapRule, TimeOverlap,
};
use crate::error::{Error, ErrorKind, Result};
use crate::orchestration::Orchestrator;
use crate::workflow::{Workflow, WorkflowRun, WorkflowStatus, WorkflowStep};
use crate::{alog, alog_warn};

pub const WEATHER_AGENT: &str = "weather";
pub const CALENDAR_AGENT: &str = "calendar";
pub const EMAIL_AGENT: &str = "email";
pub const SOCIAL_AGENT: &str = "social";

/// Names taken by the built-in domain agents.
pub const DOMAIN_AGENTS: [&str; 4] = [WEATHER_AGENT, CALENDAR_AGENT, EMAIL_AGENT, SOCIAL_AGENT];

/// Coordinator memory key for the most recent decision.
pub const LAST_DECISION_KEY: &str = "last_decision";

/// Everything the assistant can be asked to do.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Current weather for a city
    Weather {
        /// City name (defaults to the configured city)
        city: Option<String>,
    },

    /// List calendar events
    ListEvents,

    /// Create a calendar event
    CreateEvent {
        title: String,
        /// Start time, e.g. 2026-10-20T12:00:00
        start: NaiveDateTime,
        /// End time (defaults to one hour after start)
        #[arg(long)]
        end: Option<NaiveDateTime>,
        #[arg(long)]
        location: Option<String>,
    },

    /// Send an email
    SendEmail {
        to: String,
        #[arg(long, short = 's')]
        subject: Option<String>,
        #[arg(long, short = 'b', default_value = "")]
        body: String,
    },

    /// Show trending topics
    Trends {
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Publish a post
    Post { text: String },

    /// Weigh today's weather against the calendar and recommend a course of action
    Plan {
        /// What you want to do, in your own words
        #[arg(default_value = "")]
        request: String,
        #[arg(long)]
        city: Option<String>,
    },

    /// Run a workflow defined in a TOML file
    RunWorkflow { path: PathBuf },

    /// List every agent's capabilities
    Capabilities,

    /// List registered agents and their status
    Agents,
}

/// Human-readable answer to a command, with optional structured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl Reply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
            data: None,
            error_kind: None,
        }
    }

    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            text: err.to_string(),
            data: None,
            error_kind: err.kind(),
        }
    }

    fn with_data(mut self, data: impl Serialize) -> Self {
        self.data = serde_json::to_value(data).ok();
        self
    }
}

impl From<Outcome> for Reply {
    fn from(outcome: Outcome) -> Self {
        Self {
            success: outcome.success,
            text: outcome.message,
            data: outcome.data,
            error_kind: outcome.error_kind,
        }
    }
}

pub struct Assistant {
    orchestrator: Orchestrator,
    coordinator: String,
    default_city: String,
    confidence_model: ConfidenceModel,
    overlap_rule: Box<dyn OverlapRule>,
    history: Vec<Decision>,
}

impl Assistant {
    /// Wrap an orchestrator that already holds the `coordinator` agent and
    /// the `weather` and `calendar` agents the planner uses.
    pub fn new(
        orchestrator: Orchestrator,
        coordinator: impl Into<String>,
        default_city: impl Into<String>,
        confidence_model: ConfidenceModel,
    ) -> Result<Self> {
        let coordinator = coordinator.into();
        if orchestrator.get_agent(&coordinator).is_none() {
            return Err(Error::AgentNotFound(coordinator));
        }
        Ok(Self {
            orchestrator,
            coordinator,
            default_city: default_city.into(),
            confidence_model,
            overlap_rule: Box::new(TimeOverlap),
            history: Vec::new(),
        })
    }

    /// Build the standard agent set from config.
    ///
    /// Events go to `config.calendar.path` when set and stay in memory
    /// otherwise. The coordinator may not share a name with a domain agent.
    pub fn from_config(config: &Config) -> Result<Self> {
        let name = config.assistant_name.trim();
        if name.is_empty() {
            return Err(Error::Validation("assistant_name must not be empty".to_string()));
        }
        if DOMAIN_AGENTS.contains(&name) {
            return Err(Error::Validation(format!(
                "assistant_name '{}' is reserved for a built-in agent",
                name
            )));
        }

        let store: Box<dyn CalendarStore> = match &config.calendar.path {
            Some(path) => Box::new(JsonFileCalendar::open(path)?),
            None => Box::new(InMemoryCalendar::new()),
        };

        let weather = Agent::new(WEATHER_AGENT, "Reports current conditions").with_capability(
            Box::new(WeatherCapability::new(
                Box::new(StaticWeather::from_config(&config.weather)),
                config.default_city.clone(),
            )),
        );
        let calendar = Agent::new(CALENDAR_AGENT, "Keeps the calendar")
            .with_capability(Box::new(CalendarCapability::new(store)));
        let email = Agent::new(EMAIL_AGENT, "Sends mail").with_capability(Box::new(
            EmailCapability::new(config.email.clone(), Box::new(Outbox::new())),
        ));
        let social = Agent::new(SOCIAL_AGENT, "Follows and posts to the social feed").with_capability(
            Box::new(SocialCapability::new(config.social.clone(), Box::new(InMemoryFeed::new()))),
        );
        let coordinator = Agent::new(name, "Combines weather and schedule into decisions");

        let mut orchestrator = Orchestrator::new(format!("{}-orchestrator", name));
        for agent in [weather, calendar, email, social, coordinator] {
            orchestrator.register_agent(agent);
        }

        Ok(Self {
            orchestrator,
            coordinator: name.to_string(),
            default_city: config.default_city.clone(),
            confidence_model: config.confidence_model,
            overlap_rule: Box::new(TimeOverlap),
            history: Vec::new(),
        })
    }

    pub fn with_overlap_rule(mut self, rule: Box<dyn OverlapRule>) -> Self {
        self.overlap_rule = rule;
        self
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut Orchestrator {
        &mut self.orchestrator
    }

    pub fn coordinator(&self) -> Option<&Agent> {
        self.orchestrator.get_agent(&self.coordinator)
    }

    /// Every decision made so far, oldest first.
    pub fn decision_history(&self) -> &[Decision] {
        &self.history
    }

    pub fn dispatch(&mut self, command: Command) -> Reply {
        alog!("Dispatching {:?}", command);
        match command {
            Command::Weather { city } => {
                let mut params = Params::new();
                if let Some(city) = city {
                    params.insert("city".into(), Value::String(city));
                }
                self.invoke(WEATHER_AGENT, WeatherCapability::NAME, params)
            }
            Command::ListEvents => self.invoke(
                CALENDAR_AGENT,
                CalendarCapability::NAME,
                crate::params! { "action" => "list" },
            ),
            Command::CreateEvent {
                title,
                start,
                end,
                location,
            } => {
                let mut params = crate::params! { "action" => "create", "title" => title, "start" => start };
                if let Some(end) = end {
                    params.insert("end".into(), serde_json::json!(end));
                }
                if let Some(location) = location {
                    params.insert("location".into(), Value::String(location));
                }
                self.invoke(CALENDAR_AGENT, CalendarCapability::NAME, params)
            }
            Command::SendEmail { to, subject, body } => {
                let mut params = crate::params! { "to" => to, "body" => body };
                if let Some(subject) = subject {
                    params.insert("subject".into(), Value::String(subject));
                }
                self.invoke(EMAIL_AGENT, EmailCapability::NAME, params)
            }
            Command::Trends { limit } => {
                let mut params = crate::params! { "action" => "trends" };
                if let Some(limit) = limit {
                    params.insert("limit".into(), serde_json::json!(limit));
                }
                self.invoke(SOCIAL_AGENT, SocialCapability::NAME, params)
            }
            Command::Post { text } => self.invoke(
                SOCIAL_AGENT,
                SocialCapability::NAME,
                crate::params! { "action" => "post", "text" => text },
            ),
            Command::Plan { request, city } => match self.plan(city.as_deref(), &request) {
                Ok(decision) => Reply::ok(decision.to_string()).with_data(&decision),
                Err(err) => Reply::from_error(&err),
            },
            Command::RunWorkflow { path } => match self.run_workflow_file(&path) {
                Ok(run) => workflow_reply(&run),
                Err(err) => Reply::from_error(&err),
            },
            Command::Capabilities => self.capabilities_reply(),
            Command::Agents => self.agents_reply(),
        }
    }

    fn invoke(&mut self, agent: &str, capability: &str, params: Params) -> Reply {
        match self.orchestrator.get_agent_mut(agent) {
            Some(agent) => agent.execute_capability(capability, &params).into(),
            None => Reply::from_error(&Error::AgentNotFound(agent.to_string())),
        }
    }

    fn run_workflow_file(&mut self, path: &std::path::Path) -> Result<WorkflowRun> {
        let text = std::fs::read_to_string(path)?;
        let workflow = Workflow::from_toml(&text)?;
        Ok(self.orchestrator.run_workflow(&workflow))
    }

    fn capabilities_reply(&self) -> Reply {
        let mut lines = Vec::new();
        let mut all = Vec::new();
        for name in self.orchestrator.list_agents() {
            if let Some(agent) = self.orchestrator.get_agent(name) {
                for info in agent.describe_capabilities() {
                    let flag = if info.enabled { "" } else { " (disabled)" };
                    lines.push(format!("{}.{}: {}{}", name, info.name, info.description, flag));
                    all.push(info);
                }
            }
        }
        if lines.is_empty() {
            return Reply::ok("No capabilities registered");
        }
        Reply::ok(lines.join("\n")).with_data(&all)
    }

    fn agents_reply(&self) -> Reply {
        let lines: Vec<String> = self
            .orchestrator
            .list_agents()
            .into_iter()
            .filter_map(|name| self.orchestrator.get_agent(name))
            .map(|agent| format!("{} [{}]: {}", agent.name(), agent.status(), agent.description()))
            .collect();
        Reply::ok(lines.join("\n")).with_data(self.orchestrator.list_agents())
    }

    /// Fetch weather and events through a workflow, assess both, and
    /// synthesize a decision.
    ///
    /// The assessments and the decision are written to the coordinator's
    /// memory and the decision is appended to the history.
    pub fn plan(&mut self, city: Option<&str>, request: &str) -> Result<Decision> {
        let city = city.unwrap_or(self.default_city.as_str()).to_string();
        let workflow = Workflow::new(
            "plan",
            vec![
                WorkflowStep::new(WEATHER_AGENT, WeatherCapability::NAME).param("city", city),
                WorkflowStep::new(CALENDAR_AGENT, CalendarCapability::NAME).param("action", "list"),
            ],
        );
        let run = self.orchestrator.run_workflow(&workflow);

        let (weather_outcome, calendar_outcome) = match (&run.status, run.results.as_slice()) {
            (WorkflowStatus::Completed, [weather, calendar]) => (weather, calendar),
            (WorkflowStatus::Halted { at_step }, results) => {
                let message = results.last().map(|r| r.message.clone()).unwrap_or_default();
                alog_warn!("Planning stopped: {}", message);
                return Err(Error::WorkflowHalted {
                    step: *at_step,
                    message,
                });
            }
            (_, results) => {
                return Err(Error::Execution(format!(
                    "planning workflow returned {} result(s)",
                    results.len()
                )))
            }
        };
        let reading: WeatherReading = weather_outcome.data_as()?;
        let events: Vec<Event> = calendar_outcome.data_as()?;

        let weather = assess_weather(reading, &events);
        let schedule = assess_schedule(&events, &weather, self.overlap_rule.as_ref());
        let decision =
            make_contextual_decision_with(self.confidence_model, &weather, &schedule, request);

        let coordinator = self
            .orchestrator
            .get_agent_mut(&self.coordinator)
            .ok_or_else(|| Error::AgentNotFound(self.coordinator.clone()))?;
        coordinator.store_memory(WEATHER_CONTEXT_KEY, serde_json::to_value(&weather)?);
        coordinator.store_memory(SCHEDULE_CONTEXT_KEY, serde_json::to_value(&schedule)?);
        if !request.trim().is_empty() {
            coordinator.store_memory(REQUEST_CONTEXT_KEY, Value::String(request.trim().to_string()));
        }
        coordinator.store_memory(LAST_DECISION_KEY, serde_json::to_value(&decision)?);

        self.history.push(decision.clone());
        Ok(decision)
    }
}

fn workflow_reply(run: &WorkflowRun) -> Reply {
    let mut lines = vec![format!("Workflow {} {}", run.workflow_id.short(), run.status)];
    for (index, outcome) in run.results.iter().enumerate() {
        let mark = if outcome.success { "ok" } else { "failed" };
        lines.push(format!("  {}. [{}] {}", index + 1, mark, outcome.message));
    }
    Reply {
        success: run.succeeded(),
        text: lines.join("\n"),
        data: serde_json::to_value(run).ok(),
        error_kind: run.failures().last().and_then(|o| o.error_kind),
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("orchestrator", &self.orchestrator)
            .field("coordinator", &self.coordinator)
            .field("confidence_model", &self.confidence_model)
            .field("decisions", &self.history.len())
            .finish()
    }
}
