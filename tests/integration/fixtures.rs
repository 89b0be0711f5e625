//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Spy capabilities that count invocations
//! - Capabilities that fail or panic on demand
//! - Prebuilt orchestrators, events, and weather readings

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};

use aide::capability::{Capability, Condition, Event, Outcome, Params, WeatherReading};
use aide::{Agent, ErrorKind, Orchestrator};

/// Shared invocation counter, readable after the capability moves into an agent.
#[derive(Clone, Default)]
pub struct CallCounter(Rc<Cell<usize>>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.get()
    }

    fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Shared journal of `(capability, params)` pairs in call order.
#[derive(Clone, Default)]
pub struct CallJournal(Rc<RefCell<Vec<(String, Params)>>>);

impl CallJournal {
    pub fn names(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn params(&self, index: usize) -> Option<Params> {
        self.0.borrow().get(index).map(|(_, p)| p.clone())
    }

    fn record(&self, name: &str, params: &Params) {
        self.0.borrow_mut().push((name.to_string(), params.clone()));
    }
}

enum Behavior {
    Succeed,
    Fail(ErrorKind),
    Panic(&'static str),
}

/// Capability whose behavior is fixed at construction and whose calls are
/// counted and journaled.
pub struct SpyCapability {
    name: String,
    behavior: Behavior,
    counter: CallCounter,
    journal: Option<CallJournal>,
}

impl SpyCapability {
    fn with_behavior(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            counter: CallCounter::default(),
            journal: None,
        }
    }

    pub fn succeeding(name: &str) -> Self {
        Self::with_behavior(name, Behavior::Succeed)
    }

    pub fn failing(name: &str, kind: ErrorKind) -> Self {
        Self::with_behavior(name, Behavior::Fail(kind))
    }

    pub fn panicking(name: &str, message: &'static str) -> Self {
        Self::with_behavior(name, Behavior::Panic(message))
    }

    pub fn counter(&self) -> CallCounter {
        self.counter.clone()
    }

    pub fn journaled(mut self, journal: &CallJournal) -> Self {
        self.journal = Some(journal.clone());
        self
    }
}

impl Capability for SpyCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "test double"
    }

    fn execute(&mut self, params: &Params) -> Outcome {
        self.counter.bump();
        if let Some(journal) = &self.journal {
            journal.record(&self.name, params);
        }
        match self.behavior {
            Behavior::Succeed => Outcome::ok(format!("{} done", self.name)),
            Behavior::Fail(kind) => Outcome::failure(kind, format!("{} failed", self.name)),
            Behavior::Panic(message) => panic!("{}", message),
        }
    }
}

/// Orchestrator with agents `a`, `b`, `c`, each holding one spy capability
/// named `step`. `b`'s capability fails. Returns the counters in order.
pub fn abc_orchestrator(journal: &CallJournal) -> (Orchestrator, [CallCounter; 3]) {
    let a = SpyCapability::succeeding("a-step").journaled(journal);
    let b = SpyCapability::failing("b-step", ErrorKind::ExternalServiceError).journaled(journal);
    let c = SpyCapability::succeeding("c-step").journaled(journal);
    let counters = [a.counter(), b.counter(), c.counter()];

    let mut orchestrator = Orchestrator::new("test");
    orchestrator.register_agent(Agent::new("a", "first").with_capability(Box::new(a)));
    orchestrator.register_agent(Agent::new("b", "second").with_capability(Box::new(b)));
    orchestrator.register_agent(Agent::new("c", "third").with_capability(Box::new(c)));
    (orchestrator, counters)
}

pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 20)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn event(id: &str, title: &str, hour: u32) -> Event {
    Event::new(id, title, at(hour, 0))
}

pub fn rainy_and_cold(city: &str) -> WeatherReading {
    WeatherReading::new(city, 5.0, Condition::Rainy)
}

pub fn pleasant(city: &str) -> WeatherReading {
    WeatherReading::new(city, 22.0, Condition::Sunny)
}
