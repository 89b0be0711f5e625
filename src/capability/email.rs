//! Email capability over a pluggable transport.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

use super::{optional_str, outcome_of, require_str, Capability, Outcome, Params};
use crate::config::EmailConfig;
use crate::error::{Error, Result};
use crate::alog;

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

const DEFAULT_SUBJECT: &str = "Message from your assistant";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Delivers composed mail (SMTP in production).
pub trait MailTransport {
    fn send(&mut self, mail: &Mail) -> Result<()>;
}

/// In-memory transport. Clones share the same mailbox.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    sent: Rc<RefCell<Vec<Mail>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Mail> {
        self.sent.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.borrow().is_empty()
    }
}

impl MailTransport for Outbox {
    fn send(&mut self, mail: &Mail) -> Result<()> {
        self.sent.borrow_mut().push(mail.clone());
        Ok(())
    }
}

pub struct EmailCapability {
    config: EmailConfig,
    transport: Box<dyn MailTransport>,
}

impl EmailCapability {
    pub const NAME: &'static str = "email";

    pub fn new(config: EmailConfig, transport: Box<dyn MailTransport>) -> Self {
        Self { config, transport }
    }

    fn send(&mut self, params: &Params) -> Result<Outcome> {
        let from = match (&self.config.address, self.config.is_configured()) {
            (Some(address), true) => address.clone(),
            _ => {
                return Err(Error::NotConfigured(
                    "email address and app password are required".to_string(),
                ))
            }
        };

        let to = require_str(params, "to")?.trim();
        if !ADDRESS_RE.is_match(to) {
            return Err(Error::Validation(format!("'{}' is not an email address", to)));
        }
        let subject = optional_str(params, "subject")?.unwrap_or(DEFAULT_SUBJECT);
        let body = optional_str(params, "body")?.unwrap_or_default();

        let mail = Mail {
            from,
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            sent_at: Utc::now(),
        };
        self.transport.send(&mail)?;
        alog!("Email sent to {}", mail.to);

        Ok(Outcome::ok(format!("Email sent successfully to {}", mail.to))
            .with_data(serde_json::json!({ "recipient": mail.to, "subject": mail.subject })))
    }
}

impl Capability for EmailCapability {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Send email through the configured account"
    }

    fn execute(&mut self, params: &Params) -> Outcome {
        outcome_of(self.send(params))
    }
}
